//! Integration tests for the csub evaluator
//!
//! Runs whole programs through the public pipeline:
//! - Corpus fixtures (each `main` returns 0 on success)
//! - Function calls, recursion and the depth limit
//! - Struct value semantics
//! - Error kinds surfaced by `run_program`

use csub::ast::{Expr, FnDef, Item, Param, Program, Span, Spanned, Stmt, Type};
use csub::interp::{Interpreter, Value};
use csub::parser::parse_source;
use csub::{EvalError, InterpConfig, run_program};

/// Helper to parse and run a program with the default configuration
fn run(source: &str) -> Result<i32, EvalError> {
    run_with(source, InterpConfig::default())
}

fn run_with(source: &str, config: InterpConfig) -> Result<i32, EvalError> {
    let program = parse_source("test.c", source).expect("Parse should succeed");
    run_program(program, config)
}

/// Helper to load a program for host-side calls
fn load(source: &str) -> Interpreter {
    let program = parse_source("test.c", source).expect("Parse should succeed");
    Interpreter::new(program).expect("Load should succeed")
}

fn call_int(interp: &mut Interpreter, name: &str, args: &[i32]) -> Result<i32, EvalError> {
    let args = args.iter().copied().map(Value::Int).collect();
    interp.call(name, args)?.expect_int()
}

const FUNCTIONS: &str = include_str!("fixtures/008_functions.c");
const RECURSION: &str = include_str!("fixtures/009_recursion.c");
const BITWISE: &str = include_str!("fixtures/012_bitwise.c");
const STRUCTS: &str = include_str!("fixtures/014_struct.c");

// ============================================
// Corpus fixtures
// ============================================

#[test]
fn test_fixture_functions() {
    assert_eq!(run(FUNCTIONS), Ok(0));
}

#[test]
fn test_fixture_recursion() {
    assert_eq!(run(RECURSION), Ok(0));
}

#[test]
fn test_fixture_bitwise() {
    assert_eq!(run(BITWISE), Ok(0));
}

#[test]
fn test_fixture_struct() {
    assert_eq!(run(STRUCTS), Ok(0));
}

#[test]
fn test_fixture_fails_with_its_own_code() {
    // Break the third check of the functions fixture
    let broken = FUNCTIONS.replace("max(10, 20) != 20", "max(10, 20) != 10");
    assert_eq!(run(&broken), Ok(3));
}

// ============================================
// Functions from the corpus, called directly
// ============================================

#[test]
fn test_add_square_max() {
    let mut interp = load(FUNCTIONS);
    assert_eq!(call_int(&mut interp, "add", &[3, 4]), Ok(7));
    assert_eq!(call_int(&mut interp, "add", &[-3, 3]), Ok(0));
    assert_eq!(call_int(&mut interp, "square", &[5]), Ok(25));
    assert_eq!(call_int(&mut interp, "square", &[-6]), Ok(36));
    assert_eq!(call_int(&mut interp, "max", &[10, 20]), Ok(20));
    assert_eq!(call_int(&mut interp, "max", &[30, 15]), Ok(30));
}

#[test]
fn test_max_tie_returns_second_argument() {
    let mut interp = load(FUNCTIONS);
    assert_eq!(call_int(&mut interp, "max", &[7, 7]), Ok(7));
}

#[test]
fn test_add_wraps_at_i32_bounds() {
    let mut interp = load(FUNCTIONS);
    assert_eq!(call_int(&mut interp, "add", &[i32::MAX, 1]), Ok(i32::MIN));
    assert_eq!(call_int(&mut interp, "square", &[65536]), Ok(0));
}

#[test]
fn test_fibonacci_and_factorial() {
    let mut interp = load(RECURSION);
    let fib: Vec<i32> = (0..=10)
        .map(|n| call_int(&mut interp, "fibonacci", &[n]).unwrap())
        .collect();
    assert_eq!(fib, vec![0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55]);
    assert_eq!(call_int(&mut interp, "factorial", &[5]), Ok(120));
    assert_eq!(call_int(&mut interp, "factorial", &[1]), Ok(1));
    assert_eq!(call_int(&mut interp, "factorial", &[0]), Ok(1));
    assert_eq!(call_int(&mut interp, "factorial", &[-4]), Ok(1));
}

#[test]
fn test_factorial_overflow_wraps() {
    let mut interp = load(RECURSION);
    // 13! = 6227020800, reduced modulo 2^32
    assert_eq!(
        call_int(&mut interp, "factorial", &[13]),
        Ok(6_227_020_800_i64 as u32 as i32)
    );
}

#[test]
fn test_unknown_function() {
    let mut interp = load(FUNCTIONS);
    assert_eq!(
        interp.call("cube", vec![Value::Int(2)]),
        Err(EvalError::unknown_function("cube"))
    );
}

// ============================================
// Depth limit
// ============================================

#[test]
fn test_stack_overflow_then_recovery() {
    let mut interp = {
        let program = parse_source("test.c", RECURSION).unwrap();
        Interpreter::with_config(program, InterpConfig::with_max_depth(20)).unwrap()
    };
    assert_eq!(
        call_int(&mut interp, "factorial", &[100]),
        Err(EvalError::StackOverflow { limit: 20 })
    );
    assert_eq!(interp.depth(), 0);
    // Later independent evaluations are unaffected
    assert_eq!(call_int(&mut interp, "factorial", &[5]), Ok(120));
    assert_eq!(interp.run_main(), Ok(0));
}

#[test]
fn test_unbounded_recursion_overflows_with_default_limit() {
    let source = "int forever(int n) { return forever(n + 1); } int main() { return forever(0); }";
    assert_eq!(
        run(source),
        Err(EvalError::StackOverflow {
            limit: csub::interp::DEFAULT_MAX_DEPTH
        })
    );
}

#[test]
fn test_fixture_needs_enough_depth() {
    // fibonacci(10) nests 10 calls below main
    assert_eq!(run_with(RECURSION, InterpConfig::with_max_depth(12)), Ok(0));
    assert!(matches!(
        run_with(RECURSION, InterpConfig::with_max_depth(5)),
        Err(EvalError::StackOverflow { limit: 5 })
    ));
}

// ============================================
// Struct value semantics
// ============================================

#[test]
fn test_struct_argument_copy_is_independent() {
    let source = "
        struct Point { int x; int y; };
        int move_x(struct Point p) { p.x = p.x + 100; return p.x; }
        int main() {
            struct Point p;
            p.x = 1;
            p.y = 2;
            if (move_x(p) != 101) return 1;
            if (p.x != 1) return 2;
            return 0;
        }";
    assert_eq!(run(source), Ok(0));
}

#[test]
fn test_struct_copy_then_mutate_original() {
    let source = "
        struct Point { int x; int y; };
        int main() {
            struct Point a;
            a.x = 1;
            a.y = 2;
            struct Point b = a;
            a.x = 9;
            return b.x;
        }";
    assert_eq!(run(source), Ok(1));
}

#[test]
fn test_distance_sq_from_host() {
    // The fixture has no constructor; add one alongside it
    let source = format!(
        "{STRUCTS}
        struct Point make(int x, int y) {{ struct Point p; p.x = x; p.y = y; return p; }}"
    );
    let mut interp = load(&source);
    let expr = csub::parser::parse_expression("distance_sq(make(3, 4), make(0, 0))").unwrap();
    assert_eq!(interp.eval_expr(&expr), Ok(Value::Int(25)));
}

#[test]
fn test_uninitialized_field_read() {
    let source = "
        struct Point { int x; int y; };
        int main() { struct Point p; p.x = 3; return p.x + p.y; }";
    assert_eq!(run(source), Err(EvalError::uninitialized_field("Point", "y")));
}

// ============================================
// Error kinds
// ============================================

#[test]
fn test_runtime_error_kinds() {
    assert_eq!(
        run("int main() { return 1 / (2 - 2); }"),
        Err(EvalError::DivisionByZero)
    );
    assert_eq!(
        run("int main() { return 1 << 40; }"),
        Err(EvalError::InvalidShift { count: 40 })
    );
    assert_eq!(
        run("int main() { return y; }"),
        Err(EvalError::unknown_identifier("y"))
    );
    assert_eq!(
        run("struct P { int x; }; int main() { struct P p; p.q = 1; return 0; }"),
        Err(EvalError::unknown_field("P", "q"))
    );
    assert_eq!(
        run("int f(int a) { return a; } int main() { return f(1, 2); }"),
        Err(EvalError::arity_mismatch("f", 1, 2))
    );
    assert_eq!(
        run("int main() { int a = 1; int a = 2; return a; }"),
        Err(EvalError::redeclaration("a"))
    );
}

#[test]
fn test_duplicate_declaration_at_load() {
    assert_eq!(
        run("int main() { return 0; } int main() { return 1; }"),
        Err(EvalError::duplicate_declaration("main"))
    );
    assert_eq!(
        run("struct main { int x; }; int main() { return 0; }"),
        Err(EvalError::duplicate_declaration("main"))
    );
}

#[test]
fn test_error_messages() {
    let err = run("int main() { return missing(); }").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"undefined function: missing");
    let err = run("int main() { int x; return x; }").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"variable x read before it was assigned");
}

// ============================================
// Programs not built by the parser
// ============================================

fn spanned<T>(node: T) -> Spanned<T> {
    Spanned::unspanned(node)
}

#[test]
fn test_hand_built_program() {
    // int double(int n) { return n + n; }  int main() { return double(21); }
    let double = FnDef {
        name: spanned("double".to_string()),
        params: vec![Param {
            name: spanned("n".to_string()),
            ty: spanned(Type::Int),
        }],
        ret_ty: spanned(Type::Int),
        body: vec![spanned(Stmt::Return(Some(spanned(Expr::binary(
            spanned(Expr::Var("n".to_string())),
            csub::ast::BinOp::Add,
            spanned(Expr::Var("n".to_string())),
        )))))],
        span: Span::default(),
    };
    let main = FnDef {
        name: spanned("main".to_string()),
        params: Vec::new(),
        ret_ty: spanned(Type::Int),
        body: vec![spanned(Stmt::Return(Some(spanned(Expr::call(
            "double",
            vec![spanned(Expr::IntLit(21))],
        )))))],
        span: Span::default(),
    };
    let program = Program {
        items: vec![Item::FnDef(double), Item::FnDef(main)],
    };
    assert_eq!(run_program(program, InterpConfig::default()), Ok(42));
}

#[test]
fn test_program_survives_json_serialization() {
    let program = parse_source("014_struct.c", STRUCTS).unwrap();
    let json = serde_json::to_string(&program).unwrap();
    let reloaded: Program = serde_json::from_str(&json).unwrap();
    assert_eq!(reloaded, program);
    assert_eq!(run_program(reloaded, InterpConfig::default()), Ok(0));
}

#[test]
fn test_json_literal_wider_than_32_bits_is_rejected() {
    let program = parse_source("wide.c", "int main() { return 7; }").unwrap();
    let json = serde_json::to_string(&program).unwrap();
    assert!(json.contains("\"IntLit\":7"));
    let patched = json.replace("\"IntLit\":7", "\"IntLit\":4294967296");
    let reloaded: Program = serde_json::from_str(&patched).unwrap();
    assert_eq!(
        run_program(reloaded, InterpConfig::default()),
        Err(EvalError::LiteralOutOfRange { value: 4_294_967_296 })
    );
}
