//! csub CLI

use clap::{Parser, Subcommand};
use csub::ast::Program;
use csub::error::report_error;
use csub::interp::{DEFAULT_MAX_DEPTH, InterpConfig, run_program};
use csub::CompileError;
use std::path::{Path, PathBuf};

/// Exit status for front-end and evaluation failures
const FAILURE_EXIT: i32 = 101;

#[derive(Parser)]
#[command(name = "csub", version, about = "Evaluator for a small C subset")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a program and exit with the value its `main` returns
    ///
    /// The status is `main`'s value truncated by the OS. When parsing or
    /// evaluation fails, a diagnostic goes to stderr and the status is 101,
    /// the same status a `main` returning 101 produces. Use `csub test` to
    /// tell the two apart.
    Run {
        /// C source file, or a JSON AST produced by `parse`
        file: PathBuf,
        /// Maximum number of nested calls
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Run fixtures; each passes when its `main` returns 0
    Test {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Maximum number of nested calls
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Parse and dump AST as JSON
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let code = match cli.command {
        Command::Run { file, max_depth } => run_file(&file, InterpConfig::with_max_depth(max_depth)),
        Command::Test { files, max_depth } => {
            test_files(&files, InterpConfig::with_max_depth(max_depth))
        }
        Command::Parse { file } => report(parse_file(&file)),
        Command::Tokens { file } => report(tokenize_file(&file)),
    };

    std::process::exit(code);
}

/// Install a `fmt` subscriber when `RUST_LOG` is set
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn report(result: Result<(), Box<dyn std::error::Error>>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

/// Parse `source` as a JSON AST when the file ends in `.json`, as C otherwise
fn load_program(path: &Path, source: &str) -> csub::Result<Program> {
    if path.extension().is_some_and(|ext| ext == "json") {
        return Ok(serde_json::from_str(source)?);
    }
    csub::parser::parse_source(&path.display().to_string(), source)
}

fn read_program(path: &Path) -> csub::Result<Program> {
    let source = std::fs::read_to_string(path)?;
    load_program(path, &source)
}

fn run_file(path: &Path, config: InterpConfig) -> i32 {
    let filename = path.display().to_string();
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", CompileError::from(e));
            return FAILURE_EXIT;
        }
    };

    let program = match load_program(path, &source) {
        Ok(program) => program,
        Err(e) => {
            match e.span() {
                Some(_) => report_error(&filename, &source, &e),
                None => eprintln!("Error: {e}"),
            }
            return FAILURE_EXIT;
        }
    };

    match run_program(program, config) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Runtime error: {e}");
            FAILURE_EXIT
        }
    }
}

fn test_files(files: &[PathBuf], config: InterpConfig) -> i32 {
    let mut failed = 0;
    for path in files {
        let outcome = match read_program(path) {
            Ok(program) => match run_program(program, config) {
                Ok(0) => "PASS".to_string(),
                Ok(value) => format!("FAIL (returned {value})"),
                Err(e) => format!("ERROR ({e})"),
            },
            Err(e) => format!("ERROR ({e})"),
        };
        if outcome != "PASS" {
            failed += 1;
        }
        println!("{}: {outcome}", path.display());
    }

    println!("{} passed, {failed} failed", files.len() - failed);
    if failed == 0 { 0 } else { 1 }
}

fn parse_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let program = read_program(path)?;
    println!("{}", serde_json::to_string_pretty(&program)?);
    Ok(())
}

fn tokenize_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;

    let tokens = csub::lexer::tokenize(&source)?;
    for (tok, span) in &tokens {
        println!("{:?} @ {}..{}", tok, span.start, span.end);
    }

    Ok(())
}
