//! Expression AST nodes

use super::Spanned;
use serde::{Deserialize, Serialize};

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal, as written (wrapped to 32 bits on evaluation)
    IntLit(i64),

    /// Variable reference
    Var(String),

    /// Binary operation
    Binary {
        left: Box<Spanned<Expr>>,
        op: BinOp,
        right: Box<Spanned<Expr>>,
    },

    /// Unary operation
    Unary {
        op: UnOp,
        expr: Box<Spanned<Expr>>,
    },

    /// Function call
    Call {
        func: String,
        args: Vec<Spanned<Expr>>,
    },

    /// Field access: expr.field
    FieldAccess {
        expr: Box<Spanned<Expr>>,
        field: Spanned<String>,
    },
}

impl Expr {
    pub fn binary(left: Spanned<Expr>, op: BinOp, right: Spanned<Expr>) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn call(func: impl Into<String>, args: Vec<Spanned<Expr>>) -> Self {
        Expr::Call {
            func: func.into(),
            args,
        }
    }

    pub fn field(expr: Spanned<Expr>, field: impl Into<String>) -> Self {
        Expr::FieldAccess {
            expr: Box::new(expr),
            field: Spanned::unspanned(field.into()),
        }
    }
}

/// Assignment target: a variable followed by zero or more field selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LValue {
    pub var: String,
    pub fields: Vec<String>,
}

impl LValue {
    pub fn var(name: impl Into<String>) -> Self {
        LValue {
            var: name.into(),
            fields: Vec::new(),
        }
    }

    /// Convert `x`, `x.a`, `x.a.b` into an lvalue; any other shape is not assignable.
    pub fn from_expr(expr: &Expr) -> Option<LValue> {
        match expr {
            Expr::Var(name) => Some(LValue::var(name.clone())),
            Expr::FieldAccess { expr, field } => {
                let mut lvalue = LValue::from_expr(&expr.node)?;
                lvalue.fields.push(field.node.clone());
                Some(lvalue)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for LValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.var)?;
        for field in &self.fields {
            write!(f, ".{field}")?;
        }
        Ok(())
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,

    // Logical (short-circuit)
    And,
    Or,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        write!(f, "{s}")
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    /// Negation (-)
    Neg,
    /// Logical not (!)
    Not,
    /// Bitwise complement (~)
    BitNot,
}

impl std::fmt::Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnOp::Neg => write!(f, "-"),
            UnOp::Not => write!(f, "!"),
            UnOp::BitNot => write!(f, "~"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lvalue_from_var() {
        let lv = LValue::from_expr(&Expr::Var("p".to_string())).unwrap();
        assert_eq!(lv, LValue::var("p"));
    }

    #[test]
    fn test_lvalue_from_nested_field() {
        let inner = Spanned::unspanned(Expr::field(Spanned::unspanned(Expr::Var("r".to_string())), "origin"));
        let lv = LValue::from_expr(&Expr::field(inner, "x")).unwrap();
        assert_eq!(lv.var, "r");
        assert_eq!(lv.fields, vec!["origin".to_string(), "x".to_string()]);
        assert_eq!(lv.to_string(), "r.origin.x");
    }

    #[test]
    fn test_lvalue_rejects_call_and_literal() {
        assert!(LValue::from_expr(&Expr::IntLit(1)).is_none());
        assert!(LValue::from_expr(&Expr::call("f", vec![])).is_none());
        let call_field = Expr::field(Spanned::unspanned(Expr::call("make", vec![])), "x");
        assert!(LValue::from_expr(&call_field).is_none());
    }

    #[test]
    fn test_binop_display() {
        assert_eq!(BinOp::Shl.to_string(), "<<");
        assert_eq!(BinOp::BitXor.to_string(), "^");
        assert_eq!(BinOp::And.to_string(), "&&");
    }
}
