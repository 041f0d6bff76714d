//! Statement AST nodes

use super::{Expr, LValue, Spanned, Type};
use serde::{Deserialize, Serialize};

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `T name;` or `T name = init;`
    Decl {
        ty: Spanned<Type>,
        name: Spanned<String>,
        init: Option<Spanned<Expr>>,
    },

    /// `target = value;`
    Assign {
        target: Spanned<LValue>,
        value: Spanned<Expr>,
    },

    /// `if (cond) then_branch [else else_branch]`
    If {
        cond: Spanned<Expr>,
        then_branch: Box<Spanned<Stmt>>,
        else_branch: Option<Box<Spanned<Stmt>>>,
    },

    /// `return [expr];`
    Return(Option<Spanned<Expr>>),

    /// `{ ... }`
    Block(Vec<Spanned<Stmt>>),

    /// Expression evaluated for its side effects
    Expr(Spanned<Expr>),

    /// `;`
    Empty,
}
