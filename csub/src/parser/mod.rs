//! Parser implementation using lalrpop

use crate::ast::{Expr, Program, Span, Spanned};
use crate::error::{CompileError, Result};
use crate::lexer::{tokenize, Token};


lalrpop_util::lalrpop_mod!(
    #[allow(clippy::all)]
    grammar
);

type GrammarError = lalrpop_util::ParseError<usize, Token, Spanned<String>>;

/// Parse tokens into AST
pub fn parse(_filename: &str, _source: &str, tokens: Vec<(Token, Span)>) -> Result<Program> {
    grammar::ProgramParser::new()
        .parse(triples(tokens))
        .map_err(convert_error)
}

/// Parse a single expression (used by tests and tooling)
pub fn parse_expression(source: &str) -> Result<Spanned<Expr>> {
    let tokens = tokenize(source)?;
    grammar::ExpressionParser::new()
        .parse(triples(tokens))
        .map_err(convert_error)
}

/// Tokenize and parse a complete source file
pub fn parse_source(filename: &str, source: &str) -> Result<Program> {
    let tokens = tokenize(source)?;
    parse(filename, source, tokens)
}

fn triples(tokens: Vec<(Token, Span)>) -> impl Iterator<Item = (usize, Token, usize)> {
    tokens
        .into_iter()
        .map(|(tok, span)| (span.start, tok, span.end))
}

fn convert_error(e: GrammarError) -> CompileError {
    match e {
        lalrpop_util::ParseError::User { error } => CompileError::parser(error.node, error.span),
        other => {
            let span = match &other {
                lalrpop_util::ParseError::InvalidToken { location } => {
                    Span::new(*location, *location + 1)
                }
                lalrpop_util::ParseError::UnrecognizedEof { location, .. } => {
                    Span::new(*location, *location + 1)
                }
                lalrpop_util::ParseError::UnrecognizedToken { token, .. } => {
                    Span::new(token.0, token.2)
                }
                lalrpop_util::ParseError::ExtraToken { token } => Span::new(token.0, token.2),
                lalrpop_util::ParseError::User { error } => error.span,
            };
            CompileError::parser(format!("{other}"), span)
        }
    }
}
