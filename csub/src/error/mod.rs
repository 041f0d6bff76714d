//! Front-end error types and reporting

use crate::ast::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CompileError>;

/// Error raised while turning a source file into a `Program`
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Lexer error at {span:?}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parser error at {span:?}: {message}")]
    Parser { message: String, span: Span },

    #[error("IO error: {message}")]
    Io { message: String },

    /// Malformed serialized program
    #[error("JSON error: {message}")]
    Json { message: String },
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn json_error(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } | Self::Parser { span, .. } => Some(*span),
            Self::Io { .. } | Self::Json { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lexer { message, .. }
            | Self::Parser { message, .. }
            | Self::Io { message }
            | Self::Json { message } => message,
        }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        CompileError::io_error(err.to_string())
    }
}

impl From<serde_json::Error> for CompileError {
    fn from(err: serde_json::Error) -> Self {
        CompileError::json_error(err.to_string())
    }
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &CompileError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = match error {
        CompileError::Lexer { .. } => "Lexer",
        CompileError::Parser { .. } => "Parser",
        CompileError::Io { .. } => "IO",
        CompileError::Json { .. } => "JSON",
    };

    let report = if let Some(span) = error.span() {
        Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
    } else {
        Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind} error: {}", error.message()))
            .finish()
    };

    // stderr write failures are ignored
    let _ = report.eprint((filename, Source::from(source)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_error_has_span() {
        let err = CompileError::lexer("unexpected character: '@'", Span::new(3, 4));
        assert_eq!(err.span(), Some(Span::new(3, 4)));
        assert_eq!(err.message(), "unexpected character: '@'");
    }

    #[test]
    fn test_io_error_has_no_span() {
        let err = CompileError::io_error("missing.c: not found");
        assert_eq!(err.span(), None);
        assert_eq!(err.to_string(), "IO error: missing.c: not found");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<crate::ast::Program>("{").unwrap_err();
        let err: CompileError = json_err.into();
        assert!(matches!(err, CompileError::Json { .. }));
    }

    #[test]
    fn test_parser_error_display() {
        let err = CompileError::parser("unexpected token", Span::new(0, 1));
        assert!(err.to_string().starts_with("Parser error"));
    }
}
