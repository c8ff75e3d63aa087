use thiserror::Error;

/// Errors raised while decoding a predicate tree or field path from its external shape
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Malformed predicate: {0}")]
    MalformedPredicate(String),
    #[error("Expected {expected}, got {got}")]
    UnexpectedValue { expected: &'static str, got: String },
}
