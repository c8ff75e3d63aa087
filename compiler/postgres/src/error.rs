use nestql::{DeclaredType, ParseError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("Unsupported operator `{operator}` for type {}", type_name(.declared_type))]
    UnsupportedOperator { operator: String, declared_type: Option<DeclaredType> },
    #[error("Malformed value for `{operator}`: {reason}")]
    MalformedValue { operator: String, reason: String },
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Duplicate alias `{0}` in field selection")]
    DuplicateAlias(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Parse(ParseError),
}

fn type_name(declared_type: &Option<DeclaredType>) -> &str { declared_type.as_ref().map(DeclaredType::name).unwrap_or("<unannotated>") }

/// Path errors keep their kind so callers match on [`CompileError::InvalidPath`] alone.
impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::InvalidPath(path) => CompileError::InvalidPath(path),
            other => CompileError::Parse(other),
        }
    }
}

impl CompileError {
    pub fn unsupported(operator: &str, declared_type: Option<&DeclaredType>) -> Self {
        CompileError::UnsupportedOperator { operator: operator.to_owned(), declared_type: declared_type.cloned() }
    }

    pub fn malformed(operator: &str, reason: impl Into<String>) -> Self {
        CompileError::MalformedValue { operator: operator.to_owned(), reason: reason.into() }
    }
}
