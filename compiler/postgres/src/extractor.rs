use nestql::{DeclaredType, FieldPath};

use crate::error::CompileError;
use crate::literal::{ident, quote_ident, quote_literal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonOperator {
    /// `->`, yields jsonb
    Object,
    /// `->>`, yields text
    Text,
}

impl JsonOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JsonOperator::Object => "->",
            JsonOperator::Text => "->>",
        }
    }

    /// Numeric, boolean, list and JSON leaves keep their JSON value so they compare and sort natively.
    /// Everything else, including unannotated leaves, is read as text.
    pub fn for_leaf(leaf_type: Option<&DeclaredType>) -> Self {
        match leaf_type {
            Some(ty) if ty.preserves_json_scalar() => JsonOperator::Object,
            _ => JsonOperator::Text,
        }
    }
}

/// `data->'a'->'b'->>'c'`: object steps for every segment but the last, `leaf` for the last.
pub fn json_path<S: AsRef<str>>(column: &str, path: &[S], leaf: JsonOperator) -> Result<String, CompileError> {
    let Some((last, intermediate)) = path.split_last() else {
        return Err(CompileError::InvalidPath("path has no segments".into()));
    };

    if path.iter().any(|segment| segment.as_ref().is_empty()) {
        return Err(CompileError::InvalidPath(format!("empty segment in `{}`", join(path))));
    }

    let mut sql = ident(column);
    for segment in intermediate {
        sql.push_str(JsonOperator::Object.as_sql());
        sql.push_str(&quote_literal(segment.as_ref()));
    }
    sql.push_str(leaf.as_sql());
    sql.push_str(&quote_literal(last.as_ref()));
    Ok(sql)
}

/// Traversal expression for a path whose leaf has the given declared type.
pub fn extract<S: AsRef<str>>(column: &str, path: &[S], leaf_type: Option<&DeclaredType>) -> Result<String, CompileError> {
    json_path(column, path, JsonOperator::for_leaf(leaf_type))
}

/// `data->'profile'->>'username' AS "nickname"`
pub fn select_expression(column: &str, field: &FieldPath, leaf_type: Option<&DeclaredType>) -> Result<String, CompileError> {
    Ok(format!("{} AS {}", extract(column, &field.path, leaf_type)?, quote_ident(&field.alias)))
}

fn join<S: AsRef<str>>(path: &[S]) -> String { path.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(".") }
