use nestql::DeclaredType;
use serde_json::Value;

use super::helpers::{expect_str, null_check};
use super::{FieldExpr, OperatorStrategy};
use crate::error::CompileError;
use crate::literal::quote_literal;

const SEARCH_OPERATORS: &[&str] = &["matches", "plain_query", "phrase_query", "websearch_query"];

/// Full-text search with the server's default text search configuration.
///
/// Text fields are run through `to_tsvector`; a denormalized column declared as
/// [`DeclaredType::FullText`] is taken to already be a `tsvector`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullTextStrategy;

impl OperatorStrategy for FullTextStrategy {
    fn name(&self) -> &'static str { "full_text" }

    fn supports(&self, operator: &str, declared_type: Option<&DeclaredType>) -> bool {
        match declared_type {
            None | Some(DeclaredType::String) => SEARCH_OPERATORS.contains(&operator),
            Some(DeclaredType::FullText) => SEARCH_OPERATORS.contains(&operator) || operator == "isnull",
            Some(_) => false,
        }
    }

    fn build(&self, operator: &str, value: &Value, field: &FieldExpr, declared_type: Option<&DeclaredType>) -> Result<String, CompileError> {
        let parser = match operator {
            "isnull" => return null_check(operator, value, field),
            "matches" => "to_tsquery",
            "plain_query" => "plainto_tsquery",
            "phrase_query" => "phraseto_tsquery",
            "websearch_query" => "websearch_to_tsquery",
            _ => return Err(CompileError::malformed(operator, "not a text search operator")),
        };
        let query = expect_str(operator, value)?;
        let document = match (field, declared_type) {
            (FieldExpr::Column(column), Some(DeclaredType::FullText)) => column.clone(),
            _ => format!("to_tsvector({})", field.raw()),
        };
        Ok(format!("{} @@ {}({})", document, parser, quote_literal(query)))
    }
}
