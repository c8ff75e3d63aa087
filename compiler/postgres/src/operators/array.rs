use nestql::DeclaredType;
use serde_json::Value;

use super::helpers::{comparison_op_to_sql, expect_list, null_check};
use super::{FieldExpr, OperatorStrategy};
use crate::error::CompileError;
use crate::literal::quote_literal;

const ARRAY_OPERATORS: &[&str] =
    &["array_contains", "array_contained_by", "array_overlaps", "len_eq", "len_neq", "len_gt", "len_gte", "len_lt", "len_lte"];

/// JSON arrays compared as `jsonb`. Containment follows jsonb semantics, so element
/// order and duplicates do not matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayStrategy;

impl OperatorStrategy for ArrayStrategy {
    fn name(&self) -> &'static str { "array" }

    fn supports(&self, operator: &str, declared_type: Option<&DeclaredType>) -> bool {
        match declared_type {
            None => ARRAY_OPERATORS.contains(&operator),
            Some(DeclaredType::List) => ARRAY_OPERATORS.contains(&operator) || matches!(operator, "eq" | "neq" | "isnull"),
            Some(_) => false,
        }
    }

    fn build(&self, operator: &str, value: &Value, field: &FieldExpr, _: Option<&DeclaredType>) -> Result<String, CompileError> {
        let array = field.cast("jsonb");
        match operator {
            "isnull" => null_check(operator, value, field),
            "eq" => Ok(format!("{} = {}", array, jsonb_literal(&Value::Array(expect_list(operator, value)?.to_vec())))),
            "neq" => Ok(format!("{} != {}", array, jsonb_literal(&Value::Array(expect_list(operator, value)?.to_vec())))),
            "array_contains" => {
                let needle = match value {
                    Value::Null => return Err(CompileError::malformed(operator, "expected a value or a list, got null")),
                    Value::Array(_) => value.clone(),
                    scalar => Value::Array(vec![scalar.clone()]),
                };
                Ok(format!("{} @> {}", array, jsonb_literal(&needle)))
            }
            "array_contained_by" => Ok(format!("{} <@ {}", array, jsonb_literal(&Value::Array(expect_list(operator, value)?.to_vec())))),
            "array_overlaps" => {
                let items = expect_list(operator, value)?;
                if items.is_empty() {
                    return Ok("FALSE".to_string());
                }
                Ok(format!(
                    "EXISTS (SELECT 1 FROM jsonb_array_elements({}) AS elem(value) WHERE elem.value <@ {})",
                    array,
                    jsonb_literal(&Value::Array(items.to_vec()))
                ))
            }
            _ => {
                let symbol = operator.strip_prefix("len_").and_then(comparison_op_to_sql).ok_or_else(|| CompileError::malformed(operator, "not an array operator"))?;
                let length = value.as_u64().ok_or_else(|| CompileError::malformed(operator, format!("expected a non-negative integer, got {}", value)))?;
                Ok(format!("jsonb_array_length({}) {} {}", array, symbol, length))
            }
        }
    }
}

fn jsonb_literal(value: &Value) -> String { format!("{}::jsonb", quote_literal(&value.to_string())) }
