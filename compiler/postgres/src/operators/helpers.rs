//! Comparison, membership and null-check primitives shared by the strategies.

use nestql::DeclaredType;
use serde_json::Value;

use super::{FieldExpr, OperatorStrategy};
use crate::error::CompileError;
use crate::literal::typed_literal;

pub const COMMON_OPERATORS: &[&str] = &["eq", "neq", "gt", "gte", "lt", "lte", "in", "notin", "isnull"];

pub fn comparison_op_to_sql(operator: &str) -> Option<&'static str> {
    Some(match operator {
        "eq" => "=",
        "neq" => "!=",
        "gt" => ">",
        "gte" => ">=",
        "lt" => "<",
        "lte" => "<=",
        _ => return None,
    })
}

pub fn is_common(operator: &str) -> bool { COMMON_OPERATORS.contains(&operator) }

/// `eq`..`lte`, `in`/`notin` and `isnull` against `field`, with both sides cast to `cast`.
pub fn build_common(operator: &str, value: &Value, field: &FieldExpr, cast: Option<&str>) -> Result<String, CompileError> {
    match operator {
        "isnull" => null_check(operator, value, field),
        "in" => membership(operator, value, field, cast, false),
        "notin" => membership(operator, value, field, cast, true),
        _ => match comparison_op_to_sql(operator) {
            Some(symbol) => Ok(format!("{} {} {}", field.cast_opt(cast), symbol, typed_literal(operator, value, cast)?)),
            None => Err(CompileError::malformed(operator, "not a comparison operator")),
        },
    }
}

/// Always tests the uncast expression.
pub fn null_check(operator: &str, value: &Value, field: &FieldExpr) -> Result<String, CompileError> {
    match expect_bool(operator, value)? {
        true => Ok(format!("{} IS NULL", field.raw())),
        false => Ok(format!("{} IS NOT NULL", field.raw())),
    }
}

/// `x IN (a, b)` with each literal cast individually. An empty list still yields valid
/// SQL: `FALSE` for `in`, `TRUE` for `notin`.
pub fn membership(operator: &str, value: &Value, field: &FieldExpr, cast: Option<&str>, negated: bool) -> Result<String, CompileError> {
    let items = expect_list(operator, value)?;
    if items.is_empty() {
        return Ok(if negated { "TRUE" } else { "FALSE" }.to_string());
    }
    let literals = items.iter().map(|item| typed_literal(operator, item, cast)).collect::<Result<Vec<_>, _>>()?;
    Ok(format!("{} {} ({})", field.cast_opt(cast), if negated { "NOT IN" } else { "IN" }, literals.join(", ")))
}

pub fn expect_list<'a>(operator: &str, value: &'a Value) -> Result<&'a [Value], CompileError> {
    match value {
        Value::Array(items) => Ok(items.as_slice()),
        _ => Err(CompileError::malformed(operator, format!("expected a list, got {}", value))),
    }
}

pub fn expect_bool(operator: &str, value: &Value) -> Result<bool, CompileError> {
    value.as_bool().ok_or_else(|| CompileError::malformed(operator, format!("expected true or false, got {}", value)))
}

pub fn expect_str<'a>(operator: &str, value: &'a Value) -> Result<&'a str, CompileError> {
    value.as_str().ok_or_else(|| CompileError::malformed(operator, format!("expected a string, got {}", value)))
}

pub fn expect_number(operator: &str, value: &Value) -> Result<f64, CompileError> {
    value.as_f64().ok_or_else(|| CompileError::malformed(operator, format!("expected a number, got {}", value)))
}

/// Handles the common operators for exactly one declared type by casting to a fixed SQL type.
#[derive(Debug, Clone)]
pub struct CastStrategy {
    name: &'static str,
    declared_type: DeclaredType,
    cast: &'static str,
}

impl CastStrategy {
    pub const fn new(name: &'static str, declared_type: DeclaredType, cast: &'static str) -> Self { Self { name, declared_type, cast } }
}

impl OperatorStrategy for CastStrategy {
    fn name(&self) -> &'static str { self.name }

    fn supports(&self, operator: &str, declared_type: Option<&DeclaredType>) -> bool {
        declared_type == Some(&self.declared_type) && is_common(operator)
    }

    fn build(&self, operator: &str, value: &Value, field: &FieldExpr, _: Option<&DeclaredType>) -> Result<String, CompileError> {
        build_common(operator, value, field, Some(self.cast))
    }
}
