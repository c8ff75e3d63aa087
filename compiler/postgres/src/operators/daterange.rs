use nestql::DeclaredType;
use serde_json::Value;

use super::helpers::build_common;
use super::{FieldExpr, OperatorStrategy};
use crate::error::CompileError;
use crate::literal::typed_literal;

/// Postgres `daterange` values such as `[2024-01-01,2024-02-01)`
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRangeStrategy;

impl DateRangeStrategy {
    fn range_operator(operator: &str) -> Option<&'static str> {
        Some(match operator {
            "overlaps" => "&&",
            "adjacent" => "-|-",
            "strictly_left" => "<<",
            "strictly_right" => ">>",
            "not_left" => "&>",
            "not_right" => "&<",
            _ => return None,
        })
    }
}

impl OperatorStrategy for DateRangeStrategy {
    fn name(&self) -> &'static str { "date_range" }

    fn supports(&self, operator: &str, declared_type: Option<&DeclaredType>) -> bool {
        matches!(declared_type, Some(DeclaredType::DateRange))
            && (matches!(operator, "eq" | "neq" | "isnull" | "contains_date") || Self::range_operator(operator).is_some())
    }

    fn build(&self, operator: &str, value: &Value, field: &FieldExpr, _: Option<&DeclaredType>) -> Result<String, CompileError> {
        let range = field.cast("daterange");
        if operator == "contains_date" {
            return Ok(format!("{} @> {}", range, typed_literal(operator, value, Some("date"))?));
        }
        match Self::range_operator(operator) {
            Some(symbol) => Ok(format!("{} {} {}", range, symbol, typed_literal(operator, value, Some("daterange"))?)),
            None => build_common(operator, value, field, Some("daterange")),
        }
    }
}
