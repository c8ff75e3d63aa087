use nestql::DeclaredType;
use serde_json::Value;

use super::helpers::{build_common, expect_str, is_common};
use super::{FieldExpr, OperatorStrategy};
use crate::error::CompileError;
use crate::literal::quote_literal;

const PATTERN_OPERATORS: &[&str] = &["contains", "icontains", "startswith", "istartswith", "endswith", "iendswith", "like", "ilike"];

/// Strings, identifiers, enums, numbers, booleans, custom scalars and unannotated fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseStrategy;

impl BaseStrategy {
    fn cast(declared_type: Option<&DeclaredType>) -> Option<&'static str> {
        match declared_type {
            Some(DeclaredType::Id) => Some("uuid"),
            Some(DeclaredType::Int | DeclaredType::Float) => Some("numeric"),
            Some(DeclaredType::Boolean) => Some("boolean"),
            _ => None,
        }
    }

    fn is_textual(declared_type: Option<&DeclaredType>) -> bool {
        matches!(declared_type, None | Some(DeclaredType::String | DeclaredType::Enum | DeclaredType::Custom(_)))
    }
}

impl OperatorStrategy for BaseStrategy {
    fn name(&self) -> &'static str { "base" }

    fn supports(&self, operator: &str, declared_type: Option<&DeclaredType>) -> bool {
        let handled = matches!(
            declared_type,
            None | Some(
                DeclaredType::String
                    | DeclaredType::Id
                    | DeclaredType::Enum
                    | DeclaredType::Int
                    | DeclaredType::Float
                    | DeclaredType::Boolean
                    | DeclaredType::Custom(_)
            )
        );
        handled && (is_common(operator) || (Self::is_textual(declared_type) && PATTERN_OPERATORS.contains(&operator)))
    }

    fn build(&self, operator: &str, value: &Value, field: &FieldExpr, declared_type: Option<&DeclaredType>) -> Result<String, CompileError> {
        if PATTERN_OPERATORS.contains(&operator) {
            return pattern(operator, value, field);
        }
        build_common(operator, value, field, Self::cast(declared_type))
    }
}

fn pattern(operator: &str, value: &Value, field: &FieldExpr) -> Result<String, CompileError> {
    let raw = expect_str(operator, value)?;
    let (keyword, pattern) = match operator {
        "like" => ("LIKE", raw.to_owned()),
        "ilike" => ("ILIKE", raw.to_owned()),
        "contains" => ("LIKE", format!("%{}%", escape_like(raw))),
        "icontains" => ("ILIKE", format!("%{}%", escape_like(raw))),
        "startswith" => ("LIKE", format!("{}%", escape_like(raw))),
        "istartswith" => ("ILIKE", format!("{}%", escape_like(raw))),
        "endswith" => ("LIKE", format!("%{}", escape_like(raw))),
        "iendswith" => ("ILIKE", format!("%{}", escape_like(raw))),
        _ => return Err(CompileError::malformed(operator, "not a pattern operator")),
    };
    Ok(format!("{} {} {}", field.raw(), keyword, quote_literal(&pattern)))
}

/// Escape LIKE wildcards so the value matches literally (backslash is the default escape).
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
