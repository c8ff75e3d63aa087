use nestql::DeclaredType;
use serde_json::Value;

use super::helpers::{build_common, comparison_op_to_sql, expect_list, is_common};
use super::{FieldExpr, OperatorStrategy};
use crate::error::CompileError;
use crate::literal::{array_literal, typed_literal};

const LTREE_OPERATORS: &[&str] = &[
    "ancestor_of",
    "descendant_of",
    "matches_lquery",
    "matches_ltxtquery",
    "matches_any_lquery",
    "in_array",
    "ancestor_of_any",
    "descendant_of_any",
    "depth_eq",
    "depth_neq",
    "depth_gt",
    "depth_gte",
    "depth_lt",
    "depth_lte",
    "concat",
    "lca",
];

/// Hierarchical label paths (`top.science.astronomy`) stored as text and cast to `ltree`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LTreeStrategy;

impl OperatorStrategy for LTreeStrategy {
    fn name(&self) -> &'static str { "ltree" }

    fn supports(&self, operator: &str, declared_type: Option<&DeclaredType>) -> bool {
        matches!(declared_type, Some(DeclaredType::LTree)) && (is_common(operator) || LTREE_OPERATORS.contains(&operator))
    }

    fn build(&self, operator: &str, value: &Value, field: &FieldExpr, _: Option<&DeclaredType>) -> Result<String, CompileError> {
        let path = field.cast("ltree");
        match operator {
            "ancestor_of" => Ok(format!("{} @> {}", path, typed_literal(operator, value, Some("ltree"))?)),
            "descendant_of" => Ok(format!("{} <@ {}", path, typed_literal(operator, value, Some("ltree"))?)),
            "matches_lquery" => Ok(format!("{} ~ {}", path, typed_literal(operator, value, Some("lquery"))?)),
            "matches_ltxtquery" => Ok(format!("{} @ {}", path, typed_literal(operator, value, Some("ltxtquery"))?)),
            "matches_any_lquery" => Ok(format!("{} ? {}", path, array_literal(operator, expect_list(operator, value)?, "lquery")?)),
            "in_array" => Ok(format!("{} = ANY({})", path, array_literal(operator, expect_list(operator, value)?, "ltree")?)),
            "ancestor_of_any" => Ok(format!("{} @> {}", path, array_literal(operator, expect_list(operator, value)?, "ltree")?)),
            "descendant_of_any" => Ok(format!("{} <@ {}", path, array_literal(operator, expect_list(operator, value)?, "ltree")?)),
            "concat" => concat(operator, value, &path),
            "lca" => {
                let paths = expect_list(operator, value)?;
                if paths.is_empty() {
                    return Err(CompileError::malformed(operator, "lca needs at least one path"));
                }
                Ok(format!("{} = lca({})", path, array_literal(operator, paths, "ltree")?))
            }
            depth if depth.starts_with("depth_") => depth_comparison(operator, &depth["depth_".len()..], value, &path),
            _ => build_common(operator, value, field, Some("ltree")),
        }
    }
}

fn depth_comparison(operator: &str, comparison: &str, value: &Value, path: &str) -> Result<String, CompileError> {
    let symbol = comparison_op_to_sql(comparison).ok_or_else(|| CompileError::unsupported(operator, Some(&DeclaredType::LTree)))?;
    let depth = value.as_u64().ok_or_else(|| CompileError::malformed(operator, format!("expected a non-negative integer depth, got {}", value)))?;
    Ok(format!("nlevel({}) {} {}", path, symbol, depth))
}

/// `[suffix, expected]`: the field with `suffix` appended equals `expected`.
fn concat(operator: &str, value: &Value, path: &str) -> Result<String, CompileError> {
    match expect_list(operator, value)? {
        [suffix, expected] => Ok(format!(
            "({} || {}) = {}",
            path,
            typed_literal(operator, suffix, Some("ltree"))?,
            typed_literal(operator, expected, Some("ltree"))?
        )),
        other => Err(CompileError::malformed(operator, format!("expected [suffix, expected], got {} items", other.len()))),
    }
}
