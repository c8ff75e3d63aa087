//! Per-type WHERE operator strategies and the registry that dispatches to them.

use nestql::DeclaredType;
use serde_json::Value;

use crate::error::CompileError;

pub mod array;
pub mod base;
pub mod coordinate;
pub mod daterange;
pub mod fulltext;
pub mod helpers;
pub mod ltree;
pub mod network;
pub mod registry;
pub mod temporal;

pub use registry::OperatorRegistry;

/// The left-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldExpr {
    /// Text extracted from the payload column; must be cast before typed comparison
    Json(String),
    /// A denormalized physical column; already carries its type
    Column(String),
}

impl FieldExpr {
    pub fn raw(&self) -> &str {
        match self {
            FieldExpr::Json(sql) | FieldExpr::Column(sql) => sql,
        }
    }

    pub fn cast(&self, ty: &str) -> String {
        match self {
            FieldExpr::Json(sql) => format!("({})::{}", sql, ty),
            FieldExpr::Column(column) => column.clone(),
        }
    }

    pub fn cast_opt(&self, ty: Option<&str>) -> String {
        match ty {
            Some(ty) => self.cast(ty),
            None => self.raw().to_owned(),
        }
    }
}

/// A handler for one family of operators tied to one or more declared types.
///
/// Strategies are stateless apart from construction-time settings and are shared
/// across threads through the registry.
pub trait OperatorStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this strategy handles `operator` on a field of `declared_type`.
    fn supports(&self, operator: &str, declared_type: Option<&DeclaredType>) -> bool;

    fn build(&self, operator: &str, value: &Value, field: &FieldExpr, declared_type: Option<&DeclaredType>) -> Result<String, CompileError>;
}
