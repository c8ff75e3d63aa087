use std::collections::BTreeSet;

use nestql::{Condition, FieldTypes, Predicate};
use tracing::trace;

use crate::denormalized::resolve_denormalized;
use crate::error::CompileError;
use crate::extractor::{json_path, JsonOperator};
use crate::literal::ident;
use crate::operators::{FieldExpr, OperatorRegistry};

/// Compiles a predicate tree into the body of a WHERE clause.
pub struct WhereCompiler<'a> {
    payload_column: &'a str,
    registry: &'a OperatorRegistry,
    columns: &'a BTreeSet<String>,
    field_types: &'a FieldTypes,
}

impl<'a> WhereCompiler<'a> {
    pub fn new(payload_column: &'a str, registry: &'a OperatorRegistry, columns: &'a BTreeSet<String>, field_types: &'a FieldTypes) -> Self {
        Self { payload_column, registry, columns, field_types }
    }

    pub fn compile(&self, predicate: &Predicate) -> Result<String, CompileError> {
        match predicate {
            Predicate::And(children) => self.group(children, " AND ", "TRUE"),
            Predicate::Or(children) => self.group(children, " OR ", "FALSE"),
            Predicate::Not(inner) => Ok(format!("NOT ({})", self.compile(inner)?)),
            Predicate::Condition(condition) => self.condition(condition),
        }
    }

    fn group(&self, children: &[Predicate], separator: &str, identity: &str) -> Result<String, CompileError> {
        match children {
            [] => Ok(identity.to_string()),
            [only] => self.compile(only),
            _ => {
                let parts = children.iter().map(|child| self.compile(child)).collect::<Result<Vec<_>, _>>()?;
                Ok(format!("({})", parts.join(separator)))
            }
        }
    }

    fn condition(&self, condition: &Condition) -> Result<String, CompileError> {
        let declared_type = condition.declared_type.as_ref().or_else(|| self.field_types.lookup(&condition.path));
        let field = self.field_expr(&condition.path)?;

        let sql = self
            .registry
            .build(&condition.operator, &condition.value, &field, declared_type)?
            .ok_or_else(|| CompileError::unsupported(&condition.operator, declared_type))?;
        trace!("condition {:?} {} -> {}", condition.path, condition.operator, sql);
        Ok(sql)
    }

    /// The denormalized column when the table has one, the canonical text traversal otherwise.
    fn field_expr(&self, path: &[String]) -> Result<FieldExpr, CompileError> {
        // both routes reject the same paths
        let traversal = json_path(self.payload_column, path, JsonOperator::Text)?;
        Ok(match resolve_denormalized(path, self.columns) {
            Some(column) => FieldExpr::Column(ident(column)),
            None => FieldExpr::Json(traversal),
        })
    }
}
