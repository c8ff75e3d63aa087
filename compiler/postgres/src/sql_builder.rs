use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use nestql::ast::split_dot_path;
use nestql::{DeclaredType, FieldPath, FieldTypes, OrderKey, Predicate};
use tracing::{debug, trace};

use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::extractor::{extract, select_expression};
use crate::literal::{ident, qualified_ident, quote_ident, quote_literal};
use crate::operators::OperatorRegistry;
use crate::where_clause::WhereCompiler;

#[derive(Debug, Clone, PartialEq)]
pub enum WhereInput {
    /// Already compiled SQL, used verbatim
    Fragment(String),
    Predicate(Predicate),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum OutputMode {
    /// One column per field
    #[default]
    Rows,
    /// One JSON object per row, optionally tagged with its logical type name
    Json { type_tag: Option<String> },
}

/// Everything one compile call needs. Built per request and consumed by [`QueryCompiler::compile`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompileRequest {
    pub table: String,
    pub fields: Vec<FieldPath>,
    pub where_clause: Option<WhereInput>,
    pub order_by: Vec<OrderKey>,
    pub group_by: Vec<String>,
    pub output: OutputMode,
    /// Overrides the configured threshold for this call
    pub field_limit_threshold: Option<usize>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Physical columns of `table`, consulted for denormalized filter paths
    pub columns: BTreeSet<String>,
    pub field_types: FieldTypes,
}

impl CompileRequest {
    pub fn new(table: impl Into<String>) -> Self { Self { table: table.into(), ..Default::default() } }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldPath>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.where_clause = Some(WhereInput::Predicate(predicate));
        self
    }

    pub fn where_fragment(mut self, sql: impl Into<String>) -> Self {
        self.where_clause = Some(WhereInput::Fragment(sql.into()));
        self
    }

    pub fn order_by(mut self, keys: impl IntoIterator<Item = OrderKey>) -> Self {
        self.order_by = keys.into_iter().collect();
        self
    }

    pub fn group_by<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.group_by = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn json_output(mut self, type_tag: Option<&str>) -> Self {
        self.output = OutputMode::Json { type_tag: type_tag.map(str::to_owned) };
        self
    }

    pub fn field_limit_threshold(mut self, threshold: usize) -> Self {
        self.field_limit_threshold = Some(threshold);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn field_types(mut self, field_types: FieldTypes) -> Self {
        self.field_types = field_types;
        self
    }
}

/// Compiles requests into single SELECT statements against a JSONB payload column.
///
/// Holds no per-call state: one instance (and its registry) can serve any number of
/// threads at once.
#[derive(Debug, Clone)]
pub struct QueryCompiler {
    config: CompilerConfig,
    registry: Arc<OperatorRegistry>,
}

impl Default for QueryCompiler {
    fn default() -> Self { Self::new(CompilerConfig::default()) }
}

impl QueryCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        let registry = Arc::new(OperatorRegistry::with_defaults(&config));
        Self { config, registry }
    }

    pub fn with_registry(config: CompilerConfig, registry: Arc<OperatorRegistry>) -> Self { Self { config, registry } }

    pub fn config(&self) -> &CompilerConfig { &self.config }

    pub fn registry(&self) -> &OperatorRegistry { &self.registry }

    pub fn compile(&self, request: &CompileRequest) -> Result<String, CompileError> {
        let mut sql = format!("SELECT {} FROM {}", self.select_list(request)?, qualified_ident(&request.table)?);
        self.push_tail(&mut sql, request)?;
        trace!("compiled query: {}", sql);
        Ok(sql)
    }

    /// `SELECT count(*)` over the same table and filter, ignoring fields and paging.
    pub fn compile_count(&self, request: &CompileRequest) -> Result<String, CompileError> {
        let mut sql = format!("SELECT count(*) FROM {}", qualified_ident(&request.table)?);
        if let Some(where_clause) = self.where_sql(request)? {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause);
        }
        trace!("compiled count: {}", sql);
        Ok(sql)
    }

    /// Compile a predicate tree on its own, without the surrounding statement.
    pub fn compile_where(&self, predicate: &Predicate, columns: &BTreeSet<String>, field_types: &FieldTypes) -> Result<String, CompileError> {
        WhereCompiler::new(&self.config.payload_column, &self.registry, columns, field_types).compile(predicate)
    }

    fn select_list(&self, request: &CompileRequest) -> Result<String, CompileError> {
        validate_fields(&request.fields)?;

        let threshold = request.field_limit_threshold.unwrap_or(self.config.field_limit_threshold);
        let payload = ident(&self.config.payload_column);
        if request.fields.is_empty() {
            return Ok(payload);
        }
        if request.fields.len() > threshold {
            debug!("{} fields exceed threshold {}, selecting {} whole", request.fields.len(), threshold, payload);
            return Ok(payload);
        }

        match &request.output {
            OutputMode::Rows => {
                let columns = request
                    .fields
                    .iter()
                    .map(|field| select_expression(&self.config.payload_column, field, self.leaf_type(field, &request.field_types)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(columns.join(", "))
            }
            OutputMode::Json { type_tag } => {
                let mut pairs = Vec::with_capacity(request.fields.len() + 1);
                for field in &request.fields {
                    let expr = extract(&self.config.payload_column, &field.path, self.leaf_type(field, &request.field_types))?;
                    pairs.push(format!("{}, {}", quote_literal(&field.alias), expr));
                }
                if let Some(tag) = type_tag {
                    pairs.push(format!("{}, {}", quote_literal(&self.config.type_tag_key), quote_literal(tag)));
                }
                Ok(format!("jsonb_build_object({}) AS {}", pairs.join(", "), quote_ident(&self.config.json_alias)))
            }
        }
    }

    fn leaf_type<'r>(&self, field: &'r FieldPath, field_types: &'r FieldTypes) -> Option<&'r DeclaredType> {
        field.leaf_type.as_ref().or_else(|| field_types.lookup(&field.path))
    }

    /// WHERE, GROUP BY, ORDER BY, LIMIT, OFFSET, in that order, each only when present.
    fn push_tail(&self, sql: &mut String, request: &CompileRequest) -> Result<(), CompileError> {
        if let Some(where_clause) = self.where_sql(request)? {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause);
        }

        if !request.group_by.is_empty() {
            let keys = request.group_by.iter().map(|path| self.key_expression(path, &request.field_types)).collect::<Result<Vec<_>, _>>()?;
            sql.push_str(" GROUP BY ");
            sql.push_str(&keys.join(", "));
        }

        if !request.order_by.is_empty() {
            let keys = request
                .order_by
                .iter()
                .map(|key| Ok(format!("{} {}", self.key_expression(&key.path, &request.field_types)?, key.direction.as_sql())))
                .collect::<Result<Vec<_>, CompileError>>()?;
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }

        if let Some(limit) = request.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = request.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        Ok(())
    }

    fn where_sql(&self, request: &CompileRequest) -> Result<Option<String>, CompileError> {
        match &request.where_clause {
            None => Ok(None),
            Some(WhereInput::Fragment(fragment)) if fragment.trim().is_empty() => Ok(None),
            Some(WhereInput::Fragment(fragment)) => Ok(Some(fragment.trim().to_owned())),
            Some(WhereInput::Predicate(predicate)) => self.compile_where(predicate, &request.columns, &request.field_types).map(Some),
        }
    }

    /// Dot-joined ordering/grouping key, extracted with the same leaf rule as selected fields.
    fn key_expression(&self, dotted: &str, field_types: &FieldTypes) -> Result<String, CompileError> {
        let path = split_dot_path(dotted);
        extract(&self.config.payload_column, &path, field_types.lookup(&path))
    }
}

fn validate_fields(fields: &[FieldPath]) -> Result<(), CompileError> {
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if field.path.is_empty() || field.path.iter().any(String::is_empty) {
            return Err(CompileError::InvalidPath(format!("field `{}` has an empty path segment", field.alias)));
        }
        if field.alias.is_empty() {
            return Err(CompileError::InvalidPath(format!("field at `{}` has no alias", field.path.join("."))));
        }
        if !seen.insert(field.alias.as_str()) {
            return Err(CompileError::DuplicateAlias(field.alias.clone()));
        }
    }
    Ok(())
}
