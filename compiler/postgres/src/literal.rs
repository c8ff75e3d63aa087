//! Every value and identifier that reaches SQL text goes through this module.

use postgres_protocol::escape::{escape_identifier, escape_literal};
use serde_json::Value;

use crate::error::CompileError;

/// Every keyword the server's own `quote_ident()` would quote: reserved, type/function-name
/// reserved and column-name keywords.
const KEYWORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "authorization", "between", "bigint", "binary", "bit",
    "boolean", "both", "case", "cast", "char", "character", "check", "coalesce", "collate", "collation", "column", "concurrently",
    "constraint", "create", "cross", "current_catalog", "current_date", "current_role", "current_schema", "current_time",
    "current_timestamp", "current_user", "dec", "decimal", "default", "deferrable", "desc", "distinct", "do", "else", "end", "except",
    "exists", "extract", "false", "fetch", "float", "for", "foreign", "freeze", "from", "full", "grant", "greatest", "group", "grouping",
    "having", "ilike", "in", "initially", "inner", "inout", "int", "integer", "intersect", "interval", "into", "is", "isnull", "join",
    "json", "json_array", "json_arrayagg", "json_exists", "json_object", "json_objectagg", "json_query", "json_scalar", "json_serialize",
    "json_table", "json_value", "lateral", "leading", "least", "left", "like", "limit", "localtime", "localtimestamp", "merge_action",
    "national", "natural", "nchar", "none", "normalize", "not", "notnull", "null", "nullif", "numeric", "offset", "on", "only", "or",
    "order", "out", "outer", "overlaps", "overlay", "placing", "position", "precision", "primary", "real", "references", "returning",
    "right", "row", "select", "session_user", "setof", "similar", "smallint", "some", "substring", "symmetric", "system_user", "table",
    "tablesample", "then", "time", "timestamp", "to", "trailing", "treat", "trim", "true", "union", "unique", "user", "using", "values",
    "varchar", "variadic", "verbose", "when", "where", "window", "with", "xmlattributes", "xmlconcat", "xmlelement", "xmlexists",
    "xmlforest", "xmlnamespaces", "xmlparse", "xmlpi", "xmlroot", "xmlserialize", "xmltable",
];

/// Postgres text cannot hold NUL, so it is dropped before escaping.
fn strip_nul(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains('\0') {
        std::borrow::Cow::Owned(value.replace('\0', ""))
    } else {
        std::borrow::Cow::Borrowed(value)
    }
}

/// String literal via libpq-compatible escaping: quotes doubled, and an `E'..'` literal with
/// doubled backslashes whenever the value has a backslash.
pub fn quote_literal(value: &str) -> String { escape_literal(&strip_nul(value)).trim_start().to_owned() }

pub fn quote_ident(name: &str) -> String { escape_identifier(&strip_nul(name)) }

/// Plain lowercase words are emitted bare, everything else is quoted.
pub fn ident(name: &str) -> String {
    let mut chars = name.chars();
    let bare = match chars.next() {
        Some(first) => (first.is_ascii_lowercase() || first == '_') && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
        None => false,
    };
    if bare && !KEYWORDS.contains(&name) {
        name.to_owned()
    } else {
        quote_ident(name)
    }
}

/// `schema.table` -> `schema.table`, `My Schema.t` -> `"My Schema".t`
pub fn qualified_ident(name: &str) -> Result<String, CompileError> {
    if name.is_empty() || name.split('.').any(str::is_empty) {
        return Err(CompileError::InvalidPath(format!("invalid table name `{}`", name)));
    }
    Ok(name.split('.').map(ident).collect::<Vec<_>>().join("."))
}

/// The text form of a scalar JSON value, as it will be handed to a cast.
pub fn scalar_text(operator: &str, value: &Value) -> Result<String, CompileError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(CompileError::malformed(operator, "null is not comparable, use `isnull`")),
        Value::Array(_) => Err(CompileError::malformed(operator, "expected a scalar, got a list")),
        Value::Object(_) => Err(CompileError::malformed(operator, "expected a scalar, got an object")),
    }
}

/// A scalar literal, cast to `cast` when a target type is known. Numbers bound for a
/// numeric cast are emitted bare.
pub fn typed_literal(operator: &str, value: &Value, cast: Option<&str>) -> Result<String, CompileError> {
    let text = scalar_text(operator, value)?;
    Ok(match (value, cast) {
        (Value::Number(_), Some("numeric" | "integer")) => text,
        (_, Some(cast)) => format!("{}::{}", quote_literal(&text), cast),
        (_, None) => quote_literal(&text),
    })
}

/// `ARRAY['a', 'b']::cast[]`, or `'{}'::cast[]` when empty.
pub fn array_literal(operator: &str, items: &[Value], cast: &str) -> Result<String, CompileError> {
    if items.is_empty() {
        return Ok(format!("'{{}}'::{}[]", cast));
    }
    let elements = items.iter().map(|item| scalar_text(operator, item).map(|text| quote_literal(&text))).collect::<Result<Vec<_>, _>>()?;
    Ok(format!("ARRAY[{}]::{}[]", elements.join(", "), cast))
}
