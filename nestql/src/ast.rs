use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One requested output field: the alias it is returned under and the nested
/// path of document keys that leads to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPath {
    pub alias: String,
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_type: Option<DeclaredType>,
}

impl FieldPath {
    pub fn new<A: Into<String>, S: Into<String>>(alias: A, path: impl IntoIterator<Item = S>) -> Self {
        Self { alias: alias.into(), path: path.into_iter().map(Into::into).collect(), leaf_type: None }
    }

    pub fn typed(mut self, leaf_type: DeclaredType) -> Self {
        self.leaf_type = Some(leaf_type);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Condition(Condition),
}

/// A predicate leaf: `path <operator> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub path: Vec<String>,
    pub operator: String,
    pub value: serde_json::Value,
    pub declared_type: Option<DeclaredType>,
}

impl Condition {
    pub fn new<S: Into<String>>(path: impl IntoIterator<Item = S>, operator: impl Into<String>, value: serde_json::Value) -> Self {
        Self { path: path.into_iter().map(Into::into).collect(), operator: operator.into(), value, declared_type: None }
    }

    pub fn typed(mut self, declared_type: DeclaredType) -> Self {
        self.declared_type = Some(declared_type);
        self
    }
}

impl From<Condition> for Predicate {
    fn from(condition: Condition) -> Self { Predicate::Condition(condition) }
}

/// Serialized as `ASC`/`DESC`; deserialized through [`OrderDirection::from_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    /// Case-insensitive; anything other than `desc` sorts ascending.
    pub fn from_token(token: &str) -> Self {
        if token.trim().eq_ignore_ascii_case("desc") {
            OrderDirection::Desc
        } else {
            OrderDirection::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

impl From<String> for OrderDirection {
    fn from(token: String) -> Self { OrderDirection::from_token(&token) }
}

impl From<OrderDirection> for String {
    fn from(direction: OrderDirection) -> Self { direction.as_sql().to_owned() }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderKey {
    /// Dot-joined nested path, e.g. `profile.location.city`
    pub path: String,
    #[serde(default)]
    pub direction: OrderDirection,
}

impl OrderKey {
    pub fn new(path: impl Into<String>, direction: &str) -> Self { Self { path: path.into(), direction: OrderDirection::from_token(direction) } }

    pub fn segments(&self) -> Vec<String> { split_dot_path(&self.path) }
}

pub fn split_dot_path(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split('.').map(str::to_owned).collect()
}

/// The declared scalar type of a path's terminal segment, as published by the schema layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeclaredType {
    String,
    Id,
    Enum,
    Int,
    Float,
    Boolean,
    Date,
    DateTime,
    LTree,
    Port,
    Coordinate,
    IpAddress,
    MacAddress,
    DateRange,
    /// A JSON array of scalars.
    List,
    /// Free text searched through a `tsvector`.
    FullText,
    Json,
    Custom(String),
}

impl DeclaredType {
    pub fn is_numeric(&self) -> bool { matches!(self, DeclaredType::Int | DeclaredType::Float | DeclaredType::Port) }

    /// Types whose leaf is read with object extraction so the native JSON value survives.
    pub fn preserves_json_scalar(&self) -> bool { self.is_numeric() || matches!(self, DeclaredType::Boolean | DeclaredType::List | DeclaredType::Json) }

    pub fn name(&self) -> &str {
        match self {
            DeclaredType::String => "String",
            DeclaredType::Id => "ID",
            DeclaredType::Enum => "Enum",
            DeclaredType::Int => "Int",
            DeclaredType::Float => "Float",
            DeclaredType::Boolean => "Boolean",
            DeclaredType::Date => "Date",
            DeclaredType::DateTime => "DateTime",
            DeclaredType::LTree => "LTree",
            DeclaredType::Port => "Port",
            DeclaredType::Coordinate => "Coordinate",
            DeclaredType::IpAddress => "IpAddress",
            DeclaredType::MacAddress => "MacAddress",
            DeclaredType::DateRange => "DateRange",
            DeclaredType::List => "List",
            DeclaredType::FullText => "FullText",
            DeclaredType::Json => "JSON",
            DeclaredType::Custom(name) => name,
        }
    }
}

impl From<&str> for DeclaredType {
    fn from(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "string" | "str" | "text" => DeclaredType::String,
            "id" | "uuid" => DeclaredType::Id,
            "enum" => DeclaredType::Enum,
            "int" | "integer" | "bigint" | "smallint" => DeclaredType::Int,
            "float" | "decimal" | "numeric" | "double" => DeclaredType::Float,
            "boolean" | "bool" => DeclaredType::Boolean,
            "date" => DeclaredType::Date,
            "datetime" | "timestamp" | "timestamptz" => DeclaredType::DateTime,
            "ltree" => DeclaredType::LTree,
            "port" => DeclaredType::Port,
            "coordinate" | "point" | "geopoint" => DeclaredType::Coordinate,
            "ipaddress" | "ip" | "inet" => DeclaredType::IpAddress,
            "macaddress" | "mac" | "macaddr" => DeclaredType::MacAddress,
            "daterange" => DeclaredType::DateRange,
            "list" | "array" => DeclaredType::List,
            "fulltext" | "tsvector" | "search" => DeclaredType::FullText,
            "json" | "jsonb" => DeclaredType::Json,
            _ => DeclaredType::Custom(tag.to_owned()),
        }
    }
}

impl From<String> for DeclaredType {
    fn from(tag: String) -> Self { DeclaredType::from(tag.as_str()) }
}

impl From<DeclaredType> for String {
    fn from(ty: DeclaredType) -> Self { ty.name().to_owned() }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// Declared leaf types keyed by dot-joined path. This is the narrow slice of the
/// schema registry the compiler consults when a field or condition carries no type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldTypes(BTreeMap<String, DeclaredType>);

impl FieldTypes {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, path: impl Into<String>, ty: DeclaredType) -> &mut Self {
        self.0.insert(path.into(), ty);
        self
    }

    pub fn with(mut self, path: impl Into<String>, ty: DeclaredType) -> Self {
        self.insert(path, ty);
        self
    }

    pub fn lookup(&self, path: &[String]) -> Option<&DeclaredType> { self.0.get(&path.join(".")) }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}
