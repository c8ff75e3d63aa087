use serde::Deserialize;

use crate::error::CompileError;

/// Which SQL form `distance_within` compiles to when the operator does not name one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMethod {
    /// `ST_DWithin` over geography; requires PostGIS
    PostGis,
    /// Inline great-circle formula; no extension needed
    #[default]
    Haversine,
    /// `earth_distance(ll_to_earth(..))`; requires the earthdistance extension
    EarthDistance,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompilerConfig {
    #[serde(default = "default_payload_column")]
    pub payload_column: String,
    #[serde(default = "default_field_limit_threshold")]
    pub field_limit_threshold: usize,
    #[serde(default = "default_type_tag_key")]
    pub type_tag_key: String,
    #[serde(default = "default_json_alias")]
    pub json_alias: String,
    #[serde(default)]
    pub distance_method: DistanceMethod,
}

fn default_payload_column() -> String { "data".to_string() }

fn default_field_limit_threshold() -> usize { 20 }

fn default_type_tag_key() -> String { "__typename".to_string() }

fn default_json_alias() -> String { "data".to_string() }

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            payload_column: default_payload_column(),
            field_limit_threshold: default_field_limit_threshold(),
            type_tag_key: default_type_tag_key(),
            json_alias: default_json_alias(),
            distance_method: DistanceMethod::default(),
        }
    }
}

impl CompilerConfig {
    pub fn from_json(raw: &str) -> Result<Self, CompileError> {
        let config: CompilerConfig = serde_json::from_str(raw).map_err(|e| CompileError::InvalidConfig(e.to_string()))?;
        if config.payload_column.is_empty() {
            return Err(CompileError::InvalidConfig("payload_column must not be empty".into()));
        }
        Ok(config)
    }

    pub fn with_distance_method(mut self, method: DistanceMethod) -> Self {
        self.distance_method = method;
        self
    }
}
