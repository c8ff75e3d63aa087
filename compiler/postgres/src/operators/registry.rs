use std::sync::Arc;

use nestql::DeclaredType;
use serde_json::Value;
use tracing::debug;

use super::{array, base, coordinate, daterange, fulltext, ltree, network, temporal, FieldExpr, OperatorStrategy};
use crate::config::CompilerConfig;
use crate::error::CompileError;

/// Ordered, append-only list of strategies. Built once at startup, then shared
/// read-only (typically behind an `Arc`) by every compile call.
#[derive(Default)]
pub struct OperatorRegistry {
    strategies: Vec<Arc<dyn OperatorStrategy>>,
}

impl OperatorRegistry {
    pub fn new() -> Self { Self::default() }

    /// The built-in strategies, general first so the narrower ones take precedence.
    pub fn with_defaults(config: &CompilerConfig) -> Self {
        let mut registry = Self::new();
        registry
            .register(base::BaseStrategy)
            .register(array::ArrayStrategy)
            .register(fulltext::FullTextStrategy)
            .register(ltree::LTreeStrategy)
            .register(network::port())
            .register(network::mac_address())
            .register(network::IpAddressStrategy)
            .register(temporal::date())
            .register(temporal::datetime())
            .register(daterange::DateRangeStrategy)
            .register(coordinate::CoordinateStrategy::new(config.distance_method));
        registry
    }

    pub fn register(&mut self, strategy: impl OperatorStrategy + 'static) -> &mut Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Latest registration wins.
    pub fn resolve(&self, operator: &str, declared_type: Option<&DeclaredType>) -> Option<&dyn OperatorStrategy> {
        self.strategies.iter().rev().find(|strategy| strategy.supports(operator, declared_type)).map(|strategy| strategy.as_ref())
    }

    /// `Ok(None)` when nothing resolves; the caller decides that is an error.
    pub fn build(&self, operator: &str, value: &Value, field: &FieldExpr, declared_type: Option<&DeclaredType>) -> Result<Option<String>, CompileError> {
        match self.resolve(operator, declared_type) {
            Some(strategy) => strategy.build(operator, value, field, declared_type).map(Some),
            None => {
                debug!("no operator strategy for `{}` on {:?}", operator, declared_type);
                Ok(None)
            }
        }
    }

    pub fn len(&self) -> usize { self.strategies.len() }

    pub fn is_empty(&self) -> bool { self.strategies.is_empty() }
}

impl std::fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.strategies.iter().map(|strategy| strategy.name())).finish()
    }
}
