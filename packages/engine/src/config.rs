use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::{ExecuteError, Value};

/// Maps one result row into a caller-facing JSON value.
pub trait RowMapper: Send + Sync {
    fn map_row(&self, columns: &[String], row: &[Value]) -> Result<JsonValue, ExecuteError>;
}

/// Builds a [`RowMapper`] against the registry it was registered in, so a
/// mapper can consult attributes or other mappers at creation time.
pub trait RowMapperFactory: Send + Sync {
    fn create(&self, registry: &ConfigRegistry) -> Arc<dyn RowMapper>;
}

/// Caller-owned configuration: row-mapper factories keyed by name, plus a
/// free-form attribute map.
///
/// Reads see an immutable snapshot. Deriving a configuration goes through
/// [`ConfigRegistry::fork`], which copies both maps, so readers of the
/// parent never observe a child's mutations and vice versa. There is no
/// process-wide registry; every handle carries its own.
#[derive(Clone, Default)]
pub struct ConfigRegistry {
    mappers: HashMap<String, Arc<dyn RowMapperFactory>>,
    attributes: HashMap<String, JsonValue>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_mapper(
        &mut self,
        key: impl Into<String>,
        factory: Arc<dyn RowMapperFactory>,
    ) -> &mut Self {
        self.mappers.insert(key.into(), factory);
        self
    }

    /// Instantiates the mapper registered under `key`, if any.
    pub fn mapper_for(&self, key: &str) -> Option<Arc<dyn RowMapper>> {
        self.mappers.get(key).map(|factory| factory.create(self))
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: JsonValue) {
        self.attributes.insert(key.into(), value);
    }

    pub fn attribute(&self, key: &str) -> Option<&JsonValue> {
        self.attributes.get(key)
    }

    /// Copies the configuration for a derived scope. The maps are copied,
    /// not shared; the factories themselves are immutable and stay shared
    /// through their `Arc`s.
    pub fn fork(&self) -> Self {
        self.clone()
    }
}

impl std::fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.mappers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("ConfigRegistry")
            .field("mappers", &keys)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Configuration scope pushed around a statement or extension call; the
/// innermost context's registry wins while the scope is live.
#[derive(Debug, Clone)]
pub struct StatementContext {
    config: ConfigRegistry,
}

impl StatementContext {
    pub fn new(config: ConfigRegistry) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConfigRegistry {
        &self.config
    }
}
