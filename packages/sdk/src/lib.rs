mod backend;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value as JsonValue;

pub use backend::sqlite::SqliteBackend;

/// The registry key [`open`] pre-registers the JSON row mapper under.
pub const JSON_MAPPER_KEY: &str = "json";

pub struct OpenConfig {
    /// SQLite file to open lazily; `None` with no explicit backend means an
    /// in-memory database.
    pub path: Option<PathBuf>,
    /// Explicit backend, taking precedence over `path`.
    pub backend: Option<Box<dyn SqlBackend>>,
    pub config: ConfigRegistry,
}

impl Default for OpenConfig {
    fn default() -> Self {
        Self {
            path: None,
            backend: None,
            config: ConfigRegistry::new(),
        }
    }
}

pub struct Database {
    handle: LazyHandle,
}

pub async fn open(config: OpenConfig) -> Result<Database, ExecuteError> {
    let OpenConfig {
        path,
        backend,
        mut config,
    } = config;

    if config.mapper_for(JSON_MAPPER_KEY).is_none() {
        config.register_mapper(JSON_MAPPER_KEY, Arc::new(JsonRowMapperFactory));
    }

    let provided = Mutex::new(backend);
    let opener = move || {
        if let Some(backend) = provided
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return Ok(backend);
        }
        let backend = match &path {
            Some(path) => SqliteBackend::from_path(path)?,
            None => SqliteBackend::in_memory()?,
        };
        tracing::debug!(path = ?path, "opened sqlite backend");
        Ok(Box::new(backend) as Box<dyn SqlBackend>)
    };

    Ok(Database {
        handle: LazyHandle::new(config, opener),
    })
}

impl Database {
    pub async fn execute(
        &self,
        sql: &str,
        binding: &Binding,
    ) -> Result<QueryResult, ExecuteError> {
        self.handle.handle()?.execute(sql, binding).await
    }

    pub async fn query_mapped(
        &self,
        sql: &str,
        binding: &Binding,
        mapper_key: &str,
    ) -> Result<Vec<JsonValue>, ExecuteError> {
        self.handle.handle()?.query_mapped(sql, binding, mapper_key).await
    }

    pub fn enter_context(&self, context: StatementContext) -> ContextGuard<'_> {
        self.handle.enter_context(context)
    }

    pub fn close(&self) -> Result<(), ExecuteError> {
        self.handle.close()
    }
}

pub use rebind_engine::{
    rewrite_statement, value_from_json, value_to_json, Binding, ConfigRegistry, ContextGuard,
    ExecuteError, Handle, JsonRowMapper, JsonRowMapperFactory, LazyHandle, ParameterReference,
    PrepareError, QueryResult, RewrittenStatement, RowMapper, RowMapperFactory, SqlBackend,
    StatementContext, Value,
};
