use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value as JsonValue;

use crate::cache::StatementCache;
use crate::rewrite::RewrittenStatement;
use crate::{
    Binding, ConfigRegistry, ExecuteError, PrepareError, QueryResult, SqlBackend, StatementContext,
};

/// Live access to one backend: rewrites, resolves, and executes statements
/// against it. Rewrites are memoized per handle, keyed on raw SQL text.
pub struct Handle {
    backend: Box<dyn SqlBackend>,
    config: ConfigRegistry,
    statements: StatementCache,
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Handle {
    pub fn new(backend: Box<dyn SqlBackend>, config: ConfigRegistry) -> Self {
        Self {
            backend,
            config,
            statements: StatementCache::default(),
        }
    }

    pub fn config(&self) -> &ConfigRegistry {
        &self.config
    }

    /// Rewrites `sql`, or reuses a prior rewrite of the same text.
    pub fn prepare(&self, sql: &str) -> Result<Arc<RewrittenStatement>, PrepareError> {
        self.statements.rewrite_cached(sql)
    }

    pub async fn execute(
        &self,
        sql: &str,
        binding: &Binding,
    ) -> Result<QueryResult, ExecuteError> {
        let statement = self.prepare(sql)?;
        let params = binding.resolve(&statement.parameters)?;
        self.backend.execute(&statement.sql, &params).await
    }

    /// Executes and maps every row through the registry mapper registered
    /// under `mapper_key`.
    pub async fn query_mapped(
        &self,
        sql: &str,
        binding: &Binding,
        mapper_key: &str,
    ) -> Result<Vec<JsonValue>, ExecuteError> {
        let mapper = self.config.mapper_for(mapper_key).ok_or_else(|| {
            ExecuteError::mapping(format!("no row mapper registered under '{mapper_key}'"))
        })?;
        let result = self.execute(sql, binding).await?;
        result
            .rows
            .iter()
            .map(|row| mapper.map_row(&result.columns, row))
            .collect()
    }
}

type Opener = Box<dyn Fn() -> Result<Box<dyn SqlBackend>, ExecuteError> + Send + Sync>;

enum LazyState {
    Unopened,
    Open(Arc<Handle>),
    Closed,
}

/// Defers backend acquisition until first use.
///
/// The lifecycle is `Unopened -> Open -> Closed`: the opener runs exactly
/// once, on the first [`LazyHandle::handle`] call, and closing twice is an
/// error rather than a silent no-op. Statement contexts stack explicitly
/// through [`LazyHandle::enter_context`]; the returned guard pops on every
/// exit path.
pub struct LazyHandle {
    opener: Opener,
    base_config: ConfigRegistry,
    state: Mutex<LazyState>,
    contexts: Mutex<Vec<StatementContext>>,
}

impl LazyHandle {
    pub fn new(
        config: ConfigRegistry,
        opener: impl Fn() -> Result<Box<dyn SqlBackend>, ExecuteError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            opener: Box::new(opener),
            base_config: config,
            state: Mutex::new(LazyState::Unopened),
            contexts: Mutex::new(Vec::new()),
        }
    }

    /// Returns the live handle, acquiring the backend on first use.
    pub fn handle(&self) -> Result<Arc<Handle>, ExecuteError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            LazyState::Open(handle) => Ok(handle.clone()),
            LazyState::Closed => Err(ExecuteError::HandleClosed),
            LazyState::Unopened => {
                let backend = (self.opener)()?;
                let handle = Arc::new(Handle::new(backend, self.current_config()));
                tracing::debug!("opened backend on first use");
                *state = LazyState::Open(handle.clone());
                Ok(handle)
            }
        }
    }

    /// Closes the lifecycle. A second close attempt reports
    /// [`ExecuteError::HandleClosed`] instead of being silently ignored.
    pub fn close(&self) -> Result<(), ExecuteError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*state, LazyState::Closed) {
            return Err(ExecuteError::HandleClosed);
        }
        *state = LazyState::Closed;
        self.contexts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::debug!("handle closed");
        Ok(())
    }

    /// Pushes a context; the guard pops it when dropped, whatever the exit
    /// path.
    pub fn enter_context(&self, context: StatementContext) -> ContextGuard<'_> {
        self.contexts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(context);
        ContextGuard { handle: self }
    }

    /// The innermost context's configuration, or the base configuration
    /// with an empty stack. Always a fork: callers never alias the stack.
    pub fn current_config(&self) -> ConfigRegistry {
        let contexts = self.contexts.lock().unwrap_or_else(PoisonError::into_inner);
        match contexts.last() {
            Some(context) => context.config().fork(),
            None => self.base_config.fork(),
        }
    }

    fn pop_context(&self) {
        self.contexts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
    }
}

pub struct ContextGuard<'a> {
    handle: &'a LazyHandle,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.handle.pop_context();
    }
}
