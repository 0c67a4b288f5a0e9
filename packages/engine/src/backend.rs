use async_trait::async_trait;

use crate::{ExecuteError, QueryResult, Value};

/// Execution seam for a database accepting positional `?` placeholders.
/// The SQL handed in has already been rewritten; `params` line up with the
/// placeholders left to right.
#[async_trait(?Send)]
pub trait SqlBackend: Send + Sync {
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<QueryResult, ExecuteError>;
}
