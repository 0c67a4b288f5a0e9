mod backend;
mod binding;
mod cache;
mod config;
mod error;
mod handle;
mod json;
mod rewrite;
mod types;

pub use backend::SqlBackend;
pub use binding::Binding;
pub use config::{ConfigRegistry, RowMapper, RowMapperFactory, StatementContext};
pub use error::{ExecuteError, PrepareError};
pub use handle::{ContextGuard, Handle, LazyHandle};
pub use json::{value_from_json, value_to_json, JsonRowMapper, JsonRowMapperFactory};
pub use rewrite::{rewrite_statement, ParameterReference, RewrittenStatement};
pub use types::{QueryResult, Value};
