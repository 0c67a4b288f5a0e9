use std::path::Path;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rebind_engine::{ExecuteError, QueryResult, SqlBackend, Value};
use rusqlite::{params_from_iter, Connection, Row};

/// Embedded SQLite execution backend. The connection sits behind a mutex;
/// one statement runs at a time.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    pub fn in_memory() -> Result<Self, ExecuteError> {
        Connection::open_in_memory()
            .map(Self::from_connection)
            .map_err(|err| ExecuteError::backend(err.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self, ExecuteError> {
        Connection::open(path)
            .map(Self::from_connection)
            .map_err(|err| ExecuteError::backend(err.to_string()))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait(?Send)]
impl SqlBackend for SqliteBackend {
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<QueryResult, ExecuteError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        // Multi-statement scripts without parameters take the batch path;
        // prepared statements only ever carry a single statement.
        if params.is_empty() && sql.contains(';') {
            conn.execute_batch(sql)
                .map_err(|err| ExecuteError::backend(err.to_string()))?;
            return Ok(QueryResult::default());
        }

        let mut stmt = conn
            .prepare(sql)
            .map_err(|err| ExecuteError::backend(err.to_string()))?;
        let columns = stmt
            .column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>();

        let bound = params.iter().cloned().map(to_sql_value);
        let mut rows = stmt
            .query(params_from_iter(bound))
            .map_err(|err| ExecuteError::backend(err.to_string()))?;

        let mut result_rows = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|err| ExecuteError::backend(err.to_string()))?
        {
            result_rows.push(map_row(row)?);
        }

        Ok(QueryResult {
            columns,
            rows: result_rows,
        })
    }
}

fn map_row(row: &Row<'_>) -> Result<Vec<Value>, ExecuteError> {
    let mut values = Vec::new();
    for idx in 0..row.as_ref().column_count() {
        let value = row
            .get_ref(idx)
            .map_err(|err| ExecuteError::backend(err.to_string()))?;
        values.push(match value {
            rusqlite::types::ValueRef::Null => Value::Null,
            rusqlite::types::ValueRef::Integer(value) => Value::Integer(value),
            rusqlite::types::ValueRef::Real(value) => Value::Real(value),
            rusqlite::types::ValueRef::Text(value) => {
                Value::Text(String::from_utf8_lossy(value).to_string())
            }
            rusqlite::types::ValueRef::Blob(value) => Value::Blob(value.to_vec()),
        });
    }
    Ok(values)
}

// SQLite has no boolean storage class; booleans travel as 0/1 integers.
fn to_sql_value(value: Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Boolean(value) => rusqlite::types::Value::Integer(i64::from(value)),
        Value::Integer(value) => rusqlite::types::Value::Integer(value),
        Value::Real(value) => rusqlite::types::Value::Real(value),
        Value::Text(value) => rusqlite::types::Value::Text(value),
        Value::Blob(value) => rusqlite::types::Value::Blob(value),
    }
}
