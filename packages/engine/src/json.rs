use std::sync::Arc;

use serde_json::{Map, Number, Value as JsonValue};

use crate::{ConfigRegistry, ExecuteError, RowMapper, RowMapperFactory, Value};

pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(v) => JsonValue::from(*v),
        Value::Integer(v) => JsonValue::from(*v),
        Value::Real(v) => Number::from_f64(*v)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Text(v) => JsonValue::from(v.clone()),
        Value::Blob(bytes) => JsonValue::from(bytes_to_hex(bytes)),
    }
}

/// JSON objects and arrays bind as their serialized text, the usual
/// JSON-in-a-text-column convention; scalars map to their SQL counterparts.
pub fn value_from_json(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(v) => Value::Boolean(*v),
        JsonValue::Number(number) => number
            .as_i64()
            .map(Value::Integer)
            .or_else(|| number.as_f64().map(Value::Real))
            .unwrap_or(Value::Null),
        JsonValue::String(text) => Value::Text(text.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => Value::Text(value.to_string()),
    }
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 2);
    out.push_str("0x");
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Maps a row to a JSON object keyed by column name.
pub struct JsonRowMapper;

impl RowMapper for JsonRowMapper {
    fn map_row(&self, columns: &[String], row: &[Value]) -> Result<JsonValue, ExecuteError> {
        if columns.len() != row.len() {
            return Err(ExecuteError::mapping(format!(
                "row has {} values but {} columns",
                row.len(),
                columns.len()
            )));
        }
        let mut object = Map::with_capacity(columns.len());
        for (column, value) in columns.iter().zip(row) {
            object.insert(column.clone(), value_to_json(value));
        }
        Ok(JsonValue::Object(object))
    }
}

pub struct JsonRowMapperFactory;

impl RowMapperFactory for JsonRowMapperFactory {
    fn create(&self, _registry: &ConfigRegistry) -> Arc<dyn RowMapper> {
        Arc::new(JsonRowMapper)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{value_from_json, value_to_json, JsonRowMapper};
    use crate::{ExecuteError, RowMapper, Value};

    #[test]
    fn maps_a_row_to_an_object_keyed_by_column() {
        let columns = vec!["id".to_string(), "name".to_string(), "score".to_string()];
        let row = vec![
            Value::Integer(7),
            Value::Text("ada".to_string()),
            Value::Real(0.5),
        ];

        let mapped = JsonRowMapper.map_row(&columns, &row).expect("mapping should succeed");

        assert_eq!(mapped, json!({"id": 7, "name": "ada", "score": 0.5}));
    }

    #[test]
    fn rejects_mismatched_row_arity() {
        let columns = vec!["only".to_string()];
        let error = JsonRowMapper
            .map_row(&columns, &[])
            .expect_err("arity mismatch should fail");
        assert!(matches!(error, ExecuteError::Mapping { .. }));
    }

    #[test]
    fn blobs_render_as_hex_text() {
        assert_eq!(
            value_to_json(&Value::Blob(vec![0xde, 0xad])),
            json!("0xdead")
        );
    }

    #[test]
    fn json_objects_bind_as_serialized_text() {
        let value = value_from_json(&json!({"a": 1}));
        assert_eq!(value, Value::Text("{\"a\":1}".to_string()));
    }

    #[test]
    fn json_scalars_bind_as_their_sql_counterparts() {
        assert_eq!(value_from_json(&json!(null)), Value::Null);
        assert_eq!(value_from_json(&json!(true)), Value::Boolean(true));
        assert_eq!(value_from_json(&json!(3)), Value::Integer(3));
        assert_eq!(value_from_json(&json!(2.5)), Value::Real(2.5));
        assert_eq!(
            value_from_json(&json!("text")),
            Value::Text("text".to_string())
        );
    }
}
