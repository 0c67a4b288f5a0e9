use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, ContentArrangement, Row, Table};
use rebind_sdk::{value_to_json, QueryResult, Value};

pub fn print_query_result_table(result: &QueryResult) {
    if result.columns.is_empty() && result.rows.is_empty() {
        println!("OK");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic);

    if !result.columns.is_empty() {
        table.set_header(Row::from(
            result.columns.iter().map(Cell::new).collect::<Vec<_>>(),
        ));
    }

    for row in &result.rows {
        table.add_row(Row::from(
            row.iter()
                .map(|value| Cell::new(value_to_text(value)))
                .collect::<Vec<_>>(),
        ));
    }

    println!("{table}");
    println!("({} rows)", result.rows.len());
}

pub fn print_query_result_json(result: &QueryResult) {
    let payload = serde_json::json!({
        "columns": result.columns,
        "rows": result
            .rows
            .iter()
            .map(|row| row.iter().map(value_to_json).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
    );
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Boolean(value) => value.to_string(),
        Value::Integer(value) => value.to_string(),
        Value::Real(value) => value.to_string(),
        Value::Text(value) => value.clone(),
        Value::Blob(bytes) => {
            let mut out = String::with_capacity(bytes.len() * 2 + 2);
            out.push_str("0x");
            for byte in bytes {
                out.push_str(&format!("{byte:02x}"));
            }
            out
        }
    }
}
