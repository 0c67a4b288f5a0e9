use crate::app::AppContext;
use crate::cli::sql::{SqlExecuteArgs, SqlOutputFormat};
use crate::db;
use crate::error::CliError;
use crate::output;
use rebind_sdk::{value_from_json, Binding, Value};
use std::io::Read;

pub fn run(context: &AppContext, args: SqlExecuteArgs) -> Result<(), CliError> {
    let sql = resolve_sql(&args)?;
    let binding = parse_binding(&args.params)?;
    let database = db::open_database(context)?;
    let result = pollster::block_on(database.execute(&sql, &binding))
        .map_err(|err| CliError::msg(format!("sql execution failed: {err}")))?;

    match args.format {
        SqlOutputFormat::Json => output::print_query_result_json(&result),
        SqlOutputFormat::Table => output::print_query_result_table(&result),
    }

    Ok(())
}

fn resolve_sql(args: &SqlExecuteArgs) -> Result<String, CliError> {
    if args.sql == "-" {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .map_err(|source| CliError::io("failed to read SQL from stdin", source))?;
        if input.trim().is_empty() {
            return Err(CliError::Usage("stdin SQL input is empty"));
        }
        return Ok(input);
    }

    Ok(args.sql.clone())
}

fn parse_binding(params: &[String]) -> Result<Binding, CliError> {
    let mut binding = Binding::new();
    for raw in params {
        let (name, value) = raw
            .split_once('=')
            .ok_or(CliError::Usage("--param expects NAME=VALUE"))?;
        if name.is_empty() {
            return Err(CliError::Usage("--param name is empty"));
        }
        binding.set(name, parse_value(value));
    }
    Ok(binding)
}

// JSON first so numbers, booleans, and null bind typed; anything that is
// not valid JSON binds as plain text.
fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => value_from_json(&json),
        Err(_) => Value::Text(raw.to_string()),
    }
}
