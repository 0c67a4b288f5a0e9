use crate::app::AppContext;
use crate::error::CliError;
use rebind_sdk::{open, Database, OpenConfig};

pub fn open_database(context: &AppContext) -> Result<Database, CliError> {
    let config = OpenConfig {
        path: context.db_path.clone(),
        ..Default::default()
    };

    pollster::block_on(open(config)).map_err(|err| match &context.db_path {
        Some(path) => CliError::msg(format!(
            "failed to open database at {}: {}",
            path.display(),
            err
        )),
        None => CliError::msg(format!("failed to open in-memory database: {err}")),
    })
}
