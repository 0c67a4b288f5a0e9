use std::path::PathBuf;

pub struct AppContext {
    /// SQLite file to run against; `None` means an in-memory database.
    pub db_path: Option<PathBuf>,
}
