use super::sql::SqlCommand;
use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rebind")]
#[command(about = "Run SQL with :name parameters against SQLite")]
pub struct Cli {
    /// SQLite database file; omit to run against an in-memory database.
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute SQL against a database.
    Sql(SqlCommand),
}
