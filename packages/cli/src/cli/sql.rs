use clap::{Args, Subcommand, ValueEnum};

#[derive(Debug, Args)]
pub struct SqlCommand {
    #[command(subcommand)]
    pub command: SqlSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum SqlSubcommand {
    /// Execute SQL text. Use '-' to read SQL from stdin.
    Execute(SqlExecuteArgs),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SqlOutputFormat {
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct SqlExecuteArgs {
    /// Output format for query results.
    #[arg(long, value_enum, default_value_t = SqlOutputFormat::Table)]
    pub format: SqlOutputFormat,

    /// Named parameter as name=value; the value parses as JSON first and
    /// falls back to plain text.
    #[arg(long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// SQL text with :name parameters. Use '-' to read from stdin.
    pub sql: String,
}
