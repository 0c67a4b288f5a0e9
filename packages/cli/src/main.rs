use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rebind_engine=warn,rebind_sdk=warn")),
        )
        .init();

    if let Err(error) = rebind_cli::run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
