use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use lilly::cli::{parse_args, run_cli_command};
use lilly::config::LillyConfig;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let command = parse_args(std::env::args());
    run_cli_command(command, LillyConfig::from_env()).await
}

/// Log to stderr so streamed replies on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
