use clap::Parser;
use eyre::eyre;
use pulse_cli::Commands;
use pulse_config::Config;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Normalize, deduplicate and dispatch editor events", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (JSON); defaults apply when omitted
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    pulse_utils::init(&config.logging.level)
        .map_err(|e| eyre!("failed to initialise logging: {e}"))?;

    cli.command.execute(Arc::new(config)).await
}
