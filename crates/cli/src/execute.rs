use crate::commands::{self, replay, Commands};
use eyre::Result;
use pulse_config::Config;
use std::sync::Arc;

impl Commands {
    pub async fn execute(self, config: Arc<Config>) -> Result<()> {
        match self {
            Commands::Replay {
                input,
                quiet,
                verbose,
                summary,
            } => {
                replay::execute(
                    &config,
                    input.as_deref(),
                    replay::verbosity(quiet, verbose),
                    summary,
                )
                .await
            }
            Commands::Config => commands::config::execute(&config),
        }
    }
}
