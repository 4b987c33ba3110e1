use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod config;
pub mod replay;

#[derive(Subcommand)]
pub enum Commands {
    /// Feed a JSON Lines event log through the normalizer and bus
    #[command(visible_alias = "r")]
    Replay {
        /// Input file, one JSON event per line (stdin when omitted or `-`)
        input: Option<PathBuf>,

        /// Only print failures
        #[arg(short, long, conflicts_with = "verbose")]
        quiet: bool,

        /// Print every event (twice for envelope details)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Format of the run summary
        #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
        summary: SummaryFormat,
    },

    /// Print the effective configuration as JSON
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    Text,
    Json,
}
