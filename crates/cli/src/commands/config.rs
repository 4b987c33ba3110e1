use eyre::{Result, WrapErr};
use pulse_config::Config;

/// Render the effective configuration
pub fn render(config: &Config) -> Result<String> {
    serde_json::to_string_pretty(config).wrap_err("failed to serialize configuration")
}

pub fn execute(config: &Config) -> Result<()> {
    println!("{}", render(config)?);
    Ok(())
}
