//! Command-line interface and configuration loading.

use clap::{Parser, Subcommand};

use wp_domain::config::Config;

#[derive(Parser)]
#[command(name = "waypoint", about = "Waypoint coaching gateway", version)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server (the default).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print the version.
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Validate the configuration and report issues.
    Validate,
    /// Print the effective configuration as TOML.
    Show,
}

/// Load configuration from the given path. A missing file yields the
/// built-in defaults (dev-friendly); a present-but-invalid file is an
/// error.
pub fn load_config(path: &str) -> anyhow::Result<Config> {
    match std::fs::read_to_string(path) {
        Ok(raw) => {
            let config: Config = toml::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("failed to parse {path}: {e}"))?;
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path, "config file not found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(anyhow::anyhow!("failed to read {path}: {e}")),
    }
}

/// Print validation results; returns false when any error-severity issue
/// exists.
pub fn validate(config: &Config, path: &str) -> bool {
    let issues = config.validate();
    if issues.is_empty() {
        println!("{path}: OK");
        return true;
    }
    for issue in &issues {
        println!("{issue}");
    }
    !config.has_errors()
}

/// Print the effective configuration.
pub fn show(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("failed to render config: {e}"),
    }
}
