use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::connection::ConnectionConfig;
use crate::cli::CliArgs;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 0 = info, 1 = debug, 2+ = trace. `--debug` takes precedence.
    pub verbosity: u8,
}

impl Config {
    /// Expects logging to be set up already so the loader's messages are kept.
    pub fn load(cli_args: &CliArgs) -> Result<Self> {
        Self::load_with_default(cli_args, DEFAULT_CONFIG_PATH)
    }

    fn load_with_default(cli_args: &CliArgs, default_path: &str) -> Result<Self> {
        let mut config = match cli_args.config.as_deref() {
            Some(path) => Self::from_file(path)?,
            None if Path::new(default_path).exists() => Self::from_file(default_path)?,
            None => {
                warn!(
                    "Configuration file {} not found, using defaults",
                    default_path
                );
                Self::default()
            }
        };

        // Override config with CLI arguments
        config.override_with_cli_args(cli_args);

        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from {}", path.display());

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        Ok(toml::from_str(config_str)?)
    }

    fn override_with_cli_args(&mut self, args: &CliArgs) {
        if let Some(host) = &args.host {
            self.connection.host = host.clone();
        }
        if let Some(port) = args.port {
            self.connection.port = port;
        }
        if let Some(ms) = args.connect_timeout_ms {
            self.connection.connect_timeout_ms = ms;
        }
        if let Some(ms) = args.send_timeout_ms {
            self.connection.send_timeout_ms = ms;
        }
        if args.debug > 0 {
            self.logging.verbosity = args.debug;
        }
    }

    fn validate(&self) -> Result<()> {
        self.connection
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid connection configuration")?;

        Ok(())
    }
}
