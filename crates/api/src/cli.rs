//! Command-line interface.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::{self, AppConfig, ConfigError, EnvOverrides, DEFAULT_CONFIG_PATH};
use crate::routes::health::HEALTH_PATH;

#[derive(Debug, Parser)]
#[command(name = "redactedhook", version, about = "Release filter webhook for RED and OPS")]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(
        long,
        short,
        env = "REDACTEDHOOK__CONFIG",
        default_value = DEFAULT_CONFIG_PATH,
        global = true
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the webhook server (default).
    Serve,
    /// Generate a new API token and print it.
    GenerateApitoken,
    /// Write a commented default configuration file.
    CreateConfig,
    /// Probe the running service's health endpoint.
    Health,
}

/// 16 random bytes, hex encoded.
pub fn generate_api_token() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

pub fn create_config(path: &Path) -> Result<(), ConfigError> {
    config::write_template(path)
}

/// Health endpoint URL for the configured bind address. Wildcard hosts are
/// probed on loopback.
pub fn health_url(config: &AppConfig) -> String {
    let host = match config.server.host.as_str() {
        "" | "0.0.0.0" => "127.0.0.1",
        "::" => "[::1]",
        other => other,
    };
    format!("http://{host}:{}{HEALTH_PATH}", config.server.port)
}

/// `true` when the service answers 200 on its health endpoint.
pub async fn check_health(config_path: &Path) -> bool {
    let mut config = std::fs::read_to_string(config_path)
        .ok()
        .and_then(|text| AppConfig::from_toml_str(&text, config_path).ok())
        .unwrap_or_default();
    if config.apply_env(&EnvOverrides::from_env()).is_err() {
        return false;
    }

    let client = reqwest::Client::new();
    match client
        .get(health_url(&config))
        .timeout(Duration::from_secs(5))
        .send()
        .await
    {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_token_is_32_hex_chars() {
        let token = generate_api_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_api_token());
    }

    #[test]
    fn health_url_uses_loopback_for_wildcard() {
        let mut config = AppConfig::default();
        config.server.host = "0.0.0.0".into();
        config.server.port = 8080;
        assert_eq!(health_url(&config), "http://127.0.0.1:8080/healthz");
    }

    #[test]
    fn subcommands_parse() {
        let cli = Cli::parse_from(["redactedhook", "generate-apitoken"]);
        assert_eq!(cli.command, Some(Command::GenerateApitoken));

        let cli = Cli::parse_from(["redactedhook", "--config", "/tmp/x.toml"]);
        assert_eq!(cli.command, None);
        assert_eq!(cli.config, PathBuf::from("/tmp/x.toml"));
    }
}
