//! Configuration management for the telemetry gateway.
//!
//! This module handles loading, validation, and conversion of gateway configuration
//! from TOML files and command-line arguments.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use telemetry_dispatch::transport::DEFAULT_MAX_BODY_BYTES;
use telemetry_dispatch::{DispatcherConfig, TransportConfig};

/// Application configuration loaded from TOML file.
///
/// Encompasses the HTTP endpoint, caller authentication, the built-in
/// handlers and logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Endpoint configuration settings
    pub server: ServerSettings,
    /// Caller authentication settings
    #[serde(default)]
    pub auth: AuthSettings,
    /// Built-in handler settings
    #[serde(default)]
    pub handlers: HandlerSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
}

/// Endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Network address to bind the gateway to (e.g., "127.0.0.1:8080")
    pub bind_address: String,
    /// Route that accepts telemetry posts
    #[serde(default = "default_path")]
    pub path: String,
    /// Status answered for content types without a handler
    #[serde(default = "default_unrouted_status")]
    pub unrouted_status: u16,
    /// Largest accepted request body in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Seconds between statistics log lines (0 to disable)
    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,
}

fn default_path() -> String {
    "/telemetry".to_string()
}

fn default_unrouted_status() -> u16 {
    501
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

fn default_stats_interval() -> u64 {
    60
}

/// Caller authentication.
///
/// Without a token every caller is admitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Shared token game servers must present
    pub token: Option<String>,
    /// Header carrying the token
    #[serde(default = "default_auth_header")]
    pub header: String,
}

fn default_auth_header() -> String {
    "authorization".to_string()
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token: None,
            header: default_auth_header(),
        }
    }
}

/// Settings for the handlers the gateway registers itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandlerSettings {
    /// Name used in log lines for this gateway's network
    #[serde(default)]
    pub server_name: String,
    /// Player UUIDs refused by the Auth handler
    #[serde(default)]
    pub denied_players: Vec<String>,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                bind_address: "127.0.0.1:8080".to_string(),
                path: default_path(),
                unrouted_status: default_unrouted_status(),
                max_body_bytes: default_max_body_bytes(),
                stats_interval_secs: default_stats_interval(),
            },
            auth: AuthSettings::default(),
            handlers: HandlerSettings::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration there and
    /// returns it. Runs before logging is set up, so it logs nothing itself.
    ///
    /// # Returns
    ///
    /// The configuration and whether the default file had to be created.
    pub async fn load_from_file(path: &PathBuf) -> anyhow::Result<(Self, bool)> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok((config, false))
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            Ok((default_config, true))
        }
    }

    pub fn to_dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            unrouted_status: self.server.unrouted_status,
        }
    }

    pub fn to_transport_config(&self) -> TransportConfig {
        TransportConfig {
            path: self.server.path.clone(),
            max_body_bytes: self.server.max_body_bytes,
        }
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is valid, or an error string describing the issue.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "Invalid bind address: {}",
                &self.server.bind_address
            ));
        }

        if !self.server.path.starts_with('/') {
            return Err(format!(
                "Endpoint path must start with '/': {}",
                &self.server.path
            ));
        }

        if !(400..=599).contains(&self.server.unrouted_status) {
            return Err(format!(
                "Unrouted status must be an error status (400-599): {}",
                self.server.unrouted_status
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err("Max body size must be greater than zero".to_string());
        }

        if let Some(token) = &self.auth.token {
            if token.is_empty() {
                return Err("Auth token cannot be empty".to_string());
            }
            if self.auth.header.is_empty() {
                return Err("Auth header cannot be empty when a token is set".to_string());
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}
