//! Configuration file management for tlsgrade.
//!
//! This module handles loading, parsing, and merging configuration from TOML files
//! and command-line arguments.
//!
//! # Configuration Precedence
//!
//! 1. Default values (lowest priority)
//! 2. Configuration file (tlsgrade.toml or specified with --config)
//! 3. Command-line arguments (highest priority)
//!
//! # Example Configuration File
//!
//! ```toml
//! hosts = ["example.com", "example.com:8443"]
//! output = "summary"
//! exit_code = 1
//! port = 443
//! timeout_secs = 10
//!
//! [prometheus]
//! enabled = true
//! address = "http://localhost:9091"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::connector::{DEFAULT_PORT, DEFAULT_TIMEOUT};

pub const DEFAULT_CONFIG_FILE: &str = "tlsgrade.toml";
pub const OUTPUT_FORMATS: [&str; 3] = ["json", "text", "summary"];

/// Main configuration structure.
///
/// All fields are optional to support partial configuration and merging.
/// Missing values will be filled in by defaults or overridden by CLI arguments.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// List of hosts to check
    pub hosts: Option<Vec<String>>,
    /// Output format: json, text, summary
    pub output: Option<String>,
    /// Exit code to use when any host grades F or cannot be inspected
    pub exit_code: Option<i32>,
    /// Port used for hosts that do not name one
    pub port: Option<u16>,
    /// Connect plus handshake budget, in seconds
    pub timeout_secs: Option<u64>,
    /// Prometheus configuration
    pub prometheus: Option<PrometheusConfig>,
}

/// Prometheus Push Gateway settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PrometheusConfig {
    pub enabled: Option<bool>,
    /// Push gateway address (e.g., "http://localhost:9091")
    pub address: Option<String>,
}

impl Default for Config {
    /// - `hosts`: None (must be provided)
    /// - `output`: "summary"
    /// - `exit_code`: 0
    /// - `port`: 443
    /// - `timeout_secs`: 10
    /// - `prometheus.enabled`: false
    /// - `prometheus.address`: "http://localhost:9091"
    fn default() -> Self {
        Config {
            hosts: None,
            output: Some("summary".to_string()),
            exit_code: Some(0),
            port: Some(DEFAULT_PORT),
            timeout_secs: Some(DEFAULT_TIMEOUT.as_secs()),
            prometheus: Some(PrometheusConfig {
                enabled: Some(false),
                address: Some("http://localhost:9091".to_string()),
            }),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// ```no_run
    /// # use tlsgrade::config::Config;
    /// let config = Config::from_file("tlsgrade.toml")?;
    /// # Ok::<(), tlsgrade::config::ConfigError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// Merges this configuration with another, prioritizing the other's values.
    ///
    /// ```
    /// # use tlsgrade::config::Config;
    /// let defaults = Config::default();
    /// let file_config = Config::from_file("missing.toml").unwrap_or_default();
    /// let merged = defaults.merge_with(file_config);
    /// assert_eq!(merged.timeout_secs, Some(10));
    /// ```
    pub fn merge_with(mut self, other: Config) -> Self {
        if other.hosts.is_some() {
            self.hosts = other.hosts;
        }
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.exit_code.is_some() {
            self.exit_code = other.exit_code;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if let Some(other_prom) = other.prometheus {
            if let Some(ref mut self_prom) = self.prometheus {
                if other_prom.enabled.is_some() {
                    self_prom.enabled = other_prom.enabled;
                }
                if other_prom.address.is_some() {
                    self_prom.address = other_prom.address;
                }
            } else {
                self.prometheus = Some(other_prom);
            }
        }
        self
    }

    /// Creates a Config holding only the values given on the command line.
    pub fn from_cli_args(
        hosts: Option<Vec<String>>,
        output: Option<String>,
        exit_code: Option<i32>,
        port: Option<u16>,
        timeout_secs: Option<u64>,
        prometheus: Option<bool>,
        prometheus_address: Option<String>,
    ) -> Self {
        Config {
            hosts,
            output,
            exit_code,
            port,
            timeout_secs,
            prometheus: Some(PrometheusConfig {
                enabled: prometheus,
                address: prometheus_address,
            }),
        }
    }

    /// Checks the values that would otherwise fail late.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(output) = &self.output {
            if !OUTPUT_FORMATS.contains(&output.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "unknown output format '{}', expected one of {}",
                    output,
                    OUTPUT_FORMATS.join(", ")
                )));
            }
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.port == Some(0) {
            return Err(ConfigError::Validation(
                "port must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn prometheus_address(&self) -> Option<&str> {
        let prometheus = self.prometheus.as_ref()?;
        if prometheus.enabled == Some(true) {
            prometheus.address.as_deref()
        } else {
            None
        }
    }

    /// Generates an example configuration file in TOML format.
    pub fn example_toml() -> String {
        let example = Config {
            hosts: Some(vec![
                "example.com".to_string(),
                "example.com:8443".to_string(),
                "https://secure.example.com:9443".to_string(),
                "expired.badssl.com".to_string(),
            ]),
            output: Some("summary".to_string()),
            exit_code: Some(1),
            port: Some(DEFAULT_PORT),
            timeout_secs: Some(DEFAULT_TIMEOUT.as_secs()),
            prometheus: Some(PrometheusConfig {
                enabled: Some(true),
                address: Some("http://localhost:9091".to_string()),
            }),
        };

        toml::to_string_pretty(&example)
            .unwrap_or_else(|_| "# Error generating example".to_string())
    }
}

/// Errors that can occur during configuration loading and parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("IO Error: {0}")]
    Io(String),
    /// TOML parsing error (invalid syntax, type mismatch, etc.)
    #[error("Parse Error: {0}")]
    Parse(String),
    /// Validation error (missing required fields, invalid values, etc.)
    #[error("Validation Error: {0}")]
    Validation(String),
}
