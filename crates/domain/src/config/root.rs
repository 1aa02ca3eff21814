use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::metrics::MetricsConfig;
use super::server::ServerConfig;
use super::tls::TlsConfig;
use super::upstream::UpstreamConfig;

const LOCAL_CONFIG_PATH: &str = "doq-gateway.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/doq-gateway/config.toml";

/// Main configuration structure for the DoQ gateway
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// QUIC listener configuration (bind address, port, ALPN mode)
    #[serde(default)]
    pub server: ServerConfig,

    /// Certificate and key presented to clients
    #[serde(default)]
    pub tls: TlsConfig,

    /// Resolver queries are forwarded to
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Counter exposition over HTTP
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. doq-gateway.toml in current directory
    /// 3. /etc/doq-gateway/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::get_config_path() {
                Some(found) => Self::from_file(&found)?,
                None => Self::default(),
            },
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if overrides.tls_compat {
            self.server.tls_compat = true;
        }
        if let Some(cert) = overrides.cert_file {
            self.tls.cert_file = Some(cert);
        }
        if let Some(key) = overrides.key_file {
            self.tls.key_file = Some(key);
        }
        if let Some(upstream) = overrides.upstream {
            self.upstream.address = upstream;
        }
        if let Some(port) = overrides.metrics_port {
            self.metrics.enabled = true;
            self.metrics.port = port;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("DoQ port cannot be 0".to_string()));
        }

        if self.upstream.address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "No upstream resolver configured".to_string(),
            ));
        }
        self.upstream
            .upstream_addr()
            .map_err(ConfigError::Validation)?;

        if self.upstream.timeout_ms == Some(0) {
            return Err(ConfigError::Validation(
                "Upstream timeout cannot be 0".to_string(),
            ));
        }

        match (&self.tls.cert_file, &self.tls.key_file) {
            (Some(_), None) => {
                return Err(ConfigError::Validation(
                    "tls.cert_file is set but tls.key_file is missing".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(ConfigError::Validation(
                    "tls.key_file is set but tls.cert_file is missing".to_string(),
                ))
            }
            _ => {}
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::Validation(
                "Metrics port cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        [LOCAL_CONFIG_PATH, SYSTEM_CONFIG_PATH]
            .into_iter()
            .find(|p| Path::new(p).exists())
            .map(str::to_string)
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub tls_compat: bool,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub upstream: Option<String>,
    pub metrics_port: Option<u16>,
    pub log_level: Option<String>,
}
