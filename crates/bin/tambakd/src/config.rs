//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `tambak.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

/// Longest simulated actuator round trip accepted.
const MAX_ACTUATOR_LATENCY_MS: u64 = 5_000;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Simulated aerator bank.
    pub actuator: ActuatorConfig,
    /// Periodic auto-policy evaluation.
    pub policy: PolicyConfig,
    /// State fan-out to viewers.
    pub broadcast: BroadcastConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Time the virtual bank takes to acknowledge a command.
    pub latency_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Seconds between two evaluations of the latest reading.
    pub interval_secs: u64,
    /// Run the periodic loop at all. Mode switches still evaluate once.
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// States buffered per viewer before it starts skipping.
    pub capacity: usize,
}

impl Config {
    /// Load configuration from `tambak.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// merged values are out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("tambak.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TAMBAK_HOST") {
            self.server.host = val;
        }
        if let Some(port) = env_parsed("TAMBAK_PORT") {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("TAMBAK_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("TAMBAK_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("TAMBAK_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(latency) = env_parsed("TAMBAK_ACTUATOR_LATENCY_MS") {
            self.actuator.latency_ms = latency;
        }
        if let Some(interval) = env_parsed("TAMBAK_POLICY_INTERVAL_SECS") {
            self.policy.interval_secs = interval;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.actuator.latency_ms > MAX_ACTUATOR_LATENCY_MS {
            return Err(ConfigError::Validation(format!(
                "actuator latency must be at most {MAX_ACTUATOR_LATENCY_MS} ms"
            )));
        }
        if self.policy.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "policy interval must be non-zero".to_string(),
            ));
        }
        if self.broadcast.capacity == 0 {
            return Err(ConfigError::Validation(
                "broadcast capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    #[must_use]
    pub fn actuator_latency(&self) -> Duration {
        Duration::from_millis(self.actuator.latency_ms)
    }

    #[must_use]
    pub fn policy_interval(&self) -> Duration {
        Duration::from_secs(self.policy.interval_secs)
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            // logging is not initialised yet
            eprintln!("ignoring {key}={raw:?}: not a valid number");
            None
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:tambak.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "tambakd=info,tambak=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self { latency_ms: 300 }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            enabled: true,
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:tambak.db?mode=rwc");
        assert_eq!(config.actuator_latency(), Duration::from_millis(300));
        assert_eq!(config.policy_interval(), Duration::from_secs(5));
        assert!(config.policy.enabled);
        assert_eq!(config.broadcast.capacity, 64);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [actuator]
            latency_ms = 500

            [policy]
            interval_secs = 30
            enabled = false

            [broadcast]
            capacity = 8
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.database_url(), "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.actuator.latency_ms, 500);
        assert_eq!(config.policy.interval_secs, 30);
        assert!(!config.policy.enabled);
        assert_eq!(config.broadcast.capacity, 8);
    }

    #[test]
    fn should_keep_defaults_for_missing_sections() {
        let toml = "
            [policy]
            enabled = false
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.policy.interval_secs, 5);
        assert_eq!(config.actuator.latency_ms, 300);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_excessive_latency() {
        let mut config = Config::default();
        config.actuator.latency_ms = 5_001;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.actuator.latency_ms = 5_000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_reject_zero_policy_interval() {
        let mut config = Config::default();
        config.policy.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_broadcast_capacity() {
        let mut config = Config::default();
        config.broadcast.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_report_type_error_for_negative_latency() {
        let result: Result<Config, _> = toml::from_str("[actuator]\nlatency_ms = -1");
        assert!(result.is_err());
    }
}
