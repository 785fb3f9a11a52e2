//! Configuration loading and constants.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables. Every setting has a default so the service can
//! start with no configuration at all. `AppConfig` is the root struct.

use const_format::formatcp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================
// Health and deployment data must never be served from an upstream cache: a
// pipeline polling /health or /api/deployments after a rollout needs the live
// answer. The version document may be cached but must be revalidated.

/// Static assets (landing page, CSS, JS) - short cache, redeploys replace them
pub const HTTP_CACHE_STATIC_MAX_AGE: u32 = 300;

pub const CACHE_CONTROL_LIVE: &str = "no-store";

pub const CACHE_CONTROL_VERSION: &str = "no-cache";

pub const CACHE_CONTROL_STATIC: &str = formatcp!("public, max-age={}", HTTP_CACHE_STATIC_MAX_AGE);

// =============================================================================
// Deployment Log Constants
// =============================================================================

/// Number of records returned by the deployment list endpoint
pub const DEPLOYMENT_LIST_LIMIT: u32 = 10;

/// Maximum length of a deployment version (matches the VARCHAR(50) column)
pub const MAX_VERSION_LEN: usize = 50;

/// Maximum length of an environment label (matches the VARCHAR(20) column)
pub const MAX_ENVIRONMENT_LEN: usize = 20;

/// Status assigned to every newly recorded deployment
pub const DEFAULT_DEPLOYMENT_STATUS: &str = "active";

// =============================================================================
// Timeouts
// =============================================================================

/// Upper bound on a single request before the server answers 408
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upper bound on the health probe round trip
pub const HEALTH_PROBE_TIMEOUT_SECS: u64 = 3;

/// Time allowed for in-flight requests to finish after a shutdown signal
pub const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 30;

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "public";

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "gitopsdb";
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_DB_PASSWORD: &str = "password";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_APP_VERSION: &str = "1.0.0";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_DEPLOYMENT_ID: &str = "local";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "gitops_demo=debug,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Build and rollout metadata reported by /health and /version
    #[serde(default)]
    pub app: AppInfo,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    /// Directory served for `/` and other static assets
    pub static_dir: String,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
            static_dir: DEFAULT_STATIC_DIR.to_string(),
        }
    }
}

/// PostgreSQL connection settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Require TLS to the database
    pub ssl: bool,
    pub max_connections: u32,
    /// How long a request waits for a pooled connection before failing
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            name: DEFAULT_DB_NAME.to_string(),
            user: DEFAULT_DB_USER.to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
            ssl: true,
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            acquire_timeout_seconds: DEFAULT_DB_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

// Hand-written so the password never reaches the logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("ssl", &self.ssl)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_seconds", &self.acquire_timeout_seconds)
            .finish()
    }
}

/// Metadata identifying the running build
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppInfo {
    pub version: String,
    pub environment: String,
    pub deployment_id: String,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            version: DEFAULT_APP_VERSION.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            deployment_id: DEFAULT_DEPLOYMENT_ID.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply environment
    /// overrides from the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_string(&lookup, "HOST", &mut self.http.host);
        override_parsed(&lookup, "PORT", &mut self.http.port)?;
        override_parsed(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            &mut self.http.request_timeout_seconds,
        )?;
        override_string(&lookup, "STATIC_DIR", &mut self.http.static_dir);

        override_string(&lookup, "DB_HOST", &mut self.database.host);
        override_parsed(&lookup, "DB_PORT", &mut self.database.port)?;
        override_string(&lookup, "DB_NAME", &mut self.database.name);
        override_string(&lookup, "DB_USER", &mut self.database.user);
        override_string(&lookup, "DB_PASSWORD", &mut self.database.password);
        override_parsed(&lookup, "DB_SSL", &mut self.database.ssl)?;
        override_parsed(
            &lookup,
            "DB_MAX_CONNECTIONS",
            &mut self.database.max_connections,
        )?;
        override_parsed(
            &lookup,
            "DB_ACQUIRE_TIMEOUT_SECS",
            &mut self.database.acquire_timeout_seconds,
        )?;

        override_string(&lookup, "APP_VERSION", &mut self.app.version);
        override_string(&lookup, "ENVIRONMENT", &mut self.app.environment);
        override_string(&lookup, "DEPLOYMENT_ID", &mut self.app.deployment_id);

        override_string(&lookup, "LOG_FORMAT", &mut self.logging.format);

        Ok(())
    }
}

fn override_string<F>(lookup: &F, key: &str, target: &mut String)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
        *target = value;
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
        *target = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            key: key.to_string(),
            value,
        })?;
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[])).unwrap();

        assert_eq!(config.http.port, 3000);
        assert_eq!(config.database.name, "gitopsdb");
        assert_eq!(config.database.user, "postgres");
        assert_eq!(config.database.password, "password");
        assert!(config.database.ssl);
        assert_eq!(config.app.version, "1.0.0");
        assert_eq!(config.app.environment, "development");
        assert_eq!(config.app.deployment_id, "local");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("PORT", "8080"),
                ("DB_HOST", "db.internal"),
                ("DB_PORT", "6543"),
                ("DB_SSL", "false"),
                ("APP_VERSION", "2.3.1"),
                ("ENVIRONMENT", "production"),
                ("DEPLOYMENT_ID", "run-42"),
            ]))
            .unwrap();

        assert_eq!(config.http.port, 8080);
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert!(!config.database.ssl);
        assert_eq!(config.app.version, "2.3.1");
        assert_eq!(config.app.environment, "production");
        assert_eq!(config.app.deployment_id, "run-42");
    }

    #[test]
    fn test_empty_env_value_keeps_default() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("APP_VERSION", "")])).unwrap();
        assert_eq!(config.app.version, DEFAULT_APP_VERSION);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = AppConfig::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn test_partial_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[http]
port = 4000

[app]
environment = "staging"
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.http.port, 4000);
        assert_eq!(config.http.host, DEFAULT_HTTP_HOST);
        assert_eq!(config.app.environment, "staging");
        assert_eq!(config.app.version, DEFAULT_APP_VERSION);
        assert_eq!(config.database.port, DEFAULT_DB_PORT);
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = DatabaseConfig {
            password: "hunter2".to_string(),
            ..DatabaseConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
