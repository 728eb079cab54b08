//! Service configuration.
//!
//! Values are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. Optional TOML file
//! 3. `ALGOBIO__<SECTION>__<KEY>` environment variables
//! 4. Deployment variables (`HOST`, `PORT`, `APP_NAME`, `EUREKA_SERVER`,
//!    `MODEL_DIR`, `DATABASE_URL`, `DB_USER`, `DB_PASSWORD`, `DB_HOST`,
//!    `DB_PORT`, `DB_NAME`)

use algobio_core::LogFormat;
use algobio_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Deployment variables and the keys they override.
const DEPLOYMENT_VARS: &[(&str, &str)] = &[
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("APP_NAME", "registry.app_name"),
    ("EUREKA_SERVER", "registry.server_url"),
    ("MODEL_DIR", "model.dir"),
    ("DATABASE_URL", "database.url"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_NAME", "database.name"),
];

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Model artifact location
    #[serde(default)]
    pub model: ModelSettings,
    /// Classification store settings
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Service registry settings
    #[serde(default)]
    pub registry: RegistrySettings,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl ServiceConfig {
    /// Load configuration from defaults, an optional file and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is unreadable or a value has the
    /// wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Load configuration reading deployment variables through `lookup`.
    ///
    /// `ALGOBIO__*` variables are always read from the process environment.
    pub fn load_with(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), "Reading configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("ALGOBIO")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in DEPLOYMENT_VARS {
            let value = lookup(var).filter(|v| !v.is_empty());
            if value.is_some() {
                debug!(var, key, "Applying deployment variable");
            }
            builder = builder
                .set_override_option(*key, value)
                .map_err(|e| ConfigError::new(format!("{}: {}", var, e)))?;
        }

        // A registry server named explicitly turns registration on.
        if lookup("EUREKA_SERVER").is_some_and(|v| !v.is_empty()) {
            builder = builder
                .set_override("registry.enabled", true)
                .map_err(|e| ConfigError::new(e.to_string()))?;
        }

        let config: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::new(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::new("server.request_timeout_secs must be positive"));
        }
        if self.database.enabled && self.database.pool_size == 0 {
            return Err(ConfigError::new("database.pool_size must be positive"));
        }
        if self.registry.enabled {
            if self.registry.heartbeat_interval_secs == 0 {
                return Err(ConfigError::new("registry.heartbeat_interval_secs must be positive"));
            }
            if self.registry.app_name.trim().is_empty() {
                return Err(ConfigError::new("registry.app_name must not be empty"));
            }
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address, also advertised to the registry
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Name reported by `GET /`
    #[serde(default = "default_service_title")]
    pub service_title: String,
    /// Per-request deadline in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ServerSettings {
    /// Per-request deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_title: default_service_title(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Model artifact location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Directory holding `model.json`, `vectorizer.json` and `meta.json`
    #[serde(default = "default_model_dir")]
    pub dir: PathBuf,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            dir: default_model_dir(),
        }
    }
}

/// Classification store settings.
///
/// `url` wins when set; otherwise the URL is composed from the parts.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Whether predictions are persisted at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Full connection URL
    #[serde(default)]
    pub url: Option<String>,
    /// User name
    #[serde(default = "default_db_user")]
    pub user: String,
    /// Password, percent-encoded when composing the URL
    #[serde(default)]
    pub password: String,
    /// Host name
    #[serde(default = "default_db_host")]
    pub host: String,
    /// Port
    #[serde(default = "default_db_port")]
    pub port: u16,
    /// Database name
    #[serde(default = "default_db_name")]
    pub name: String,
    /// Maximum pooled connections
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl DatabaseSettings {
    /// Connection URL for the store.
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                urlencoding::encode(&self.user),
                urlencoding::encode(&self.password),
                self.host,
                self.port,
                self.name
            ),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: None,
            user: default_db_user(),
            password: String::new(),
            host: default_db_host(),
            port: default_db_port(),
            name: default_db_name(),
            pool_size: default_pool_size(),
        }
    }
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("enabled", &self.enabled)
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

/// Service registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// Whether to register with Eureka
    #[serde(default)]
    pub enabled: bool,
    /// Eureka base URL, e.g. `http://localhost:8761/eureka`
    #[serde(default = "default_registry_url")]
    pub server_url: String,
    /// Application name registered with Eureka
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Host advertised to the registry, defaults to `server.host`
    #[serde(default)]
    pub instance_host: Option<String>,
    /// Lease renewal interval in seconds
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,
}

impl RegistrySettings {
    /// Lease renewal interval.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            server_url: default_registry_url(),
            app_name: default_app_name(),
            instance_host: None,
            heartbeat_interval_secs: default_heartbeat_interval(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_service_title() -> String {
    "Virus DNA Classifier (with DB)".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("model")
}

fn default_true() -> bool {
    true
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "algobio_ai".to_string()
}

fn default_pool_size() -> u32 {
    8
}

fn default_registry_url() -> String {
    "http://localhost:8761/eureka".to_string()
}

fn default_app_name() -> String {
    "AI-CLASSIFIER".to_string()
}

fn default_heartbeat_interval() -> u64 {
    30
}
