//! Configuration loading and constants.
//!
//! Loads the host configuration from TOML files and defines constants for the
//! fixed cross-origin response headers, dependency probe bounds, logging, and
//! default paths. `AppConfig` is the root configuration struct; `HandlerConfig`
//! is the stage/region pair handed to every handler at construction.

use const_format::formatcp;
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// Cross-Origin Response Headers
// =============================================================================
// Forced onto every response leaving the request envelope. The max-age header
// is only added to pre-flight (204) responses.

/// Content type of every structured response body
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Origins allowed to read responses
pub const CORS_ALLOW_ORIGIN: &str = "*";

/// Methods advertised to cross-origin callers
pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Request headers cross-origin callers may send
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// How long browsers may cache a pre-flight result (24 hours)
pub const CORS_MAX_AGE_SECS: u32 = 86400;

pub const CORS_MAX_AGE: &str = formatcp!("{}", CORS_MAX_AGE_SECS);

// =============================================================================
// Dependency Probe Bounds
// =============================================================================

/// Maximum records read when probing the record store
pub const PROBE_RECORD_LIMIT: u32 = 1;

/// Maximum keys listed when probing the blob store
pub const PROBE_BLOB_MAX_KEYS: u32 = 1;

/// Maximum user pools listed when probing the identity provider
pub const PROBE_IDENTITY_MAX_RESULTS: u32 = 1;

// =============================================================================
// Runtime Descriptor
// =============================================================================

/// Runtime version string reported by the health probe
pub const RUNTIME_VERSION: &str =
    formatcp!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "canopy=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Stage used when neither the environment nor the config file names one
pub const DEFAULT_STAGE: &str = "dev";

/// Region used when neither the environment nor the config file names one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Environment variable carrying the deployment stage
pub const STAGE_ENV_VAR: &str = "STAGE";

/// Environment variable carrying the deployment region
pub const REGION_ENV_VAR: &str = "AWS_REGION";

/// Seconds to wait for in-flight requests during graceful shutdown
pub const SHUTDOWN_GRACE_SECS: u64 = 30;

/// Deployment stage and region, resolved once and handed to handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub stage: String,
    pub region: String,
}

impl HandlerConfig {
    pub fn new(stage: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            region: region.into(),
        }
    }

    /// Resolve from a variable lookup, falling back to the given defaults.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F, fallback: &EnvironmentConfig) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            stage: read(STAGE_ENV_VAR).unwrap_or_else(|| fallback.stage.clone()),
            region: read(REGION_ENV_VAR).unwrap_or_else(|| fallback.region.clone()),
        }
    }

    /// Resolve from the process environment.
    pub fn from_env(fallback: &EnvironmentConfig) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), fallback)
    }

    /// Production stages hide diagnostic traces from error responses.
    pub fn is_production(&self) -> bool {
        matches!(self.stage.as_str(), "prod" | "production")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    /// Stage and region fallbacks
    #[serde(default)]
    pub environment: EnvironmentConfig,
    /// Invocation metadata reported by detailed health checks
    #[serde(default)]
    pub function: FunctionConfig,
    /// Endpoints of the probed dependencies
    pub services: ServicesConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default = "EnvironmentConfig::default_stage")]
    pub stage: String,
    #[serde(default = "EnvironmentConfig::default_region")]
    pub region: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            stage: Self::default_stage(),
            region: Self::default_region(),
        }
    }
}

impl EnvironmentConfig {
    fn default_stage() -> String {
        DEFAULT_STAGE.to_string()
    }

    fn default_region() -> String {
        DEFAULT_REGION.to_string()
    }
}

/// Function identity and limits, standing in for the managed runtime's context
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionConfig {
    #[serde(default = "FunctionConfig::default_name")]
    pub name: String,
    #[serde(default = "FunctionConfig::default_version")]
    pub version: String,
    #[serde(default = "FunctionConfig::default_memory_limit")]
    pub memory_limit_mb: u32,
    /// Per-invocation time budget
    #[serde(default = "FunctionConfig::default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            version: Self::default_version(),
            memory_limit_mb: Self::default_memory_limit(),
            timeout_seconds: Self::default_timeout(),
        }
    }
}

impl FunctionConfig {
    fn default_name() -> String {
        env!("CARGO_PKG_NAME").to_string()
    }

    fn default_version() -> String {
        "$LATEST".to_string()
    }

    fn default_memory_limit() -> u32 {
        128
    }

    fn default_timeout() -> u64 {
        30
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
    /// Structured-record store endpoint
    pub record_store: String,
    /// Blob store endpoint
    pub blob_store: String,
    /// Identity provider endpoint
    pub identity: String,
    /// Timeout for a single probe call in milliseconds (default: 2000)
    #[serde(default = "ServicesConfig::default_probe_timeout")]
    pub probe_timeout_ms: u64,
}

impl ServicesConfig {
    fn default_probe_timeout() -> u64 {
        2000
    }

    fn endpoints(&self) -> [(&'static str, &str); 3] {
        [
            ("record_store", self.record_store.as_str()),
            ("blob_store", self.blob_store.as_str()),
            ("identity", self.identity.as_str()),
        ]
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
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Validation(
                "http.port must be non-zero".to_string(),
            ));
        }

        for (name, url) in self.services.endpoints() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "services.{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if self.services.probe_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "services.probe_timeout_ms must be non-zero".to_string(),
            ));
        }

        if self.function.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "function.timeout_seconds must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const MINIMAL: &str = r#"
[http]
host = "127.0.0.1"
port = 3000

[services]
record_store = "http://localhost:8000/tables/trees"
blob_store = "http://localhost:9000/buckets/photos"
identity = "https://idp.example.com/userpools"
"#;

    #[test]
    fn test_minimal_config_takes_defaults() {
        let config = AppConfig::parse(MINIMAL).unwrap();
        assert_eq!(config.environment.stage, DEFAULT_STAGE);
        assert_eq!(config.environment.region, DEFAULT_REGION);
        assert_eq!(config.services.probe_timeout_ms, 2000);
        assert_eq!(config.function.memory_limit_mb, 128);
        assert_eq!(config.function.timeout_seconds, 30);
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}\n[logging]\nformat = \"json\"\n", MINIMAL).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.http.port, 3000);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_rejects_non_http_service_url() {
        let contents = MINIMAL.replace("https://idp.example.com/userpools", "ftp://idp");
        let err = AppConfig::parse(&contents).unwrap_err();
        match err {
            ConfigError::Validation(msg) => assert!(msg.contains("services.identity")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_zero_port() {
        let contents = MINIMAL.replace("port = 3000", "port = 0");
        assert!(matches!(
            AppConfig::parse(&contents),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            AppConfig::parse("[http\nport = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_handler_config_prefers_lookup_over_fallback() {
        let vars: HashMap<&str, &str> = [("STAGE", "prod"), ("AWS_REGION", "eu-west-1")].into();
        let config = HandlerConfig::from_lookup(
            |k| vars.get(k).map(|v| v.to_string()),
            &EnvironmentConfig::default(),
        );
        assert_eq!(config, HandlerConfig::new("prod", "eu-west-1"));
        assert!(config.is_production());
    }

    #[test]
    fn test_handler_config_empty_values_fall_back() {
        let fallback = EnvironmentConfig {
            stage: "staging".to_string(),
            region: "ap-south-1".to_string(),
        };
        let config = HandlerConfig::from_lookup(|_| Some(String::new()), &fallback);
        assert_eq!(config, HandlerConfig::new("staging", "ap-south-1"));
        assert!(!config.is_production());
    }

    #[test]
    fn test_max_age_header_value() {
        assert_eq!(CORS_MAX_AGE, "86400");
    }
}
