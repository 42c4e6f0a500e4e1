use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Server configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server host address
    #[validate(length(min = 1, message = "HTTP host cannot be empty"))]
    pub http_host: String,

    /// HTTP server port (1-65535)
    #[validate(range(
        min = 1,
        max = 65535,
        message = "HTTP port must be between 1 and 65535"
    ))]
    pub http_port: u16,

    /// Directory that relative CSV source paths are resolved against
    pub datasets_dir: Option<PathBuf>,

    /// Upper bound on rows returned by a single take request
    #[validate(range(
        min = 1,
        max = 100000,
        message = "Max take rows must be between 1 and 100000"
    ))]
    pub max_take_rows: usize,

    /// Per-request timeout in seconds
    #[validate(range(
        min = 1,
        max = 3600,
        message = "Request timeout must be between 1 and 3600 seconds"
    ))]
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size in bytes
    #[validate(range(min = 1024, message = "Max body size must be at least 1024 bytes"))]
    pub max_body_bytes: usize,

    /// Whether to run server in daemon mode
    pub daemon: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_host: "0.0.0.0".to_string(),
            http_port: 9099,
            datasets_dir: None,
            max_take_rows: 1000,
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
            daemon: false,
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            http_host: env::var("FRAMESERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: parse_env_var("FRAMESERVER_PORT", "9099")?,
            datasets_dir: env::var("FRAMESERVER_DATASETS_DIR").ok().map(PathBuf::from),
            max_take_rows: parse_env_var("FRAMESERVER_MAX_TAKE_ROWS", "1000")?,
            request_timeout_secs: parse_env_var("FRAMESERVER_REQUEST_TIMEOUT_SECS", "30")?,
            max_body_bytes: parse_env_var("FRAMESERVER_MAX_BODY_BYTES", "1048576")?,
            daemon: false, // Environment-based config always runs in foreground
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from CLI arguments with validation
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let config = Self {
            http_host: cli.http_host,
            http_port: cli.http_port,
            datasets_dir: cli.datasets_dir,
            max_take_rows: cli.max_take_rows,
            request_timeout_secs: cli.request_timeout_secs,
            max_body_bytes: ServerConfig::default().max_body_bytes,
            daemon: cli.daemon,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub http_host: String,
    pub http_port: u16,
    pub datasets_dir: Option<PathBuf>,
    pub max_take_rows: usize,
    pub request_timeout_secs: u64,
    pub daemon: bool,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
