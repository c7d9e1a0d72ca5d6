//! # weft-config
//!
//! Environment-driven configuration for the standard weft pipeline.
//!
//! | Variable                | Field              | Default  |
//! |-------------------------|--------------------|----------|
//! | `WEFT_LOG`              | `log_filter`       | `info`   |
//! | `WEFT_BATCH_PATH`       | `batch_path`       | `/batch` |
//! | `WEFT_REMOTE_IP_HEADER` | `remote_ip_header` | unset    |
//! | `WEFT_REQUEST_LOG`      | `request_logging`  | `true`   |
//!
//! An empty `WEFT_BATCH_PATH` disables batching.
//!
//! ```rust
//! use weft::{middleware_fn, Context, Next};
//! use weft_config::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! let app = config.build(middleware_fn(|ctx: Context, _next: Next| {
//!     ctx.response().set_body("hello");
//!     Ok(())
//! }));
//! // RequestLogger, ErrorHandler, Batcher, ErrorHandler, app
//! assert_eq!(app.len(), 5);
//! ```

use std::env;
use std::path::PathBuf;

use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use weft::middleware::{AlternateRemoteIp, Batcher, ErrorHandler, RequestLogger};
use weft::{IntoChain, MiddlewareChain};

pub const LOG_FILTER_VAR: &str = "WEFT_LOG";
pub const BATCH_PATH_VAR: &str = "WEFT_BATCH_PATH";
pub const REMOTE_IP_HEADER_VAR: &str = "WEFT_REMOTE_IP_HEADER";
pub const REQUEST_LOG_VAR: &str = "WEFT_REQUEST_LOG";

/// Settings for the middleware wrapped around an application chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub log_filter: String,
    /// `None` disables the batch endpoint
    pub batch_path: Option<String>,
    /// Header holding the real client IP when running behind a proxy
    pub remote_ip_header: Option<String>,
    pub request_logging: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            batch_path: Some("/batch".to_string()),
            remote_ip_header: None,
            request_logging: true,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let log_filter = env::var(LOG_FILTER_VAR).unwrap_or(defaults.log_filter);

        let batch_path = match env::var(BATCH_PATH_VAR) {
            Ok(path) if path.is_empty() => None,
            Ok(path) if !path.starts_with('/') => return Err(ConfigError::InvalidBatchPath(path)),
            Ok(path) => Some(path),
            Err(_) => defaults.batch_path,
        };

        let remote_ip_header = env::var(REMOTE_IP_HEADER_VAR)
            .ok()
            .filter(|header| !header.trim().is_empty());

        let request_logging = match env::var(REQUEST_LOG_VAR) {
            Ok(value) => parse_bool(REQUEST_LOG_VAR, &value)?,
            Err(_) => defaults.request_logging,
        };

        Ok(Self {
            log_filter,
            batch_path,
            remote_ip_header,
            request_logging,
        })
    }

    /// Load a .env file into the process environment, then read it
    pub fn from_env_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        dotenv::from_path(path.into())?;
        Self::from_env()
    }

    /// Wrap `app` in the standard pipeline:
    /// request logging, error handling, remote IP rewriting, batching.
    ///
    /// With batching on, a second error handler sits below the batcher so a
    /// failing sub-request becomes its own entry in the batch response.
    pub fn build(&self, app: impl IntoChain) -> MiddlewareChain {
        let mut chain = MiddlewareChain::new();

        if self.request_logging {
            chain = chain.with(RequestLogger::new());
        }
        chain = chain.with(ErrorHandler::new());
        if let Some(header) = &self.remote_ip_header {
            chain = chain.with(AlternateRemoteIp::from_header(header.clone()));
        }
        if let Some(path) = &self.batch_path {
            chain = chain
                .with(Batcher::with_path(path.clone()))
                .with(ErrorHandler::new());
        }

        debug!(middleware = chain.len(), "assembled pipeline");
        chain.with(app.into_chain())
    }

    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` wins over `log_filter` when set. Returns an error if a
    /// subscriber is already installed.
    pub fn init_tracing(&self) -> Result<(), ConfigError> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_filter))
            .map_err(|e| ConfigError::ParseError {
                key: LOG_FILTER_VAR.to_string(),
                message: e.to_string(),
            })?;

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| ConfigError::TracingInit(e.to_string()))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::ParseError {
            key: key.to_string(),
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse environment variable '{key}': {message}")]
    ParseError { key: String, message: String },

    #[error("Batch path must start with '/': {0}")]
    InvalidBatchPath(String),

    #[error("Failed to load .env file: {0}")]
    DotenvError(#[from] dotenv::Error),

    #[error("Failed to install tracing subscriber: {0}")]
    TracingInit(String),
}
