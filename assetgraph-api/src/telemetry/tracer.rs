//! Tracing Subscriber Initialization

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "assetgraph_api=debug,tower_http=debug,info";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable, multi-line
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" | "text" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Log output format
    pub log_format: LogFormat,
    /// Filter directives used when `RUST_LOG` is unset
    pub default_filter: String,
    /// Service name attached to the startup event
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            default_filter: DEFAULT_FILTER.to_string(),
            service_name: "assetgraph-api".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Read `ASSETGRAPH_LOG_FORMAT` and `ASSETGRAPH_SERVICE_NAME`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_format: lookup("ASSETGRAPH_LOG_FORMAT")
                .and_then(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
            default_filter: defaults.default_filter,
            service_name: lookup("ASSETGRAPH_SERVICE_NAME").unwrap_or(defaults.service_name),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Call once at startup. `RUST_LOG` overrides the configured default filter.
pub fn init_tracing(config: &TelemetryConfig) -> ApiResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
    };
    installed.map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = %config.service_name,
        log_format = ?config.log_format,
        "Telemetry initialized"
    );
    Ok(())
}
