//! AssetGraph Telemetry - Logging Infrastructure
//!
//! Subscriber setup for structured logs and a per-request span middleware.

pub mod middleware;
pub mod tracer;

pub use middleware::observability_middleware;
pub use tracer::{init_tracing, LogFormat, TelemetryConfig};
