//! SafeCalc basic library
//!
//! Plumbing shared by all services:
//! - logging bootstrap
//! - API response envelope and HTTP errors
//! - graceful shutdown
//! - process metrics

pub mod api_types;
pub mod error;
pub mod logging;
pub mod serde_helpers;
pub mod shutdown;
pub mod system_metrics;

pub use api_types::{ErrorInfo, ErrorResponse, HealthStatus, ServiceStatus, SuccessResponse};

// Re-export AppError when axum feature is enabled
#[cfg(feature = "axum")]
pub use api_types::AppError;

pub use error::LoggingError;
pub use logging::{init_with_config, LogConfig};
pub use system_metrics::SystemMetrics;
