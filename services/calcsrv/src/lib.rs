//! Calculator service library exports for testing

pub mod api;
pub mod app_state;
pub mod cache;
pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod rate_limit;
pub mod routes;

// Re-export commonly used types
pub use app_state::AppState;
pub use cache::ResultCache;
pub use config::CalcSrvConfig;
pub use error::{ApiError, CalcSrvError, Result};
pub use rate_limit::RateLimiter;
pub use routes::create_routes;
