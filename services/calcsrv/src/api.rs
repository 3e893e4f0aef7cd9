//! HTTP API handlers

pub mod calculate_handlers;
pub mod extract;
pub mod health_handlers;
pub mod scientific_handlers;
