//! Sliding-window rate limiter
//!
//! Each client keeps the timestamps of its recent requests. A request is
//! allowed while fewer than `max_requests` timestamps fall inside the window.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use common::AppError;
use dashmap::DashMap;
use tracing::warn;

use crate::app_state::AppState;
use crate::error::MSG_RATE_LIMITED;

pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    clients: DashMap<String, VecDeque<Instant>>,
    rejected: AtomicU64,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: DashMap::new(),
            rejected: AtomicU64::new(0),
        }
    }

    /// Record a request for `client_id`; `false` when over the limit
    pub fn check(&self, client_id: &str) -> bool {
        self.check_at(client_id, Instant::now())
    }

    fn check_at(&self, client_id: &str, now: Instant) -> bool {
        let mut history = self.clients.entry(client_id.to_string()).or_default();

        while history
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= self.window)
        {
            history.pop_front();
        }

        if history.len() >= self.max_requests {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        history.push_back(now);
        true
    }

    /// Drop clients with no requests left inside the window
    pub fn prune(&self) -> usize {
        self.prune_at(Instant::now())
    }

    fn prune_at(&self, now: Instant) -> usize {
        let before = self.clients.len();
        self.clients.retain(|_, history| {
            history
                .back()
                .is_some_and(|t| now.saturating_duration_since(*t) < self.window)
        });
        before.saturating_sub(self.clients.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }

    pub fn rejected_total(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

/// Client identity: first `X-Forwarded-For` entry, else the peer address
pub fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

/// Middleware for the calculation routes
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(limiter) = state.limiter.as_ref() else {
        return next.run(request).await;
    };

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_id(request.headers(), peer);

    if !limiter.check(&client) {
        warn!(client = %client, path = %request.uri().path(), "Rate limit exceeded");
        return AppError::too_many_requests(MSG_RATE_LIMITED).into_response();
    }

    next.run(request).await
}
