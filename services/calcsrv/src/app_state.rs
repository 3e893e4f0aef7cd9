//! Application state shared by all handlers

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::ResultCache;
use crate::config::CalcSrvConfig;
use crate::middleware::RequestMetrics;
use crate::rate_limit::RateLimiter;

pub struct AppState {
    pub config: Arc<CalcSrvConfig>,
    pub cache: ResultCache,
    /// `None` when rate limiting is disabled
    pub limiter: Option<RateLimiter>,
    pub metrics: RequestMetrics,
    pub started_at: Instant,
}

impl AppState {
    /// Build state with an in-process cache only
    pub fn new(config: CalcSrvConfig) -> Self {
        let cache = ResultCache::new(&config.cache);
        Self::with_cache(config, cache)
    }

    pub fn with_cache(config: CalcSrvConfig, cache: ResultCache) -> Self {
        let limiter = config
            .rate_limit
            .enabled
            .then(|| RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window()));

        Self {
            config: Arc::new(config),
            cache,
            limiter,
            metrics: RequestMetrics::default(),
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn rate_limited_total(&self) -> u64 {
        self.limiter.as_ref().map_or(0, RateLimiter::rejected_total)
    }
}

/// Start the periodic cache purge and limiter prune tasks
///
/// Both stop when `token` is cancelled.
pub fn spawn_maintenance_tasks(
    state: Arc<AppState>,
    token: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    if state.cache.is_enabled() {
        let period = Duration::from_secs(state.config.cache.purge_interval_secs.max(1));
        let state = Arc::clone(&state);
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let purged = state.cache.purge_expired().await;
                        if purged > 0 {
                            debug!("Cache purge: {} expired entries removed", purged);
                        }
                    }
                }
            }
        }));
    }

    if state.limiter.is_some() {
        let period = Duration::from_secs(state.config.rate_limit.prune_interval_secs.max(1));
        handles.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Some(limiter) = state.limiter.as_ref() {
                            let pruned = limiter.prune();
                            if pruned > 0 {
                                debug!("Rate limiter prune: {} idle clients removed", pruned);
                            }
                        }
                    }
                }
            }
        }));
    }

    handles
}
