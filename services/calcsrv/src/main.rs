//! Calculator Service (calcsrv)
//!
//! Evaluates untrusted arithmetic and scientific requests over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
#[cfg(feature = "swagger-ui")]
use utoipa::OpenApi;
#[cfg(feature = "swagger-ui")]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(feature = "swagger-ui")]
use calcsrv::routes::CalcsrvApiDoc;
use calcsrv::{
    app_state::spawn_maintenance_tasks, create_routes, AppState, CalcSrvConfig, CalcSrvError,
    ResultCache,
};
use common::shutdown::wait_for_shutdown;
use common::LogConfig;

const SERVICE_NAME: &str = "calcsrv";

#[derive(Parser, Debug, Clone)]
#[command(name = "calcsrv", version, about = "Safe calculator service")]
struct Args {
    /// Configuration file (YAML)
    #[arg(short, long, env = "CALCSRV_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address override, e.g. 127.0.0.1:8080
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate configuration, print it and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = CalcSrvConfig::load(args.config.as_deref())?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(bind) = &args.bind {
        let addr: SocketAddr = bind
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", bind))?;
        config.server.host = addr.ip().to_string();
        config.server.port = addr.port();
    }
    config.validate()?;

    if args.check {
        let summary = serde_yaml::to_string(&config).context("Failed to render configuration")?;
        println!("Configuration OK\n{}", summary);
        return Ok(());
    }

    common::init_with_config(LogConfig {
        service_name: SERVICE_NAME.to_string(),
        level: config.logging.level.clone(),
        log_dir: config.logging.dir.clone(),
        enable_json: config.logging.json,
        enable_api_log: config.logging.api_log,
    })
    .map_err(CalcSrvError::from)?;

    info!("Starting calcsrv v{}", env!("CARGO_PKG_VERSION"));
    if config.rate_limit.enabled {
        info!(
            "Rate limit: {} requests per {}s per client",
            config.rate_limit.max_requests, config.rate_limit.window_secs
        );
    } else {
        info!("Rate limiting disabled");
    }

    let cache = build_cache(&config).await;
    let state = Arc::new(AppState::with_cache(config, cache));

    let shutdown_token = CancellationToken::new();
    let maintenance = spawn_maintenance_tasks(Arc::clone(&state), shutdown_token.clone());

    let bind_address = state.config.bind_address();
    let app = create_routes(Arc::clone(&state));

    #[cfg(feature = "swagger-ui")]
    let app = {
        info!("Swagger UI feature ENABLED - initializing at /docs");
        app.merge(SwaggerUi::new("/docs").url("/openapi.json", CalcsrvApiDoc::openapi()))
    };

    #[cfg(not(feature = "swagger-ui"))]
    info!("Swagger UI feature DISABLED");

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|e| CalcSrvError::Bind {
            addr: bind_address.clone(),
            reason: e.to_string(),
        })?;

    info!("API server listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(wait_for_shutdown())
    .await
    .context("Server error")?;

    shutdown_token.cancel();
    for handle in maintenance {
        if let Err(e) = handle.await {
            warn!("Background task ended abnormally: {}", e);
        }
    }

    info!("calcsrv stopped");
    Ok(())
}

#[cfg(feature = "redis")]
async fn build_cache(config: &CalcSrvConfig) -> ResultCache {
    let cache = ResultCache::new(&config.cache);
    let Some(url) = config.cache.redis_url.as_deref().filter(|_| config.cache.enabled) else {
        return cache;
    };

    match calcsrv::cache::RedisStore::connect(url).await {
        Ok(store) => {
            info!("Redis cache tier enabled at: {}", url);
            cache.with_redis(store)
        },
        Err(e) => {
            warn!("Redis cache tier unavailable, using memory only: {}", e);
            cache
        },
    }
}

#[cfg(not(feature = "redis"))]
async fn build_cache(config: &CalcSrvConfig) -> ResultCache {
    if config.cache.redis_url.is_some() {
        warn!("cache.redis_url is set but calcsrv was built without the redis feature");
    }
    ResultCache::new(&config.cache)
}
