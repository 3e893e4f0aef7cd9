//! Unified logging for SafeCalc services
//!
//! Console output always; a daily-rolling file (plain or JSON) when a log
//! directory is configured, with `api_access` events optionally split into a
//! separate `<service>_api.log`.

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter,
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::error::{LoggingError, Result};

/// Target used for per-request access events
pub const API_ACCESS_TARGET: &str = "api_access";

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Event formatter: `timestamp [LEVEL] message`
///
/// Access events carry an extra `[api]` tag so they stand out on the console.
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.3fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m",
                Level::DEBUG => "\x1b[34m",
                Level::INFO => "\x1b[32m",
                Level::WARN => "\x1b[33m",
                Level::ERROR => "\x1b[31m",
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        if event.metadata().target() == API_ACCESS_TARGET {
            write!(writer, "[api] ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// Non-blocking writers stop flushing once their guard is dropped
static GUARDS: OnceLock<Mutex<Vec<WorkerGuard>>> = OnceLock::new();

fn keep_guard(guard: WorkerGuard) {
    let guards = GUARDS.get_or_init(|| Mutex::new(Vec::new()));
    match guards.lock() {
        Ok(mut guards) => guards.push(guard),
        Err(poisoned) => poisoned.into_inner().push(guard),
    }
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name, used as the crate filter target and the file prefix
    pub service_name: String,
    /// Base level (`info`), or a full filter spec (`info,tower_http=debug`)
    pub level: String,
    /// Directory for rolling log files; console only when `None`
    pub log_dir: Option<PathBuf>,
    /// JSON lines in the service log file
    pub enable_json: bool,
    /// Write `api_access` events to their own file
    pub enable_api_log: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            level: "info".to_string(),
            log_dir: None,
            enable_json: false,
            enable_api_log: true,
        }
    }
}

/// Build the `EnvFilter` directive string
///
/// `RUST_LOG` wins when set; `api_access=info` is appended unless it already
/// names that target. At the default `info` level the service's own crate
/// logs at `debug`.
pub fn filter_directives(config: &LogConfig, rust_log: Option<&str>) -> String {
    let base = match rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        Some(env) => env.to_string(),
        None if config.level.contains('=') || config.level.contains(',') => config.level.clone(),
        None => {
            let service_level = if config.level.eq_ignore_ascii_case("info") {
                "debug"
            } else {
                config.level.as_str()
            };
            format!("{},{}={}", config.level, config.service_name, service_level)
        },
    };

    if base.contains(API_ACCESS_TARGET) {
        base
    } else {
        format!("{},{}=info", base, API_ACCESS_TARGET)
    }
}

/// Install the global subscriber
pub fn init_with_config(config: LogConfig) -> Result<()> {
    let directives = filter_directives(&config, std::env::var("RUST_LOG").ok().as_deref());
    let env_filter = EnvFilter::try_new(&directives).map_err(|e| LoggingError::Filter {
        filter: directives.clone(),
        reason: e.to_string(),
    })?;

    let console_layer = fmt::layer()
        .with_ansi(true)
        .event_format(BracketedLevelFormat)
        .boxed();

    let split_api = config.enable_api_log && config.log_dir.is_some();

    let (file_layer, api_file_layer) = match &config.log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;

            let appender =
                tracing_appender::rolling::daily(dir, format!("{}.log", config.service_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            keep_guard(guard);

            let business_only = filter::filter_fn(move |metadata| {
                !split_api || metadata.target() != API_ACCESS_TARGET
            });
            let file_layer = if config.enable_json {
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(true)
                    .with_filter(business_only)
                    .boxed()
            } else {
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .event_format(BracketedLevelFormat)
                    .with_filter(business_only)
                    .boxed()
            };

            let api_file_layer = if split_api {
                let appender = tracing_appender::rolling::daily(
                    dir,
                    format!("{}_api.log", config.service_name),
                );
                let (writer, guard) = tracing_appender::non_blocking(appender);
                keep_guard(guard);
                Some(
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .event_format(BracketedLevelFormat)
                        .with_filter(filter::filter_fn(|metadata| {
                            metadata.target() == API_ACCESS_TARGET
                        }))
                        .boxed(),
                )
            } else {
                None
            };

            (Some(file_layer), api_file_layer)
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .with(api_file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    match &config.log_dir {
        Some(dir) => tracing::info!("Logging: {} @ {}", config.service_name, dir.display()),
        None => tracing::info!("Logging: {} (console)", config.service_name),
    }
    tracing::debug!("Log filter: {}", directives);

    Ok(())
}
