//! Diagnostic logging for the CLI.
//!
//! Logging is off unless one of these environment variables is set:
//!
//! - `STEPWISE_DEBUG=true|1|yes` - Enable debug logging
//! - `STEPWISE_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `STEPWISE_LOG_FORMAT=json|pretty|compact` - Output format (default: compact)
//!
//! Log lines go to stderr so they never mix with command output.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Whether `STEPWISE_DEBUG` asks for debug logging.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("STEPWISE_DEBUG")
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Configured log level.
///
/// Defaults to "debug" if `STEPWISE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    resolve_level(env::var("STEPWISE_LOG_LEVEL").ok().as_deref(), is_debug_enabled())
}

fn resolve_level(requested: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match requested.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

/// Configured log format.
pub fn get_log_format() -> &'static str {
    resolve_format(env::var("STEPWISE_LOG_FORMAT").ok().as_deref())
}

fn resolve_format(requested: Option<&str>) -> &'static str {
    match requested.map(str::to_lowercase).as_deref() {
        Some("json") => "json",
        Some("pretty") => "pretty",
        _ => "compact",
    }
}

/// Initialize logging once. Later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled()
            && env::var("STEPWISE_LOG_LEVEL").is_err()
            && env::var("STEPWISE_LOG_FORMAT").is_err()
        {
            return;
        }

        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let level = get_log_level();
        let filter = EnvFilter::try_new(format!(
            "stepwise={},stepwise_cli={},stepwise_migrate={}",
            level, level, level
        ))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

        let layer = fmt::layer().with_writer(std::io::stderr);
        match get_log_format() {
            "json" => tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init(),
            "pretty" => tracing_subscriber::registry()
                .with(filter)
                .with(layer.pretty())
                .init(),
            _ => tracing_subscriber::registry()
                .with(filter)
                .with(layer.compact())
                .init(),
        }

        tracing::debug!(level = level, format = get_log_format(), "Logging initialized");
    });
}
