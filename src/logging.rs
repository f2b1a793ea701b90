//! Logging setup for Tidemark.
//!
//! The planner emits `tracing` events: one `debug` per decision, an `info`
//! summary per plan and a `warn` for ungated cluster key changes. Nothing is
//! printed unless a subscriber is installed, either by the host application
//! or by [`init`] here.
//!
//! # Environment Variables
//!
//! - `TIDEMARK_DEBUG=true|1|yes` - Enable debug logging
//! - `TIDEMARK_LOG_LEVEL=trace|debug|info|warn|error` - Set the log level
//! - `TIDEMARK_LOG_FORMAT=json|pretty|compact` - Set the output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use tidemark::logging;
//!
//! // Reads the environment once; later calls are no-ops.
//! logging::init();
//! ```

use std::env;
use std::fmt;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "TIDEMARK_DEBUG";
const LEVEL_VAR: &str = "TIDEMARK_LOG_LEVEL";
const FORMAT_VAR: &str = "TIDEMARK_LOG_FORMAT";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Json,
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
        })
    }
}

/// Check if debug logging is enabled via `TIDEMARK_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

fn parse_level(value: &str) -> Option<&'static str> {
    match value.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

/// The configured log level.
///
/// `TIDEMARK_LOG_LEVEL` wins when it names a valid level. Otherwise the level
/// is `debug` with `TIDEMARK_DEBUG` set and `warn` without.
pub fn log_level() -> &'static str {
    env::var(LEVEL_VAR)
        .ok()
        .and_then(|level| parse_level(&level))
        .unwrap_or(if is_debug_enabled() { "debug" } else { "warn" })
}

/// The configured output format.
pub fn log_format() -> LogFormat {
    env::var(FORMAT_VAR)
        .map(|f| LogFormat::parse(&f))
        .unwrap_or_default()
}

/// Install a subscriber configured from the environment.
///
/// Does nothing unless `TIDEMARK_DEBUG` or `TIDEMARK_LOG_LEVEL` is set, or
/// when the `tracing-subscriber` feature is disabled. Only the first call has
/// an effect.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
            return;
        }
        install(log_level(), log_format());
    });
}

/// Install a subscriber with an explicit level and format, ignoring the
/// environment. Only the first call to this or [`init`] has an effect.
pub fn init_with(level: &str, format: LogFormat) {
    INIT.call_once(|| {
        install(parse_level(level).unwrap_or("warn"), format);
    });
}

#[cfg(feature = "tracing-subscriber")]
fn install(level: &'static str, format: LogFormat) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_new(format!(
        "tidemark={level},tidemark_evolve={level},tidemark_ingest={level},tidemark_schema={level}"
    ))
    .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
    };

    if installed.is_ok() {
        tracing::info!(level, format = %format, "Tidemark logging initialized");
    }
}

#[cfg(not(feature = "tracing-subscriber"))]
fn install(_level: &'static str, _format: LogFormat) {}

/// Debug logging that only fires when `TIDEMARK_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! tidemark_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            $crate::__tracing::debug!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Some("debug"));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("Pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Json);
        assert_eq!(LogFormat::default().to_string(), "json");
    }

    #[test]
    fn test_log_level_default() {
        // SAFETY: test-only; no other test in this crate reads these variables
        unsafe {
            env::remove_var(DEBUG_VAR);
            env::remove_var(LEVEL_VAR);
        }
        assert!(!is_debug_enabled());
        assert_eq!(log_level(), "warn");
    }
}
