//! Structured logging setup
//!
//! The crate itself only emits `tracing` events; nothing is printed unless
//! the application installs a subscriber. [`init_logging`] is a ready-made
//! one: JSON for production, pretty-print for development, filtered by
//! level and optional per-target directives.
//!
//! Events worth knowing about:
//! - `TRACE` metadata records created
//! - `DEBUG` one line per resolved route (`method`, `path`, `multipart`)
//! - `DEBUG` controller declared (once per type)
//! - `WARN` base path assigned twice

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Extra directives, comma-separated (`controller_routes=trace,my_app=debug`)
    pub target_filter: Option<String>,
    /// Include file:line location (dev only)
    pub include_location: bool,
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("CONTROLLER_ROUTES_LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("CONTROLLER_ROUTES_LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
            ),
            target_filter: env::var("CONTROLLER_ROUTES_LOG_TARGET_FILTER").ok(),
            include_location: env::var("CONTROLLER_ROUTES_LOG_INCLUDE_LOCATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Verbose pretty-printed configuration for local work and tests
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Directives from [`target_filter`](Self::target_filter); invalid ones
    /// are skipped.
    fn directives(&self) -> Vec<Directive> {
        let Some(filter) = &self.target_filter else {
            return Vec::new();
        };
        filter
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .filter_map(|f| match f.parse::<Directive>() {
                Ok(directive) => Some(directive),
                Err(_) => {
                    eprintln!("Warning: Invalid log filter directive: {f}");
                    None
                }
            })
            .collect()
    }
}

/// Install a global subscriber configured by `config`.
///
/// `RUST_LOG`, when set, takes precedence over `config.log_level`. Fails if
/// a global subscriber is already installed.
///
/// ```no_run
/// use controller_routes::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::from_env()).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));
    for directive in config.directives() {
        env_filter = env_filter.add_directive(directive);
    }

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default_dev() {
        let config = LogConfig::default_dev();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.include_location);
        assert_eq!(config.level(), Level::DEBUG);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("invalid"), LogFormat::Json);
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let config = LogConfig {
            log_level: "loud".into(),
            ..LogConfig::default_dev()
        };
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn test_invalid_directives_are_skipped() {
        let config = LogConfig {
            target_filter: Some("controller_routes=trace, ,my_app=[bad".into()),
            ..LogConfig::default_dev()
        };
        let directives = config.directives();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].to_string(), "controller_routes=trace");
    }
}
