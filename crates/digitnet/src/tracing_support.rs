//! Log output for digitnet binaries
//!
//! The library crates only emit `tracing` spans and events; nothing is
//! printed until an application installs a subscriber. [`init_tracing`] does
//! that with an env-filter and one of three output formats.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directive (default `digitnet_model=info,warn`)
//! - `DIGITNET_LOG_FORMAT`: `pretty`, `json` or `compact` (default `pretty`)
//!
//! # Example
//!
//! ```no_run
//! use digitnet::tracing_support::{init_tracing, TracingConfig, TracingFormat};
//!
//! init_tracing(
//!     TracingConfig::default()
//!         .with_format(TracingFormat::Json)
//!         .with_filter("digitnet_model=debug"),
//! )?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::Result;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "digitnet_model=info,warn";

/// Environment variable selecting the output format
pub const FORMAT_ENV: &str = "DIGITNET_LOG_FORMAT";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingFormat {
    /// Multi-line, human readable
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
    /// One line per event
    Compact,
}

impl TracingFormat {
    /// Parse a format name; unknown names fall back to `Pretty`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => TracingFormat::Json,
            "compact" => TracingFormat::Compact,
            _ => TracingFormat::Pretty,
        }
    }
}

/// Subscriber settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub format: TracingFormat,
    /// `EnvFilter` directive, e.g. `digitnet_model=debug,warn`
    pub filter: String,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_thread_ids: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::from_env_values(
            std::env::var(FORMAT_ENV).ok().as_deref(),
            std::env::var("RUST_LOG").ok().as_deref(),
        )
    }
}

impl TracingConfig {
    fn from_env_values(format: Option<&str>, filter: Option<&str>) -> Self {
        Self {
            format: format.map(TracingFormat::parse).unwrap_or_default(),
            filter: filter
                .filter(|f| !f.trim().is_empty())
                .unwrap_or(DEFAULT_FILTER)
                .to_string(),
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
        }
    }

    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.with_ansi = ansi;
        self
    }

    /// Also log the id of the thread that emitted each event
    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }
}

/// Install the global subscriber
///
/// Call once at startup.
///
/// # Errors
///
/// Fails if the filter directive does not parse or a global subscriber is
/// already installed.
#[cfg(feature = "tracing")]
pub fn init_tracing(config: TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)?;
    let base = fmt::layer()
        .with_target(config.with_target)
        .with_thread_ids(config.with_thread_ids);

    match config.format {
        TracingFormat::Pretty => tracing_subscriber::registry()
            .with(base.pretty().with_ansi(config.with_ansi).with_filter(filter))
            .try_init()?,
        TracingFormat::Json => tracing_subscriber::registry()
            .with(base.json().with_filter(filter))
            .try_init()?,
        TracingFormat::Compact => tracing_subscriber::registry()
            .with(base.compact().with_ansi(config.with_ansi).with_filter(filter))
            .try_init()?,
    }

    tracing::debug!(format = ?config.format, filter = %config.filter, "tracing initialised");
    Ok(())
}

/// No-op when the `tracing` feature is disabled
#[cfg(not(feature = "tracing"))]
pub fn init_tracing(_config: TracingConfig) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!(TracingFormat::parse("json"), TracingFormat::Json);
        assert_eq!(TracingFormat::parse(" Compact "), TracingFormat::Compact);
        assert_eq!(TracingFormat::parse("pretty"), TracingFormat::Pretty);
        assert_eq!(TracingFormat::parse("xml"), TracingFormat::Pretty);
    }

    #[test]
    fn test_env_fallbacks() {
        let config = TracingConfig::from_env_values(None, None);
        assert_eq!(config.format, TracingFormat::Pretty);
        assert_eq!(config.filter, DEFAULT_FILTER);

        let config = TracingConfig::from_env_values(Some("json"), Some("  "));
        assert_eq!(config.format, TracingFormat::Json);
        assert_eq!(config.filter, DEFAULT_FILTER);

        let config = TracingConfig::from_env_values(None, Some("digitnet_model=trace"));
        assert_eq!(config.filter, "digitnet_model=trace");
    }

    #[test]
    fn test_builder() {
        let config = TracingConfig::from_env_values(None, None)
            .with_format(TracingFormat::Compact)
            .with_filter("debug")
            .with_ansi(false)
            .with_thread_ids(true);
        assert_eq!(config.format, TracingFormat::Compact);
        assert_eq!(config.filter, "debug");
        assert!(!config.with_ansi);
        assert!(config.with_thread_ids);
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn test_bad_filter_is_rejected() {
        let config = TracingConfig::from_env_values(None, None).with_filter("digitnet_model=loud");
        assert!(init_tracing(config).is_err());
    }
}
