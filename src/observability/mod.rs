//! Logging setup.
//!
//! The client itself only emits `tracing` events; applications that do not
//! install their own subscriber can call [`init_logging`]. Secrets never
//! reach an event: keys and tokens are held in `SecretString` and header
//! values are marked sensitive.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt as layer_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::{DocumentLibraryError, DocumentLibraryResult};

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Log level enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Trace level - most verbose.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
    /// Off - no logging.
    Off,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        };
        f.write_str(name)
    }
}

impl FromStr for LogLevel {
    type Err = DocumentLibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "none" => Ok(LogLevel::Off),
            _ => Err(DocumentLibraryError::Configuration {
                message: format!("Unknown log level: {s}"),
            }),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Minimum level, used when `RUST_LOG` is not set.
    pub level: LogLevel,
    /// Emit one JSON object per event instead of text.
    pub json: bool,
}

impl LogConfig {
    /// Creates a configuration with the default level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level.
    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Switches to JSON output.
    #[must_use]
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from(self.level).into())
            .from_env_lossy()
    }
}

/// Installs a global `tracing` subscriber.
///
/// Calling it again after a successful call does nothing. It fails when
/// some other subscriber was installed first.
///
/// ```no_run
/// use integrations_document_library::observability::{init_logging, LogConfig, LogLevel};
///
/// init_logging(&LogConfig::new().level(LogLevel::Debug).json(true))?;
/// # Ok::<(), integrations_document_library::DocumentLibraryError>(())
/// ```
pub fn init_logging(config: &LogConfig) -> DocumentLibraryResult<()> {
    if INITIALIZED.get().is_some() {
        return Ok(());
    }

    let registry = tracing_subscriber::registry().with(config.filter());
    let installed = if config.json {
        registry.with(layer_fmt::layer().json()).try_init()
    } else {
        registry.with(layer_fmt::layer().with_target(true)).try_init()
    };

    installed.map_err(|e| DocumentLibraryError::Configuration {
        message: format!("Failed to install tracing subscriber: {e}"),
    })?;

    let _ = INITIALIZED.set(());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("debug", LogLevel::Debug)]
    #[test_case("WARNING", LogLevel::Warn)]
    #[test_case(" off ", LogLevel::Off)]
    fn test_log_level_from_str(input: &str, expected: LogLevel) {
        assert_eq!(input.parse::<LogLevel>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_level_rejected() {
        assert!(matches!(
            "loud".parse::<LogLevel>(),
            Err(DocumentLibraryError::Configuration { .. })
        ));
    }

    #[test]
    fn test_level_filter_conversion() {
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::WARN);
        assert_eq!(LevelFilter::from(LogLevel::Off), LevelFilter::OFF);
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = LogConfig::new().level(LogLevel::Error);
        init_logging(&config).unwrap();
        init_logging(&config).unwrap();
    }
}
