//! Minimal logging contract consumed by the configuration engine.
//!
//! The engine does not own a logger implementation; it consumes a small
//! `{fatal, error, warn, info, debug, trace}` contract so that an embedding
//! caller can supply its own logger. The default [`TracingLogger`] forwards
//! to `tracing` events and supports changing its active level at runtime,
//! which the central-config applier uses when a `log_level` push arrives.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Severity levels understood by the agent logger.
///
/// Ordered from most to least verbose. `Off` disables all output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Off,
}

impl LogLevel {
    /// The canonical string spelling used in configuration values.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Off => "off",
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            LogLevel::Trace => 0,
            LogLevel::Debug => 1,
            LogLevel::Info => 2,
            LogLevel::Warn => 3,
            LogLevel::Error => 4,
            LogLevel::Fatal => 5,
            LogLevel::Off => 6,
        }
    }

    fn from_u8(raw: u8) -> LogLevel {
        match raw {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            5 => LogLevel::Fatal,
            _ => LogLevel::Off,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ();

    /// Accepts the canonical spellings plus the legacy `warning` alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" | "critical" => Ok(LogLevel::Fatal),
            "off" => Ok(LogLevel::Off),
            _ => Err(()),
        }
    }
}

/// The logging contract consumed by normalizers, the resolver, and the
/// central-config applier.
///
/// Implementations must be cheap to call when the message is below the
/// active level, because normalizers log unconditionally on bad input.
pub trait ConfigLogger: Send + Sync {
    /// Emit a message at the given level.
    fn log(&self, level: LogLevel, message: &str);

    /// The currently active level.
    fn level(&self) -> LogLevel;

    /// Update the active level in place.
    ///
    /// Used by the central-config applier when a `log_level` push arrives,
    /// and only when the logger is not caller-supplied.
    fn set_level(&self, level: LogLevel);

    /// Whether this logger was supplied by the embedding caller.
    ///
    /// The central-config applier refuses to change the level of a custom
    /// logger, since the caller owns its configuration.
    fn is_custom(&self) -> bool {
        true
    }

    fn fatal(&self, message: &str) {
        self.log(LogLevel::Fatal, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }
}

/// Default logger: forwards to `tracing` events, honoring a dynamic level.
///
/// # Examples
///
/// ```rust
/// use agent_config::{ConfigLogger, LogLevel, TracingLogger};
///
/// let logger = TracingLogger::new(LogLevel::Info);
/// logger.warn("invalid value for \"metricsInterval\"");
/// logger.set_level(LogLevel::Error);
/// assert_eq!(logger.level(), LogLevel::Error);
/// ```
pub struct TracingLogger {
    level: AtomicU8,
}

impl TracingLogger {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level: AtomicU8::new(level.to_u8()),
        }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl ConfigLogger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if level < self.level() || level == LogLevel::Off {
            return;
        }
        match level {
            LogLevel::Trace => tracing::trace!("{}", message),
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            // `tracing` has no level above error; fatal maps onto it.
            LogLevel::Error | LogLevel::Fatal => tracing::error!("{}", message),
            LogLevel::Off => {}
        }
    }

    fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    fn set_level(&self, level: LogLevel) {
        self.level.store(level.to_u8(), Ordering::Relaxed);
    }

    fn is_custom(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
