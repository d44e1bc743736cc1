//! In-crate test helpers.
//!
//! [`MockLogger`] implements [`ConfigLogger`] and records everything it is
//! given, so tests can assert on warning and info output.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::logger::{ConfigLogger, LogLevel};

/// A recording logger for assertions on emitted messages.
///
/// Records every message regardless of the configured level, so tests can
/// assert on output without caring about verbosity.
pub struct MockLogger {
    records: Mutex<Vec<(LogLevel, String)>>,
    level: Mutex<LogLevel>,
    custom: AtomicBool,
}

impl MockLogger {
    /// A caller-supplied logger, which the engine must never reconfigure.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            level: Mutex::new(LogLevel::Trace),
            custom: AtomicBool::new(true),
        }
    }

    /// A built-in logger, whose level the engine may update.
    pub fn builtin() -> Self {
        let logger = Self::new();
        logger.custom.store(false, Ordering::Relaxed);
        logger
    }

    /// All recorded messages in emission order.
    pub fn messages(&self) -> Vec<(LogLevel, String)> {
        self.records.lock().unwrap().clone()
    }

    /// The recorded messages at a single level.
    fn at_level(&self, level: LogLevel) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.at_level(LogLevel::Warn)
    }

    pub fn infos(&self) -> Vec<String> {
        self.at_level(LogLevel::Info)
    }

    pub fn errors(&self) -> Vec<String> {
        self.at_level(LogLevel::Error)
    }

    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
    }
}

impl Default for MockLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLogger for MockLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.records
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }

    fn level(&self) -> LogLevel {
        *self.level.lock().unwrap()
    }

    fn set_level(&self, level: LogLevel) {
        *self.level.lock().unwrap() = level;
    }

    fn is_custom(&self) -> bool {
        self.custom.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A fresh mock poses as caller-supplied; `builtin` flips that.
    #[test]
    fn test_custom_flag() {
        assert!(MockLogger::new().is_custom());
        assert!(!MockLogger::builtin().is_custom());
    }

    /// Messages are recorded per level and survive a level change.
    #[test]
    fn test_records_by_level() {
        let logger = MockLogger::new();
        logger.warn("first");
        logger.set_level(LogLevel::Error);
        logger.warn("second");
        logger.info("third");

        assert_eq!(logger.warnings(), vec!["first", "second"]);
        assert_eq!(logger.infos(), vec!["third"]);
        assert_eq!(logger.level(), LogLevel::Error);
        assert_eq!(logger.messages().len(), 3);

        logger.clear();
        assert!(logger.messages().is_empty());
    }
}
