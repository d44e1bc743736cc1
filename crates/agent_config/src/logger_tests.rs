//! Tests for the logging contract.

use super::*;

/// Verify the level parser accepts canonical spellings and known aliases.
#[test]
fn test_log_level_parsing() {
    assert_eq!("trace".parse::<LogLevel>(), Ok(LogLevel::Trace));
    assert_eq!("info".parse::<LogLevel>(), Ok(LogLevel::Info));
    assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warn));
    assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
    assert_eq!("critical".parse::<LogLevel>(), Ok(LogLevel::Fatal));
    assert_eq!("off".parse::<LogLevel>(), Ok(LogLevel::Off));
    assert!("verbose".parse::<LogLevel>().is_err());
}

/// Verify levels order from most to least verbose.
#[test]
fn test_log_level_ordering() {
    assert!(LogLevel::Trace < LogLevel::Debug);
    assert!(LogLevel::Warn < LogLevel::Error);
    assert!(LogLevel::Fatal < LogLevel::Off);
}

/// Verify the default logger is not considered caller-supplied.
#[test]
fn test_tracing_logger_is_not_custom() {
    let logger = TracingLogger::default();
    assert!(!logger.is_custom());
}

/// Verify the active level can be swapped at runtime.
#[test]
fn test_tracing_logger_dynamic_level() {
    let logger = TracingLogger::new(LogLevel::Info);
    assert_eq!(logger.level(), LogLevel::Info);
    logger.set_level(LogLevel::Debug);
    assert_eq!(logger.level(), LogLevel::Debug);
}

/// Verify round-tripping a level through its string form.
#[test]
fn test_log_level_as_str_round_trip() {
    for level in [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Off,
    ] {
        assert_eq!(level.as_str().parse::<LogLevel>(), Ok(level));
    }
}
