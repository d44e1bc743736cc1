//! Tests for the normalizer pipeline.

use super::*;
use crate::schema::Schema;
use crate::test_support::MockLogger;

fn run(opts: &mut OptionMap, logger: &MockLogger) {
    let schema = Schema::load().unwrap();
    let defaults = schema.defaults();
    let pipeline = Pipeline::new(&schema).unwrap();
    pipeline.run(opts, &schema, &defaults, logger);
}

fn opts_of(entries: &[(&str, ConfigValue)]) -> OptionMap {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

// ============================================================================
// Durations
// ============================================================================

/// Duration strings normalize to seconds across units.
#[test]
fn test_duration_units() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[
        ("metricsInterval", "2m".into()),
        ("serverTimeout", "2000ms".into()),
        ("abortedErrorThreshold", "25s".into()),
    ]);
    run(&mut opts, &logger);

    assert_eq!(opts["metricsInterval"].as_number(), Some(120.0));
    assert_eq!(opts["serverTimeout"].as_number(), Some(2.0));
    assert_eq!(opts["abortedErrorThreshold"].as_number(), Some(25.0));
    assert!(logger.warnings().is_empty());
}

/// Microseconds are accepted only where the option allows them.
#[test]
fn test_duration_microseconds_allowed_per_option() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[
        ("exitSpanMinDuration", "250us".into()),
        ("serverTimeout", "250us".into()),
    ]);
    run(&mut opts, &logger);

    assert_eq!(opts["exitSpanMinDuration"].as_number(), Some(0.00025));
    // serverTimeout does not allow `us`, so it falls back to its default.
    assert_eq!(opts["serverTimeout"].as_number(), Some(30.0));
    assert_eq!(logger.warnings().len(), 1);
}

/// A unit-less value is accepted in the option's default unit, with a
/// dedicated warning.
#[test]
fn test_duration_missing_units() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("metricsInterval", "10".into())]);
    run(&mut opts, &logger);

    assert_eq!(opts["metricsInterval"].as_number(), Some(10.0));
    let warnings = logger.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("units missing"));
    assert!(warnings[0].contains("metricsInterval"));
}

/// An unparseable duration falls back to the option's default when one
/// exists, and is dropped when none does.
#[test]
fn test_duration_invalid_values() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[
        ("metricsInterval", "2 days".into()),
        ("spanFramesMinDuration", "bogus".into()),
    ]);
    run(&mut opts, &logger);

    assert_eq!(opts["metricsInterval"].as_number(), Some(30.0));
    assert!(!opts.contains_key("spanFramesMinDuration"));
    assert_eq!(logger.warnings().len(), 2);
}

/// Decimal amounts are rejected in string form; unit suffixes are
/// case-sensitive.
#[test]
fn test_duration_string_syntax_is_strict() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[
        ("metricsInterval", "1.5s".into()),
        ("serverTimeout", "10S".into()),
    ]);
    run(&mut opts, &logger);

    assert_eq!(opts["metricsInterval"].as_number(), Some(30.0));
    assert_eq!(opts["serverTimeout"].as_number(), Some(30.0));
    assert_eq!(logger.warnings().len(), 2);
}

/// Negative durations are valid only for options that allow them.
#[test]
fn test_duration_negative_values() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[
        ("spanFramesMinDuration", "-1s".into()),
        ("metricsInterval", "-5s".into()),
    ]);
    run(&mut opts, &logger);

    // spanFramesMinDuration feeds span stack trace synthesis: -1s means
    // "always", which synthesis maps to threshold 0.
    assert_eq!(opts["spanStackTraceMinDuration"].as_number(), Some(0.0));
    assert_eq!(opts["metricsInterval"].as_number(), Some(30.0));
}

// ============================================================================
// Byte sizes
// ============================================================================

/// Byte-size suffixes use 1024 multipliers.
#[test]
fn test_byte_size_suffixes() {
    assert_eq!(parse_byte_size("1000b"), 1000.0);
    assert_eq!(parse_byte_size("100kb"), 102400.0);
    assert_eq!(parse_byte_size("10mb"), 10485760.0);
    assert_eq!(parse_byte_size("1gb"), 1073741824.0);
    assert_eq!(parse_byte_size("1GB"), 1073741824.0);
    assert_eq!(parse_byte_size("1024"), 1024.0);
}

/// A bad byte size becomes NaN in place; it never falls back to the default
/// and never warns.
#[test]
fn test_byte_size_invalid_is_nan() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("apiRequestSize", "lots".into())]);
    run(&mut opts, &logger);

    assert!(opts["apiRequestSize"].as_number().unwrap().is_nan());
    assert!(logger.warnings().is_empty());
}

// ============================================================================
// Booleans
// ============================================================================

/// Only booleans and the exact strings "true"/"false" are recognized.
/// Anything else unsets the option rather than falling back to the default.
#[test]
fn test_boolean_values() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[
        ("active", "false".into()),
        ("captureHeaders", ConfigValue::Bool(true)),
        ("instrument", "yes".into()),
        ("disableSend", "TRUE".into()),
    ]);
    run(&mut opts, &logger);

    assert_eq!(opts["active"].as_bool(), Some(false));
    assert_eq!(opts["captureHeaders"].as_bool(), Some(true));
    assert!(!opts.contains_key("instrument"));
    assert!(!opts.contains_key("disableSend"));
    assert_eq!(logger.warnings().len(), 2);
}

/// The boolean quirk: a bad value unsets the option, it does not become
/// the default.
#[test]
fn test_bad_boolean_becomes_unset_not_default() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("centralConfig", "enabled".into())]);
    run(&mut opts, &logger);

    // centralConfig defaults to true, but a bad supplied value must not
    // resurrect that default here.
    assert!(!opts.contains_key("centralConfig"));
    assert_eq!(logger.warnings().len(), 1);
}

// ============================================================================
// Numbers and the infinity sentinel
// ============================================================================

/// Numeric strings parse; garbage falls back to the default with a warning.
#[test]
fn test_numbers() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[
        ("stackTraceLimit", "100".into()),
        ("maxQueueSize", "many".into()),
    ]);
    run(&mut opts, &logger);

    assert_eq!(opts["stackTraceLimit"].as_number(), Some(100.0));
    assert_eq!(opts["maxQueueSize"].as_number(), Some(1024.0));
    assert_eq!(logger.warnings().len(), 1);
}

/// `transactionMaxSpans: -1` means unbounded.
#[test]
fn test_transaction_max_spans_infinity_sentinel() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("transactionMaxSpans", "-1".into())]);
    run(&mut opts, &logger);

    assert_eq!(opts["transactionMaxSpans"].as_number(), Some(f64::INFINITY));
}

// ============================================================================
// Sample rate
// ============================================================================

/// Valid rates are rounded to four decimal places; rounding is idempotent.
#[test]
fn test_sample_rate_rounding() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("transactionSampleRate", ConfigValue::Number(0.5555555))]);
    run(&mut opts, &logger);
    assert_eq!(opts["transactionSampleRate"].as_number(), Some(0.5556));

    run(&mut opts, &logger);
    assert_eq!(opts["transactionSampleRate"].as_number(), Some(0.5556));
    assert!(logger.warnings().is_empty());
}

/// A tiny positive rate rounds up to the minimum rather than down to zero.
#[test]
fn test_sample_rate_minimum() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("transactionSampleRate", ConfigValue::Number(0.00001))]);
    run(&mut opts, &logger);
    assert_eq!(opts["transactionSampleRate"].as_number(), Some(0.0001));

    let mut opts = opts_of(&[("transactionSampleRate", ConfigValue::Number(0.0))]);
    run(&mut opts, &logger);
    assert_eq!(opts["transactionSampleRate"].as_number(), Some(0.0));
}

/// An invalid rate falls back to the default with exactly one warning,
/// whether it is out of range or not numeric at all.
#[test]
fn test_sample_rate_fallback_warns_once() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("transactionSampleRate", ConfigValue::Number(1.5))]);
    run(&mut opts, &logger);
    assert_eq!(opts["transactionSampleRate"].as_number(), Some(1.0));
    assert_eq!(logger.warnings().len(), 1);

    for bad in [
        ConfigValue::Number(2.0),
        ConfigValue::Number(-1.0),
        ConfigValue::from("half"),
    ] {
        let logger = MockLogger::new();
        let mut opts = opts_of(&[("transactionSampleRate", bad)]);
        run(&mut opts, &logger);
        assert_eq!(opts["transactionSampleRate"].as_number(), Some(1.0));
        assert_eq!(logger.warnings().len(), 1);
    }
}

// ============================================================================
// Key-value pairs
// ============================================================================

/// All three source shapes produce the same ordered pair list.
#[test]
fn test_key_value_pair_shapes() {
    let expected = ConfigValue::Pairs(vec![
        ("foo".to_string(), "bar".to_string()),
        ("baz".to_string(), "qux".to_string()),
    ]);

    for value in [
        "foo=bar, baz = qux".into(),
        ConfigValue::from(vec!["foo=bar", "baz=qux"]),
        expected.clone(),
    ] {
        let logger = MockLogger::new();
        let mut opts = opts_of(&[("globalLabels", value)]);
        run(&mut opts, &logger);
        assert_eq!(opts["globalLabels"], expected);
    }
}

/// Duplicate keys and their order survive.
#[test]
fn test_key_value_pairs_keep_duplicates() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("addPatch", "a=1,b=2,a=3".into())]);
    run(&mut opts, &logger);

    assert_eq!(
        opts["addPatch"].as_pairs().unwrap(),
        &[
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "3".to_string()),
        ]
    );
}

// ============================================================================
// Lists and wildcard matchers
// ============================================================================

/// Comma-joined strings split into trimmed lists.
#[test]
fn test_list_splitting() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("disableInstrumentations", "http, mysql ,redis".into())]);
    run(&mut opts, &logger);

    assert_eq!(
        opts["disableInstrumentations"].as_list().unwrap(),
        &["http".to_string(), "mysql".to_string(), "redis".to_string()]
    );
}

/// Wildcard-list options get a derived, compiled matcher list; the source
/// pattern list is kept alongside.
#[test]
fn test_wildcard_matcher_derivation() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("transactionIgnoreUrls", "/health*, *.gif".into())]);
    run(&mut opts, &logger);

    let matchers = opts["transactionIgnoreUrlsMatchers"].as_matchers().unwrap();
    assert_eq!(matchers.len(), 2);
    assert!(matchers[0].matches("/healthcheck"));
    assert!(matchers[1].matches("/static/logo.GIF"));
    assert!(!matchers[0].matches("/api/health"));
    assert!(opts["transactionIgnoreUrls"].as_list().is_some());
}

// ============================================================================
// Enums
// ============================================================================

/// An enum value outside the allowed set falls back with a warning.
#[test]
fn test_enum_fallback() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[
        ("captureBody", "sometimes".into()),
        ("traceContinuationStrategy", "restart".into()),
        ("cloudProvider", "AWS".into()),
    ]);
    run(&mut opts, &logger);

    assert_eq!(opts["captureBody"].as_str(), Some("off"));
    assert_eq!(opts["traceContinuationStrategy"].as_str(), Some("restart"));
    // Matching is case-sensitive.
    assert_eq!(opts["cloudProvider"].as_str(), Some("auto"));
    assert_eq!(logger.warnings().len(), 2);
}

// ============================================================================
// Context manager
// ============================================================================

/// `asyncHooks: false` maps to `contextManager: "patch"`.
#[test]
fn test_async_hooks_false_bridges_to_patch() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("asyncHooks", "false".into())]);
    run(&mut opts, &logger);

    assert_eq!(opts["contextManager"].as_str(), Some("patch"));
    assert_eq!(logger.warnings().len(), 1);
}

/// When both options are given, the deprecated one is dropped.
#[test]
fn test_context_manager_wins_over_async_hooks() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[
        ("asyncHooks", ConfigValue::Bool(false)),
        ("contextManager", "asynclocalstorage".into()),
    ]);
    run(&mut opts, &logger);

    assert_eq!(opts["contextManager"].as_str(), Some("asynclocalstorage"));
    assert!(!opts.contains_key("asyncHooks"));
    assert_eq!(logger.warnings().len(), 1);
}

/// An unrecognized context manager is removed: there is no default.
#[test]
fn test_context_manager_invalid_is_removed() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("contextManager", "fibers".into())]);
    run(&mut opts, &logger);

    assert!(!opts.contains_key("contextManager"));
    assert_eq!(logger.warnings().len(), 1);
}

// ============================================================================
// Histogram boundaries
// ============================================================================

/// Boundaries parse from string form and must be strictly ascending.
#[test]
fn test_histogram_boundaries() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("customMetricsHistogramBoundaries", "1, 5, 10".into())]);
    run(&mut opts, &logger);
    assert_eq!(
        opts["customMetricsHistogramBoundaries"].as_number_list(),
        Some(&[1.0, 5.0, 10.0][..])
    );
    assert!(logger.warnings().is_empty());

    let logger = MockLogger::new();
    let mut opts = opts_of(&[(
        "customMetricsHistogramBoundaries",
        ConfigValue::NumberList(vec![1.0, 1.0, 5.0]),
    )]);
    run(&mut opts, &logger);
    // Falls back to the default boundary list.
    assert_eq!(
        opts["customMetricsHistogramBoundaries"]
            .as_number_list()
            .unwrap()
            .len(),
        51
    );
    assert_eq!(logger.warnings().len(), 1);
}

// ============================================================================
// Span stack trace synthesis
// ============================================================================

/// The synthesis decision table, straight from the compatibility rules.
#[test]
fn test_span_stack_trace_decision_table() {
    // Nothing configured: never collect.
    assert_eq!(span_stack_trace_min_duration(None, None, None), -1.0);
    // The modern option always wins.
    assert_eq!(
        span_stack_trace_min_duration(Some(0.0), Some(false), Some(5.0)),
        0.0
    );
    assert_eq!(span_stack_trace_min_duration(Some(-2.0), None, None), -1.0);
    // captureSpanStackTraces: false disables collection.
    assert_eq!(
        span_stack_trace_min_duration(None, Some(false), Some(5.0)),
        -1.0
    );
    // spanFramesMinDuration: 0 historically meant "never", negative "always".
    assert_eq!(span_stack_trace_min_duration(None, None, Some(0.0)), -1.0);
    assert_eq!(span_stack_trace_min_duration(None, None, Some(-3.0)), 0.0);
    assert_eq!(span_stack_trace_min_duration(None, Some(true), Some(0.55)), 0.55);
    // captureSpanStackTraces: true alone uses the historical threshold.
    assert_eq!(span_stack_trace_min_duration(None, Some(true), None), 0.01);
}

/// The pipeline seeds the synthesized option only when one of the three
/// inputs was configured.
#[test]
fn test_span_stack_trace_synthesis_in_pipeline() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("captureSpanStackTraces", "true".into())]);
    run(&mut opts, &logger);
    assert_eq!(opts["spanStackTraceMinDuration"].as_number(), Some(0.01));

    let mut opts = opts_of(&[("stackTraceLimit", ConfigValue::Number(10.0))]);
    run(&mut opts, &logger);
    assert!(!opts.contains_key("spanStackTraceMinDuration"));
}

// ============================================================================
// URLs
// ============================================================================

/// URLs are stored in normalized serialization; invalid ones are removed.
#[test]
fn test_url_normalization() {
    let logger = MockLogger::new();
    let mut opts = opts_of(&[("serverUrl", "http://collector.example.com:8200".into())]);
    run(&mut opts, &logger);
    assert_eq!(
        opts["serverUrl"].as_str(),
        Some("http://collector.example.com:8200/")
    );

    let mut opts = opts_of(&[("serverUrl", "not a url".into())]);
    run(&mut opts, &logger);
    assert!(!opts.contains_key("serverUrl"));
    assert_eq!(logger.warnings().len(), 1);
}

// ============================================================================
// Pipeline construction
// ============================================================================

/// The standard pass sequence satisfies every dependency edge in the
/// schema.
#[test]
fn test_pipeline_order_is_valid() {
    let schema = Schema::load().unwrap();
    assert!(Pipeline::new(&schema).is_ok());
}
