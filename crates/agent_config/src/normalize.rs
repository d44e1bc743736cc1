//! Normalizer pipeline.
//!
//! After the sources are merged, every option value is still in "source
//! shape": durations are strings like `"30s"`, booleans may be the strings
//! `"true"`/`"false"`, lists may be comma-joined strings. The pipeline
//! rewrites the merged map in place into resolved shape, one pass per value
//! family, logging a warning for every value it has to reject or repair.
//!
//! Pass order is load-bearing in three places and validated against the
//! schema's `depends_on` edges when the pipeline is built:
//!
//! * booleans run before the context-manager bridge, which reads the
//!   already-normalized `asyncHooks` flag;
//! * booleans and durations run before span-stack-trace synthesis, which
//!   reads both deprecated inputs;
//! * URL validation runs last, on the final value.
//!
//! Passes only touch keys present in the map, so the same pipeline
//! normalizes both a full merged configuration and the small subset map of
//! a central-config push.

use crate::logger::ConfigLogger;
use crate::schema::{
    matcher_list_key, DurationUnit, Schema, ValueType, CONTEXT_MANAGER_ASYNCHOOKS,
    CONTEXT_MANAGER_ASYNCLOCALSTORAGE, CONTEXT_MANAGER_PATCH,
};
use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::value::{ConfigValue, OptionMap};
use crate::wildcard::CompiledMatcher;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Seconds value meaning "never collect a span stack trace".
pub(crate) const SPAN_STACK_TRACE_NEVER: f64 = -1.0;

/// Seconds value meaning "collect a stack trace for every span".
const SPAN_STACK_TRACE_ALWAYS: f64 = 0.0;

/// Threshold used when only the deprecated `captureSpanStackTraces: true`
/// is given: 10ms, the historical default of `spanFramesMinDuration`.
const SPAN_STACK_TRACE_COMPAT_THRESHOLD: f64 = 0.01;

/// One normalization pass. Each pass owns a value family or a single
/// special-cased option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    KeyValuePairs,
    Numbers,
    InfinitySentinels,
    ByteSizes,
    Lists,
    Durations,
    Booleans,
    WildcardMatchers,
    Enums,
    SampleRate,
    ContextManager,
    HistogramBoundaries,
    SpanStackTraceSynthesis,
    Urls,
}

/// The standard pass sequence.
const DEFAULT_PASSES: &[Pass] = &[
    Pass::KeyValuePairs,
    Pass::Numbers,
    Pass::InfinitySentinels,
    Pass::ByteSizes,
    Pass::Lists,
    Pass::Durations,
    Pass::Booleans,
    Pass::WildcardMatchers,
    Pass::Enums,
    Pass::SampleRate,
    Pass::ContextManager,
    Pass::HistogramBoundaries,
    Pass::SpanStackTraceSynthesis,
    Pass::Urls,
];

/// True when the given value type is handled by some pass (or deliberately
/// carried through untouched). The match is exhaustive so that adding a
/// `ValueType` variant without deciding its normalization fails to compile.
pub fn has_normalizer(value_type: &ValueType) -> bool {
    match value_type {
        ValueType::Bool
        | ValueType::Number
        | ValueType::NumberOrInfinity
        | ValueType::ByteSize
        | ValueType::Duration { .. }
        | ValueType::StringList
        | ValueType::WildcardList
        | ValueType::KeyValuePairs
        | ValueType::Enum { .. }
        | ValueType::Url
        | ValueType::String
        | ValueType::Opaque => true,
    }
}

/// The validated, ordered pass sequence.
pub struct Pipeline {
    passes: Vec<Pass>,
}

impl Pipeline {
    /// Build the standard pipeline, checking its order against the schema's
    /// dependency edges.
    pub fn new(schema: &Schema) -> ConfigurationResult<Pipeline> {
        let passes = DEFAULT_PASSES.to_vec();
        validate_order(&passes, schema)?;
        Ok(Pipeline { passes })
    }

    /// Run every pass over the map, in order. Only keys present in the map
    /// are touched.
    pub fn run(
        &self,
        opts: &mut OptionMap,
        schema: &Schema,
        defaults: &OptionMap,
        logger: &dyn ConfigLogger,
    ) {
        for pass in &self.passes {
            pass.run(opts, schema, defaults, logger);
        }
    }
}

/// Check that every option is finally normalized no earlier than all of its
/// dependencies.
fn validate_order(passes: &[Pass], schema: &Schema) -> ConfigurationResult<()> {
    let mut last_pass: HashMap<&'static str, usize> = HashMap::new();
    for (index, pass) in passes.iter().enumerate() {
        for name in pass.targets(schema) {
            last_pass.insert(name, index);
        }
    }

    for option in schema.options() {
        let own_index = match last_pass.get(option.name) {
            Some(&index) => index,
            None => continue,
        };
        for dependency in &option.depends_on {
            // A dependency no pass touches needs no ordering.
            if let Some(&dep_index) = last_pass.get(*dependency) {
                if dep_index >= own_index {
                    return Err(ConfigurationError::NormalizationOrder {
                        name: option.name.to_string(),
                        dependency: dependency.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn names_of_type(schema: &Schema, pred: impl Fn(&ValueType) -> bool) -> Vec<&'static str> {
    schema
        .options()
        .iter()
        .filter(|option| pred(&option.value_type))
        .map(|option| option.name)
        .collect()
}

impl Pass {
    /// The option names this pass may rewrite, given the schema.
    fn targets(&self, schema: &Schema) -> Vec<&'static str> {
        match self {
            Pass::KeyValuePairs => {
                names_of_type(schema, |t| matches!(t, ValueType::KeyValuePairs))
            }
            Pass::Numbers => names_of_type(schema, |t| {
                matches!(t, ValueType::Number | ValueType::NumberOrInfinity)
            }),
            Pass::InfinitySentinels => {
                names_of_type(schema, |t| matches!(t, ValueType::NumberOrInfinity))
            }
            Pass::ByteSizes => names_of_type(schema, |t| matches!(t, ValueType::ByteSize)),
            Pass::Lists => names_of_type(schema, |t| {
                matches!(t, ValueType::StringList | ValueType::WildcardList)
            }),
            Pass::Durations => names_of_type(schema, |t| matches!(t, ValueType::Duration { .. })),
            Pass::Booleans => names_of_type(schema, |t| matches!(t, ValueType::Bool)),
            Pass::WildcardMatchers => {
                names_of_type(schema, |t| matches!(t, ValueType::WildcardList))
            }
            Pass::Enums => names_of_type(schema, |t| matches!(t, ValueType::Enum { .. })),
            Pass::SampleRate => vec!["transactionSampleRate"],
            Pass::ContextManager => vec!["contextManager"],
            Pass::HistogramBoundaries => vec!["customMetricsHistogramBoundaries"],
            Pass::SpanStackTraceSynthesis => vec!["spanStackTraceMinDuration"],
            Pass::Urls => names_of_type(schema, |t| matches!(t, ValueType::Url)),
        }
    }

    fn run(
        &self,
        opts: &mut OptionMap,
        schema: &Schema,
        defaults: &OptionMap,
        logger: &dyn ConfigLogger,
    ) {
        match self {
            Pass::KeyValuePairs => normalize_key_value_pairs(opts, schema, logger),
            Pass::Numbers => normalize_numbers(opts, schema, defaults, logger),
            Pass::InfinitySentinels => normalize_infinity_sentinels(opts, schema),
            Pass::ByteSizes => normalize_byte_sizes(opts, schema),
            Pass::Lists => normalize_lists(opts, schema),
            Pass::Durations => normalize_durations(opts, schema, defaults, logger),
            Pass::Booleans => normalize_booleans(opts, schema, logger),
            Pass::WildcardMatchers => derive_wildcard_matchers(opts, schema),
            Pass::Enums => normalize_enums(opts, schema, logger),
            Pass::SampleRate => normalize_sample_rate(opts, defaults, logger),
            Pass::ContextManager => normalize_context_manager(opts, logger),
            Pass::HistogramBoundaries => normalize_histogram_boundaries(opts, defaults, logger),
            Pass::SpanStackTraceSynthesis => synthesize_span_stack_trace_min_duration(opts),
            Pass::Urls => normalize_urls(opts, schema, logger),
        }
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Replace an invalid value with the option's raw default when one exists,
/// or drop the key, warning either way.
fn fall_back(
    opts: &mut OptionMap,
    name: &str,
    raw: &ConfigValue,
    defaults: &OptionMap,
    logger: &dyn ConfigLogger,
) {
    match defaults.get(name) {
        Some(default) => {
            logger.warn(&format!(
                "invalid value \"{}\" for \"{}\" config option, falling back to \"{}\"",
                raw, name, default
            ));
            opts.insert(name.to_string(), default.clone());
        }
        None => {
            logger.warn(&format!(
                "invalid value \"{}\" for \"{}\" config option, ignoring it",
                raw, name
            ));
            opts.remove(name);
        }
    }
}

// ============================================================================
// Key-value pairs
// ============================================================================

fn parse_pair(segment: &str) -> Option<(String, String)> {
    let (key, value) = segment.split_once('=')?;
    Some((key.trim().to_string(), value.trim().to_string()))
}

/// Accepts three source shapes: a pre-built pair list, a string list of
/// `key=value` entries, or a single `"a=b,c=d"` string. Order and duplicate
/// keys are preserved. Entries without `=` are silently dropped.
fn normalize_key_value_pairs(opts: &mut OptionMap, schema: &Schema, logger: &dyn ConfigLogger) {
    for name in Pass::KeyValuePairs.targets(schema) {
        let value = match opts.get(name) {
            Some(value) => value.clone(),
            None => continue,
        };
        let pairs = match &value {
            ConfigValue::Pairs(pairs) => Some(pairs.clone()),
            ConfigValue::String(s) => Some(s.split(',').filter_map(parse_pair).collect()),
            ConfigValue::List(items) => {
                Some(items.iter().filter_map(|item| parse_pair(item)).collect())
            }
            _ => None,
        };
        match pairs {
            Some(pairs) => {
                opts.insert(name.to_string(), ConfigValue::Pairs(pairs));
            }
            None => {
                logger.warn(&format!(
                    "invalid key-value value \"{}\" for \"{}\" config option, ignoring it",
                    value, name
                ));
                opts.remove(name);
            }
        }
    }
}

// ============================================================================
// Numbers
// ============================================================================

fn normalize_numbers(
    opts: &mut OptionMap,
    schema: &Schema,
    defaults: &OptionMap,
    logger: &dyn ConfigLogger,
) {
    for name in Pass::Numbers.targets(schema) {
        let value = match opts.get(name) {
            Some(value) => value.clone(),
            None => continue,
        };
        match &value {
            ConfigValue::Number(_) => {}
            ConfigValue::String(s) => match s.trim().parse::<f64>() {
                Ok(parsed) => {
                    opts.insert(name.to_string(), ConfigValue::Number(parsed));
                }
                Err(_) => fall_back(opts, name, &value, defaults, logger),
            },
            _ => fall_back(opts, name, &value, defaults, logger),
        }
    }
}

/// `-1` means "unbounded" for options like `transactionMaxSpans`; downstream
/// consumers compare against a real number, so it becomes positive infinity.
fn normalize_infinity_sentinels(opts: &mut OptionMap, schema: &Schema) {
    for name in Pass::InfinitySentinels.targets(schema) {
        if let Some(ConfigValue::Number(n)) = opts.get(name) {
            if *n == -1.0 {
                opts.insert(name.to_string(), ConfigValue::Number(f64::INFINITY));
            }
        }
    }
}

// ============================================================================
// Byte sizes
// ============================================================================

fn byte_size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(\d+)(b|kb|mb|gb)$").unwrap_or_else(|_| unreachable!())
    })
}

/// Parse a byte-size string: an integer with a `b`/`kb`/`mb`/`gb` suffix
/// (case-insensitive, 1024 multipliers). A bare numeric string is taken as
/// bytes. Anything else parses to NaN, which the caller stores as-is: a
/// byte-size option never falls back to its default.
pub fn parse_byte_size(input: &str) -> f64 {
    match byte_size_pattern().captures(input) {
        Some(captures) => {
            let amount: f64 = match captures[1].parse() {
                Ok(amount) => amount,
                Err(_) => return f64::NAN,
            };
            let multiplier = match captures[2].to_ascii_lowercase().as_str() {
                "b" => 1.0,
                "kb" => 1024.0,
                "mb" => 1024.0 * 1024.0,
                _ => 1024.0 * 1024.0 * 1024.0,
            };
            amount * multiplier
        }
        None => input.trim().parse::<f64>().unwrap_or(f64::NAN),
    }
}

fn normalize_byte_sizes(opts: &mut OptionMap, schema: &Schema) {
    for name in Pass::ByteSizes.targets(schema) {
        if let Some(ConfigValue::String(s)) = opts.get(name) {
            let parsed = parse_byte_size(s);
            opts.insert(name.to_string(), ConfigValue::Number(parsed));
        }
    }
}

// ============================================================================
// Lists
// ============================================================================

/// A comma-joined string becomes a trimmed string list; a pre-split list is
/// kept as-is.
fn normalize_lists(opts: &mut OptionMap, schema: &Schema) {
    for name in Pass::Lists.targets(schema) {
        if let Some(ConfigValue::String(s)) = opts.get(name) {
            let items: Vec<String> = s.split(',').map(|item| item.trim().to_string()).collect();
            opts.insert(name.to_string(), ConfigValue::List(items));
        }
    }
}

// ============================================================================
// Durations
// ============================================================================

/// Outcome of parsing a single duration value.
pub enum DurationParse {
    /// Parsed cleanly, value in seconds.
    Ok(f64),
    /// Parsed, but the unit suffix was missing and the option's default
    /// unit was assumed. Value in seconds.
    MissingUnits(f64),
    Invalid,
}

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(-?\d+)(us|ms|s|m)?$").unwrap_or_else(|_| unreachable!()))
}

/// Parse a duration into seconds.
///
/// String values take an integer amount with an optional unit suffix; the
/// suffix is case-sensitive and must be in `allowed_units`. Decimal amounts
/// are only valid for bare numeric values, not strings. Negative amounts
/// are valid only when `allow_negative` is set.
pub fn seconds_from_duration(
    value: &ConfigValue,
    default_unit: DurationUnit,
    allowed_units: &[DurationUnit],
    allow_negative: bool,
) -> DurationParse {
    let (amount, unit) = match value {
        ConfigValue::Number(n) => (*n, None),
        ConfigValue::String(s) => {
            let captures = match duration_pattern().captures(s.trim()) {
                Some(captures) => captures,
                None => return DurationParse::Invalid,
            };
            let amount: f64 = match captures[1].parse() {
                Ok(amount) => amount,
                Err(_) => return DurationParse::Invalid,
            };
            let unit = match captures.get(2) {
                Some(suffix) => match DurationUnit::parse(suffix.as_str()) {
                    Some(unit) => Some(unit),
                    None => return DurationParse::Invalid,
                },
                None => None,
            };
            (amount, unit)
        }
        _ => return DurationParse::Invalid,
    };

    if amount < 0.0 && !allow_negative {
        return DurationParse::Invalid;
    }

    match unit {
        Some(unit) => {
            if !allowed_units.contains(&unit) {
                return DurationParse::Invalid;
            }
            DurationParse::Ok(unit.in_seconds(amount))
        }
        None => DurationParse::MissingUnits(default_unit.in_seconds(amount)),
    }
}

fn normalize_durations(
    opts: &mut OptionMap,
    schema: &Schema,
    defaults: &OptionMap,
    logger: &dyn ConfigLogger,
) {
    for name in Pass::Durations.targets(schema) {
        let value = match opts.get(name) {
            Some(value) => value.clone(),
            None => continue,
        };
        let (default_unit, allowed_units, allow_negative) = match schema
            .lookup(name)
            .map(|option| &option.value_type)
        {
            Some(ValueType::Duration {
                default_unit,
                allowed_units,
                allow_negative,
            }) => (*default_unit, *allowed_units, *allow_negative),
            _ => continue,
        };

        match seconds_from_duration(&value, default_unit, allowed_units, allow_negative) {
            DurationParse::Ok(seconds) => {
                opts.insert(name.to_string(), ConfigValue::Number(seconds));
            }
            DurationParse::MissingUnits(seconds) => {
                logger.warn(&format!(
                    "units missing in duration value \"{}\" for \"{}\" config option: using default units ({})",
                    value,
                    name,
                    default_unit.suffix()
                ));
                opts.insert(name.to_string(), ConfigValue::Number(seconds));
            }
            DurationParse::Invalid => match defaults.get(name) {
                Some(default) => {
                    logger.warn(&format!(
                        "invalid duration value \"{}\" for \"{}\" config option, falling back to \"{}\"",
                        value, name, default
                    ));
                    let fallback = match seconds_from_duration(
                        default,
                        default_unit,
                        allowed_units,
                        allow_negative,
                    ) {
                        DurationParse::Ok(seconds) | DurationParse::MissingUnits(seconds) => {
                            seconds
                        }
                        // Defaults are authored with units; never reached.
                        DurationParse::Invalid => 0.0,
                    };
                    opts.insert(name.to_string(), ConfigValue::Number(fallback));
                }
                None => {
                    logger.warn(&format!(
                        "invalid duration value \"{}\" for \"{}\" config option, ignoring it",
                        value, name
                    ));
                    opts.remove(name);
                }
            },
        }
    }
}

// ============================================================================
// Booleans
// ============================================================================

/// Only an actual boolean or the exact strings `"true"`/`"false"` count.
/// Anything else unsets the option entirely: it does NOT fall back to the
/// default, so a later `is_some` check sees "not configured".
fn normalize_booleans(opts: &mut OptionMap, schema: &Schema, logger: &dyn ConfigLogger) {
    for name in Pass::Booleans.targets(schema) {
        let value = match opts.get(name) {
            Some(value) => value.clone(),
            None => continue,
        };
        match &value {
            ConfigValue::Bool(_) => {}
            ConfigValue::String(s) if s == "true" => {
                opts.insert(name.to_string(), ConfigValue::Bool(true));
            }
            ConfigValue::String(s) if s == "false" => {
                opts.insert(name.to_string(), ConfigValue::Bool(false));
            }
            _ => {
                logger.warn(&format!(
                    "unrecognized boolean value \"{}\" for \"{}\" config option, ignoring it",
                    value, name
                ));
                opts.remove(name);
            }
        }
    }
}

// ============================================================================
// Wildcard matcher derivation
// ============================================================================

/// For every wildcard-list option present as a string list, compile the
/// patterns and store them under the derived `<name>Matchers` key. The base
/// list is kept alongside for diagnostics.
fn derive_wildcard_matchers(opts: &mut OptionMap, schema: &Schema) {
    for name in Pass::WildcardMatchers.targets(schema) {
        if let Some(ConfigValue::List(items)) = opts.get(name) {
            let matchers: Vec<CompiledMatcher> = items
                .iter()
                .map(|pattern| CompiledMatcher::compile(pattern))
                .collect();
            opts.insert(matcher_list_key(name), ConfigValue::Matchers(matchers));
        }
    }
}

// ============================================================================
// Enums
// ============================================================================

/// A value outside the allowed set falls back to the default, always with a
/// warning. Matching is case-sensitive. Every enum option has a default,
/// which schema loading guarantees stays in the allowed set.
fn normalize_enums(opts: &mut OptionMap, schema: &Schema, logger: &dyn ConfigLogger) {
    for name in Pass::Enums.targets(schema) {
        let value = match opts.get(name) {
            Some(value) => value.clone(),
            None => continue,
        };
        let (allowed, default) = match schema.lookup(name) {
            Some(option) => match (&option.value_type, &option.default_value) {
                (ValueType::Enum { allowed }, Some(default)) => (*allowed, default.clone()),
                _ => continue,
            },
            None => continue,
        };
        let valid = value
            .as_str()
            .map(|s| allowed.contains(&s))
            .unwrap_or(false);
        if !valid {
            logger.warn(&format!(
                "unrecognized value \"{}\" for \"{}\" config option, falling back to \"{}\"",
                value, name, default
            ));
            opts.insert(name.to_string(), default);
        }
    }
}

// ============================================================================
// Sample rate
// ============================================================================

/// Clamp and round `transactionSampleRate`.
///
/// Valid rates are in [0, 1]. A rate is rounded to four decimal places,
/// except that a positive rate below 0.0001 rounds UP to 0.0001 so that a
/// tiny configured rate never silently becomes "never sample". An invalid
/// rate falls back to the default with a single warning; non-numeric
/// strings were already repaired (and warned about) by the numbers pass, so
/// the two paths never double-warn.
fn normalize_sample_rate(opts: &mut OptionMap, defaults: &OptionMap, logger: &dyn ConfigLogger) {
    const NAME: &str = "transactionSampleRate";
    let value = match opts.get(NAME) {
        Some(value) => value.clone(),
        None => return,
    };
    let rate = value.as_number().filter(|n| (0.0..=1.0).contains(n));
    match rate {
        Some(rate) => {
            let rounded = if rate > 0.0 && rate < 0.0001 {
                0.0001
            } else {
                (rate * 10000.0).round() / 10000.0
            };
            opts.insert(NAME.to_string(), ConfigValue::Number(rounded));
        }
        None => fall_back(opts, NAME, &value, defaults, logger),
    }
}

// ============================================================================
// Context manager
// ============================================================================

/// Bridge the deprecated `asyncHooks` flag into `contextManager`, then
/// validate the result.
///
/// * both set: `asyncHooks` is dropped with a warning, `contextManager`
///   wins;
/// * only `asyncHooks: false`: maps to `contextManager: "patch"`;
/// * only `asyncHooks: true`: historical default behavior, nothing to map;
/// * an invalid `contextManager` is removed (there is no default), leaving
///   runtime selection to the tracer.
fn normalize_context_manager(opts: &mut OptionMap, logger: &dyn ConfigLogger) {
    const NAME: &str = "contextManager";
    const DEPRECATED: &str = "asyncHooks";

    if let Some(async_hooks) = opts.get(DEPRECATED).and_then(ConfigValue::as_bool) {
        if opts.contains_key(NAME) {
            logger.warn(&format!(
                "both \"{}\" and \"{}\" config options were provided: ignoring the deprecated \"{}\"",
                NAME, DEPRECATED, DEPRECATED
            ));
            opts.remove(DEPRECATED);
        } else if !async_hooks {
            logger.warn(&format!(
                "the \"{}\" config option is deprecated: use `{}: \"{}\"` instead",
                DEPRECATED, NAME, CONTEXT_MANAGER_PATCH
            ));
            opts.insert(NAME.to_string(), ConfigValue::from(CONTEXT_MANAGER_PATCH));
        } else {
            logger.warn(&format!(
                "the \"{}\" config option is deprecated: `{}: true` is the default behavior",
                DEPRECATED, DEPRECATED
            ));
        }
    }

    if let Some(value) = opts.get(NAME) {
        let valid = value
            .as_str()
            .map(|s| {
                [
                    CONTEXT_MANAGER_PATCH,
                    CONTEXT_MANAGER_ASYNCHOOKS,
                    CONTEXT_MANAGER_ASYNCLOCALSTORAGE,
                ]
                .contains(&s)
            })
            .unwrap_or(false);
        if !valid {
            logger.warn(&format!(
                "unrecognized value \"{}\" for \"{}\" config option, ignoring it",
                value, NAME
            ));
            opts.remove(NAME);
        }
    }
}

// ============================================================================
// Histogram boundaries
// ============================================================================

/// `customMetricsHistogramBoundaries` must be a strictly ascending list of
/// numbers. String forms (`"1,5,10"` or a string list) are parsed first.
/// Any violation falls back to the default boundaries with a warning.
fn normalize_histogram_boundaries(
    opts: &mut OptionMap,
    defaults: &OptionMap,
    logger: &dyn ConfigLogger,
) {
    const NAME: &str = "customMetricsHistogramBoundaries";
    let value = match opts.get(NAME) {
        Some(value) => value.clone(),
        None => return,
    };

    let parsed: Option<Vec<f64>> = match &value {
        ConfigValue::NumberList(items) => Some(items.clone()),
        ConfigValue::String(s) => s
            .split(',')
            .map(|item| item.trim().parse::<f64>().ok())
            .collect(),
        ConfigValue::List(items) => items
            .iter()
            .map(|item| item.trim().parse::<f64>().ok())
            .collect(),
        _ => None,
    };

    let ascending = parsed
        .as_ref()
        .map(|items| items.windows(2).all(|pair| pair[0] < pair[1]))
        .unwrap_or(false);

    match parsed {
        Some(items) if ascending => {
            opts.insert(NAME.to_string(), ConfigValue::NumberList(items));
        }
        _ => fall_back(opts, NAME, &value, defaults, logger),
    }
}

// ============================================================================
// Span stack trace synthesis
// ============================================================================

/// Decide the effective `spanStackTraceMinDuration` from the modern option
/// and its two deprecated ancestors.
///
/// Inputs are the already-normalized values: `modern` and `frames` in
/// seconds, `capture` a plain flag. `None` means "not configured".
pub fn span_stack_trace_min_duration(
    modern: Option<f64>,
    capture: Option<bool>,
    frames: Option<f64>,
) -> f64 {
    if let Some(modern) = modern {
        // Any negative value means "never".
        if modern < 0.0 {
            return SPAN_STACK_TRACE_NEVER;
        }
        return modern;
    }
    if capture == Some(false) {
        return SPAN_STACK_TRACE_NEVER;
    }
    if let Some(frames) = frames {
        if frames == 0.0 {
            return SPAN_STACK_TRACE_NEVER;
        }
        if frames < 0.0 {
            return SPAN_STACK_TRACE_ALWAYS;
        }
        return frames;
    }
    if capture == Some(true) {
        return SPAN_STACK_TRACE_COMPAT_THRESHOLD;
    }
    SPAN_STACK_TRACE_NEVER
}

fn synthesize_span_stack_trace_min_duration(opts: &mut OptionMap) {
    const NAME: &str = "spanStackTraceMinDuration";
    let modern = opts.get(NAME).and_then(ConfigValue::as_number);
    let capture = opts
        .get("captureSpanStackTraces")
        .and_then(ConfigValue::as_bool);
    let frames = opts
        .get("spanFramesMinDuration")
        .and_then(ConfigValue::as_number);

    // When none of the three were configured, leave the option unset so a
    // central-config subset map is not polluted with a synthesized key.
    if modern.is_none() && capture.is_none() && frames.is_none() {
        return;
    }

    let effective = span_stack_trace_min_duration(modern, capture, frames);
    opts.insert(NAME.to_string(), ConfigValue::Number(effective));
}

// ============================================================================
// URLs
// ============================================================================

/// Validate URL-typed options, storing the normalized serialization (which
/// includes a trailing slash on a bare authority). Runs last so it sees the
/// final value. An unparseable URL is removed with a warning.
fn normalize_urls(opts: &mut OptionMap, schema: &Schema, logger: &dyn ConfigLogger) {
    for name in Pass::Urls.targets(schema) {
        let value = match opts.get(name) {
            Some(value) => value.clone(),
            None => continue,
        };
        let normalized = value.as_str().and_then(|s| url::Url::parse(s).ok());
        match normalized {
            Some(parsed) => {
                opts.insert(name.to_string(), ConfigValue::String(parsed.to_string()));
            }
            None => {
                logger.warn(&format!(
                    "invalid URL value \"{}\" for \"{}\" config option, ignoring it",
                    value, name
                ));
                opts.remove(name);
            }
        }
    }
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
