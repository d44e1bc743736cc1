//! Layered configuration resolution.
//!
//! The resolver merges the four sources in precedence order (defaults, then
//! the config file, then start options, then the environment, later wins),
//! runs the normalizer pipeline over the merged map, applies the handful of
//! cross-option rules that need the full picture, and records provenance
//! for every resolved key.
//!
//! Resolution never fails on bad input: every malformed value is repaired
//! or dropped with a warning. The only fallible step is construction, which
//! validates the pipeline against the schema.

use crate::errors::ConfigurationResult;
use crate::logger::{ConfigLogger, LogLevel};
use crate::normalize::Pipeline;
use crate::preamble::{build_preamble, Preamble};
use crate::schema::{
    matcher_list_key, Schema, INTAKE_STRING_MAX_SIZE, INTAKE_STRING_OPTIONS,
};
use crate::sources::{read_config_file, read_environment};
use crate::value::{ConfigValue, OptionMap};
use crate::wildcard::CompiledMatcher;
use regex::Regex;
use std::sync::OnceLock;

/// Deprecated options that get a per-source warning at resolution time.
///
/// `asyncHooks` is absent: the context-manager bridge emits its own, more
/// specific guidance.
const DEPRECATION_WARNED_AT_RESOLVE: &[&str] = &[
    "filterHttpHeaders",
    "captureSpanStackTraces",
    "spanFramesMinDuration",
];

fn service_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9 _-]+$").unwrap_or_else(|_| unreachable!()))
}

/// The resolved configuration map behind typed accessors.
///
/// Untyped access via [`get`](ResolvedConfig::get) is always available;
/// the typed accessors cover the options the agent runtime reads on hot
/// paths.
#[derive(Debug, Default)]
pub struct ResolvedConfig {
    values: OptionMap,
}

impl ResolvedConfig {
    /// A default-only configuration: schema defaults normalized, matcher
    /// lists seeded. The agent uses this between process start and the
    /// first full [`Resolver::resolve`].
    pub fn initial(
        schema: &Schema,
        logger: &dyn ConfigLogger,
    ) -> ConfigurationResult<ResolvedConfig> {
        let pipeline = Pipeline::new(schema)?;
        let defaults = schema.defaults();
        let mut values = defaults.clone();
        for name in schema.wildcard_list_names() {
            values
                .entry(matcher_list_key(name))
                .or_insert_with(|| ConfigValue::Matchers(Vec::new()));
        }
        pipeline.run(&mut values, schema, &defaults, logger);
        seed_span_stack_trace_min_duration(&mut values);
        Ok(ResolvedConfig { values })
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.values.get(name)
    }

    pub fn values(&self) -> &OptionMap {
        &self.values
    }

    /// Mutable access for the central-config applier.
    pub(crate) fn values_mut(&mut self) -> &mut OptionMap {
        &mut self.values
    }

    fn bool_or(&self, name: &str, fallback: bool) -> bool {
        self.values
            .get(name)
            .and_then(ConfigValue::as_bool)
            .unwrap_or(fallback)
    }

    fn number_or(&self, name: &str, fallback: f64) -> f64 {
        self.values
            .get(name)
            .and_then(ConfigValue::as_number)
            .unwrap_or(fallback)
    }

    pub fn active(&self) -> bool {
        self.bool_or("active", true)
    }

    pub fn service_name(&self) -> Option<&str> {
        self.values.get("serviceName").and_then(ConfigValue::as_str)
    }

    pub fn environment(&self) -> Option<&str> {
        self.values.get("environment").and_then(ConfigValue::as_str)
    }

    pub fn server_url(&self) -> Option<&str> {
        self.values.get("serverUrl").and_then(ConfigValue::as_str)
    }

    pub fn log_level(&self) -> LogLevel {
        self.values
            .get("logLevel")
            .and_then(ConfigValue::as_str)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(LogLevel::Info)
    }

    pub fn capture_body(&self) -> &str {
        self.values
            .get("captureBody")
            .and_then(ConfigValue::as_str)
            .unwrap_or("off")
    }

    pub fn transaction_sample_rate(&self) -> f64 {
        self.number_or("transactionSampleRate", 1.0)
    }

    pub fn transaction_max_spans(&self) -> f64 {
        self.number_or("transactionMaxSpans", 500.0)
    }

    pub fn span_stack_trace_min_duration(&self) -> f64 {
        self.number_or("spanStackTraceMinDuration", -1.0)
    }

    pub fn breakdown_metrics(&self) -> bool {
        self.bool_or("breakdownMetrics", true)
    }

    /// The compiled matchers derived from a wildcard-list option. Always
    /// present (possibly empty) after resolution.
    pub fn matchers(&self, name: &str) -> &[CompiledMatcher] {
        self.values
            .get(&matcher_list_key(name))
            .and_then(ConfigValue::as_matchers)
            .unwrap_or(&[])
    }
}

/// A resolved configuration plus its provenance.
#[derive(Debug)]
pub struct Resolution {
    pub config: ResolvedConfig,
    pub preamble: Preamble,
}

/// Merges, normalizes, and annotates configuration.
pub struct Resolver<'s> {
    schema: &'s Schema,
    pipeline: Pipeline,
}

impl<'s> Resolver<'s> {
    pub fn new(schema: &'s Schema) -> ConfigurationResult<Self> {
        let pipeline = Pipeline::new(schema)?;
        Ok(Resolver { schema, pipeline })
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Resolve configuration from all four sources.
    ///
    /// `start_options` are the options the embedding caller passed at
    /// startup, already in source shape. Unknown keys from start options
    /// and the config file are carried through untouched.
    pub fn resolve(&self, start_options: OptionMap, logger: &dyn ConfigLogger) -> Resolution {
        let environment = read_environment(self.schema);
        let file = read_config_file(&start_options, logger);
        let defaults = self.schema.defaults();

        let mut merged = defaults.clone();
        if let Some(file_options) = &file.options {
            merged.extend(file_options.clone());
        }
        merged.extend(start_options.clone());
        merged.extend(environment.clone());

        self.warn_deprecated(&file.options, &start_options, &environment, logger);

        // Every wildcard-list option resolves to a matcher list, even when
        // the base option was never configured.
        for name in self.schema.wildcard_list_names() {
            merged
                .entry(matcher_list_key(name))
                .or_insert_with(|| ConfigValue::Matchers(Vec::new()));
        }

        self.pipeline.run(&mut merged, self.schema, &defaults, logger);
        seed_span_stack_trace_min_duration(&mut merged);

        validate_service_name(&mut merged, logger);
        disable_breakdown_metrics_when_idle(&mut merged);
        truncate_intake_strings(&mut merged);

        if !logger.is_custom() {
            if let Some(level) = merged
                .get("logLevel")
                .and_then(ConfigValue::as_str)
                .and_then(|raw| raw.parse::<LogLevel>().ok())
            {
                logger.set_level(level);
            }
        }

        let preamble = build_preamble(self.schema, &merged, &environment, &start_options, &file);
        logger.info(&format!("agent configuration: {}", preamble.to_json()));

        Resolution {
            config: ResolvedConfig { values: merged },
            preamble,
        }
    }

    /// Warn once per source for each supplied deprecated option.
    fn warn_deprecated(
        &self,
        file_options: &Option<OptionMap>,
        start_options: &OptionMap,
        environment: &OptionMap,
        logger: &dyn ConfigLogger,
    ) {
        let empty = OptionMap::new();
        let sources = [
            ("config file", file_options.as_ref().unwrap_or(&empty)),
            ("start options", start_options),
            ("environment", environment),
        ];
        for name in DEPRECATION_WARNED_AT_RESOLVE {
            let message = match self.schema.lookup(name).and_then(|option| option.deprecated) {
                Some(message) => message,
                None => continue,
            };
            for (source_name, source) in &sources {
                if source.contains_key(*name) {
                    logger.warn(&format!(
                        "the \"{}\" config option (set via {}) is deprecated: {}",
                        name, source_name, message
                    ));
                }
            }
        }
    }
}

/// `spanStackTraceMinDuration` is synthesized from its legacy inputs only
/// when at least one of them was configured; a full resolution still has
/// to end with the key present. Seed "never" (-1) when nothing set it.
fn seed_span_stack_trace_min_duration(opts: &mut OptionMap) {
    opts.entry("spanStackTraceMinDuration".to_string())
        .or_insert(ConfigValue::Number(crate::normalize::SPAN_STACK_TRACE_NEVER));
}

/// A service name is restricted to the character set every downstream
/// system accepts. An invalid name is dropped with a warning rather than
/// mangled.
fn validate_service_name(opts: &mut OptionMap, logger: &dyn ConfigLogger) {
    if let Some(name) = opts.get("serviceName").and_then(ConfigValue::as_str) {
        if !service_name_pattern().is_match(name) {
            logger.warn(&format!(
                "serviceName \"{}\" is invalid: contains characters outside [a-zA-Z0-9 _-], ignoring it",
                name
            ));
            opts.remove("serviceName");
        }
    }
}

/// `metricsInterval: 0` disables metrics reporting, and breakdown metrics
/// cannot be computed without it.
fn disable_breakdown_metrics_when_idle(opts: &mut OptionMap) {
    if opts.get("metricsInterval").and_then(ConfigValue::as_number) == Some(0.0) {
        opts.insert("breakdownMetrics".to_string(), ConfigValue::Bool(false));
    }
}

/// Intake string fields are truncated to the wire limit, on a character
/// boundary.
fn truncate_intake_strings(opts: &mut OptionMap) {
    for name in INTAKE_STRING_OPTIONS {
        if let Some(ConfigValue::String(value)) = opts.get(*name) {
            if value.len() > INTAKE_STRING_MAX_SIZE {
                let mut end = INTAKE_STRING_MAX_SIZE;
                while !value.is_char_boundary(end) {
                    end -= 1;
                }
                let truncated = value[..end].to_string();
                opts.insert(name.to_string(), ConfigValue::String(truncated));
            }
        }
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
