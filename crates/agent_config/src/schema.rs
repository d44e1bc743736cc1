//! Option schema registry.
//!
//! A static table of option definitions: name, value type, default,
//! environment-variable bindings, central-config wire name, cross-tool
//! display name, intra-schema dependencies, and deprecation markers.
//! Everything else in the engine is driven by this table.
//!
//! The table is validated once when it is built: duplicate names, unknown or
//! forward `depends_on` references, duplicate central-config names, and
//! value types without a registered normalizer are all programming errors
//! and fail fast at startup rather than at first use.

use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::normalize;
use crate::value::{ConfigValue, OptionMap};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Maximum byte length of string fields shipped in intake payloads.
pub const INTAKE_STRING_MAX_SIZE: usize = 1024;

/// Placeholder shown instead of secret values in diagnostic output.
pub const REDACTED: &str = "[REDACTED]";

/// Product-specific prefix carried by every current environment-variable
/// binding except the grandfathered container/orchestration variables.
pub const ENV_PREFIX: &str = "BEACON_APM_";

/// Environment variable naming an explicit configuration file path.
pub const CONFIG_FILE_ENV_VAR: &str = "BEACON_APM_CONFIG_FILE";

/// Default configuration file name, resolved relative to the working
/// directory when neither an explicit path nor the environment override
/// is given.
pub const DEFAULT_CONFIG_FILE: &str = "beacon-agent.toml";

/// Options truncated to [`INTAKE_STRING_MAX_SIZE`] bytes after resolution.
pub const INTAKE_STRING_OPTIONS: &[&str] = &["serviceVersion", "hostname"];

pub const CONTEXT_MANAGER_PATCH: &str = "patch";
pub const CONTEXT_MANAGER_ASYNCHOOKS: &str = "asynchooks";
pub const CONTEXT_MANAGER_ASYNCLOCALSTORAGE: &str = "asynclocalstorage";

pub const TRACE_CONTINUATION_STRATEGY_CONTINUE: &str = "continue";
pub const TRACE_CONTINUATION_STRATEGY_RESTART: &str = "restart";
pub const TRACE_CONTINUATION_STRATEGY_RESTART_EXTERNAL: &str = "restart_external";

/// Time units accepted by duration options. Unit suffixes are
/// case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
}

impl DurationUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            DurationUnit::Microseconds => "us",
            DurationUnit::Milliseconds => "ms",
            DurationUnit::Seconds => "s",
            DurationUnit::Minutes => "m",
        }
    }

    pub fn parse(suffix: &str) -> Option<DurationUnit> {
        match suffix {
            "us" => Some(DurationUnit::Microseconds),
            "ms" => Some(DurationUnit::Milliseconds),
            "s" => Some(DurationUnit::Seconds),
            "m" => Some(DurationUnit::Minutes),
            _ => None,
        }
    }

    /// Scale a value in this unit to seconds.
    pub fn in_seconds(&self, value: f64) -> f64 {
        match self {
            DurationUnit::Microseconds => value / 1e6,
            DurationUnit::Milliseconds => value / 1e3,
            DurationUnit::Seconds => value,
            DurationUnit::Minutes => value * 60.0,
        }
    }
}

/// Unit sets shared by the duration options.
pub const UNITS_MS_S_M: &[DurationUnit] = &[
    DurationUnit::Milliseconds,
    DurationUnit::Seconds,
    DurationUnit::Minutes,
];

pub const UNITS_US_MS_S_M: &[DurationUnit] = &[
    DurationUnit::Microseconds,
    DurationUnit::Milliseconds,
    DurationUnit::Seconds,
    DurationUnit::Minutes,
];

/// The value type tag of an option, driving which normalizer handles it.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
    Bool,
    Number,
    /// A number where `-1` is the "unbounded" sentinel, normalized to
    /// positive infinity.
    NumberOrInfinity,
    /// A byte count with optional `b`/`kb`/`mb`/`gb` suffix.
    ByteSize,
    /// A duration, normalized to a value in seconds.
    Duration {
        default_unit: DurationUnit,
        allowed_units: &'static [DurationUnit],
        allow_negative: bool,
    },
    /// A comma-separated or pre-split list of strings.
    StringList,
    /// A string list that additionally derives a compiled-matcher list
    /// under [`matcher_list_key`].
    WildcardList,
    /// Ordered `key=value` pairs.
    KeyValuePairs,
    /// One of a fixed allowed set, case-sensitive. Always carries a default.
    Enum { allowed: &'static [&'static str] },
    /// A structurally valid URL.
    Url,
    String,
    /// Carried through untouched by the type-directed passes; some opaque
    /// options have a dedicated by-name pass instead.
    Opaque,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Bool => "boolean",
            ValueType::Number => "number",
            ValueType::NumberOrInfinity => "numberOrInfinity",
            ValueType::ByteSize => "byteSize",
            ValueType::Duration { .. } => "durationSeconds",
            ValueType::StringList => "stringList",
            ValueType::WildcardList => "wildcardList",
            ValueType::KeyValuePairs => "keyValuePairs",
            ValueType::Enum { .. } => "enum",
            ValueType::Url => "url",
            ValueType::String => "string",
            ValueType::Opaque => "opaque",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One configuration option. Defined once at process start, never mutated.
#[derive(Debug, Clone)]
pub struct OptionDefinition {
    /// Unique option key, in the cross-agent camelCase spelling used by
    /// start options.
    pub name: &'static str,
    pub value_type: ValueType,
    /// Raw default, in the same shape a source would supply (`"30s"`, not
    /// `30.0`). `None` is semantically distinct from an empty default.
    pub default_value: Option<ConfigValue>,
    /// Bound environment variables, most-preferred last. A deprecated alias
    /// may precede the current name.
    pub env_names: Vec<&'static str>,
    /// Wire name under which a central-config push may address this option.
    pub central_config_name: Option<&'static str>,
    /// Cross-tool snake_case name, shown in the provenance preamble.
    pub cross_tool_name: Option<&'static str>,
    /// Options that must be normalized before this one.
    pub depends_on: Vec<&'static str>,
    /// Deprecation message naming the replacement, if any.
    pub deprecated: Option<&'static str>,
}

impl OptionDefinition {
    fn new(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            value_type,
            default_value: None,
            env_names: Vec::new(),
            central_config_name: None,
            cross_tool_name: None,
            depends_on: Vec::new(),
            deprecated: None,
        }
    }

    fn default_value(mut self, value: impl Into<ConfigValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    fn env(mut self, var: &'static str) -> Self {
        self.env_names.push(var);
        self
    }

    fn central(mut self, wire_name: &'static str) -> Self {
        self.central_config_name = Some(wire_name);
        self.cross_tool_name = Some(wire_name);
        self
    }

    fn cross(mut self, common_name: &'static str) -> Self {
        self.cross_tool_name = Some(common_name);
        self
    }

    fn depends(mut self, deps: &[&'static str]) -> Self {
        self.depends_on.extend_from_slice(deps);
        self
    }

    fn deprecated(mut self, message: &'static str) -> Self {
        self.deprecated = Some(message);
        self
    }
}

/// Key under which a wildcard-list option's compiled matchers are stored.
pub fn matcher_list_key(name: &str) -> String {
    format!("{}Matchers", name)
}

/// Default histogram bucket boundaries for custom metrics: exponential
/// powers-of-2 boundaries, 2^N for N in [-8, -7.5, ..., 16.5, 17], rounded
/// to 6 significant figures.
const HISTOGRAM_BOUNDARIES: &[f64] = &[
    0.00390625, 0.00552427, 0.0078125, 0.0110485, 0.015625, 0.0220971, 0.03125, 0.0441942, 0.0625,
    0.0883883, 0.125, 0.176777, 0.25, 0.353553, 0.5, 0.707107, 1.0, 1.41421, 2.0, 2.82843, 4.0,
    5.65685, 8.0, 11.3137, 16.0, 22.6274, 32.0, 45.2548, 64.0, 90.5097, 128.0, 181.019, 256.0,
    362.039, 512.0, 724.077, 1024.0, 1448.15, 2048.0, 2896.31, 4096.0, 5792.62, 8192.0, 11585.2,
    16384.0, 23170.5, 32768.0, 46341.0, 65536.0, 92681.9, 131072.0,
];

/// Field-name patterns redacted by default, per the shared agent
/// sanitization rules.
const SANITIZE_FIELD_NAMES: &[&str] = &[
    "password",
    "passwd",
    "pwd",
    "secret",
    "*key",
    "*token*",
    "*session*",
    "*credit*",
    "*card*",
    "*auth*",
    "set-cookie",
    "*principal*",
    "pw",
    "pass",
    "connect.sid",
];

const ELASTICSEARCH_CAPTURE_BODY_URLS: &[&str] = &[
    "*/_search",
    "*/_search/template",
    "*/_msearch",
    "*/_msearch/template",
    "*/_async_search",
    "*/_count",
    "*/_sql",
    "*/_eql/search",
];

fn string_list(items: &[&str]) -> ConfigValue {
    ConfigValue::List(items.iter().map(|s| s.to_string()).collect())
}

/// The full option catalogue, in registration order.
///
/// Registration order matters: every `depends_on` entry must name an option
/// registered earlier, which `Schema::from_options` enforces.
fn catalogue() -> Vec<OptionDefinition> {
    use ValueType::*;

    vec![
        OptionDefinition::new(
            "abortedErrorThreshold",
            Duration {
                default_unit: DurationUnit::Seconds,
                allowed_units: UNITS_MS_S_M,
                allow_negative: false,
            },
        )
        .default_value("25s")
        .env("BEACON_APM_ABORTED_ERROR_THRESHOLD"),
        OptionDefinition::new("active", Bool)
            .default_value(true)
            .env("BEACON_APM_ACTIVE"),
        OptionDefinition::new("addPatch", KeyValuePairs).env("BEACON_APM_ADD_PATCH"),
        OptionDefinition::new("apiKey", String)
            .env("BEACON_APM_API_KEY")
            .cross("api_key"),
        OptionDefinition::new("apiRequestSize", ByteSize)
            .default_value("768kb")
            .env("BEACON_APM_API_REQUEST_SIZE"),
        OptionDefinition::new(
            "apiRequestTime",
            Duration {
                default_unit: DurationUnit::Seconds,
                allowed_units: UNITS_MS_S_M,
                allow_negative: false,
            },
        )
        .default_value("10s")
        .env("BEACON_APM_API_REQUEST_TIME"),
        OptionDefinition::new("asyncHooks", Bool)
            .env("BEACON_APM_ASYNC_HOOKS")
            .deprecated("use `contextManager`"),
        OptionDefinition::new("breakdownMetrics", Bool)
            .default_value(true)
            .env("BEACON_APM_BREAKDOWN_METRICS"),
        OptionDefinition::new(
            "captureBody",
            Enum {
                allowed: &["off", "errors", "transactions", "all"],
            },
        )
        .default_value("off")
        .env("BEACON_APM_CAPTURE_BODY")
        .central("capture_body"),
        OptionDefinition::new(
            "captureErrorLogStackTraces",
            Enum {
                allowed: &["never", "messages", "always"],
            },
        )
        .default_value("messages")
        .env("BEACON_APM_CAPTURE_ERROR_LOG_STACK_TRACES"),
        OptionDefinition::new("captureExceptions", Bool)
            .default_value(true)
            .env("BEACON_APM_CAPTURE_EXCEPTIONS"),
        OptionDefinition::new("captureHeaders", Bool)
            .default_value(true)
            .env("BEACON_APM_CAPTURE_HEADERS"),
        OptionDefinition::new("captureSpanStackTraces", Bool)
            .env("BEACON_APM_CAPTURE_SPAN_STACK_TRACES")
            .deprecated("use `spanStackTraceMinDuration`"),
        OptionDefinition::new("centralConfig", Bool)
            .default_value(true)
            .env("BEACON_APM_CENTRAL_CONFIG"),
        OptionDefinition::new(
            "cloudProvider",
            Enum {
                allowed: &["auto", "gcp", "azure", "aws", "none"],
            },
        )
        .default_value("auto")
        .env("BEACON_APM_CLOUD_PROVIDER"),
        OptionDefinition::new("containerId", String).env("BEACON_APM_CONTAINER_ID"),
        // No default: the context-manager normalizer must know whether a
        // value was supplied by the user before bridging `asyncHooks`.
        OptionDefinition::new("contextManager", String)
            .env("BEACON_APM_CONTEXT_MANAGER")
            .depends(&["asyncHooks"]),
        OptionDefinition::new("contextPropagationOnly", Bool)
            .default_value(false)
            .env("BEACON_APM_CONTEXT_PROPAGATION_ONLY"),
        OptionDefinition::new("customMetricsHistogramBoundaries", Opaque)
            .default_value(HISTOGRAM_BOUNDARIES.to_vec())
            .env("BEACON_APM_CUSTOM_METRICS_HISTOGRAM_BOUNDARIES"),
        OptionDefinition::new("disableInstrumentations", StringList)
            .default_value(Vec::<&str>::new())
            .env("BEACON_APM_DISABLE_INSTRUMENTATIONS"),
        OptionDefinition::new("disableMetrics", WildcardList)
            .default_value(Vec::<&str>::new())
            .env("BEACON_APM_DISABLE_METRICS"),
        OptionDefinition::new("disableSend", Bool)
            .default_value(false)
            .env("BEACON_APM_DISABLE_SEND"),
        OptionDefinition::new("elasticsearchCaptureBodyUrls", WildcardList)
            .default_value(string_list(ELASTICSEARCH_CAPTURE_BODY_URLS))
            .env("BEACON_APM_ELASTICSEARCH_CAPTURE_BODY_URLS"),
        OptionDefinition::new("environment", String)
            .default_value("development")
            .env("BEACON_APM_ENVIRONMENT"),
        OptionDefinition::new("errorMessageMaxLength", ByteSize)
            .env("BEACON_APM_ERROR_MESSAGE_MAX_LENGTH"),
        OptionDefinition::new("errorOnAbortedRequests", Bool)
            .default_value(false)
            .env("BEACON_APM_ERROR_ON_ABORTED_REQUESTS"),
        OptionDefinition::new(
            "exitSpanMinDuration",
            Duration {
                default_unit: DurationUnit::Milliseconds,
                allowed_units: UNITS_US_MS_S_M,
                allow_negative: false,
            },
        )
        .default_value("0ms")
        .env("BEACON_APM_EXIT_SPAN_MIN_DURATION")
        .central("exit_span_min_duration"),
        OptionDefinition::new("filterHttpHeaders", Bool)
            .default_value(true)
            .env("BEACON_APM_FILTER_HTTP_HEADERS")
            .deprecated("already covered by `sanitizeFieldNames` defaults"),
        OptionDefinition::new("frameworkName", String).env("BEACON_APM_FRAMEWORK_NAME"),
        OptionDefinition::new("frameworkVersion", String).env("BEACON_APM_FRAMEWORK_VERSION"),
        OptionDefinition::new("globalLabels", KeyValuePairs).env("BEACON_APM_GLOBAL_LABELS"),
        OptionDefinition::new("hostname", String).env("BEACON_APM_HOSTNAME"),
        OptionDefinition::new("ignoreMessageQueues", WildcardList)
            .default_value(Vec::<&str>::new())
            .env("BEACON_IGNORE_MESSAGE_QUEUES")
            .env("BEACON_APM_IGNORE_MESSAGE_QUEUES")
            .central("ignore_message_queues"),
        // Start-options / file only; never bound to the environment.
        OptionDefinition::new("ignoreUrls", WildcardList),
        OptionDefinition::new("ignoreUserAgents", WildcardList),
        OptionDefinition::new("instrument", Bool)
            .default_value(true)
            .env("BEACON_APM_INSTRUMENT"),
        OptionDefinition::new("instrumentIncomingHTTPRequests", Bool)
            .default_value(true)
            .env("BEACON_APM_INSTRUMENT_INCOMING_HTTP_REQUESTS"),
        OptionDefinition::new("kubernetesNamespace", String)
            .env("BEACON_APM_KUBERNETES_NAMESPACE")
            .env("KUBERNETES_NAMESPACE"),
        OptionDefinition::new("kubernetesNodeName", String)
            .env("BEACON_APM_KUBERNETES_NODE_NAME")
            .env("KUBERNETES_NODE_NAME"),
        OptionDefinition::new("kubernetesPodName", String)
            .env("BEACON_APM_KUBERNETES_POD_NAME")
            .env("KUBERNETES_POD_NAME"),
        OptionDefinition::new("kubernetesPodUID", String)
            .env("BEACON_APM_KUBERNETES_POD_UID")
            .env("KUBERNETES_POD_UID"),
        OptionDefinition::new("logLevel", String)
            .default_value("info")
            .env("BEACON_APM_LOG_LEVEL")
            .central("log_level"),
        OptionDefinition::new("logUncaughtExceptions", Bool)
            .default_value(false)
            .env("BEACON_APM_LOG_UNCAUGHT_EXCEPTIONS"),
        OptionDefinition::new("longFieldMaxLength", Number)
            .default_value(10000)
            .env("BEACON_APM_LONG_FIELD_MAX_LENGTH"),
        OptionDefinition::new("maxQueueSize", Number)
            .default_value(1024)
            .env("BEACON_APM_MAX_QUEUE_SIZE"),
        OptionDefinition::new(
            "metricsInterval",
            Duration {
                default_unit: DurationUnit::Seconds,
                allowed_units: UNITS_MS_S_M,
                allow_negative: false,
            },
        )
        .default_value("30s")
        .env("BEACON_APM_METRICS_INTERVAL"),
        OptionDefinition::new("metricsLimit", Number)
            .default_value(1000)
            .env("BEACON_APM_METRICS_LIMIT"),
        OptionDefinition::new("opentelemetryBridgeEnabled", Bool)
            .default_value(false)
            .env("BEACON_APM_OPENTELEMETRY_BRIDGE_ENABLED"),
        OptionDefinition::new("payloadLogFile", String).env("BEACON_APM_PAYLOAD_LOG_FILE"),
        OptionDefinition::new("sanitizeFieldNames", WildcardList)
            .default_value(string_list(SANITIZE_FIELD_NAMES))
            .env("BEACON_SANITIZE_FIELD_NAMES")
            .env("BEACON_APM_SANITIZE_FIELD_NAMES")
            .central("sanitize_field_names"),
        OptionDefinition::new("secretToken", String)
            .env("BEACON_APM_SECRET_TOKEN")
            .cross("secret_token"),
        OptionDefinition::new("serverCaCertFile", String).env("BEACON_APM_SERVER_CA_CERT_FILE"),
        OptionDefinition::new(
            "serverTimeout",
            Duration {
                default_unit: DurationUnit::Seconds,
                allowed_units: UNITS_MS_S_M,
                allow_negative: false,
            },
        )
        .default_value("30s")
        .env("BEACON_APM_SERVER_TIMEOUT"),
        OptionDefinition::new("serverUrl", Url)
            .default_value("http://127.0.0.1:8200")
            .env("BEACON_APM_SERVER_URL")
            .cross("server_url"),
        OptionDefinition::new("serviceName", String)
            .env("BEACON_APM_SERVICE_NAME")
            .cross("service_name"),
        OptionDefinition::new("serviceNodeName", String).env("BEACON_APM_SERVICE_NODE_NAME"),
        OptionDefinition::new("serviceVersion", String)
            .env("BEACON_APM_SERVICE_VERSION")
            .cross("service_version"),
        OptionDefinition::new("sourceLinesErrorAppFrames", Number)
            .default_value(5)
            .env("BEACON_APM_SOURCE_LINES_ERROR_APP_FRAMES"),
        OptionDefinition::new("sourceLinesErrorLibraryFrames", Number)
            .default_value(5)
            .env("BEACON_APM_SOURCE_LINES_ERROR_LIBRARY_FRAMES"),
        OptionDefinition::new("sourceLinesSpanAppFrames", Number)
            .default_value(0)
            .env("BEACON_APM_SOURCE_LINES_SPAN_APP_FRAMES"),
        OptionDefinition::new("sourceLinesSpanLibraryFrames", Number)
            .default_value(0)
            .env("BEACON_APM_SOURCE_LINES_SPAN_LIBRARY_FRAMES"),
        OptionDefinition::new("spanCompressionEnabled", Bool)
            .default_value(true)
            .env("BEACON_APM_SPAN_COMPRESSION_ENABLED"),
        OptionDefinition::new(
            "spanCompressionExactMatchMaxDuration",
            Duration {
                default_unit: DurationUnit::Milliseconds,
                allowed_units: UNITS_MS_S_M,
                allow_negative: false,
            },
        )
        .default_value("50ms")
        .env("BEACON_APM_SPAN_COMPRESSION_EXACT_MATCH_MAX_DURATION"),
        OptionDefinition::new(
            "spanCompressionSameKindMaxDuration",
            Duration {
                default_unit: DurationUnit::Milliseconds,
                allowed_units: UNITS_MS_S_M,
                allow_negative: false,
            },
        )
        .default_value("0ms")
        .env("BEACON_APM_SPAN_COMPRESSION_SAME_KIND_MAX_DURATION"),
        OptionDefinition::new(
            "spanFramesMinDuration",
            Duration {
                default_unit: DurationUnit::Seconds,
                allowed_units: UNITS_MS_S_M,
                allow_negative: true,
            },
        )
        .env("BEACON_APM_SPAN_FRAMES_MIN_DURATION")
        .deprecated("use `spanStackTraceMinDuration`"),
        // No default: the synthesis normalizer must know whether a value
        // was supplied by the user.
        OptionDefinition::new(
            "spanStackTraceMinDuration",
            Duration {
                default_unit: DurationUnit::Milliseconds,
                allowed_units: UNITS_MS_S_M,
                allow_negative: true,
            },
        )
        .env("BEACON_APM_SPAN_STACK_TRACE_MIN_DURATION")
        .central("span_stack_trace_min_duration")
        .depends(&["captureSpanStackTraces", "spanFramesMinDuration"]),
        OptionDefinition::new("stackTraceLimit", Number)
            .default_value(50)
            .env("BEACON_APM_STACK_TRACE_LIMIT"),
        OptionDefinition::new(
            "traceContinuationStrategy",
            Enum {
                allowed: &[
                    TRACE_CONTINUATION_STRATEGY_CONTINUE,
                    TRACE_CONTINUATION_STRATEGY_RESTART,
                    TRACE_CONTINUATION_STRATEGY_RESTART_EXTERNAL,
                ],
            },
        )
        .default_value(TRACE_CONTINUATION_STRATEGY_CONTINUE)
        .env("BEACON_APM_TRACE_CONTINUATION_STRATEGY")
        .central("trace_continuation_strategy"),
        OptionDefinition::new("transactionIgnoreUrls", WildcardList)
            .default_value(Vec::<&str>::new())
            .env("BEACON_APM_TRANSACTION_IGNORE_URLS")
            .central("transaction_ignore_urls"),
        OptionDefinition::new("transactionMaxSpans", NumberOrInfinity)
            .default_value(500)
            .env("BEACON_APM_TRANSACTION_MAX_SPANS")
            .central("transaction_max_spans"),
        OptionDefinition::new("transactionSampleRate", Number)
            .default_value(1.0)
            .env("BEACON_APM_TRANSACTION_SAMPLE_RATE")
            .central("transaction_sample_rate"),
        OptionDefinition::new("useAgentTraceparentHeader", Bool)
            .default_value(true)
            .env("BEACON_APM_USE_AGENT_TRACEPARENT_HEADER"),
        OptionDefinition::new("usePathAsTransactionName", Bool)
            .default_value(false)
            .env("BEACON_APM_USE_PATH_AS_TRANSACTION_NAME"),
        OptionDefinition::new("verifyServerCert", Bool)
            .default_value(true)
            .env("BEACON_APM_VERIFY_SERVER_CERT"),
    ]
}

/// The validated option registry.
#[derive(Debug)]
pub struct Schema {
    options: Vec<OptionDefinition>,
    by_name: HashMap<&'static str, usize>,
    by_central_name: HashMap<&'static str, usize>,
}

impl Schema {
    /// Build and validate the full catalogue.
    pub fn load() -> ConfigurationResult<Schema> {
        Schema::from_options(catalogue())
    }

    fn from_options(options: Vec<OptionDefinition>) -> ConfigurationResult<Schema> {
        let mut by_name = HashMap::new();
        let mut by_central_name = HashMap::new();

        for (index, option) in options.iter().enumerate() {
            if by_name.insert(option.name, index).is_some() {
                return Err(ConfigurationError::DuplicateOptionName {
                    name: option.name.to_string(),
                });
            }

            for dependency in &option.depends_on {
                match by_name.get(dependency) {
                    // `by_name` only holds earlier entries at this point, so
                    // presence implies correct registration order.
                    Some(_) => {}
                    None if options.iter().any(|other| other.name == *dependency) => {
                        return Err(ConfigurationError::ForwardDependency {
                            name: option.name.to_string(),
                            dependency: dependency.to_string(),
                        });
                    }
                    None => {
                        return Err(ConfigurationError::UnknownDependency {
                            name: option.name.to_string(),
                            dependency: dependency.to_string(),
                        });
                    }
                }
            }

            if let Some(central_name) = option.central_config_name {
                if by_central_name.insert(central_name, index).is_some() {
                    return Err(ConfigurationError::DuplicateCentralName {
                        central_name: central_name.to_string(),
                    });
                }
            }

            if !normalize::has_normalizer(&option.value_type) {
                return Err(ConfigurationError::MissingNormalizer {
                    name: option.name.to_string(),
                    value_type: option.value_type.name().to_string(),
                });
            }
        }

        Ok(Schema {
            options,
            by_name,
            by_central_name,
        })
    }

    pub fn lookup(&self, name: &str) -> Option<&OptionDefinition> {
        self.by_name.get(name).map(|&index| &self.options[index])
    }

    /// All option names, in registration order.
    pub fn all_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.options.iter().map(|option| option.name)
    }

    pub fn options(&self) -> &[OptionDefinition] {
        &self.options
    }

    pub fn env_names_for(&self, name: &str) -> &[&'static str] {
        self.lookup(name)
            .map(|option| option.env_names.as_slice())
            .unwrap_or(&[])
    }

    pub fn central_name_for(&self, name: &str) -> Option<&'static str> {
        self.lookup(name).and_then(|option| option.central_config_name)
    }

    /// Reverse lookup: the option a central-config wire name addresses.
    pub fn option_for_central_name(&self, wire_name: &str) -> Option<&OptionDefinition> {
        self.by_central_name
            .get(wire_name)
            .map(|&index| &self.options[index])
    }

    /// The raw defaults map, in source shape (pre-normalization).
    pub fn defaults(&self) -> OptionMap {
        self.options
            .iter()
            .filter_map(|option| {
                option
                    .default_value
                    .clone()
                    .map(|value| (option.name.to_string(), value))
            })
            .collect()
    }

    /// Depth of an option in the dependency graph: 0 for independent
    /// options, one more than the deepest dependency otherwise.
    ///
    /// Registration order is a valid topological order (validated at load),
    /// so ranks can be computed in a single forward pass.
    pub fn dependency_rank(&self, name: &str) -> usize {
        let mut ranks: HashMap<&str, usize> = HashMap::new();
        for option in &self.options {
            let rank = option
                .depends_on
                .iter()
                .map(|dep| ranks.get(dep).copied().unwrap_or(0) + 1)
                .max()
                .unwrap_or(0);
            ranks.insert(option.name, rank);
        }
        ranks.get(name).copied().unwrap_or(0)
    }

    /// Names of all wildcard-list options, which carry derived matcher keys.
    pub fn wildcard_list_names(&self) -> Vec<&'static str> {
        self.options
            .iter()
            .filter(|option| option.value_type == ValueType::WildcardList)
            .map(|option| option.name)
            .collect()
    }
}

/// The process-global schema.
///
/// Schema definition errors are programming errors, so this fails fast on
/// first access rather than surfacing a `Result` to every call site.
pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| Schema::load().expect("configuration schema is invalid"))
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
