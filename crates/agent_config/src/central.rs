//! Central configuration application.
//!
//! The control plane pushes a flat JSON object of snake_case option names.
//! The applier translates those wire names through the schema, normalizes
//! the resulting subset map with the same pipeline used at startup, and
//! copies the surviving keys into the live configuration.
//!
//! A push must never take the agent down: the whole application is wrapped
//! so that any internal failure is logged (with the offending payload
//! attached) and swallowed. Unknown wire names are reported in a single
//! batched warning. The startup preamble is deliberately left untouched;
//! it documents startup resolution only.

use crate::logger::{ConfigLogger, LogLevel};
use crate::normalize::Pipeline;
use crate::schema::Schema;
use crate::value::{ConfigValue, OptionMap};
use crate::errors::ConfigurationResult;
use crate::resolver::ResolvedConfig;
use thiserror::Error;

/// Internal failures of a single apply. Never surfaces past [`apply`].
#[derive(Error, Debug)]
enum ApplyError {
    #[error("unsupported value shape for central config key \"{key}\"")]
    UnsupportedValue { key: String },
}

/// Applies central-config pushes to a live configuration.
pub struct CentralConfigApplier<'s> {
    schema: &'s Schema,
    pipeline: Pipeline,
}

impl<'s> CentralConfigApplier<'s> {
    pub fn new(schema: &'s Schema) -> ConfigurationResult<Self> {
        let pipeline = Pipeline::new(schema)?;
        Ok(CentralConfigApplier { schema, pipeline })
    }

    /// Apply one pushed payload. Infallible by contract: internal errors
    /// are logged together with the payload and swallowed.
    pub fn apply(
        &self,
        remote: &serde_json::Map<String, serde_json::Value>,
        config: &mut ResolvedConfig,
        logger: &dyn ConfigLogger,
    ) {
        if let Err(error) = self.try_apply(remote, config, logger) {
            let payload =
                serde_json::to_string(remote).unwrap_or_else(|_| "<unserializable>".to_string());
            logger.error(&format!(
                "central config change failed: {} (remote config: {})",
                error, payload
            ));
        }
    }

    fn try_apply(
        &self,
        remote: &serde_json::Map<String, serde_json::Value>,
        config: &mut ResolvedConfig,
        logger: &dyn ConfigLogger,
    ) -> Result<(), ApplyError> {
        let mut subset = OptionMap::new();
        let mut unknown: Vec<&str> = Vec::new();

        for (wire_name, value) in remote {
            match self.schema.option_for_central_name(wire_name) {
                Some(option) => {
                    let value = json_to_value(wire_name, value)?;
                    subset.insert(option.name.to_string(), value);
                }
                None => unknown.push(wire_name),
            }
        }

        if !unknown.is_empty() {
            unknown.sort_unstable();
            logger.warn(&format!(
                "central config contains unsupported option keys, ignoring them: {}",
                unknown.join(", ")
            ));
        }

        if subset.is_empty() {
            return Ok(());
        }

        let defaults = self.schema.defaults();
        self.pipeline.run(&mut subset, self.schema, &defaults, logger);

        for (name, value) in subset {
            logger.info(&format!(
                "central config change: \"{}\" set to {}",
                name, value
            ));
            if name == "logLevel" {
                self.update_log_level(&value, logger);
            }
            config.values_mut().insert(name, value);
        }

        Ok(())
    }

    /// A pushed log level takes effect immediately, but only on the
    /// agent-owned logger. A caller-supplied logger keeps its own level.
    fn update_log_level(&self, value: &ConfigValue, logger: &dyn ConfigLogger) {
        if logger.is_custom() {
            return;
        }
        if let Some(level) = value.as_str().and_then(|raw| raw.parse::<LogLevel>().ok()) {
            logger.set_level(level);
            logger.info(&format!("logger level set to \"{}\" by central config", level));
        }
    }
}

/// Map a JSON wire value onto source shape. The control plane sends
/// strings for everything today; booleans, numbers, and string arrays are
/// accepted for forward compatibility.
fn json_to_value(key: &str, value: &serde_json::Value) -> Result<ConfigValue, ApplyError> {
    match value {
        serde_json::Value::String(s) => Ok(ConfigValue::String(s.clone())),
        serde_json::Value::Bool(b) => Ok(ConfigValue::Bool(*b)),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(n) => Ok(ConfigValue::Number(n)),
            None => Err(ApplyError::UnsupportedValue {
                key: key.to_string(),
            }),
        },
        serde_json::Value::Array(items) => {
            let strings: Option<Vec<String>> = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect();
            match strings {
                Some(strings) => Ok(ConfigValue::List(strings)),
                None => Err(ApplyError::UnsupportedValue {
                    key: key.to_string(),
                }),
            }
        }
        _ => Err(ApplyError::UnsupportedValue {
            key: key.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "central_tests.rs"]
mod tests;
