//! Configuration source collection.
//!
//! Two of the four sources live here: the process environment and the
//! on-disk config file. Start options arrive from the embedding caller and
//! defaults come from the schema; the resolver merges all four.
//!
//! Environment reading is schema-driven: only variables the schema binds
//! are read, and when an option binds several variables (a deprecated alias
//! plus its current name, or a bare orchestrator variable) the bindings are
//! ordered most-preferred last, so a later variable overrides an earlier
//! one.

use crate::logger::ConfigLogger;
use crate::schema::{Schema, CONFIG_FILE_ENV_VAR, DEFAULT_CONFIG_FILE};
use crate::value::{ConfigValue, OptionMap};
use std::path::{Path, PathBuf};

/// Read every schema-bound environment variable into an option map.
///
/// All values come back as strings; the normalizer pipeline gives them
/// their real types later.
pub fn read_environment(schema: &Schema) -> OptionMap {
    let mut opts = OptionMap::new();
    for option in schema.options() {
        for env_name in &option.env_names {
            if let Ok(value) = std::env::var(env_name) {
                opts.insert(option.name.to_string(), ConfigValue::String(value));
            }
        }
    }
    opts
}

/// The outcome of locating and reading the config file.
#[derive(Debug)]
pub struct FileSource {
    /// The path that was read (or attempted), if any was applicable.
    pub resolved_path: Option<PathBuf>,
    /// Parsed options, when the file existed and parsed.
    pub options: Option<OptionMap>,
}

impl FileSource {
    fn empty() -> Self {
        FileSource {
            resolved_path: None,
            options: None,
        }
    }
}

/// Locate and read the config file.
///
/// The path comes from, in order of preference: the `configFile` start
/// option, the `BEACON_APM_CONFIG_FILE` environment variable, the default
/// `beacon-agent.toml` in the working directory. An explicitly named file
/// that is missing or malformed logs an error; the default file is allowed
/// to be absent.
pub fn read_config_file(start_options: &OptionMap, logger: &dyn ConfigLogger) -> FileSource {
    let explicit = start_options
        .get("configFile")
        .and_then(ConfigValue::as_str)
        .map(PathBuf::from)
        .or_else(|| std::env::var(CONFIG_FILE_ENV_VAR).ok().map(PathBuf::from));

    let (path, required) = match explicit {
        Some(path) => (path, true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    if !required && !path.exists() {
        return FileSource::empty();
    }

    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(source) => {
            logger.error(&format!(
                "can't read config file {}: {}",
                path.display(),
                source
            ));
            return FileSource {
                resolved_path: Some(path),
                options: None,
            };
        }
    };

    match parse_config_file(&contents, &path, logger) {
        Some(options) => FileSource {
            resolved_path: Some(path),
            options: Some(options),
        },
        None => FileSource {
            resolved_path: Some(path),
            options: None,
        },
    }
}

fn parse_config_file(
    contents: &str,
    path: &Path,
    logger: &dyn ConfigLogger,
) -> Option<OptionMap> {
    let table: toml::Table = match contents.parse() {
        Ok(table) => table,
        Err(source) => {
            logger.error(&format!(
                "can't parse config file {}: {}",
                path.display(),
                source
            ));
            return None;
        }
    };

    // Unknown keys ride along untouched: the resolver keeps them so an
    // embedding caller can carry its own settings in the same file.
    Some(
        table
            .into_iter()
            .map(|(key, value)| (key, toml_to_value(value)))
            .collect(),
    )
}

/// Map a TOML value onto the option value model, in source shape.
fn toml_to_value(value: toml::Value) -> ConfigValue {
    match value {
        toml::Value::String(s) => ConfigValue::String(s),
        toml::Value::Integer(n) => ConfigValue::Number(n as f64),
        toml::Value::Float(n) => ConfigValue::Number(n),
        toml::Value::Boolean(b) => ConfigValue::Bool(b),
        toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
        toml::Value::Array(items) => {
            if items.iter().all(|item| item.is_str()) {
                ConfigValue::List(
                    items
                        .into_iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect(),
                )
            } else if items.iter().all(|item| item.is_integer() || item.is_float())
            {
                ConfigValue::NumberList(
                    items
                        .into_iter()
                        .filter_map(|item| {
                            item.as_integer()
                                .map(|n| n as f64)
                                .or_else(|| item.as_float())
                        })
                        .collect(),
                )
            } else {
                // Mixed arrays degrade to their display strings.
                ConfigValue::List(items.into_iter().map(|item| item.to_string()).collect())
            }
        }
        // Tables map key-value options (`globalLabels`, `addPatch`).
        toml::Value::Table(table) => ConfigValue::Pairs(
            table
                .into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        toml::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (key, value)
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
#[path = "sources_tests.rs"]
mod tests;
