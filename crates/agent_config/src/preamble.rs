//! Resolution provenance ("preamble").
//!
//! Alongside the resolved configuration, the resolver records where every
//! value came from: which source won, what raw value that source supplied,
//! and (for file-sourced values) which file. The preamble is what the agent
//! logs at startup and what support asks for first, so secrets are redacted
//! before they ever reach it.
//!
//! The preamble is a snapshot of startup resolution. Central-config pushes
//! deliberately do not rewrite it.

use crate::schema::{matcher_list_key, Schema, REDACTED};
use crate::sources::FileSource;
use crate::value::{ConfigValue, OptionMap};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Options whose values never appear in diagnostics.
const SECRET_OPTIONS: &[&str] = &["apiKey", "secretToken"];

/// Which source supplied the winning value for an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Environment,
    Start,
    File,
    Default,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Environment => "environment",
            SourceKind::Start => "start",
            SourceKind::File => "file",
            SourceKind::Default => "default",
        };
        f.write_str(name)
    }
}

/// Provenance for one resolved option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreambleEntry {
    pub source: SourceKind,
    /// The resolved (normalized, redacted) value.
    pub value: ConfigValue,
    /// The raw value the winning source supplied, present only when it
    /// differs from the resolved value.
    #[serde(rename = "sourceValue", skip_serializing_if = "Option::is_none")]
    pub source_value: Option<ConfigValue>,
    /// The cross-tool name of this option, when one exists.
    #[serde(rename = "commonName", skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    /// The config file path, for file-sourced values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Provenance for the whole resolved configuration, keyed by option name.
///
/// Sorted by key so the logged form is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preamble {
    entries: BTreeMap<String, PreambleEntry>,
}

impl Preamble {
    pub fn get(&self, name: &str) -> Option<&PreambleEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PreambleEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The JSON form the resolver logs at startup.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.entries).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for Preamble {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// Redact a value that may carry credentials.
///
/// Secret options are replaced wholesale; URL values only lose their
/// userinfo component.
fn redact(name: &str, value: &ConfigValue) -> ConfigValue {
    if SECRET_OPTIONS.contains(&name) {
        return ConfigValue::String(REDACTED.to_string());
    }
    if name == "serverUrl" {
        if let Some(raw) = value.as_str() {
            if let Ok(mut url) = url::Url::parse(raw) {
                if !url.username().is_empty() || url.password().is_some() {
                    let _ = url.set_username(REDACTED);
                    let _ = url.set_password(None);
                    return ConfigValue::String(url.to_string());
                }
            }
        }
    }
    value.clone()
}

/// Build the preamble by replaying source precedence over the resolved map.
///
/// Derived matcher keys are implementation detail and carry no provenance
/// of their own; they are skipped.
pub fn build_preamble(
    schema: &Schema,
    resolved: &OptionMap,
    environment: &OptionMap,
    start_options: &OptionMap,
    file: &FileSource,
) -> Preamble {
    let derived: HashSet<String> = schema
        .wildcard_list_names()
        .into_iter()
        .map(matcher_list_key)
        .collect();
    let file_path = file
        .resolved_path
        .as_ref()
        .map(|path| path.display().to_string());
    let empty = OptionMap::new();
    let file_options = file.options.as_ref().unwrap_or(&empty);

    let mut entries = BTreeMap::new();
    for (name, value) in resolved {
        if derived.contains(name) {
            continue;
        }

        let (source, raw) = if let Some(raw) = environment.get(name) {
            (SourceKind::Environment, Some(raw))
        } else if let Some(raw) = start_options.get(name) {
            (SourceKind::Start, Some(raw))
        } else if let Some(raw) = file_options.get(name) {
            (SourceKind::File, Some(raw))
        } else {
            (SourceKind::Default, None)
        };

        let resolved_value = redact(name, value);
        let source_value = raw
            .filter(|raw| *raw != value)
            .map(|raw| redact(name, raw));

        entries.insert(
            name.clone(),
            PreambleEntry {
                source,
                value: resolved_value,
                source_value,
                common_name: schema
                    .lookup(name)
                    .and_then(|option| option.cross_tool_name)
                    .map(str::to_string),
                file: if source == SourceKind::File {
                    file_path.clone()
                } else {
                    None
                },
            },
        );
    }

    Preamble { entries }
}

#[cfg(test)]
#[path = "preamble_tests.rs"]
mod tests;
