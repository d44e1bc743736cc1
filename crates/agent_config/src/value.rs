//! Option value model.
//!
//! Every configuration source produces values in a small tagged union,
//! [`ConfigValue`], and every normalizer rewrites values within it. Sources
//! only ever produce the raw variants (`String`, `Bool`, `Number`, `List`,
//! `Pairs`, `NumberList`); the derived `Matchers` variant exists only after
//! normalization, holding compiled wildcard matchers next to their source
//! string list.
//!
//! Numbers are uniformly `f64`: the infinity sentinel (`transactionMaxSpans`
//! set to `-1`) and the byte-size "not a number" result both need values a
//! plain integer cannot carry.

use crate::wildcard::CompiledMatcher;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// The in-progress and resolved shape of a single option value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<String>),
    Pairs(Vec<(String, String)>),
    NumberList(Vec<f64>),
    Matchers(Vec<CompiledMatcher>),
}

/// A key → value map, as merged from the sources and mutated in place by the
/// normalizer pipeline.
pub type OptionMap = HashMap<String, ConfigValue>;

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_pairs(&self) -> Option<&[(String, String)]> {
        match self {
            ConfigValue::Pairs(pairs) => Some(pairs),
            _ => None,
        }
    }

    pub fn as_number_list(&self) -> Option<&[f64]> {
        match self {
            ConfigValue::NumberList(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_matchers(&self) -> Option<&[CompiledMatcher]> {
        match self {
            ConfigValue::Matchers(matchers) => Some(matchers),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    /// Human-readable form for warning messages, e.g.
    /// `invalid duration value "2x" for "metricsInterval" config option`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Number(n) => write!(f, "{}", n),
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::List(items) => f.write_str(&items.join(",")),
            ConfigValue::Pairs(pairs) => {
                let joined: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                f.write_str(&joined.join(","))
            }
            ConfigValue::NumberList(items) => {
                let joined: Vec<String> = items.iter().map(|n| n.to_string()).collect();
                f.write_str(&joined.join(","))
            }
            ConfigValue::Matchers(matchers) => {
                let joined: Vec<String> = matchers.iter().map(|m| m.to_string()).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Number(n) => serializer.serialize_f64(*n),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::List(items) => items.serialize(serializer),
            ConfigValue::Pairs(pairs) => pairs.serialize(serializer),
            ConfigValue::NumberList(items) => items.serialize(serializer),
            ConfigValue::Matchers(matchers) => {
                let mut seq = serializer.serialize_seq(Some(matchers.len()))?;
                for matcher in matchers {
                    seq.serialize_element(matcher.pattern())?;
                }
                seq.end()
            }
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Number(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Number(value as f64)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<Vec<&str>> for ConfigValue {
    fn from(items: Vec<&str>) -> Self {
        ConfigValue::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(items: Vec<String>) -> Self {
        ConfigValue::List(items)
    }
}

impl From<Vec<(String, String)>> for ConfigValue {
    fn from(pairs: Vec<(String, String)>) -> Self {
        ConfigValue::Pairs(pairs)
    }
}

impl From<Vec<f64>> for ConfigValue {
    fn from(items: Vec<f64>) -> Self {
        ConfigValue::NumberList(items)
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
