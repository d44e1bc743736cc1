//! Tests for the option value model.

use super::*;
use crate::wildcard::CompiledMatcher;

/// Verify the typed accessors only answer for their own variant.
#[test]
fn test_typed_accessors() {
    let value = ConfigValue::Bool(true);
    assert_eq!(value.as_bool(), Some(true));
    assert_eq!(value.as_number(), None);
    assert_eq!(value.as_str(), None);

    let value = ConfigValue::Number(1.5);
    assert_eq!(value.as_number(), Some(1.5));
    assert_eq!(value.as_bool(), None);

    let value = ConfigValue::from(vec!["a", "b"]);
    assert_eq!(value.as_list(), Some(&["a".to_string(), "b".to_string()][..]));
}

/// Verify display output is what warning messages interpolate.
#[test]
fn test_display_forms() {
    assert_eq!(ConfigValue::Bool(false).to_string(), "false");
    assert_eq!(ConfigValue::Number(2.0).to_string(), "2");
    assert_eq!(ConfigValue::from("30s").to_string(), "30s");
    assert_eq!(ConfigValue::from(vec!["a", "b"]).to_string(), "a,b");
    assert_eq!(
        ConfigValue::Pairs(vec![("k".into(), "v".into())]).to_string(),
        "k=v"
    );
}

/// Verify matcher lists serialize as their source patterns.
#[test]
fn test_matchers_serialize_as_patterns() {
    let value = ConfigValue::Matchers(vec![
        CompiledMatcher::compile("*foo"),
        CompiledMatcher::compile("bar*"),
    ]);
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(json, serde_json::json!(["*foo", "bar*"]));
}

/// Verify numbers serialize as JSON numbers.
#[test]
fn test_number_serialization() {
    let json = serde_json::to_value(ConfigValue::Number(768.0 * 1024.0)).unwrap();
    assert_eq!(json, serde_json::json!(786432.0));
}
