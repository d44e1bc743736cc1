//! Tests for configuration error types.

use super::*;

/// Verify error messages name the offending option.
#[test]
fn test_duplicate_option_name_display() {
    let err = ConfigurationError::DuplicateOptionName {
        name: "logLevel".to_string(),
    };
    assert_eq!(err.to_string(), "duplicate option name in schema: logLevel");
}

/// Verify dependency errors name both sides of the edge.
#[test]
fn test_forward_dependency_display() {
    let err = ConfigurationError::ForwardDependency {
        name: "contextManager".to_string(),
        dependency: "asyncHooks".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("contextManager"));
    assert!(msg.contains("asyncHooks"));
}

/// Verify errors can be compared, which the schema tests rely on.
#[test]
fn test_errors_are_comparable() {
    let a = ConfigurationError::MissingNormalizer {
        name: "foo".to_string(),
        value_type: "opaque".to_string(),
    };
    let b = a.clone();
    assert_eq!(a, b);
}
