//! Configuration system error types.
//!
//! Domain-specific errors for schema registration, normalization pipeline
//! construction, and central configuration application.

use thiserror::Error;

/// Configuration system errors.
///
/// Schema errors (`DuplicateOptionName`, `UnknownDependency`,
/// `ForwardDependency`, `MissingNormalizer`, `NormalizationOrder`) are
/// programming errors in the option table itself. They are detected once,
/// when the schema or pipeline is built, and are fatal at process startup.
///
/// Runtime conditions (a malformed option value, an unreadable config file,
/// an unknown central-config key) are *not* represented here: those are
/// recovered locally with a warning and never surface as an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("duplicate option name in schema: {name}")]
    DuplicateOptionName { name: String },

    #[error("option \"{name}\" depends on \"{dependency}\", which is not defined in the schema")]
    UnknownDependency { name: String, dependency: String },

    #[error("option \"{name}\" depends on \"{dependency}\", which is registered later in the schema")]
    ForwardDependency { name: String, dependency: String },

    #[error("no normalizer registered for value type {value_type} (option \"{name}\")")]
    MissingNormalizer { name: String, value_type: String },

    #[error("pipeline normalizes \"{name}\" before its dependency \"{dependency}\"")]
    NormalizationOrder { name: String, dependency: String },

    #[error("duplicate central configuration name in schema: {central_name}")]
    DuplicateCentralName { central_name: String },
}

/// Result type alias for configuration operations.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
