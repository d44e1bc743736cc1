//! Layered configuration resolution and live reconfiguration for the
//! Beacon APM agent.
//!
//! The engine resolves agent configuration from four layered sources
//! (schema defaults, a TOML config file, caller start options, and the
//! process environment), normalizes every value through a typed pipeline,
//! and records provenance for each resolved key. After startup, pushes
//! from the central control plane can reconfigure a subset of options on
//! the live configuration without a restart.
//!
//! # Architecture
//!
//! - [`schema`]: the static option registry (names, types, defaults,
//!   environment bindings, central-config wire names, dependencies),
//!   validated once at load.
//! - [`sources`]: schema-driven environment reading and config file
//!   loading.
//! - [`normalize`]: the ordered normalizer pipeline that turns source
//!   shape (strings, mostly) into resolved shape, repairing or dropping
//!   bad values with warnings.
//! - [`wildcard`]: the glob-like pattern compiler behind the
//!   wildcard-list options.
//! - [`resolver`]: merging, cross-option rules, and the resolution entry
//!   point.
//! - [`preamble`]: provenance ("where did this value come from"),
//!   redacted and logged at startup.
//! - [`central`]: application of central-config pushes to a live
//!   configuration.
//!
//! # Examples
//!
//! ```rust
//! use agent_config::{OptionMap, Resolver, Schema, TracingLogger};
//!
//! # fn main() -> Result<(), agent_config::ConfigurationError> {
//! let schema = Schema::load()?;
//! let resolver = Resolver::new(&schema)?;
//! let logger = TracingLogger::default();
//!
//! let mut start_options = OptionMap::new();
//! start_options.insert("serviceName".to_string(), "checkout".into());
//!
//! let resolution = resolver.resolve(start_options, &logger);
//! assert_eq!(resolution.config.service_name(), Some("checkout"));
//! # Ok(())
//! # }
//! ```

pub mod central;
pub mod errors;
pub mod logger;
pub mod normalize;
pub mod preamble;
pub mod resolver;
pub mod schema;
pub mod sources;
pub mod value;
pub mod wildcard;

#[cfg(test)]
pub(crate) mod test_support;

pub use central::CentralConfigApplier;
pub use errors::{ConfigurationError, ConfigurationResult};
pub use logger::{ConfigLogger, LogLevel, TracingLogger};
pub use normalize::Pipeline;
pub use preamble::{Preamble, PreambleEntry, SourceKind};
pub use resolver::{Resolution, ResolvedConfig, Resolver};
pub use schema::{schema, OptionDefinition, Schema, ValueType};
pub use sources::{read_config_file, read_environment, FileSource};
pub use value::{ConfigValue, OptionMap};
pub use wildcard::CompiledMatcher;
