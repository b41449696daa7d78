//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → lifecycle::startup builds the RuleRegistry from it
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; rules never change while serving
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AccessPolicy, AppConfig, AuthConfig, ListenerConfig, ObservabilityConfig, QueryVarConfig,
    RuleConfig, TemplateConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
