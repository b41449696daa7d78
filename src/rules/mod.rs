//! Rule registry subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (configuration phase):
//!     RuleArgs (code or config file)
//!     → registry.rs add_rule (empty pattern dropped, defaults filled)
//!     → ordered Vec<Rule>
//!     → registry.rs add_query_vars (dedup merge)
//!
//! Request time (read-only, shared via Arc):
//!     matched pattern → rule_index_by_pattern → &Rule
//! ```
//!
//! # Design Decisions
//! - Explicit registry object instead of a process-wide static
//! - Registration order is preserved; first matching pattern wins
//! - Duplicate patterns are accepted, never an error
//! - Handlers are a tagged variant, not a runtime type probe

pub mod registry;
pub mod rule;

pub use registry::{QueryVarSet, RuleRegistry};
pub use rule::{
    Access, CallbackError, Controller, Handler, InsertPosition, Redirect, Rule, RuleArgs,
    DEFAULT_QUERY_TEMPLATE,
};
