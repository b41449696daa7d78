//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Populate registry → Compile rewrite table → Bind
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger() → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The registry is complete before the first request is served

pub mod shutdown;
pub mod startup;

pub use shutdown::{wait_for_shutdown, Shutdown};
pub use startup::registry_from_config;
