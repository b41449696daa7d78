//! Rewrite subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query string)
//!     → router.rs (ordered regex scan)
//!     → matcher.rs (expand query template from captures)
//!     → recognized query var filter
//!     → Return: RewriteMatch or no match
//!
//! Table Compilation (at startup):
//!     RuleRegistry
//!     → Top rules, then Bottom rules
//!     → Compile regexes, parse query templates
//!     → Freeze as immutable RewriteTable
//! ```
//!
//! # Design Decisions
//! - Table compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same rule
//! - First match wins (ordered by insertion position, then registration)

pub mod matcher;
pub mod router;

pub use matcher::QueryTemplate;
pub use router::{CompiledRule, RewriteMatch, RewriteTable};
