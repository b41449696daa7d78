//! Regex rewrite rules with access-gated dispatch.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod rules;
pub mod security;

pub use config::AppConfig;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RewriteTable;
pub use rules::{RuleArgs, RuleRegistry};
