//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn declarative config into a populated rule registry
//! - Leave room for code-registered rules before the registry is frozen
//!
//! # Design Decisions
//! - Config rules are registered in file order, before any code rules
//! - The registry is frozen into an `Arc` only when the server starts

use crate::config::AppConfig;
use crate::rules::RuleRegistry;

/// Build a registry holding every rule and query var the config declares.
pub fn registry_from_config(config: &AppConfig) -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    for rule in &config.rules {
        registry.add_rule(rule.to_rule_args());
    }
    registry.add_query_vars(config.query_vars.extra.iter().cloned());

    tracing::info!(
        rules = registry.len(),
        query_vars = registry.query_vars().len(),
        "Rule registry populated from config"
    );
    registry
}
