//! The rule registry.
//!
//! # Responsibilities
//! - Hold rule records in registration order
//! - Hold the set of extra recognized query vars
//! - Look rules up by their exact pattern string
//!
//! # Design Decisions
//! - Built once at startup, then shared read-only behind `Arc`
//! - Empty patterns are dropped with a warning, never an error
//! - Lookup returns `Option<usize>` so index 0 is never mistaken for a miss

use crate::rules::rule::{Rule, RuleArgs};

/// Flat, additive set of query var names.
///
/// Keeps first-seen order so listings are stable.
#[derive(Debug, Clone, Default)]
pub struct QueryVarSet {
    names: Vec<String>,
}

impl QueryVarSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge names into the set, skipping ones already present.
    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !name.is_empty() && !self.contains(&name) {
                self.names.push(name);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Ordered rule list plus recognized query vars.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
    query_vars: QueryVarSet,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. A rule with an empty pattern is ignored.
    pub fn add_rule(&mut self, args: RuleArgs) {
        if args.pattern.is_empty() {
            tracing::warn!("Ignoring rewrite rule with empty pattern");
            return;
        }

        let rule = args.into_rule();
        tracing::debug!(
            pattern = %rule.pattern,
            query = %rule.query_template,
            position = %rule.position,
            "Rewrite rule registered"
        );
        self.rules.push(rule);
    }

    /// All rules in registration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Index of the first rule whose pattern equals `pattern`.
    pub fn rule_index_by_pattern(&self, pattern: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.pattern == pattern)
    }

    pub fn rule_by_pattern(&self, pattern: &str) -> Option<&Rule> {
        self.rule_index_by_pattern(pattern).map(|i| &self.rules[i])
    }

    pub fn add_query_vars<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_vars.extend(names);
    }

    pub fn query_vars(&self) -> &QueryVarSet {
        &self.query_vars
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
