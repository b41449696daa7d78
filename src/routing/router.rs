//! The compiled rewrite table.
//!
//! # Responsibilities
//! - Compile registered rules in insertion-position order
//! - Match a request path and report which pattern won
//! - Resolve recognized query vars for the matched request
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Patterns anchored at the start of the slash-trimmed path; the anchor is
//!   checked on the match, so the pattern text is compiled exactly as written
//! - Raw path tried first, then its percent-decoded form
//! - Explicit `None` on no match rather than a silent default

use std::collections::{BTreeMap, HashSet};

use regex::{Captures, Regex};

use crate::observability::metrics;
use crate::routing::matcher::QueryTemplate;
use crate::rules::{InsertPosition, RuleRegistry};

/// Compile a rule pattern the way the rewrite table uses it.
///
/// Config validation calls this too, so a pattern that validates always
/// makes it into the table.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(pattern)
}

/// Captures for a match that starts at the beginning of `text`.
///
/// Leftmost-first search reports a match at offset 0 whenever one exists.
fn anchored_captures<'t>(regex: &Regex, text: &'t str) -> Option<Captures<'t>> {
    regex
        .captures(text)
        .filter(|c| c.get(0).is_some_and(|m| m.start() == 0))
}

/// One rule as compiled into the table.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pattern: String,
    regex: Regex,
    query: QueryTemplate,
    position: InsertPosition,
}

impl CompiledRule {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn query(&self) -> &QueryTemplate {
        &self.query
    }

    pub fn position(&self) -> InsertPosition {
        self.position
    }
}

/// Result of matching a request against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteMatch {
    /// Pattern string of the winning rule, as registered.
    pub pattern: String,
    /// Regex captures; index 0 is the whole match.
    pub captures: Vec<Option<String>>,
    /// Recognized query vars for this request.
    pub query_vars: BTreeMap<String, String>,
}

/// Rewrite rules in match order plus the recognized query var names.
#[derive(Debug, Clone, Default)]
pub struct RewriteTable {
    rules: Vec<CompiledRule>,
    recognized: HashSet<String>,
}

impl RewriteTable {
    /// Build the table from a registry.
    ///
    /// `Top` rules come first, `Bottom` rules last, each group in
    /// registration order. A repeated pattern keeps its first slot.
    pub fn build(registry: &RuleRegistry, builtin_query_vars: &[String]) -> Self {
        let ordered = registry
            .rules()
            .iter()
            .filter(|r| r.position == InsertPosition::Top)
            .chain(
                registry
                    .rules()
                    .iter()
                    .filter(|r| r.position == InsertPosition::Bottom),
            );

        let mut seen = HashSet::new();
        let mut rules = Vec::new();
        for rule in ordered {
            if !seen.insert(rule.pattern.as_str()) {
                continue;
            }
            match compile_pattern(&rule.pattern) {
                Ok(regex) => rules.push(CompiledRule {
                    pattern: rule.pattern.clone(),
                    regex,
                    query: QueryTemplate::parse(&rule.query_template),
                    position: rule.position,
                }),
                Err(e) => {
                    tracing::warn!(pattern = %rule.pattern, error = %e, "Skipping rewrite rule with invalid pattern");
                }
            }
        }

        let recognized = builtin_query_vars
            .iter()
            .map(String::as_str)
            .chain(registry.query_vars().iter())
            .map(str::to_string)
            .collect();

        tracing::info!(rules = rules.len(), "Rewrite table compiled");
        metrics::record_rules_compiled(rules.len());

        Self { rules, recognized }
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn is_recognized(&self, name: &str) -> bool {
        self.recognized.contains(name)
    }

    /// Match a request path (query string excluded) and resolve query vars.
    ///
    /// Query-string parameters for recognized vars override values the
    /// rewrite produced.
    pub fn match_request(&self, path: &str, query_string: Option<&str>) -> Option<RewriteMatch> {
        let request = path.trim_matches('/');
        let decoded = urlencoding::decode(request)
            .ok()
            .filter(|d| *d != request);

        for rule in &self.rules {
            let captures = anchored_captures(&rule.regex, request)
                .map(|c| collect_captures(&c))
                .or_else(|| {
                    decoded
                        .as_deref()
                        .and_then(|d| anchored_captures(&rule.regex, d))
                        .map(|c| collect_captures(&c))
                });

            if let Some(captures) = captures {
                let query_vars = self.resolve_query_vars(&rule.query, &captures, query_string);
                return Some(RewriteMatch {
                    pattern: rule.pattern.clone(),
                    captures,
                    query_vars,
                });
            }
        }

        None
    }

    fn resolve_query_vars(
        &self,
        template: &QueryTemplate,
        captures: &[Option<String>],
        query_string: Option<&str>,
    ) -> BTreeMap<String, String> {
        let mut vars: BTreeMap<String, String> = template
            .expand(captures)
            .into_iter()
            .filter(|(k, _)| self.is_recognized(k))
            .collect();

        if let Some(qs) = query_string {
            for (k, v) in url::form_urlencoded::parse(qs.as_bytes()) {
                if self.is_recognized(&k) {
                    vars.insert(k.into_owned(), v.into_owned());
                }
            }
        }

        vars
    }
}

fn collect_captures(caps: &Captures<'_>) -> Vec<Option<String>> {
    caps.iter()
        .map(|m| m.map(|m| m.as_str().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleArgs;

    fn table(rules: Vec<RuleArgs>, vars: &[&str]) -> RewriteTable {
        let mut registry = RuleRegistry::new();
        for r in rules {
            registry.add_rule(r);
        }
        registry.add_query_vars(vars.iter().copied());
        RewriteTable::build(&registry, &["p".to_string(), "paged".to_string()])
    }

    #[test]
    fn test_top_rules_before_bottom() {
        let t = table(
            vec![
                RuleArgs::new("^catch/(.*)$").position(InsertPosition::Bottom),
                RuleArgs::new("^catch/special$"),
            ],
            &[],
        );
        let patterns: Vec<&str> = t.rules().iter().map(|r| r.pattern()).collect();
        assert_eq!(patterns, vec!["^catch/special$", "^catch/(.*)$"]);

        let m = t.match_request("/catch/special", None).unwrap();
        assert_eq!(m.pattern, "^catch/special$");
        let m = t.match_request("/catch/other", None).unwrap();
        assert_eq!(m.pattern, "^catch/(.*)$");
    }

    #[test]
    fn test_query_vars_filtered_to_recognized() {
        let t = table(
            vec![RuleArgs::new("^shop/([^/]+)/?$").query("index.php?product=$matches[1]&secret=1")],
            &["product"],
        );
        let m = t.match_request("/shop/boots/", None).unwrap();
        assert_eq!(m.query_vars.get("product").map(String::as_str), Some("boots"));
        assert!(!m.query_vars.contains_key("secret"));
        assert_eq!(m.captures[1].as_deref(), Some("boots"));
    }

    #[test]
    fn test_query_string_overrides_rewrite() {
        let t = table(
            vec![RuleArgs::new("^list/page/([0-9]+)$").query("index.php?paged=$matches[1]")],
            &[],
        );
        let m = t
            .match_request("/list/page/2", Some("paged=5&junk=1&p=9"))
            .unwrap();
        assert_eq!(m.query_vars.get("paged").map(String::as_str), Some("5"));
        assert_eq!(m.query_vars.get("p").map(String::as_str), Some("9"));
        assert!(!m.query_vars.contains_key("junk"));
    }

    #[test]
    fn test_match_is_anchored_at_start() {
        let t = table(vec![RuleArgs::new("blog/?$")], &[]);
        assert!(t.match_request("/blog", None).is_some());
        assert!(t.match_request("/my/blog", None).is_none());
    }

    #[test]
    fn test_verbose_pattern_with_comment_compiles_and_matches() {
        let t = table(
            vec![RuleArgs::new("(?x)shop/([a-z]+) # product slug").query("index.php?p=$matches[1]")],
            &[],
        );
        assert_eq!(t.rules().len(), 1);
        let m = t.match_request("/shop/boots", None).unwrap();
        assert_eq!(m.captures[1].as_deref(), Some("boots"));
        assert!(t.match_request("/old/shop/boots", None).is_none());
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let t = table(vec![RuleArgs::new("a/x|b/y")], &[]);
        assert!(t.match_request("/b/y", None).is_some());
        assert!(t.match_request("/zb/y", None).is_none());
    }

    #[test]
    fn test_percent_decoded_path_fallback() {
        let t = table(vec![RuleArgs::new("^tag/café$")], &[]);
        assert!(t.match_request("/tag/caf%C3%A9", None).is_some());
    }

    #[test]
    fn test_invalid_pattern_skipped() {
        let t = table(
            vec![RuleArgs::new("^(?<=x)bad$"), RuleArgs::new("^good$")],
            &[],
        );
        assert_eq!(t.rules().len(), 1);
        assert!(t.match_request("/good", None).is_some());
    }

    #[test]
    fn test_duplicate_pattern_keeps_first() {
        let t = table(
            vec![
                RuleArgs::new("^dup$").query("index.php?p=1"),
                RuleArgs::new("^dup$").query("index.php?p=2"),
            ],
            &[],
        );
        assert_eq!(t.rules().len(), 1);
        let m = t.match_request("/dup", None).unwrap();
        assert_eq!(m.query_vars.get("p").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_no_match() {
        let t = table(vec![RuleArgs::new("^a$")], &[]);
        assert_eq!(t.match_request("/b", None), None);
    }
}
