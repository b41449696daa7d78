//! Per-request context handed to redirect callables.

use std::collections::BTreeMap;

/// What is known about a request once a rewrite rule has matched it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    request_uri: String,
    matched_pattern: String,
    captures: Vec<Option<String>>,
    query_vars: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new(request_uri: impl Into<String>, matched_pattern: impl Into<String>) -> Self {
        Self {
            request_uri: request_uri.into(),
            matched_pattern: matched_pattern.into(),
            ..Default::default()
        }
    }

    pub fn with_captures(mut self, captures: Vec<Option<String>>) -> Self {
        self.captures = captures;
        self
    }

    pub fn with_query_vars(mut self, query_vars: BTreeMap<String, String>) -> Self {
        self.query_vars = query_vars;
        self
    }

    /// Original request URI, query string included.
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    /// Request path without the query string.
    pub fn path(&self) -> &str {
        self.request_uri
            .split_once('?')
            .map(|(path, _)| path)
            .unwrap_or(&self.request_uri)
    }

    pub fn matched_pattern(&self) -> &str {
        &self.matched_pattern
    }

    /// Regex captures; index 0 is the whole match.
    pub fn captures(&self) -> &[Option<String>] {
        &self.captures
    }

    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures.get(index).and_then(|c| c.as_deref())
    }

    /// Recognized query vars resolved for this request.
    pub fn query_vars(&self) -> &BTreeMap<String, String> {
        &self.query_vars
    }

    pub fn query_var(&self, name: &str) -> Option<&str> {
        self.query_vars.get(name).map(String::as_str)
    }
}
