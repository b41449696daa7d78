//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::dispatch::DeniedPage;
use crate::rules::{Access, InsertPosition, Redirect, RuleArgs};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Template lookup settings.
    pub templates: TemplateConfig,

    /// Login endpoint and session cookie.
    pub auth: AuthConfig,

    /// Page shown to authenticated callers who are denied access.
    pub denied: DeniedPage,

    /// Recognized query vars.
    pub query_vars: QueryVarConfig,

    /// Declarative rewrite rules, registered in file order.
    pub rules: Vec<RuleConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Template lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directories searched in order; the first one holding the file wins.
    pub search_paths: Vec<PathBuf>,

    /// Template served when nothing else resolves.
    pub not_found: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            search_paths: vec![PathBuf::from("templates")],
            not_found: "404.html".to_string(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Login page path or URL.
    pub login_path: String,

    /// Cookie whose presence marks a logged-in caller.
    pub session_cookie: String,

    /// Login query parameter carrying the return target.
    pub return_param: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            session_cookie: "rr_session".to_string(),
            return_param: "redirect_to".to_string(),
        }
    }
}

/// Query var configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryVarConfig {
    /// Vars the host always recognizes.
    pub builtin: Vec<String>,

    /// Extra vars registered alongside the rules.
    pub extra: Vec<String>,
}

impl Default for QueryVarConfig {
    fn default() -> Self {
        Self {
            builtin: ["p", "page", "paged", "name", "s"]
                .into_iter()
                .map(String::from)
                .collect(),
            extra: Vec::new(),
        }
    }
}

/// Fixed access policy for a declarative rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessPolicy {
    Allow,
    Deny,
}

/// A rewrite rule declared in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    /// Regex matched against the slash-trimmed request path.
    pub pattern: String,

    /// Query template, e.g. `index.php?product=$matches[1]`.
    #[serde(default)]
    pub query: Option<String>,

    /// Template to render instead of the default output.
    #[serde(default)]
    pub template: Option<String>,

    /// Permanent redirect target; `$N` expands to capture group N.
    #[serde(default)]
    pub redirect: Option<String>,

    #[serde(default)]
    pub access: Option<AccessPolicy>,

    #[serde(default)]
    pub position: InsertPosition,
}

impl RuleConfig {
    pub fn to_rule_args(&self) -> RuleArgs {
        let mut args = RuleArgs::new(self.pattern.clone()).position(self.position);
        if let Some(query) = &self.query {
            args = args.query(query.clone());
        }
        if let Some(template) = &self.template {
            args = args.template(template.clone());
        }
        if let Some(target) = &self.redirect {
            args = args.redirect(Redirect::to_target(target.clone()));
        }
        match self.access {
            Some(AccessPolicy::Allow) => args = args.access(Access::allow()),
            Some(AccessPolicy::Deny) => args = args.access(Access::deny()),
            None => {}
        }
        args
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
