//! Per-request rule dispatch.
//!
//! # Responsibilities
//! - Find the rule for the pattern the host matched
//! - Run the access check and pick the denied outcome
//! - Hand back deferred redirect / template work
//! - Invoke the rule's controller
//!
//! # Design Decisions
//! - Steps run in a fixed order: access, redirect, template, controller
//! - Redirect and template override are registered independently
//! - A pending redirect means the controller is not invoked
//! - Callback errors are returned untouched, never wrapped

use std::sync::Arc;

use crate::dispatch::access::{AccessDenied, AuthStatus, DeniedPage};
use crate::dispatch::deferred::{DeferredRedirect, TemplateOverride};
use crate::observability::metrics;
use crate::rules::{CallbackError, Rule, RuleRegistry};

/// Work left for later request phases after a rule was dispatched.
#[derive(Debug, Default)]
pub struct Deferred {
    /// Fire in the final template phase to issue a 301.
    pub redirect: Option<DeferredRedirect>,
    /// Apply in the template selection phase.
    pub template: Option<TemplateOverride>,
    /// Whether the rule's controller ran during dispatch.
    pub controller_invoked: bool,
}

/// What the dispatcher decided for one request.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// No registered rule has this pattern; the host carries on as usual.
    NotApplicable,
    /// Access check failed. Terminal.
    Denied(AccessDenied),
    /// Access granted; the request continues with this deferred work.
    Proceed(Deferred),
}

impl DispatchOutcome {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::NotApplicable => "not_applicable",
            DispatchOutcome::Denied(AccessDenied::Forbidden(_)) => "forbidden",
            DispatchOutcome::Denied(AccessDenied::LoginRedirect { .. }) => "login_redirect",
            DispatchOutcome::Proceed(_) => "proceed",
        }
    }
}

/// Dispatches matched requests against a shared rule registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<RuleRegistry>,
    denied_page: DeniedPage,
}

impl Dispatcher {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self {
            registry,
            denied_page: DeniedPage::default(),
        }
    }

    /// Replace the page shown to authenticated callers who are denied.
    pub fn with_denied_page(mut self, denied_page: DeniedPage) -> Self {
        self.denied_page = denied_page;
        self
    }

    /// Dispatch a request the host already matched against `matched_pattern`.
    ///
    /// `request_uri` is the original URI, used as the login return target.
    pub fn dispatch(
        &self,
        matched_pattern: &str,
        request_uri: &str,
        auth: &dyn AuthStatus,
    ) -> Result<DispatchOutcome, CallbackError> {
        let outcome = match self.registry.rule_by_pattern(matched_pattern) {
            Some(rule) => self.dispatch_rule(rule, request_uri, auth)?,
            None => DispatchOutcome::NotApplicable,
        };

        tracing::debug!(
            pattern = %matched_pattern,
            outcome = outcome.label(),
            "Rule dispatched"
        );
        metrics::record_dispatch(outcome.label());
        Ok(outcome)
    }

    fn dispatch_rule(
        &self,
        rule: &Rule,
        request_uri: &str,
        auth: &dyn AuthStatus,
    ) -> Result<DispatchOutcome, CallbackError> {
        let granted = match &rule.access {
            Some(access) => access.check()?,
            None => true,
        };

        if !granted {
            let denied = if auth.is_authenticated() {
                AccessDenied::Forbidden(self.denied_page.clone())
            } else {
                AccessDenied::LoginRedirect {
                    location: auth.login_url(request_uri),
                }
            };
            tracing::info!(pattern = %rule.pattern, uri = %request_uri, "Access denied");
            return Ok(DispatchOutcome::Denied(denied));
        }

        let redirect = rule
            .redirect
            .clone()
            .map(|r| DeferredRedirect::new(&rule.pattern, r));
        let template = rule.template.as_deref().map(TemplateOverride::new);

        let mut controller_invoked = false;
        if redirect.is_none() {
            if let Some(handler) = &rule.controller {
                handler.run()?;
                controller_invoked = true;
            }
        }

        Ok(DispatchOutcome::Proceed(Deferred {
            redirect,
            template,
            controller_invoked,
        }))
    }
}
