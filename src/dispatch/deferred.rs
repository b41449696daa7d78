//! Work the dispatcher hands back for later request phases.
//!
//! Neither the redirect nor the template override runs at dispatch time.
//! The host adapter fires them once it reaches the matching phase.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::dispatch::RequestContext;
use crate::rules::{CallbackError, Redirect};
use crate::security::sanitize_redirect_url;

/// Host template lookup.
pub trait TemplateLocator {
    /// Resolve a template identifier to a concrete file.
    fn locate(&self, name: &str) -> Option<PathBuf>;

    /// The host's "not found" template.
    fn not_found(&self) -> PathBuf;
}

/// A 301 ready to be issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermanentRedirect {
    pub location: String,
}

impl PermanentRedirect {
    pub const STATUS: u16 = 301;
}

/// A redirect registered at dispatch time, fired in the final template phase.
#[derive(Clone)]
pub struct DeferredRedirect {
    pattern: String,
    redirect: Redirect,
}

impl DeferredRedirect {
    pub(crate) fn new(pattern: &str, redirect: Redirect) -> Self {
        Self {
            pattern: pattern.to_string(),
            redirect,
        }
    }

    /// Compute the target and sanitize it.
    ///
    /// `Ok(None)` means the callable produced a target the sanitizer
    /// rejected; the request still terminates.
    pub fn fire(&self, ctx: &RequestContext) -> Result<Option<PermanentRedirect>, CallbackError> {
        let target = self.redirect.target_for(ctx)?;
        match sanitize_redirect_url(&target) {
            Some(location) => {
                tracing::debug!(pattern = %self.pattern, location = %location, "Issuing permanent redirect");
                Ok(Some(PermanentRedirect { location }))
            }
            None => {
                tracing::warn!(pattern = %self.pattern, target = %target, "Redirect target rejected by sanitizer");
                Ok(None)
            }
        }
    }
}

impl fmt::Debug for DeferredRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredRedirect")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Result of resolving a template override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTemplate {
    Found(PathBuf),
    /// The requested template was missing; this is the host's 404 template.
    NotFound(PathBuf),
}

impl ResolvedTemplate {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedTemplate::Found(p) | ResolvedTemplate::NotFound(p) => p,
        }
    }
}

/// A template override registered at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOverride {
    template: String,
}

impl TemplateOverride {
    pub(crate) fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn resolve(&self, locator: &dyn TemplateLocator) -> ResolvedTemplate {
        match locator.locate(&self.template) {
            Some(path) => ResolvedTemplate::Found(path),
            None => {
                tracing::debug!(template = %self.template, "Template not found, using 404 template");
                ResolvedTemplate::NotFound(locator.not_found())
            }
        }
    }
}
