//! Access-denied outcomes.
//!
//! # Responsibilities
//! - Define the failure page shown to authenticated callers
//! - Define the login redirect issued to anonymous callers
//! - Describe the host's authentication facility as a trait

use serde::{Deserialize, Serialize};

pub const DEFAULT_DENIED_MESSAGE: &str = "You do not have permission to access this page.";
pub const DEFAULT_DENIED_TITLE: &str = "Access Denied";
pub const DEFAULT_DENIED_STATUS: u16 = 403;

/// Authentication status as reported by the host.
pub trait AuthStatus {
    /// Whether the current caller is logged in.
    fn is_authenticated(&self) -> bool;

    /// Login endpoint that sends the caller back to `return_to` afterwards.
    fn login_url(&self, return_to: &str) -> String;
}

/// Failure page rendered when an authenticated caller is denied.
///
/// Message, title and status can each be overridden on their own.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeniedPage {
    pub message: String,
    pub title: String,
    pub status: u16,
}

impl Default for DeniedPage {
    fn default() -> Self {
        Self {
            message: DEFAULT_DENIED_MESSAGE.to_string(),
            title: DEFAULT_DENIED_TITLE.to_string(),
            status: DEFAULT_DENIED_STATUS,
        }
    }
}

impl DeniedPage {
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

/// Terminal outcome of a failed access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    /// Caller is logged in but not allowed here.
    Forbidden(DeniedPage),
    /// Caller is anonymous; send them to log in first.
    LoginRedirect { location: String },
}
