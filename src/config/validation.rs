//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check rule patterns compile
//! - Validate value ranges (timeouts > 0, status codes, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Empty rule patterns are not an error; the registry drops them

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::routing::router::compile_pattern;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("rule {index}: pattern '{pattern}' does not compile: {reason}")]
    Pattern {
        index: usize,
        pattern: String,
        reason: String,
    },

    #[error("denied status {0} is not a valid HTTP status code")]
    DeniedStatus(u16),

    #[error("auth.login_path must not be empty")]
    EmptyLoginPath,

    #[error("auth.session_cookie must not be empty")]
    EmptySessionCookie,

    #[error("templates.not_found must not be empty")]
    EmptyNotFoundTemplate,
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    for (index, rule) in config.rules.iter().enumerate() {
        if rule.pattern.is_empty() {
            continue;
        }
        if let Err(e) = compile_pattern(&rule.pattern) {
            errors.push(ValidationError::Pattern {
                index,
                pattern: rule.pattern.clone(),
                reason: e.to_string(),
            });
        }
    }

    if !(100..=599).contains(&config.denied.status) {
        errors.push(ValidationError::DeniedStatus(config.denied.status));
    }

    if config.auth.login_path.trim().is_empty() {
        errors.push(ValidationError::EmptyLoginPath);
    }

    if config.auth.session_cookie.trim().is_empty() {
        errors.push(ValidationError::EmptySessionCookie);
    }

    if config.templates.not_found.trim().is_empty() {
        errors.push(ValidationError::EmptyNotFoundTemplate);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
