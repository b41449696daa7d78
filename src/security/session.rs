//! Session-cookie authentication status.
//!
//! The adapter does not manage sessions; it only needs to know whether the
//! caller presents one and where the login page lives.

use axum::http::{header, HeaderMap};

use crate::config::AuthConfig;
use crate::dispatch::AuthStatus;

/// Authentication status of a single request.
#[derive(Debug, Clone)]
pub struct SessionAuth {
    authenticated: bool,
    login_path: String,
    return_param: String,
}

impl SessionAuth {
    /// Inspect request headers for a non-empty session cookie.
    pub fn from_headers(headers: &HeaderMap, config: &AuthConfig) -> Self {
        let authenticated = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .any(|(name, value)| name == config.session_cookie && !value.is_empty());

        Self {
            authenticated,
            login_path: config.login_path.clone(),
            return_param: config.return_param.clone(),
        }
    }
}

impl AuthStatus for SessionAuth {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn login_url(&self, return_to: &str) -> String {
        let separator = if self.login_path.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}={}",
            self.login_path,
            separator,
            self.return_param,
            urlencoding::encode(return_to)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config() -> AuthConfig {
        AuthConfig::default()
    }

    #[test]
    fn test_session_cookie_detected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; rr_session=abc123"),
        );
        assert!(SessionAuth::from_headers(&headers, &config()).is_authenticated());
    }

    #[test]
    fn test_missing_or_empty_cookie_is_anonymous() {
        let headers = HeaderMap::new();
        assert!(!SessionAuth::from_headers(&headers, &config()).is_authenticated());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("rr_session="));
        assert!(!SessionAuth::from_headers(&headers, &config()).is_authenticated());
    }

    #[test]
    fn test_login_url_carries_return_target() {
        let auth = SessionAuth::from_headers(&HeaderMap::new(), &config());
        assert_eq!(
            auth.login_url("/members/area?tab=1"),
            "/login?redirect_to=%2Fmembers%2Farea%3Ftab%3D1"
        );

        let mut cfg = config();
        cfg.login_path = "/auth?step=1".into();
        let auth = SessionAuth::from_headers(&HeaderMap::new(), &cfg);
        assert_eq!(auth.login_url("/x"), "/auth?step=1&redirect_to=%2Fx");
    }
}
