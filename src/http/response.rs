//! Response rendering.
//!
//! # Responsibilities
//! - Render the access-denied page
//! - Issue login (302) and permanent (301) redirects
//! - Serve resolved template files
//! - Produce the default output when a rule sets no template
//!
//! # Design Decisions
//! - Failure page text is HTML-escaped
//! - A missing not-found template degrades to a plain 404 body
//! - A Location that is not a valid header value becomes a 500

use std::collections::BTreeMap;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::dispatch::{DeniedPage, PermanentRedirect, ResolvedTemplate};

/// Access-denied page for authenticated callers.
pub fn denied_page(page: &DeniedPage) -> Response {
    let status = StatusCode::from_u16(page.status).unwrap_or(StatusCode::FORBIDDEN);
    let title = html_escape::encode_text(&page.title);
    let body = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<p>{}</p>\n</body>\n</html>\n",
        html_escape::encode_text(&page.message),
    );
    (status, Html(body)).into_response()
}

/// 302 to the login page.
pub fn login_redirect(location: &str) -> Response {
    redirect(StatusCode::FOUND, location)
}

/// 301 issued by a deferred redirect.
pub fn permanent_redirect(target: &PermanentRedirect) -> Response {
    redirect(StatusCode::MOVED_PERMANENTLY, &target.location)
}

fn redirect(status: StatusCode, location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = status;
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        Err(_) => {
            tracing::error!(location = %location, "Redirect location is not a valid header value");
            internal_error()
        }
    }
}

/// Serve a resolved template file.
pub async fn template(resolved: &ResolvedTemplate) -> Response {
    let path = resolved.path();
    let status = match resolved {
        ResolvedTemplate::Found(_) => StatusCode::OK,
        ResolvedTemplate::NotFound(_) => StatusCode::NOT_FOUND,
    };

    match tokio::fs::read_to_string(path).await {
        Ok(contents) => (status, Html(contents)).into_response(),
        Err(e) if status == StatusCode::NOT_FOUND => {
            tracing::debug!(path = %path.display(), error = %e, "Not-found template unreadable");
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read template");
            internal_error()
        }
    }
}

#[derive(Debug, Serialize)]
struct DefaultOutput<'a> {
    matched_rule: &'a str,
    query: &'a BTreeMap<String, String>,
}

/// Output when a matched rule selects no template: the resolved query.
pub fn default_output(pattern: &str, query: &BTreeMap<String, String>) -> Response {
    Json(DefaultOutput {
        matched_rule: pattern,
        query,
    })
    .into_response()
}

/// Request terminated without output.
pub fn empty() -> Response {
    StatusCode::OK.into_response()
}

pub fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_denied_page_status_and_escaping() {
        let page = DeniedPage::default()
            .with_title("<Staff>")
            .with_message("Tom & <b>Jerry</b>");
        let response = denied_page(&page);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("<title>&lt;Staff&gt;</title>"));
        assert!(body.contains("<h1>&lt;Staff&gt;</h1>"));
        assert!(body.contains("<p>Tom &amp; &lt;b&gt;Jerry&lt;/b&gt;</p>"));
        assert!(!body.contains("<b>"));
    }

    #[test]
    fn test_redirect_statuses() {
        let r = login_redirect("/login?redirect_to=%2Fx");
        assert_eq!(r.status(), StatusCode::FOUND);
        assert_eq!(r.headers()[header::LOCATION], "/login?redirect_to=%2Fx");

        let r = permanent_redirect(&PermanentRedirect {
            location: "/new".into(),
        });
        assert_eq!(r.status(), StatusCode::MOVED_PERMANENTLY);
    }

    #[test]
    fn test_invalid_location_is_server_error() {
        assert_eq!(
            login_redirect("/bad\nvalue").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_missing_not_found_template_is_plain_404() {
        let resolved = ResolvedTemplate::NotFound("/no/such/404.html".into());
        assert_eq!(template(&resolved).await.status(), StatusCode::NOT_FOUND);

        let resolved = ResolvedTemplate::Found("/no/such/page.html".into());
        assert_eq!(
            template(&resolved).await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
