//! End-to-end dispatch through the HTTP adapter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{header, StatusCode};
use rewrite_rules::config::{AccessPolicy, RuleConfig};
use rewrite_rules::http::HttpServer;
use rewrite_rules::lifecycle::registry_from_config;
use rewrite_rules::rules::{Access, Handler, InsertPosition, Redirect, RuleArgs, RuleRegistry};

mod common;

fn rule(pattern: &str) -> RuleConfig {
    RuleConfig {
        pattern: pattern.into(),
        query: None,
        template: None,
        redirect: None,
        access: None,
        position: InsertPosition::Top,
    }
}

fn counting(count: &Arc<AtomicUsize>) -> Handler {
    let count = count.clone();
    Handler::invocable(move || {
        count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

#[tokio::test]
async fn test_unmatched_path_serves_not_found_template() {
    let (_dir, config) = common::site();
    let server = HttpServer::new(config, RuleRegistry::new());

    let res = common::send(&server.router(), common::get("/nowhere")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::body_string(res).await, common::NOT_FOUND_BODY);
}

#[tokio::test]
async fn test_denied_logged_in_caller_gets_403_page() {
    let (_dir, mut config) = common::site();
    config.rules.push(RuleConfig {
        access: Some(AccessPolicy::Deny),
        ..rule("^members/?$")
    });
    let registry = registry_from_config(&config);
    let server = HttpServer::new(config, registry);

    let res = common::send(&server.router(), common::get_logged_in("/members")).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = common::body_string(res).await;
    assert!(body.contains("<title>Access Denied</title>"));
    assert!(body.contains("You do not have permission to access this page."));
}

#[tokio::test]
async fn test_denied_page_overrides_from_config() {
    let (_dir, mut config) = common::site();
    config.denied.title = "Members Only".into();
    config.denied.status = 401;
    config.rules.push(RuleConfig {
        access: Some(AccessPolicy::Deny),
        ..rule("^members/?$")
    });
    let registry = registry_from_config(&config);
    let server = HttpServer::new(config, registry);

    let res = common::send(&server.router(), common::get_logged_in("/members/")).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_string(res).await;
    assert!(body.contains("Members Only"));
    assert!(body.contains("You do not have permission to access this page."));
}

#[tokio::test]
async fn test_denied_anonymous_caller_redirected_to_login() {
    let (_dir, mut config) = common::site();
    config.rules.push(RuleConfig {
        access: Some(AccessPolicy::Deny),
        ..rule("^members/(.+)$")
    });
    let registry = registry_from_config(&config);
    let server = HttpServer::new(config, registry);

    let res = common::send(&server.router(), common::get("/members/home")).await;
    assert_eq!(res.status(), StatusCode::FOUND);

    let location = res.headers()[header::LOCATION].to_str().unwrap();
    let (path, query) = location.split_once('?').unwrap();
    assert_eq!(path, "/login");
    let target = url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "redirect_to")
        .map(|(_, v)| v.into_owned());
    assert_eq!(target.as_deref(), Some("/members/home"));
}

#[tokio::test]
async fn test_configured_redirect_is_permanent() {
    let (_dir, mut config) = common::site();
    config.rules.push(RuleConfig {
        redirect: Some("/products/$1".into()),
        ..rule("^old-shop/([0-9]+)/?$")
    });
    let registry = registry_from_config(&config);
    let server = HttpServer::new(config, registry);

    let res = common::send(&server.router(), common::get("/old-shop/42/")).await;
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[header::LOCATION], "/products/42");
}

#[tokio::test]
async fn test_redirect_target_rejected_by_sanitizer_ends_request() {
    let (_dir, config) = common::site();
    let mut registry = RuleRegistry::new();
    registry.add_rule(
        RuleArgs::new("^go/?$")
            .redirect(Redirect::new(|_| Ok("javascript:alert(1)".into())))
            .template("landing.html"),
    );
    let server = HttpServer::new(config, registry);

    let res = common::send(&server.router(), common::get("/go")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(header::LOCATION).is_none());
    assert_eq!(common::body_string(res).await, "");
}

#[tokio::test]
async fn test_template_override() {
    let (_dir, mut config) = common::site();
    config.rules.push(RuleConfig {
        template: Some("landing.html".into()),
        ..rule("^welcome/?$")
    });
    config.rules.push(RuleConfig {
        template: Some("missing.html".into()),
        ..rule("^broken/?$")
    });
    let registry = registry_from_config(&config);
    let server = HttpServer::new(config, registry);
    let router = server.router();

    let res = common::send(&router, common::get("/welcome")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::body_string(res).await, common::LANDING_BODY);

    let res = common::send(&router, common::get("/broken")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::body_string(res).await, common::NOT_FOUND_BODY);
}

#[tokio::test]
async fn test_controller_runs_once_and_default_output_lists_query() {
    let (_dir, config) = common::site();
    let count = Arc::new(AtomicUsize::new(0));
    let mut registry = RuleRegistry::new();
    registry.add_query_vars(["product"]);
    registry.add_rule(
        RuleArgs::new("^shop/([^/]+)/?$")
            .query("index.php?product=$matches[1]&internal=1")
            .controller(counting(&count)),
    );
    let server = HttpServer::new(config, registry);

    let res = common::send(&server.router(), common::get("/shop/boots?paged=2&junk=x")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(count.load(Ordering::SeqCst), 1);

    let body: serde_json::Value = serde_json::from_str(&common::body_string(res).await).unwrap();
    assert_eq!(body["matched_rule"], "^shop/([^/]+)/?$");
    assert_eq!(body["query"]["product"], "boots");
    assert_eq!(body["query"]["paged"], "2");
    assert!(body["query"].get("internal").is_none());
    assert!(body["query"].get("junk").is_none());
}

#[tokio::test]
async fn test_redirect_skips_controller() {
    let (_dir, config) = common::site();
    let count = Arc::new(AtomicUsize::new(0));
    let mut registry = RuleRegistry::new();
    registry.add_rule(
        RuleArgs::new("^legacy/(.+)$")
            .redirect(Redirect::new(|ctx| {
                Ok(format!("https://example.com/{}", ctx.capture(1).unwrap_or_default()))
            }))
            .controller(counting(&count)),
    );
    let server = HttpServer::new(config, registry);

    let res = common::send(&server.router(), common::get("/legacy/page")).await;
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[header::LOCATION], "https://example.com/page");
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_callback_failure_is_server_error() {
    let (_dir, config) = common::site();
    let mut registry = RuleRegistry::new();
    registry.add_rule(RuleArgs::new("^fragile/?$").access(Access::new(|| Err("store offline".into()))));
    let server = HttpServer::new(config, registry);

    let res = common::send(&server.router(), common::get("/fragile")).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_bottom_rule_yields_to_top_rule() {
    let (_dir, mut config) = common::site();
    config.rules.push(RuleConfig {
        template: Some("missing.html".into()),
        position: InsertPosition::Bottom,
        ..rule("^docs/(.*)$")
    });
    config.rules.push(RuleConfig {
        template: Some("landing.html".into()),
        ..rule("^docs/start$")
    });
    let registry = registry_from_config(&config);
    let server = HttpServer::new(config, registry);

    let res = common::send(&server.router(), common::get("/docs/start")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::body_string(res).await, common::LANDING_BODY);
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let (_dir, config) = common::site();
    let server = HttpServer::new(config, RuleRegistry::new());

    let res = common::send(&server.router(), common::get("/anything")).await;
    let id = res.headers().get("x-request-id").expect("missing request id");
    assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
}
