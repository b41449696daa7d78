//! HTTP server setup and the per-request rewrite pipeline.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all rewrite handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Match requests against the rewrite table
//! - Dispatch matched rules and carry out their deferred work
//! - Bind server to listener with graceful shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, AuthConfig};
use crate::dispatch::{
    AccessDenied, DispatchOutcome, Dispatcher, RequestContext, ResolvedTemplate, TemplateLocator,
};
use crate::http::request::{MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
use crate::http::response;
use crate::http::templates::FsTemplateLocator;
use crate::lifecycle::wait_for_shutdown;
use crate::observability::metrics;
use crate::routing::{RewriteMatch, RewriteTable};
use crate::rules::RuleRegistry;
use crate::security::SessionAuth;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RewriteTable>,
    pub dispatcher: Arc<Dispatcher>,
    pub templates: Arc<FsTemplateLocator>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    /// Freeze the registry and build everything a request needs.
    pub fn new(config: &AppConfig, registry: RuleRegistry) -> Self {
        let table = RewriteTable::build(&registry, &config.query_vars.builtin);
        let dispatcher =
            Dispatcher::new(Arc::new(registry)).with_denied_page(config.denied.clone());

        Self {
            table: Arc::new(table),
            dispatcher: Arc::new(dispatcher),
            templates: Arc::new(FsTemplateLocator::new(&config.templates)),
            auth: Arc::new(config.auth.clone()),
        }
    }
}

/// HTTP server hosting the rewrite rules.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server from config and a fully populated registry.
    pub fn new(config: AppConfig, registry: RuleRegistry) -> Self {
        let state = AppState::new(&config, registry);
        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(rewrite_handler))
            .route("/", any(rewrite_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %req.request_id(),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The configured router, for embedding or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C or the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: rewrite match, dispatch, deferred work, output.
async fn rewrite_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let uri = request.uri().clone();
    let request_uri = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let Some(matched) = state.table.match_request(uri.path(), uri.query()) else {
        tracing::debug!(path = %uri.path(), "No rewrite rule matched");
        let not_found = ResolvedTemplate::NotFound(state.templates.not_found());
        let response = response::template(&not_found).await;
        metrics::record_request(response.status().as_u16(), "none", start);
        return response;
    };

    let pattern = matched.pattern.clone();
    let auth = SessionAuth::from_headers(request.headers(), &state.auth);
    let response = match state.dispatcher.dispatch(&pattern, &request_uri, &auth) {
        Ok(outcome) => apply_outcome(&state, outcome, matched, request_uri).await,
        Err(e) => {
            tracing::error!(pattern = %pattern, error = %e, "Rule callback failed");
            response::internal_error()
        }
    };

    metrics::record_request(response.status().as_u16(), &pattern, start);
    response
}

async fn apply_outcome(
    state: &AppState,
    outcome: DispatchOutcome,
    matched: RewriteMatch,
    request_uri: String,
) -> Response {
    let deferred = match outcome {
        DispatchOutcome::Denied(AccessDenied::Forbidden(page)) => {
            return response::denied_page(&page);
        }
        DispatchOutcome::Denied(AccessDenied::LoginRedirect { location }) => {
            return response::login_redirect(&location);
        }
        DispatchOutcome::NotApplicable => {
            return response::default_output(&matched.pattern, &matched.query_vars);
        }
        DispatchOutcome::Proceed(deferred) => deferred,
    };

    // Final template phase: a pending redirect ends the request here.
    if let Some(redirect) = &deferred.redirect {
        let ctx = RequestContext::new(request_uri, matched.pattern.clone())
            .with_captures(matched.captures)
            .with_query_vars(matched.query_vars);
        return match redirect.fire(&ctx) {
            Ok(Some(target)) => response::permanent_redirect(&target),
            Ok(None) => response::empty(),
            Err(e) => {
                tracing::error!(pattern = %matched.pattern, error = %e, "Redirect callback failed");
                response::internal_error()
            }
        };
    }

    // Template selection phase.
    if let Some(template) = &deferred.template {
        let resolved = template.resolve(state.templates.as_ref());
        return response::template(&resolved).await;
    }

    response::default_output(&matched.pattern, &matched.query_vars)
}
