//! Structured logging.
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level when set
//! - Safe to call more than once (later calls are ignored)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor a configured level is usable.
pub const DEFAULT_FILTER: &str = "rewrite_rules=debug,tower_http=debug";

/// Build the env filter: `RUST_LOG`, then `level`, then [`DEFAULT_FILTER`].
pub fn build_filter(level: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let directives = match level {
        Some(level) if !level.is_empty() => format!("rewrite_rules={level},tower_http={level}"),
        _ => DEFAULT_FILTER.to_string(),
    };
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the global tracing subscriber.
pub fn init(level: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
