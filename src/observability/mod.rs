//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry, rewrite table, dispatcher, http adapter
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID (from the http layer) rides on the trace span
//! - Metrics are cheap and safe to record without an exporter

pub mod logging;
pub mod metrics;
