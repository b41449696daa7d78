//! HTTP adapter subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → routing (rewrite table match)
//!     → dispatch (access check, deferred work, controller)
//!     → templates.rs (template lookup)
//!     → response.rs (403 page, redirects, template, default output)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod templates;

pub use request::{MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
pub use templates::FsTemplateLocator;
