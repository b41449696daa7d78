//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → session.rs (is the caller logged in? where is the login page?)
//!
//! Outgoing redirect:
//!     → redirect_url.rs (sanitize Location before it is emitted)
//! ```
//!
//! # Design Decisions
//! - No trust in callable-produced redirect targets
//! - Session validity is the host's business; only presence is checked here

pub mod redirect_url;
pub mod session;

pub use redirect_url::sanitize_redirect_url;
pub use session::SessionAuth;
