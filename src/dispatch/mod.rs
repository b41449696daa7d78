//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! matched pattern (from rewrite table)
//!     → dispatcher.rs (rule lookup)
//!     → access check
//!         denied → access.rs (403 page | login redirect)    [terminal]
//!     → deferred.rs DeferredRedirect   (fired in final template phase)
//!     → deferred.rs TemplateOverride   (applied in template selection)
//!     → controller invocation          (unless a redirect is pending)
//! ```
//!
//! # Design Decisions
//! - Host facilities (auth status, template lookup) are traits
//! - Deferred work is returned as data, not registered as hooks
//! - Dispatch is synchronous and holds no locks

pub mod access;
pub mod context;
pub mod deferred;
pub mod dispatcher;

pub use access::{AccessDenied, AuthStatus, DeniedPage};
pub use context::RequestContext;
pub use deferred::{
    DeferredRedirect, PermanentRedirect, ResolvedTemplate, TemplateLocator, TemplateOverride,
};
pub use dispatcher::{Deferred, DispatchOutcome, Dispatcher};
