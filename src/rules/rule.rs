//! Rule records and the callables they carry.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dispatch::RequestContext;

/// Query template used when a rule does not set one.
pub const DEFAULT_QUERY_TEMPLATE: &str = "index.php";

/// Error produced by configurer-supplied callables.
///
/// The dispatcher never wraps or swallows these; they travel back to the
/// caller exactly as the callable returned them.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Where a rule lands relative to the host's own rewrite rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    #[default]
    Top,
    Bottom,
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertPosition::Top => f.pad("top"),
            InsertPosition::Bottom => f.pad("bottom"),
        }
    }
}

/// A type the dispatcher can build one instance of when its rule matches.
///
/// Whatever the controller does happens during construction; the instance
/// is dropped right after.
pub trait Controller: Sized {
    fn construct() -> Result<Self, CallbackError>;
}

type InvokeFn = dyn Fn() -> Result<(), CallbackError> + Send + Sync;

/// What runs when a rule matches.
#[derive(Clone)]
pub enum Handler {
    /// A callable invoked with no arguments.
    Invocable(Arc<InvokeFn>),
    /// A type constructed once per matching request.
    Instantiable {
        type_name: &'static str,
        construct: fn() -> Result<(), CallbackError>,
    },
}

impl Handler {
    pub fn invocable<F>(f: F) -> Self
    where
        F: Fn() -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Handler::Invocable(Arc::new(f))
    }

    pub fn instantiable<T: Controller>() -> Self {
        Handler::Instantiable {
            type_name: std::any::type_name::<T>(),
            construct: construct_and_drop::<T>,
        }
    }

    /// Run the handler: call it, or build one instance of its type.
    pub fn run(&self) -> Result<(), CallbackError> {
        match self {
            Handler::Invocable(f) => f(),
            Handler::Instantiable { construct, .. } => construct(),
        }
    }
}

fn construct_and_drop<T: Controller>() -> Result<(), CallbackError> {
    T::construct().map(drop)
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Invocable(_) => f.write_str("Handler::Invocable(..)"),
            Handler::Instantiable { type_name, .. } => {
                write!(f, "Handler::Instantiable({})", type_name)
            }
        }
    }
}

type AccessFn = dyn Fn() -> Result<bool, CallbackError> + Send + Sync;

/// Access predicate. Anything but `Ok(true)` denies the request.
#[derive(Clone)]
pub struct Access(Arc<AccessFn>);

impl Access {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Result<bool, CallbackError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Predicate that always grants access.
    pub fn allow() -> Self {
        Self::new(|| Ok(true))
    }

    /// Predicate that always denies access.
    pub fn deny() -> Self {
        Self::new(|| Ok(false))
    }

    pub fn check(&self) -> Result<bool, CallbackError> {
        (self.0)()
    }
}

impl fmt::Debug for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Access(..)")
    }
}

type RedirectFn = dyn Fn(&RequestContext) -> Result<String, CallbackError> + Send + Sync;

/// Produces the target of a permanent redirect from the request context.
#[derive(Clone)]
pub struct Redirect(Arc<RedirectFn>);

impl Redirect {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<String, CallbackError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Redirect to a target where `$N` is replaced by capture group `N`.
    ///
    /// Groups that did not participate in the match expand to nothing.
    pub fn to_target(target: impl Into<String>) -> Self {
        let target = target.into();
        Self::new(move |ctx| Ok(expand_captures(&target, ctx.captures())))
    }

    pub fn target_for(&self, ctx: &RequestContext) -> Result<String, CallbackError> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Redirect(..)")
    }
}

fn expand_captures(target: &str, captures: &[Option<String>]) -> String {
    let mut out = String::with_capacity(target.len());
    let mut chars = target.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut digits = String::new();
        while let Some(&(_, d)) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            digits.push(d);
            chars.next();
        }
        match digits.parse::<usize>() {
            Ok(n) => {
                if let Some(Some(value)) = captures.get(n) {
                    out.push_str(value);
                }
            }
            Err(_) => {
                out.push('$');
                out.push_str(&digits);
            }
        }
    }
    out
}

/// One registered routing entry.
#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: String,
    pub query_template: String,
    pub controller: Option<Handler>,
    pub template: Option<String>,
    pub redirect: Option<Redirect>,
    pub access: Option<Access>,
    pub position: InsertPosition,
}

/// Arguments for [`RuleRegistry::add_rule`](super::RuleRegistry::add_rule).
///
/// Unset fields are filled with defaults on registration.
#[derive(Debug, Clone, Default)]
pub struct RuleArgs {
    pub pattern: String,
    pub query_template: Option<String>,
    pub controller: Option<Handler>,
    pub template: Option<String>,
    pub redirect: Option<Redirect>,
    pub access: Option<Access>,
    pub position: Option<InsertPosition>,
}

impl RuleArgs {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    pub fn query(mut self, query_template: impl Into<String>) -> Self {
        self.query_template = Some(query_template.into());
        self
    }

    pub fn controller(mut self, handler: Handler) -> Self {
        self.controller = Some(handler);
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn redirect(mut self, redirect: Redirect) -> Self {
        self.redirect = Some(redirect);
        self
    }

    pub fn access(mut self, access: Access) -> Self {
        self.access = Some(access);
        self
    }

    pub fn position(mut self, position: InsertPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub(crate) fn into_rule(self) -> Rule {
        Rule {
            pattern: self.pattern,
            query_template: self
                .query_template
                .filter(|q| !q.is_empty())
                .unwrap_or_else(|| DEFAULT_QUERY_TEMPLATE.to_string()),
            controller: self.controller,
            template: self.template.filter(|t| !t.is_empty()),
            redirect: self.redirect,
            access: self.access,
            position: self.position.unwrap_or_default(),
        }
    }
}
