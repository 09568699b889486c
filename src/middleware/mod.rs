//! Middleware layer.
//!
//! Middleware is the place for cross-cutting concerns: request tracing,
//! authentication gates, cookie bookkeeping. A middleware has up to two
//! hooks, each an optional capability:
//!
//! - [`BeforeHook`] runs before the action and may set a redirect, which
//!   skips the action.
//! - [`AfterHook`] runs after the action (or after the skipped action).
//!
//! A middleware missing the hook for a phase is skipped for that phase.
//!
//! # Ordering
//!
//! ```text
//! global.before → route.before → action → route.after → global.after
//! ```
//!
//! Within each list hooks run in registration order, in both phases.
//!
//! # Resolution
//!
//! Routes and the global stack refer to middleware by name. Names are
//! resolved against the [`MiddlewareRegistry`] once, at boot; an unknown
//! name is a boot error rather than a per-request surprise.

mod authenticate;
mod trace;
mod verify_email;

pub use authenticate::Authenticate;
pub use trace::Trace;
pub use verify_email::VerifyEmail;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::Error;
use crate::request::Request;

// ── Hooks ─────────────────────────────────────────────────────────────────────

/// Runs before the matched action.
pub trait BeforeHook: Send + Sync {
    fn before(&self, req: &mut Request);
}

/// Runs after the matched action.
pub trait AfterHook: Send + Sync {
    fn after(&self, req: &mut Request);
}

impl<F> BeforeHook for F
where
    F: Fn(&mut Request) + Send + Sync,
{
    fn before(&self, req: &mut Request) {
        self(req)
    }
}

/// Adapter for closures used as after-hooks; plain closures already
/// implement [`BeforeHook`].
pub struct After<F>(pub F);

impl<F> AfterHook for After<F>
where
    F: Fn(&mut Request) + Send + Sync,
{
    fn after(&self, req: &mut Request) {
        (self.0)(req)
    }
}

// ── Middleware ────────────────────────────────────────────────────────────────

/// Lifecycle phase a hook belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Before,
    After,
}

/// A middleware: zero, one or both lifecycle hooks.
///
/// ```rust
/// use trowel::Request;
/// use trowel::middleware::{After, Middleware};
///
/// let stamp = Middleware::new()
///     .with_before(|req: &mut Request| req.set_cookie("seen", "1"))
///     .with_after(After(|_req: &mut Request| {}));
/// assert!(stamp.has_before() && stamp.has_after());
/// ```
#[derive(Clone, Default)]
pub struct Middleware {
    before: Option<Arc<dyn BeforeHook>>,
    after: Option<Arc<dyn AfterHook>>,
}

impl Middleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// A middleware whose single type implements both hooks.
    pub fn both<T>(hooks: T) -> Self
    where
        T: BeforeHook + AfterHook + 'static,
    {
        let hooks = Arc::new(hooks);
        Self {
            before: Some(Arc::clone(&hooks) as Arc<dyn BeforeHook>),
            after: Some(hooks as Arc<dyn AfterHook>),
        }
    }

    pub fn with_before(mut self, hook: impl BeforeHook + 'static) -> Self {
        self.before = Some(Arc::new(hook));
        self
    }

    pub fn with_after(mut self, hook: impl AfterHook + 'static) -> Self {
        self.after = Some(Arc::new(hook));
        self
    }

    pub fn has_before(&self) -> bool { self.before.is_some() }
    pub fn has_after(&self) -> bool { self.after.is_some() }

    /// Invokes the hook for `phase`. Returns `false` when this middleware has
    /// no such hook.
    pub fn run(&self, phase: Phase, req: &mut Request) -> bool {
        match phase {
            Phase::Before => self.before.as_ref().map(|h| h.before(req)).is_some(),
            Phase::After => self.after.as_ref().map(|h| h.after(req)).is_some(),
        }
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("before", &self.has_before())
            .field("after", &self.has_after())
            .finish()
    }
}

/// A middleware resolved from the registry, kept with its name for logging.
#[derive(Clone, Debug)]
pub struct Resolved {
    name: String,
    middleware: Arc<Middleware>,
}

impl Resolved {
    pub fn name(&self) -> &str {
        &self.name
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Name → middleware table populated at boot.
#[derive(Clone, Debug, Default)]
pub struct MiddlewareRegistry {
    entries: HashMap<String, Arc<Middleware>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `middleware` under `name`, replacing any earlier entry.
    pub fn register(&mut self, name: impl Into<String>, middleware: Middleware) {
        self.entries.insert(name.into(), Arc::new(middleware));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Resolves `names` in order. Fails on the first unregistered name.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<Resolved>, Error> {
        names.iter()
            .map(|name| {
                self.entries.get(name)
                    .map(|m| Resolved { name: name.clone(), middleware: Arc::clone(m) })
                    .ok_or_else(|| Error::UnknownMiddleware(name.clone()))
            })
            .collect()
    }
}

// ── Runner ────────────────────────────────────────────────────────────────────

/// Runs `phase` for every middleware in `stack`, in order.
pub(crate) fn run_phase(stack: &[Resolved], phase: Phase, req: &mut Request) {
    for entry in stack {
        if !entry.middleware.run(phase, req) {
            debug!(middleware = %entry.name, ?phase, "no hook for phase, skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    #[test]
    fn missing_hooks_are_skipped() {
        let before_only = Middleware::new().with_before(|req: &mut Request| req.redirect("/x"));
        let mut req = Request::new(Method::Get, "/");
        assert!(!before_only.run(Phase::After, &mut req));
        assert_eq!(req.redirect_url(), None);
        assert!(before_only.run(Phase::Before, &mut req));
        assert_eq!(req.redirect_url(), Some("/x"));
    }

    #[test]
    fn resolve_keeps_order_and_rejects_unknown_names() {
        let mut registry = MiddlewareRegistry::new();
        registry.register("a", Middleware::new());
        registry.register("b", Middleware::new());

        let names = ["b".to_owned(), "a".to_owned()];
        let resolved = registry.resolve(&names).unwrap();
        assert_eq!(resolved.iter().map(Resolved::name).collect::<Vec<_>>(), ["b", "a"]);

        match registry.resolve(&["a".to_owned(), "nope".to_owned()]) {
            Err(Error::UnknownMiddleware(name)) => assert_eq!(name, "nope"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    struct Counter;

    impl BeforeHook for Counter {
        fn before(&self, req: &mut Request) { req.set_cookie("phase", "before") }
    }

    impl AfterHook for Counter {
        fn after(&self, req: &mut Request) { req.set_cookie("phase", "after") }
    }

    #[test]
    fn both_shares_one_instance() {
        let mw = Middleware::both(Counter);
        let mut req = Request::new(Method::Get, "/");
        mw.run(Phase::Before, &mut req);
        assert_eq!(req.cookie("phase").as_deref(), Some("before"));
        mw.run(Phase::After, &mut req);
        assert_eq!(req.cookie("phase").as_deref(), Some("after"));
    }
}
