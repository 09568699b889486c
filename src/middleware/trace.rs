//! Request tracing middleware.

use tracing::info;

use super::{AfterHook, BeforeHook};
use crate::request::Request;

/// Logs each dispatched request on the way in and on the way out.
///
/// Register it globally so it wraps every route:
///
/// ```rust
/// use trowel::Router;
/// use trowel::middleware::{Middleware, Trace};
///
/// let router = Router::new()
///     .register("trace", Middleware::both(Trace))
///     .global(["trace"]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl BeforeHook for Trace {
    fn before(&self, req: &mut Request) {
        info!(method = %req.method(), path = req.path(), "request started");
    }
}

impl AfterHook for Trace {
    fn after(&self, req: &mut Request) {
        info!(
            method = %req.method(),
            path = req.path(),
            redirect = req.redirect_url().unwrap_or("-"),
            "request finished",
        );
    }
}
