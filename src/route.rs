//! Route definitions.

use std::fmt;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// One registered route: method, URL pattern, action and the names of the
/// middleware that wrap it.
///
/// Immutable once handed to a [`Router`](crate::Router). The pattern is
/// compiled when the application boots.
///
/// ```rust
/// use trowel::{Request, Response, Route};
///
/// fn show(req: &mut Request) -> Response {
///     Response::text(req.param("id").unwrap_or_default().to_owned())
/// }
///
/// let route = Route::get("/users/@id", show).middleware(["auth"]);
/// assert_eq!(route.url(), "/users/@id");
/// ```
#[derive(Clone)]
pub struct Route {
    method: Method,
    url: String,
    action: BoxedHandler,
    middleware: Vec<String>,
}

impl Route {
    pub fn new(method: Method, url: &str, action: impl Handler) -> Self {
        Self {
            method,
            url: url.to_owned(),
            action: action.into_boxed_handler(),
            middleware: Vec::new(),
        }
    }

    pub fn get(url: &str, action: impl Handler) -> Self { Self::new(Method::Get, url, action) }
    pub fn post(url: &str, action: impl Handler) -> Self { Self::new(Method::Post, url, action) }
    pub fn put(url: &str, action: impl Handler) -> Self { Self::new(Method::Put, url, action) }
    pub fn patch(url: &str, action: impl Handler) -> Self { Self::new(Method::Patch, url, action) }
    pub fn delete(url: &str, action: impl Handler) -> Self { Self::new(Method::Delete, url, action) }
    pub fn options(url: &str, action: impl Handler) -> Self { Self::new(Method::Options, url, action) }

    /// Appends route-level middleware, run after the global stack on the way
    /// in and before it on the way out.
    pub fn middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn url(&self) -> &str { &self.url }
    pub fn middleware_names(&self) -> &[String] { &self.middleware }

    pub(crate) fn action(&self) -> &BoxedHandler {
        &self.action
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}
