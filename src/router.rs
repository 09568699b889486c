//! Ordered request router.
//!
//! Routes are tried in registration order and the first one whose pattern
//! matches the URL *and* whose method matches the request wins. There is no
//! specificity ranking: register `/users/new` before `/users/@id` if both
//! should be reachable.
//!
//! [`Router`] is the builder you hand to the application. At boot it becomes
//! a [`RouteTable`]: patterns compiled, middleware names resolved, nothing
//! mutable left. The table is shared by every request.

use std::collections::HashMap;

use crate::compiler::{CompiledRoute, compile};
use crate::error::Error;
use crate::handler::Handler;
use crate::method::Method;
use crate::middleware::{Middleware, MiddlewareRegistry, Resolved};
use crate::route::Route;

/// The application router.
///
/// Each builder call returns `self` so registrations chain naturally:
///
/// ```rust
/// # use trowel::{Request, Response, Route, Router};
/// # fn list(_: &mut Request) -> Response { Response::text("") }
/// # fn show(_: &mut Request) -> Response { Response::text("") }
/// # fn create(_: &mut Request) -> Response { Response::text("") }
/// use trowel::middleware::{Middleware, Trace};
///
/// let router = Router::new()
///     .register("trace", Middleware::both(Trace))
///     .global(["trace"])
///     .get("/users",      list)
///     .get("/users/@id",  show)
///     .route(Route::post("/users", create));
/// ```
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
    global: Vec<String>,
    registry: MiddlewareRegistry,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fully-built [`Route`].
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    pub fn on(self, method: Method, url: &str, action: impl Handler) -> Self {
        self.route(Route::new(method, url, action))
    }

    pub fn get(self, url: &str, action: impl Handler) -> Self { self.on(Method::Get, url, action) }
    pub fn post(self, url: &str, action: impl Handler) -> Self { self.on(Method::Post, url, action) }
    pub fn put(self, url: &str, action: impl Handler) -> Self { self.on(Method::Put, url, action) }
    pub fn patch(self, url: &str, action: impl Handler) -> Self { self.on(Method::Patch, url, action) }
    pub fn delete(self, url: &str, action: impl Handler) -> Self { self.on(Method::Delete, url, action) }
    pub fn options(self, url: &str, action: impl Handler) -> Self { self.on(Method::Options, url, action) }

    /// Makes `middleware` available under `name` to routes and the global stack.
    pub fn register(mut self, name: &str, middleware: Middleware) -> Self {
        self.registry.register(name, middleware);
        self
    }

    /// Appends names to the global stack that wraps every matched route.
    pub fn global<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.global.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Compiles every pattern and resolves every middleware name.
    pub fn compile(self) -> Result<RouteTable, Error> {
        let global = self.registry.resolve(&self.global)?;
        let entries = self.routes.into_iter()
            .map(|route| {
                let compiled = compile(route.url())?;
                let middleware = self.registry.resolve(route.middleware_names())?;
                Ok(Entry { route, compiled, middleware })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(RouteTable { entries, global })
    }
}

// ── RouteTable ────────────────────────────────────────────────────────────────

/// A route with its compiled matcher and resolved middleware.
#[derive(Debug)]
pub struct Entry {
    route: Route,
    compiled: CompiledRoute,
    middleware: Vec<Resolved>,
}

impl Entry {
    pub fn route(&self) -> &Route { &self.route }
    pub fn compiled(&self) -> &CompiledRoute { &self.compiled }
    pub fn middleware(&self) -> &[Resolved] { &self.middleware }
}

/// The immutable, compiled route table produced by [`Router::compile`].
#[derive(Debug)]
pub struct RouteTable {
    entries: Vec<Entry>,
    global: Vec<Resolved>,
}

impl RouteTable {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn global(&self) -> &[Resolved] {
        &self.global
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First route matching both `url` and `method`, with its parameters.
    ///
    /// Pure lookup: unlike dispatch, parameters from URL-only matches are not
    /// collected.
    pub fn find(&self, method: Method, url: &str) -> Option<(&Entry, HashMap<String, String>)> {
        self.entries.iter()
            .filter(|e| e.route.method() == method)
            .find_map(|e| e.compiled.captures(url).map(|params| (e, params)))
    }
}
