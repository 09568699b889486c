//! Per-request context.
//!
//! A [`Request`] is created fresh for every incoming HTTP request and owned
//! by that request's dispatch cycle. Middleware and the matched action all
//! receive it as `&mut Request`: path parameters, the current user, the
//! redirect target and queued cookies live here and nowhere else.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::auth::User;
use crate::container::Container;
use crate::method::Method;

/// An incoming request plus the mutable state accumulated while it is
/// dispatched.
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    body: Bytes,
    params: HashMap<String, String>,
    user: Option<User>,
    redirect: Option<String>,
    // `None` marks a cookie deleted during this request.
    cookie_jar: Vec<(String, Option<String>)>,
    container: Arc<Container>,
}

impl Request {
    /// Builds a request for `method` and `url`. A `?query` suffix is split off
    /// the path, and the path is percent-decoded; a path that does not decode
    /// to UTF-8 is kept as sent.
    ///
    /// ```rust
    /// use trowel::{Method, Request};
    ///
    /// let req = Request::new(Method::Get, "/users/42?tab=posts");
    /// assert_eq!(req.path(), "/users/42");
    /// assert_eq!(req.query(), Some("tab=posts"));
    /// ```
    pub fn new(method: Method, url: &str) -> Self {
        let (raw_path, query) = match url.split_once('?') {
            Some((p, q)) => (p, Some(q.to_owned())),
            None => (url, None),
        };
        let path = urlencoding::decode(raw_path)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| raw_path.to_owned());
        Self {
            method,
            path,
            query,
            headers: Vec::new(),
            body: Bytes::new(),
            params: HashMap::new(),
            user: None,
            redirect: None,
            cookie_jar: Vec::new(),
            container: Arc::new(Container::new()),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub(crate) fn attach(&mut self, container: Arc<Container>) {
        self.container = container;
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    // ── Services ─────────────────────────────────────────────────────────────

    /// The application's service container. Cloning the `Arc` lets a handler
    /// hold services while still mutating the request.
    pub fn container(&self) -> Arc<Container> {
        Arc::clone(&self.container)
    }

    // ── Path parameters ──────────────────────────────────────────────────────

    /// Returns a named path parameter.
    ///
    /// For a route `/users/@id`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Replaces the path parameters with `params`.
    pub fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    // ── Current user ─────────────────────────────────────────────────────────

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    // ── Redirects ────────────────────────────────────────────────────────────

    /// Once set, the matched action is skipped and the response becomes a
    /// `302 Found` to `location`. Middleware still runs.
    pub fn redirect(&mut self, location: impl Into<String>) {
        self.redirect = Some(location.into());
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    // ── Cookies ──────────────────────────────────────────────────────────────

    /// Reads a cookie, preferring values set or deleted during this request
    /// over the incoming `cookie` header.
    pub fn cookie(&self, name: &str) -> Option<String> {
        if let Some((_, value)) = self.cookie_jar.iter().rev().find(|(k, _)| k == name) {
            return value.clone();
        }
        self.headers.iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("cookie"))
            .flat_map(|(_, v)| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_owned())
    }

    pub fn set_cookie(&mut self, name: &str, value: impl Into<String>) {
        self.cookie_jar.push((name.to_owned(), Some(value.into())));
    }

    pub fn delete_cookie(&mut self, name: &str) {
        self.cookie_jar.push((name.to_owned(), None));
    }

    /// Renders queued cookie changes as `set-cookie` header values, last
    /// write per name wins.
    pub(crate) fn take_set_cookies(&mut self) -> Vec<String> {
        let mut latest: Vec<(String, Option<String>)> = Vec::new();
        for (name, value) in self.cookie_jar.drain(..) {
            latest.retain(|(k, _)| *k != name);
            latest.push((name, value));
        }
        latest.into_iter()
            .map(|(name, value)| match value {
                Some(v) => format!("{name}={v}; Path=/; HttpOnly"),
                None => format!("{name}=; Path=/; Max-Age=0; HttpOnly"),
            })
            .collect()
    }
}
