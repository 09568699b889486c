//! Authentication.
//!
//! - [`Auth`] logs users in and out for one request, keeping a signed user
//!   id in the `token` cookie.
//! - [`Signer`] produces the tamper-evident tokens used for that cookie and
//!   for email confirmation links.
//! - [`ConfirmController`] completes the email confirmation flow.
//!
//! Where users are stored is not this module's concern: anything
//! implementing [`UserProvider`] will do. [`MemoryUsers`] keeps them in a
//! vector for tests and demos.

mod confirm;
mod password;
mod sign;

pub use confirm::{Confirmation, ConfirmController, Rejection, confirm, verification_link};
pub use password::{DEFAULT_ITERATIONS, PasswordHasher};
pub use sign::{DELIMITER, SignedToken, Signer, identifier, timed_payload};

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::container::Container;
use crate::error::Error;
use crate::request::Request;

/// Name of the cookie carrying the signed user id.
pub const SESSION_COOKIE: &str = "token";

// ── Users ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    /// Password hash as produced by [`PasswordHasher::hash`].
    pub password: String,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Lookup and update operations auth needs from user storage.
pub trait UserProvider: Send + Sync {
    fn find_by_id(&self, id: u64) -> Option<User>;

    /// Finds a user by the login column (email).
    fn find_by_login(&self, login: &str) -> Option<User>;

    /// Stamps `verified_at`. Returns `false` if the user does not exist.
    fn mark_verified(&self, id: u64, at: DateTime<Utc>) -> bool;
}

/// In-process [`UserProvider`]; ids are assigned sequentially from 1.
#[derive(Debug, Default)]
pub struct MemoryUsers {
    users: RwLock<Vec<User>>,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new unverified user. `password` must already be hashed.
    pub fn create(&self, name: &str, email: &str, password: String) -> User {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        let user = User {
            id: users.len() as u64 + 1,
            name: name.to_owned(),
            email: email.to_owned(),
            password,
            verified_at: None,
        };
        users.push(user.clone());
        user
    }
}

impl UserProvider for MemoryUsers {
    fn find_by_id(&self, id: u64) -> Option<User> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        users.iter().find(|u| u.id == id).cloned()
    }

    fn find_by_login(&self, login: &str) -> Option<User> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        users.iter().find(|u| u.email == login).cloned()
    }

    fn mark_verified(&self, id: u64, at: DateTime<Utc>) -> bool {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.verified_at = Some(at);
                true
            }
            None => false,
        }
    }
}

// ── Auth ──────────────────────────────────────────────────────────────────────

/// Request-scoped authentication.
///
/// ```rust
/// # use trowel::auth::{Auth, MemoryUsers, PasswordHasher, Signer};
/// # use trowel::{Method, Request};
/// let users = MemoryUsers::new();
/// let hasher = PasswordHasher::new(1_000);
/// users.create("joe", "joe@example.com", hasher.hash("secret"));
///
/// let signer = Signer::new("key");
/// let mut req = Request::new(Method::Post, "/login");
/// let mut auth = Auth::new(&mut req, &users, &signer, &hasher);
/// assert!(auth.login("joe@example.com", "secret").is_some());
/// assert!(req.cookie("token").is_some());
/// ```
pub struct Auth<'a> {
    req: &'a mut Request,
    users: &'a dyn UserProvider,
    signer: &'a Signer,
    hasher: &'a PasswordHasher,
    once: bool,
}

impl<'a> Auth<'a> {
    pub fn new(
        req: &'a mut Request,
        users: &'a dyn UserProvider,
        signer: &'a Signer,
        hasher: &'a PasswordHasher,
    ) -> Self {
        Self { req, users, signer, hasher, once: false }
    }

    /// Builds an `Auth` from services bound in `container`. Hold the
    /// container `Arc` yourself so it outlives the `Auth`:
    ///
    /// ```rust,ignore
    /// let app = req.container();
    /// let mut auth = Auth::from_container(&app, req)?;
    /// ```
    pub fn from_container(container: &'a Container, req: &'a mut Request) -> Result<Self, Error> {
        let users = container.make::<Arc<dyn UserProvider>>()?;
        Ok(Self::new(
            req,
            &**users,
            container.make::<Signer>()?,
            container.make::<PasswordHasher>()?,
        ))
    }

    /// Authenticates for this request only: no session cookie is set.
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    /// Checks `password` for the user whose login column equals `login`.
    pub fn login(&mut self, login: &str, password: &str) -> Option<User> {
        let user = self.users.find_by_login(login)?;
        if !self.hasher.verify(password, &user.password) {
            debug!(user = user.id, "password mismatch");
            return None;
        }
        Some(self.establish(user))
    }

    pub fn login_by_id(&mut self, id: u64) -> Option<User> {
        let user = self.users.find_by_id(id)?;
        Some(self.establish(user))
    }

    fn establish(&mut self, user: User) -> User {
        if !self.once {
            let token = self.signer.sign(&user.id.to_string());
            self.req.set_cookie(SESSION_COOKIE, token.to_string());
        }
        self.req.set_user(Some(user.clone()));
        user
    }

    /// The current user: the one set on the request, else the one named by a
    /// validly signed session cookie.
    pub fn user(&mut self) -> Option<User> {
        if let Some(user) = self.req.user() {
            return Some(user.clone());
        }
        let token: SignedToken = self.req.cookie(SESSION_COOKIE)?.parse().ok()?;
        let id = self.signer.unsign(&token).ok()?.parse().ok()?;
        let user = self.users.find_by_id(id)?;
        self.req.set_user(Some(user.clone()));
        Some(user)
    }

    /// Clears the session cookie and the request's user.
    pub fn logout(&mut self) {
        self.req.delete_cookie(SESSION_COOKIE);
        self.req.set_user(None);
    }
}
