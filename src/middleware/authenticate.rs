//! Gate for routes that require a signed-in user.

use tracing::error;

use super::BeforeHook;
use crate::auth::Auth;
use crate::request::Request;

/// Loads the current user from the session cookie and redirects guests to
/// the login page.
#[derive(Clone, Debug)]
pub struct Authenticate {
    login: String,
}

impl Authenticate {
    pub fn new() -> Self {
        Self { login: "/login".to_owned() }
    }

    /// Redirect target for guests.
    pub fn login(mut self, location: impl Into<String>) -> Self {
        self.login = location.into();
        self
    }
}

impl Default for Authenticate {
    fn default() -> Self { Self::new() }
}

impl BeforeHook for Authenticate {
    fn before(&self, req: &mut Request) {
        let app = req.container();
        let signed_in = match Auth::from_container(&app, req) {
            Ok(mut auth) => auth.user().is_some(),
            Err(e) => {
                error!("authentication unavailable: {e}");
                false
            }
        };
        if !signed_in {
            req.redirect(self.login.clone());
        }
    }
}
