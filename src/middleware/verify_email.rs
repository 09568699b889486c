//! Gate for routes that require a confirmed email address.

use super::BeforeHook;
use crate::request::Request;

/// Redirects to the verification notice when the current user has not
/// confirmed their email. Requests without a user pass through untouched;
/// pair it with an authentication middleware that redirects guests.
#[derive(Clone, Debug)]
pub struct VerifyEmail {
    notice: String,
}

impl VerifyEmail {
    pub fn new() -> Self {
        Self { notice: "/email/verify".to_owned() }
    }

    /// Redirect target for unverified users.
    pub fn notice(mut self, location: impl Into<String>) -> Self {
        self.notice = location.into();
        self
    }
}

impl Default for VerifyEmail {
    fn default() -> Self { Self::new() }
}

impl BeforeHook for VerifyEmail {
    fn before(&self, req: &mut Request) {
        if req.user().is_some_and(|u| u.verified_at.is_none()) {
            req.redirect(self.notice.clone());
        }
    }
}
