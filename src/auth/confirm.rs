//! Email confirmation.
//!
//! A confirmation link carries a signed `"{user id}::{issued at}"` payload
//! in its last path segment. Following it moves the confirmation from
//! pending to exactly one terminal state:
//!
//! ```text
//! Pending ──valid signature, within window, user exists──▶ Verified
//!    └─────bad signature │ expired │ unknown user─────────▶ Rejected
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

use super::sign::{SignedToken, Signer, identifier, timed_payload};
use super::{User, UserProvider};
use crate::config::{Config, DEFAULT_TOKEN_WINDOW_SECS};
use crate::error::TokenError;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Why a confirmation was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Rejection {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("no such user")]
    UnknownUser,
}

/// Terminal state of a confirmation attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Confirmation {
    Verified(User),
    Rejected(Rejection),
}

/// Builds the absolute confirmation link for `user_id`, valid from `now`.
///
/// ```rust
/// use trowel::auth::{Signer, verification_link};
///
/// let link = verification_link(&Signer::new("key"), "https://example.com/", 1, chrono::Utc::now());
/// assert!(link.starts_with("https://example.com/email/verify/"));
/// ```
pub fn verification_link(signer: &Signer, base_url: &str, user_id: u64, now: DateTime<Utc>) -> String {
    let token = signer.sign(&timed_payload(user_id, now));
    format!("{}/email/verify/{token}", base_url.trim_end_matches('/'))
}

/// Runs the confirmation state machine for the wire-encoded `token`.
///
/// A user who is already verified keeps their original `verified_at`.
pub fn confirm(
    signer: &Signer,
    users: &dyn UserProvider,
    token: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> Confirmation {
    match check(signer, users, token, now, window) {
        Ok(user) => Confirmation::Verified(user),
        Err(rejection) => Confirmation::Rejected(rejection),
    }
}

fn check(
    signer: &Signer,
    users: &dyn UserProvider,
    token: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<User, Rejection> {
    let token: SignedToken = token.parse()?;
    let payload = signer.verify(&token, now, window)?;
    let id: u64 = identifier(payload)?.parse().map_err(|_| TokenError::Malformed)?;
    let mut user = users.find_by_id(id).ok_or(Rejection::UnknownUser)?;
    if user.verified_at.is_none() {
        users.mark_verified(id, now);
        user.verified_at = Some(now);
    }
    Ok(user)
}

/// Routes for the confirmation flow.
pub struct ConfirmController;

impl ConfirmController {
    /// Adds `GET /email/verify` and `GET /email/verify/@id` to `router`.
    pub fn routes(router: Router) -> Router {
        router
            .get("/email/verify", Self::verify_show)
            .get("/email/verify/@id", Self::confirm_email)
    }

    /// Notice shown to users who still have to confirm their address.
    pub fn verify_show(_req: &mut Request) -> Response {
        Response::view("auth/verify")
    }

    /// Verifies the token in the `id` parameter. Renders `confirm` on
    /// success and `error` on any rejection.
    pub fn confirm_email(req: &mut Request) -> Response {
        let app = req.container();
        let (signer, users) = match (app.make::<Signer>(), app.make::<Arc<dyn UserProvider>>()) {
            (Ok(signer), Ok(users)) => (signer, users),
            (Err(e), _) | (_, Err(e)) => {
                error!("confirmation unavailable: {e}");
                return Response::status(http::StatusCode::INTERNAL_SERVER_ERROR);
            }
        };
        let window = app.get::<Config>()
            .map(Config::token_window)
            .unwrap_or(Duration::from_secs(DEFAULT_TOKEN_WINDOW_SECS));

        let token = req.param("id").unwrap_or_default();
        match confirm(signer, &**users, token, Utc::now(), window) {
            Confirmation::Verified(user) => {
                info!(user = user.id, "email confirmed");
                req.set_user(Some(user));
                Response::view("confirm")
            }
            Confirmation::Rejected(reason) => {
                warn!(%reason, "email confirmation rejected");
                Response::view("error")
            }
        }
    }
}
