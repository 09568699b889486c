//! The dispatch loop: one request in, one outcome out.
//!
//! For each route, in registration order:
//!
//! 1. Match the URL against the compiled pattern.
//! 2. On a URL match, replace the request's parameters with the captures,
//!    even if the method turns out not to match. The winner therefore sees
//!    only its own placeholders.
//! 3. On a URL *and* method match the route wins: global before-hooks, route
//!    before-hooks, the action (unless a redirect is already set), route
//!    after-hooks, global after-hooks. Nothing further is tried.
//!
//! No winner is [`Outcome::NotFound`], a normal result and not an error.

use tracing::info;

use crate::middleware::{Phase, run_phase};
use crate::request::Request;
use crate::response::Response;
use crate::router::RouteTable;

/// What dispatch produced for a request.
#[derive(Debug)]
pub enum Outcome {
    /// A route won. Holds the action's response, or a `302` when a redirect
    /// was set by middleware or the action.
    Matched(Response),
    NotFound,
}

impl Outcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn into_response(self) -> Response {
        match self {
            Self::Matched(res) => res,
            Self::NotFound => Response::not_found(),
        }
    }
}

/// Routes `req` through `table`. See the module docs for the exact sequence.
pub fn dispatch(table: &RouteTable, req: &mut Request) -> Outcome {
    for entry in table.entries() {
        let Some(params) = entry.compiled().captures(req.path()) else {
            continue;
        };
        req.set_params(params);

        if entry.route().method() != req.method() {
            continue;
        }

        run_phase(table.global(), Phase::Before, req);
        info!(method = %req.method(), url = req.path(), "route matched");
        run_phase(entry.middleware(), Phase::Before, req);

        let response = match req.redirect_url() {
            None => Some(entry.route().action().call(req)),
            Some(_) => None,
        };

        run_phase(entry.middleware(), Phase::After, req);
        run_phase(table.global(), Phase::After, req);

        return match (req.redirect_url(), response) {
            (Some(location), _) => Outcome::Matched(Response::redirect(location)),
            (None, Some(res)) => Outcome::Matched(res),
            (None, None) => unreachable!("a redirect is never cleared once set"),
        };
    }
    Outcome::NotFound
}
