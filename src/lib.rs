//! # trowel
//!
//! A small web framework: ordered routing with before/after middleware,
//! service providers, and signed-token authentication.
//!
//! ## The request cycle
//!
//! ```text
//! HTTP ─▶ Server ─▶ App::handle ─▶ dispatch ─▶ first route matching URL + method
//!                                     │
//!            global.before → route.before → action → route.after → global.after
//! ```
//!
//! - Routes are plain patterns with `@name` placeholders, compiled to
//!   anchored regexes once at boot and tried in registration order.
//! - Middleware is looked up by name in a registry at boot; a name nobody
//!   registered fails the boot, not a request.
//! - Actions are synchronous functions of `&mut Request`. Async I/O stays in
//!   the server, outside dispatch.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use trowel::auth::{ConfirmController, MemoryUsers};
//! use trowel::provider::{AuthProvider, FrameworkProvider};
//! use trowel::{App, Config, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), trowel::Error> {
//!     let config = Config::new("change-me");
//!     let router = ConfirmController::routes(Router::new())
//!         .get("/users/@id:int", show_user);
//!
//!     let app = App::builder(config.clone())
//!         .provider(FrameworkProvider)
//!         .provider(AuthProvider::new(Arc::new(MemoryUsers::new())))
//!         .routes(router)
//!         .boot()?;
//!
//!     Server::from_config(&config).serve(app).await
//! }
//!
//! fn show_user(req: &mut Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":{id}}}"#).into_bytes())
//! }
//! ```

mod app;
mod compiler;
mod config;
mod container;
mod dispatch;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod route;
mod router;
mod server;

pub mod auth;
pub mod middleware;
pub mod presets;
pub mod provider;

pub use app::{App, AppBuilder};
pub use compiler::{CompiledRoute, compile};
pub use config::Config;
pub use container::Container;
pub use dispatch::{Outcome, dispatch};
pub use error::{Error, TokenError};
pub use handler::Handler;
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use route::Route;
pub use router::{Entry, RouteTable, Router};
pub use server::Server;
