//! Minimal trowel app: login, a gated dashboard and email confirmation.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! The confirmation link for the seeded user is logged at startup. Try:
//!   curl -i -X POST http://localhost:8000/login -d 'email=joe@example.com&password=secret'
//!   curl -i http://localhost:8000/dashboard --cookie 'token=<from set-cookie>'
//!   curl -i http://localhost:8000/email/verify/<token from the log>

use std::sync::Arc;

use chrono::Utc;
use http::StatusCode;
use tracing::info;
use trowel::auth::{Auth, ConfirmController, MemoryUsers, PasswordHasher, Signer, verification_link};
use trowel::middleware::{Authenticate, Middleware, Trace, VerifyEmail};
use trowel::provider::{AuthProvider, FrameworkProvider};
use trowel::{App, Config, Request, Response, Route, Router, Server};

#[tokio::main]
async fn main() -> Result<(), trowel::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::new("demo-key").overlay(|name| std::env::var(name).ok());

    let users = Arc::new(MemoryUsers::new());
    let joe = users.create(
        "joe",
        "joe@example.com",
        PasswordHasher::new(config.password_iterations).hash("secret"),
    );
    let link = verification_link(&Signer::new(&config.key), "http://localhost:8000", joe.id, Utc::now());
    info!(%link, "confirmation link for joe@example.com");

    let router = ConfirmController::routes(Router::new())
        .register("trace",    Middleware::both(Trace))
        .register("auth",     Middleware::new().with_before(Authenticate::new()))
        .register("verified", Middleware::new().with_before(VerifyEmail::new()))
        .global(["trace"])
        .post("/login",  login)
        .post("/logout", logout)
        .route(Route::get("/dashboard", dashboard).middleware(["auth", "verified"]));

    let app = App::builder(config.clone())
        .provider(FrameworkProvider)
        .provider(AuthProvider::new(users))
        .routes(router)
        .boot()?;

    Server::from_config(&config).serve(app).await
}

// POST /login, urlencoded form body `email=..&password=..`
fn login(req: &mut Request) -> Response {
    let form = String::from_utf8_lossy(req.body()).into_owned();
    let field = |key: &str| {
        form.split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| urlencoding::decode(&v.replace('+', " ")).ok().map(|v| v.into_owned()))
            .unwrap_or_default()
    };
    let (email, password) = (field("email"), field("password"));

    let app = req.container();
    let Ok(mut auth) = Auth::from_container(&app, req) else {
        return Response::status(StatusCode::INTERNAL_SERVER_ERROR);
    };
    match auth.login(&email, &password) {
        Some(_) => Response::redirect("/dashboard"),
        None => Response::status(StatusCode::UNAUTHORIZED),
    }
}

// POST /logout
fn logout(req: &mut Request) -> Response {
    let app = req.container();
    if let Ok(mut auth) = Auth::from_container(&app, req) {
        auth.logout();
    }
    Response::redirect("/login")
}

// GET /dashboard, behind `auth` and `verified`
fn dashboard(req: &mut Request) -> Response {
    let name = req.user().map_or("stranger", |u| u.name.as_str());
    Response::html(format!("<h1>Welcome back, {name}</h1>"))
}
