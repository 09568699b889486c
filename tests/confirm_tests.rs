//! Email confirmation end to end: boot with the framework and auth
//! providers, then follow signed links through `App::handle`.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use http::StatusCode;
use trowel::auth::{ConfirmController, MemoryUsers, PasswordHasher, Signer, UserProvider, timed_payload};
use trowel::middleware::{Authenticate, Middleware, VerifyEmail};
use trowel::provider::{AuthProvider, FrameworkProvider};
use trowel::{App, Config, Method, Request, Route, Router};

const KEY: &str = "confirm-test-key";

struct Fixture {
    app: App,
    users: Arc<MemoryUsers>,
    signer: Signer,
}

fn fixture() -> Fixture {
    let mut config = Config::new(KEY);
    config.password_iterations = 1_000;

    let users = Arc::new(MemoryUsers::new());
    users.create("joe", "joe@example.com", PasswordHasher::new(1_000).hash("secret"));

    let router = ConfirmController::routes(Router::new())
        .register("auth", Middleware::new().with_before(Authenticate::new()))
        .register("verified", Middleware::new().with_before(VerifyEmail::new()))
        .route(Route::get("/dashboard", |_: &mut Request| "dashboard").middleware(["auth", "verified"]));

    let app = App::builder(config)
        .provider(FrameworkProvider)
        .provider(AuthProvider::new(Arc::clone(&users) as Arc<dyn UserProvider>))
        .routes(router)
        .boot()
        .unwrap();

    Fixture { app, users, signer: Signer::new(KEY) }
}

impl Fixture {
    fn link(&self, issued_at: chrono::DateTime<Utc>) -> String {
        let token = self.signer.sign(&timed_payload(1, issued_at));
        format!("/email/verify/{token}")
    }

    fn get(&self, url: &str) -> trowel::Response {
        self.app.handle(Request::new(Method::Get, url))
    }

    fn session(&self) -> String {
        format!("token={}", self.signer.sign("1"))
    }
}

#[test]
fn fresh_token_confirms_the_user() {
    let fx = fixture();

    let res = fx.get(&fx.link(Utc::now()));

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.rendered_template(), Some("confirm"));
    assert!(fx.users.find_by_id(1).unwrap().verified_at.is_some());
}

#[test]
fn token_inside_the_window_confirms() {
    let fx = fixture();
    let res = fx.get(&fx.link(Utc::now() - TimeDelta::minutes(9)));
    assert_eq!(res.rendered_template(), Some("confirm"));
}

#[test]
fn expired_token_renders_error() {
    let fx = fixture();

    let res = fx.get(&fx.link(Utc::now() - TimeDelta::minutes(11)));

    assert_eq!(res.rendered_template(), Some("error"));
    assert!(fx.users.find_by_id(1).unwrap().verified_at.is_none());
}

#[test]
fn token_signed_with_another_key_renders_error() {
    let fx = fixture();
    let forged = Signer::new("someone-else").sign(&timed_payload(1, Utc::now()));

    let res = fx.get(&format!("/email/verify/{forged}"));

    assert_eq!(res.rendered_template(), Some("error"));
    assert!(fx.users.find_by_id(1).unwrap().verified_at.is_none());
}

#[test]
fn unknown_user_renders_error() {
    let fx = fixture();
    let token = fx.signer.sign(&timed_payload(42, Utc::now()));
    assert_eq!(fx.get(&format!("/email/verify/{token}")).rendered_template(), Some("error"));
}

#[test]
fn garbage_token_renders_error() {
    let fx = fixture();
    assert_eq!(fx.get("/email/verify/not-a-token").rendered_template(), Some("error"));
}

#[test]
fn verification_notice_has_its_own_route() {
    let fx = fixture();
    assert_eq!(fx.get("/email/verify").rendered_template(), Some("auth/verify"));
}

#[test]
fn guests_are_sent_to_login() {
    let fx = fixture();
    let res = fx.get("/dashboard");
    assert_eq!(res.status_code(), StatusCode::FOUND);
    assert_eq!(res.header("location"), Some("/login"));
}

#[test]
fn forged_session_cookie_is_a_guest() {
    let fx = fixture();
    let cookie = format!("token={}", Signer::new("someone-else").sign("1"));
    let res = fx.app.handle(Request::new(Method::Get, "/dashboard").with_header("cookie", &cookie));
    assert_eq!(res.header("location"), Some("/login"));
}

#[test]
fn unverified_users_are_sent_to_the_notice_until_confirmed() {
    let fx = fixture();
    let dashboard = || {
        fx.app.handle(Request::new(Method::Get, "/dashboard").with_header("cookie", &fx.session()))
    };

    let before = dashboard();
    assert_eq!(before.status_code(), StatusCode::FOUND);
    assert_eq!(before.header("location"), Some("/email/verify"));

    assert_eq!(fx.get(&fx.link(Utc::now())).rendered_template(), Some("confirm"));

    let after = dashboard();
    assert_eq!(after.status_code(), StatusCode::OK);
    assert_eq!(after.body(), b"dashboard");
}

#[test]
fn confirming_twice_keeps_the_first_timestamp() {
    let fx = fixture();

    fx.get(&fx.link(Utc::now()));
    let first = fx.users.find_by_id(1).unwrap().verified_at;
    fx.get(&fx.link(Utc::now()));

    assert!(first.is_some());
    assert_eq!(fx.users.find_by_id(1).unwrap().verified_at, first);
}

#[test]
fn boot_fails_without_a_key() {
    let err = App::builder(Config::new(""))
        .provider(FrameworkProvider)
        .boot()
        .unwrap_err();
    assert!(matches!(err, trowel::Error::Config(_)));
}

#[test]
fn auth_provider_needs_the_framework_services() {
    let err = App::builder(Config::new(KEY))
        .provider(AuthProvider::new(Arc::new(MemoryUsers::new())))
        .boot()
        .unwrap_err();
    assert!(matches!(err, trowel::Error::MissingService(_)));
}
