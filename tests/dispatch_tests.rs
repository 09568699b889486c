//! Dispatch behaviour through a booted [`App`]: route selection, middleware
//! ordering, redirects and 404s.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use http::StatusCode;
use trowel::middleware::{After, Middleware};
use trowel::{App, Config, Method, Outcome, Request, Response, Route, Router, dispatch};

type Log = Arc<Mutex<Vec<String>>>;

fn boot(router: Router) -> App {
    App::builder(Config::new("test-key")).routes(router).boot().unwrap()
}

fn counting(hits: &Arc<AtomicUsize>, body: &'static str) -> impl Fn(&mut Request) -> Response + use<> {
    let hits = Arc::clone(hits);
    move |_req: &mut Request| {
        hits.fetch_add(1, Ordering::SeqCst);
        Response::text(body)
    }
}

fn recording(log: &Log, entry: &'static str) -> impl Fn(&mut Request) + Send + Sync + use<> {
    let log = Arc::clone(log);
    move |_req: &mut Request| log.lock().unwrap().push(entry.to_owned())
}

#[test]
fn matching_route_runs_exactly_once_and_alone() {
    let (users, posts, about) = (Arc::default(), Arc::default(), Arc::default());
    let app = boot(
        Router::new()
            .get("/users", counting(&users, "users"))
            .get("/posts", counting(&posts, "posts"))
            .get("/about", counting(&about, "about")),
    );

    let res = app.handle(Request::new(Method::Get, "/posts"));

    assert_eq!(res.body(), b"posts");
    assert_eq!(posts.load(Ordering::SeqCst), 1);
    assert_eq!(users.load(Ordering::SeqCst), 0);
    assert_eq!(about.load(Ordering::SeqCst), 0);
}

#[test]
fn first_registered_route_wins() {
    let (first, second) = (Arc::default(), Arc::default());
    let app = boot(
        Router::new()
            .get("/users/@id", counting(&first, "first"))
            .get("/users/@name", counting(&second, "second")),
    );

    let res = app.handle(Request::new(Method::Get, "/users/joe"));

    assert_eq!(res.body(), b"first");
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

#[test]
fn method_mismatch_keeps_searching() {
    let (post, get) = (Arc::default(), Arc::default());
    let app = boot(
        Router::new()
            .post("/items/@id", counting(&post, "post"))
            .get("/items/@id", counting(&get, "get")),
    );

    assert_eq!(app.handle(Request::new(Method::Get, "/items/5")).body(), b"get");
    assert_eq!(app.handle(Request::new(Method::Post, "/items/5")).body(), b"post");
    assert_eq!(post.load(Ordering::SeqCst), 1);
    assert_eq!(get.load(Ordering::SeqCst), 1);
}

#[test]
fn winning_route_sees_only_its_own_params() {
    let table = Router::new()
        .post("/items/@draft", |_: &mut Request| Response::text("post"))
        .get("/items/@id", |req: &mut Request| {
            format!("{}:{}", req.param("id").unwrap_or("-"), req.param("draft").unwrap_or("-"))
        })
        .compile()
        .unwrap();

    let mut req = Request::new(Method::Get, "/items/9");
    let res = dispatch(&table, &mut req).into_response();
    assert_eq!(res.body(), b"9:-");
    assert_eq!(req.params().keys().collect::<Vec<_>>(), ["id"]);
}

#[test]
fn params_reach_the_action() {
    let app = boot(Router::new().get("/users/@user/posts/@post:int", |req: &mut Request| {
        format!("{}#{}", req.param("user").unwrap_or_default(), req.param("post").unwrap_or_default())
    }));

    assert_eq!(app.handle(Request::new(Method::Get, "/users/joe/posts/12")).body(), b"joe#12");
    assert_eq!(
        app.handle(Request::new(Method::Get, "/users/joe/posts/twelve")).status_code(),
        StatusCode::NOT_FOUND,
    );
}

#[test]
fn percent_encoded_paths_match_decoded() {
    let app = boot(Router::new().get("/users/@name", |req: &mut Request| {
        req.param("name").unwrap_or_default().to_owned()
    }));
    let res = app.handle(Request::new(Method::Get, "/users/jos%C3%A9"));
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), "josé".as_bytes());
}

#[test]
fn options_shortcut_registers_a_route() {
    let app = boot(Router::new().options("/items", |_: &mut Request| StatusCode::NO_CONTENT));
    let res = app.handle(Request::new(Method::Options, "/items"));
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
}

#[test]
fn no_match_is_not_found() {
    let table = Router::new().get("/about", |_: &mut Request| "about").compile().unwrap();

    let mut req = Request::new(Method::Get, "/missing");
    assert!(dispatch(&table, &mut req).is_not_found());

    let mut wrong_method = Request::new(Method::Delete, "/about");
    assert!(matches!(dispatch(&table, &mut wrong_method), Outcome::NotFound));

    let app = boot(Router::new().get("/about", |_: &mut Request| "about"));
    let res = app.handle(Request::new(Method::Get, "/missing"));
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(res.body(), b"Route not found. Error 404");
}

#[test]
fn trailing_slash_follows_the_pattern() {
    let app = boot(
        Router::new()
            .get("/bare", |_: &mut Request| "bare")
            .get("/slashed/", |_: &mut Request| "slashed"),
    );
    let status = |url: &str| app.handle(Request::new(Method::Get, url)).status_code();

    assert_eq!(status("/bare"), StatusCode::OK);
    assert_eq!(status("/bare/"), StatusCode::NOT_FOUND);
    assert_eq!(status("/slashed/"), StatusCode::OK);
    assert_eq!(status("/slashed"), StatusCode::NOT_FOUND);
    assert_eq!(status("/slashed//"), StatusCode::NOT_FOUND);
}

#[test]
fn query_string_does_not_affect_matching() {
    let app = boot(Router::new().get("/search", |req: &mut Request| req.query().unwrap_or("").to_owned()));
    let res = app.handle(Request::new(Method::Get, "/search?q=rust"));
    assert_eq!(res.body(), b"q=rust");
}

#[test]
fn middleware_runs_around_the_action_in_order() {
    let log: Log = Arc::default();
    let action_log = Arc::clone(&log);

    let router = Router::new()
        .register("g1", Middleware::new()
            .with_before(recording(&log, "g1.before"))
            .with_after(After(recording(&log, "g1.after"))))
        .register("g2", Middleware::new()
            .with_before(recording(&log, "g2.before"))
            .with_after(After(recording(&log, "g2.after"))))
        .register("r1", Middleware::new()
            .with_before(recording(&log, "r1.before"))
            .with_after(After(recording(&log, "r1.after"))))
        .register("after-only", Middleware::new().with_after(After(recording(&log, "after-only.after"))))
        .global(["g1", "g2"])
        .route(Route::get("/", move |_: &mut Request| {
            action_log.lock().unwrap().push("action".to_owned());
            "ok"
        }).middleware(["r1", "after-only"]));

    boot(router).handle(Request::new(Method::Get, "/"));

    assert_eq!(*log.lock().unwrap(), [
        "g1.before", "g2.before", "r1.before",
        "action",
        "r1.after", "after-only.after", "g1.after", "g2.after",
    ]);
}

#[test]
fn middleware_does_not_run_without_a_match() {
    let log: Log = Arc::default();
    let router = Router::new()
        .register("g", Middleware::new().with_before(recording(&log, "g.before")))
        .global(["g"])
        .get("/", |_: &mut Request| "ok");

    boot(router).handle(Request::new(Method::Get, "/nowhere"));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn redirect_in_before_middleware_skips_the_action() {
    let hits = Arc::default();
    let log: Log = Arc::default();
    let router = Router::new()
        .register("guard", Middleware::new()
            .with_before(|req: &mut Request| req.redirect("/login"))
            .with_after(After(recording(&log, "guard.after"))))
        .route(Route::get("/admin", counting(&hits, "admin")).middleware(["guard"]));

    let res = boot(router).handle(Request::new(Method::Get, "/admin"));

    assert_eq!(res.status_code(), StatusCode::FOUND);
    assert_eq!(res.header("location"), Some("/login"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(*log.lock().unwrap(), ["guard.after"]);
}

#[test]
fn redirect_set_by_the_action_wins() {
    let app = boot(Router::new().post("/logout", |req: &mut Request| {
        req.redirect("/");
        "ignored"
    }));
    let res = app.handle(Request::new(Method::Post, "/logout"));
    assert_eq!(res.status_code(), StatusCode::FOUND);
    assert_eq!(res.header("location"), Some("/"));
}

#[test]
fn queued_cookies_become_set_cookie_headers() {
    let app = boot(Router::new().get("/", |req: &mut Request| {
        req.set_cookie("lang", "en");
        "ok"
    }));
    let res = app.handle(Request::new(Method::Get, "/"));
    assert_eq!(res.header("set-cookie"), Some("lang=en; Path=/; HttpOnly"));
}

#[test]
fn the_route_table_is_shared_across_threads() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Arc::new(boot(Router::new().get("/users/@id", counting(&hits, "ok"))));

    let handles = (0..8)
        .map(|i| {
            let app = Arc::clone(&app);
            std::thread::spawn(move || app.handle(Request::new(Method::Get, &format!("/users/{i}"))).status_code())
        })
        .collect::<Vec<_>>();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), StatusCode::OK);
    }
    assert_eq!(hits.load(Ordering::SeqCst), 8);
}

#[test]
fn boot_fails_on_unknown_middleware() {
    let err = App::builder(Config::new("k"))
        .routes(Router::new().route(Route::get("/", |_: &mut Request| "ok").middleware(["auth"])))
        .boot()
        .unwrap_err();
    assert!(matches!(err, trowel::Error::UnknownMiddleware(name) if name == "auth"));
}
