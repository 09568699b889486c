//! Application bootstrap and the per-request entry point.

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::container::Container;
use crate::dispatch::dispatch;
use crate::error::Error;
use crate::provider::ServiceProvider;
use crate::request::Request;
use crate::response::Response;
use crate::router::{RouteTable, Router};

/// A booted application: services bound, routes compiled, nothing left to
/// mutate. Share it behind an `Arc`; [`Server::serve`](crate::Server::serve)
/// does.
#[derive(Debug)]
pub struct App {
    container: Arc<Container>,
    routes: RouteTable,
}

impl App {
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder { config, providers: Vec::new(), router: Router::new() }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Runs one request through dispatch and renders the outcome. Cookies
    /// queued on the request are attached to whatever response results,
    /// including a 404.
    pub fn handle(&self, mut req: Request) -> Response {
        req.attach(Arc::clone(&self.container));
        let mut res = dispatch(&self.routes, &mut req).into_response();
        for cookie in req.take_set_cookies() {
            res.append_header("set-cookie", cookie);
        }
        res
    }
}

pub struct AppBuilder {
    config: Config,
    providers: Vec<Box<dyn ServiceProvider>>,
    router: Router,
}

impl AppBuilder {
    pub fn provider(mut self, provider: impl ServiceProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn routes(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// Validates the config, registers then boots every provider in order,
    /// and compiles the route table.
    pub fn boot(self) -> Result<App, Error> {
        self.config.validate()?;

        let mut container = Container::new();
        container.bind(self.config);
        for provider in &self.providers {
            provider.register(&mut container)?;
        }
        for provider in &self.providers {
            provider.boot(&container)?;
        }

        let routes = self.router.compile()?;
        info!(
            providers = self.providers.len(),
            routes = routes.len(),
            services = container.len(),
            "application booted",
        );
        Ok(App { container: Arc::new(container), routes })
    }
}
