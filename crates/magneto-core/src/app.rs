//! Application: routes, middleware and handler dispatch
//!
//! `App::handle` maps a [`Request`] to a [`Response`] without any I/O, so the
//! server loop and the tests share the same entry point.

use crate::handlers::{self, AppState};
use crate::middleware::{Cors, MiddlewareChain, Tracing};
use crate::probe::{DatabaseResolver, EnvSource, Probe};
use crate::router::RouteMatch;
use crate::{Catalog, Method, Request, Response, Result, Router, Settings};
use std::sync::Arc;

/// Registered endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Hello,
    TestDatabase,
    SearchJobs,
}

impl Route {
    /// The route table served by [`App`]
    pub fn table() -> Router<Route> {
        let mut router = Router::new();
        router
            .get("/", Route::Root)
            .get("/api/hello", Route::Hello)
            .get("/test", Route::TestDatabase)
            .get("/jobs/search", Route::SearchJobs);
        router
    }
}

/// The jobs backend
pub struct App {
    router: Router<Route>,
    middleware: MiddlewareChain,
    state: AppState,
}

impl App {
    /// App with the default middleware: request tracing, then permissive CORS
    pub fn new(state: AppState) -> Self {
        let mut middleware = MiddlewareChain::new();
        middleware.add(Tracing::default());
        middleware.add(Cors::permissive());
        Self::with_middleware(state, middleware)
    }

    pub fn with_middleware(state: AppState, middleware: MiddlewareChain) -> Self {
        Self {
            router: Route::table(),
            middleware,
            state,
        }
    }

    /// App over the sample catalog, probing `resolver` and `env`
    pub fn from_settings(
        settings: &Settings,
        resolver: Arc<dyn DatabaseResolver>,
        env: Arc<dyn EnvSource>,
    ) -> Self {
        Self::new(AppState {
            catalog: Catalog::sample(),
            probe: Probe::new(resolver, env).limits(settings.probe_limits()),
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handle one request
    pub fn handle(&self, mut req: Request) -> Response {
        if let Some((ran, mut res)) = self.middleware.run_before(&mut req) {
            self.middleware.run_after_from(ran, &req, &mut res);
            return res;
        }

        let mut res = match self.router.match_route(req.method, &req.path) {
            RouteMatch::Found(route) => self.dispatch(route, &req).unwrap_or_else(|err| {
                tracing::error!(error = %err, path = %req.path, "handler failed");
                Response::internal_error()
            }),
            RouteMatch::MethodNotAllowed => {
                let allow = self
                    .router
                    .allowed_methods(&req.path)
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut res = Response::method_not_allowed();
                res.headers.push(("allow".to_string(), allow));
                res
            }
            RouteMatch::NotFound => Response::not_found(),
        };

        self.middleware.run_after(&req, &mut res);
        res
    }

    fn dispatch(&self, route: Route, req: &Request) -> Result<Response> {
        match route {
            Route::Root => handlers::root::root(&self.state, req),
            Route::Hello => handlers::root::hello(&self.state, req),
            Route::TestDatabase => handlers::diagnostics::test_database(&self.state, req),
            Route::SearchJobs => handlers::jobs::search(&self.state, req),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}
