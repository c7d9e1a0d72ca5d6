//! Method and path routing.
//!
//! Path parameters are indicated by a path segment starting with a colon:
//! `/users/:user/preferences` matches `/users/alice/preferences` and captures
//! `"alice"` as `user`. Captures are stored in the context attribute
//! `router`/`match` as a [`RouteMatch`].
//!
//! If a route matching the request is found, its chain runs and the router
//! does **not** call the middleware installed after it. If nothing matches,
//! the router calls `next`, so later routers or middleware can try.
//!
//! ```
//! use weft::{middleware_fn, Context, Next, Router};
//!
//! let mut router = Router::new();
//! router
//!     .get("/users/:user/preferences", middleware_fn(|ctx: Context, _next: Next| {
//!         if let Some(found) = Router::route_match(&ctx) {
//!             let user = found.param("user").unwrap_or_default();
//!             ctx.response().set_body(format!("preferences for {user}"));
//!         }
//!         Ok(())
//!     }))
//!     .unwrap();
//! ```

mod route;
pub use self::route::{PARAM_SIGIL, Route, RouteError};

mod route_match;
pub use self::route_match::{ParamError, RouteMatch};

mod simple_router;
pub use self::simple_router::SimpleRouter;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    context::Context,
    http_helpers::HttpMethod,
    traits_helpers::middleware::{IntoChain, Middleware, MiddlewareResult, Next},
};

/// Attribute namespace used by the router
pub const NS: &str = "router";
/// Attribute holding the [`RouteMatch`] of the current request
pub const MATCH: &str = "match";
/// Attribute holding the request path as it was before a mount stripped it
pub const ORIGINAL_PATH: &str = "originalPath";

#[derive(Debug, Default)]
pub struct Router {
    /// Routes for every method, mounts included; always tried first
    any: Vec<Arc<Route>>,

    /// Method -> routes, in registration order
    routes: FxHashMap<HttpMethod, Vec<Arc<Route>>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_route(
        &mut self,
        method: HttpMethod,
        path: &str,
        chain: impl IntoChain,
    ) -> Result<&mut Self, RouteError> {
        let route = Route::new(path, chain.into_chain())?;
        self.routes
            .entry(method)
            .or_default()
            .push(Arc::new(route));
        Ok(self)
    }

    pub fn get(&mut self, path: &str, chain: impl IntoChain) -> Result<&mut Self, RouteError> {
        self.add_route(HttpMethod::GET, path, chain)
    }

    pub fn put(&mut self, path: &str, chain: impl IntoChain) -> Result<&mut Self, RouteError> {
        self.add_route(HttpMethod::PUT, path, chain)
    }

    pub fn post(&mut self, path: &str, chain: impl IntoChain) -> Result<&mut Self, RouteError> {
        self.add_route(HttpMethod::POST, path, chain)
    }

    pub fn delete(&mut self, path: &str, chain: impl IntoChain) -> Result<&mut Self, RouteError> {
        self.add_route(HttpMethod::DELETE, path, chain)
    }

    pub fn patch(&mut self, path: &str, chain: impl IntoChain) -> Result<&mut Self, RouteError> {
        self.add_route(HttpMethod::PATCH, path, chain)
    }

    /// Route `path` for every method
    pub fn all(&mut self, path: &str, chain: impl IntoChain) -> Result<&mut Self, RouteError> {
        let route = Route::new(path, chain.into_chain())?;
        self.any.push(Arc::new(route));
        Ok(self)
    }

    /// Mount a chain under `prefix` for every method.
    ///
    /// The mounted chain sees the request path with the prefix removed; the
    /// full path stays available through [`Router::original_path`].
    /// Parameter segments are not allowed in a prefix.
    pub fn mount(&mut self, prefix: &str, chain: impl IntoChain) -> Result<&mut Self, RouteError> {
        let route = Route::prefix(prefix, chain.into_chain())?;
        self.any.push(Arc::new(route));
        Ok(self)
    }

    /// First route matching the request, any-method routes before the
    /// method's own, each list in registration order
    pub fn find(&self, method: HttpMethod, path: &str) -> Option<RouteMatch> {
        let method_routes = self
            .routes
            .get(&method)
            .map(Vec::as_slice)
            .unwrap_or_default();

        self.any.iter().chain(method_routes).find_map(|route| {
            route
                .matches(path)
                .map(|params| RouteMatch::new(Arc::clone(route), params))
        })
    }

    /// The match recorded for the current request, if a router matched it
    pub fn route_match(ctx: &Context) -> Option<Arc<RouteMatch>> {
        ctx.get::<RouteMatch>(NS, MATCH)
    }

    /// The request path before the innermost mount stripped its prefix
    pub fn original_path(ctx: &Context) -> Option<Arc<String>> {
        ctx.get::<String>(NS, ORIGINAL_PATH)
    }

    pub fn len(&self) -> usize {
        self.any.len() + self.routes.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Middleware for Router {
    fn handle(&self, ctx: Context, next: Next) -> MiddlewareResult {
        let request = ctx.request();
        let Some(found) = self.find(request.method(), request.path()) else {
            debug!(method = %request.method(), path = request.path(), "no route matched");
            return next.run();
        };

        let route = Arc::clone(found.route_arc());
        debug!(
            method = %request.method(),
            path = request.path(),
            route = route.path(),
            "route matched"
        );
        ctx.put(NS, MATCH, found);

        if !route.is_prefix() {
            return route.chain().execute(ctx);
        }

        let original = request.path().to_string();
        let mounted = ctx.with_request(request.with_path(route.strip_prefix(&original)));
        ctx.put(NS, ORIGINAL_PATH, original);
        route.chain().execute(mounted)
    }
}
