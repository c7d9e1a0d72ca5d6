use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    context::Context,
    http_helpers::HttpMethod,
    middleware::MiddlewareChain,
    traits_helpers::middleware::{IntoChain, Middleware, MiddlewareResult, Next},
};

/// Router that only supports exact path matching.
///
/// If a path is matched, middleware following the router will not be
/// called; otherwise it falls through to the next middleware. Registering the
/// same method and path twice replaces the earlier chain.
#[derive(Debug, Default)]
pub struct SimpleRouter {
    routes: FxHashMap<HttpMethod, FxHashMap<String, MiddlewareChain>>,
}

impl SimpleRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_route(
        &mut self,
        method: HttpMethod,
        path: &str,
        chain: impl IntoChain,
    ) -> &mut Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path.to_string(), chain.into_chain());
        self
    }

    pub fn get(&mut self, path: &str, chain: impl IntoChain) -> &mut Self {
        self.add_route(HttpMethod::GET, path, chain)
    }

    pub fn put(&mut self, path: &str, chain: impl IntoChain) -> &mut Self {
        self.add_route(HttpMethod::PUT, path, chain)
    }

    pub fn post(&mut self, path: &str, chain: impl IntoChain) -> &mut Self {
        self.add_route(HttpMethod::POST, path, chain)
    }

    pub fn delete(&mut self, path: &str, chain: impl IntoChain) -> &mut Self {
        self.add_route(HttpMethod::DELETE, path, chain)
    }
}

impl Middleware for SimpleRouter {
    fn handle(&self, ctx: Context, next: Next) -> MiddlewareResult {
        let request = ctx.request();
        let chain = self
            .routes
            .get(&request.method())
            .and_then(|paths| paths.get(request.path()));

        match chain {
            Some(chain) => chain.execute(ctx),
            None => {
                debug!(method = %request.method(), path = request.path(), "no exact route");
                next.run()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockRequest, TestMiddleware};

    #[test]
    fn test_exact_match_only() {
        let mut router = SimpleRouter::new();
        let foo = TestMiddleware::new();
        router.get("/foo", foo.clone());

        let after = TestMiddleware::new();
        let router = std::sync::Arc::new(router);

        MockRequest::get("/foo/bar")
            .run((std::sync::Arc::clone(&router), after.clone()))
            .unwrap();
        assert!(!foo.ran());
        assert!(after.ran());

        MockRequest::get("/foo")
            .run((router, after.clone()))
            .unwrap();
        assert!(foo.ran());
        assert_eq!(after.count(), 1);
    }

    #[test]
    fn test_method_must_match() {
        let mut router = SimpleRouter::new();
        let created = TestMiddleware::new();
        router.post("/items", created.clone());

        let after = TestMiddleware::new();
        MockRequest::get("/items")
            .run((router, after.clone()))
            .unwrap();

        assert!(!created.ran());
        assert!(after.ran());
    }

    #[test]
    fn test_reregistering_replaces() {
        let mut router = SimpleRouter::new();
        let old = TestMiddleware::new();
        let new = TestMiddleware::new();
        router.get("/x", old.clone()).get("/x", new.clone());

        MockRequest::get("/x").run(router).unwrap();

        assert!(!old.ran());
        assert!(new.ran());
    }
}
