//! Composable middleware chains with method/path routing and prefix mounting.
//!
//! A request enters wrapped in a [`Context`] and runs through a
//! [`MiddlewareChain`]. Each [`Middleware`] may handle the request, or pass
//! it on by running its [`Next`], optionally with a derived context.
//! [`Router`] and [`PrefixRouter`] are middleware too: they pick a sub-chain
//! for the request or fall through to whatever follows them.
//!
//! ```
//! use weft::{middleware_fn, Context, MiddlewareChain, Next, PrefixRouter, Router};
//! use weft::middleware::{ErrorHandler, RequestLogger};
//! use weft::http_helpers::{HttpMethod, HttpRequest};
//!
//! let mut users = Router::new();
//! users
//!     .get("/:id", middleware_fn(|ctx: Context, _next: Next| {
//!         let id = Router::route_match(&ctx)
//!             .and_then(|m| m.param("id").map(str::to_string))
//!             .unwrap_or_default();
//!         ctx.response().set_body(format!("user {id}"));
//!         Ok(())
//!     }))
//!     .unwrap();
//!
//! let mut api = PrefixRouter::new();
//! api.prefix("/users", users);
//!
//! let app = MiddlewareChain::new()
//!     .with(RequestLogger::new())
//!     .with(ErrorHandler::new())
//!     .with(api);
//!
//! let ctx = Context::new(HttpRequest::builder(HttpMethod::GET, "/users/42").build());
//! app.execute(ctx.clone()).unwrap();
//! assert_eq!(ctx.response().body.as_ref().unwrap().to_text(), "user 42");
//! ```

pub mod context;
pub mod http_helpers;
pub mod middleware;
pub mod prefix_router;
pub mod router;
pub mod traits_helpers;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use context::Context;
pub use http_helpers::{Body, HttpError, HttpMethod, HttpRequest, HttpResponse};
pub use middleware::MiddlewareChain;
pub use prefix_router::PrefixRouter;
pub use router::{RouteError, RouteMatch, Router, SimpleRouter};
pub use traits_helpers::{
    Continuation, IntoChain, Middleware, MiddlewareResult, Next, ReplayableNext, middleware_fn,
};

// Re-export dependencies that appear in public signatures
pub use anyhow;
pub use rustc_hash::FxHashMap;
