pub mod middleware;
pub use self::middleware::{
    Continuation, FunctionalMiddleware, IntoChain, Middleware, MiddlewareResult, Next,
    ReplayableNext, middleware_fn,
};
