mod chain;
pub(crate) use chain::ChainRun;
pub use chain::MiddlewareChain;

pub mod builtin;
pub use builtin::{AlternateRemoteIp, Batcher, ErrorHandler, RequestLogger};

// Re-export core traits
pub use crate::traits_helpers::middleware::{
    Continuation, FunctionalMiddleware, IntoChain, Middleware, MiddlewareResult, Next,
    ReplayableNext, middleware_fn,
};
