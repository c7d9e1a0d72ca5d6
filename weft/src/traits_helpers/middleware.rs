use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::middleware::{ChainRun, MiddlewareChain};

/// Result type for middleware chain execution.
///
/// Errors are never caught by the chain or the routers; they propagate to
/// whatever wraps the outermost chain (typically an
/// [`ErrorHandler`](crate::middleware::ErrorHandler)).
pub type MiddlewareResult = anyhow::Result<()>;

/// "The rest of the pipeline", resumable with a given context
pub trait Continuation: Send + Sync {
    fn resume(&self, ctx: Context) -> MiddlewareResult;
}

/// Core middleware trait
pub trait Middleware: Send + Sync {
    /// Process the request and optionally call `next`.
    ///
    /// Returning without running `next` makes this middleware terminal for the
    /// request: nothing later in the chain runs.
    fn handle(&self, ctx: Context, next: Next) -> MiddlewareResult;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn handle(&self, ctx: Context, next: Next) -> MiddlewareResult {
        (**self).handle(ctx, next)
    }
}

impl<M: Middleware + ?Sized> Middleware for Box<M> {
    fn handle(&self, ctx: Context, next: Next) -> MiddlewareResult {
        (**self).handle(ctx, next)
    }
}

/// Where a `Next` resumes
#[derive(Clone)]
pub(crate) enum Step {
    /// Nothing left to run
    End,
    Resume(Arc<dyn Continuation>),
    /// Position inside a running chain
    Chain(Arc<ChainRun>, usize),
}

impl Step {
    pub(crate) fn resume(&self, ctx: Context) -> MiddlewareResult {
        match self {
            Step::End => Ok(()),
            Step::Resume(continuation) => continuation.resume(ctx),
            Step::Chain(run, index) => ChainRun::resume_at(run, *index, ctx),
        }
    }
}

/// Single-use handle on the remainder of the chain.
///
/// `run` and `run_with` consume the handle, so a middleware activation can
/// resume the chain at most once. Dropping it without running is how a
/// middleware ends the request.
pub struct Next {
    ctx: Context,
    step: Step,
}

impl Next {
    pub fn new(ctx: Context, continuation: Arc<dyn Continuation>) -> Self {
        Self::at(ctx, Step::Resume(continuation))
    }

    /// A `Next` that does nothing when run
    pub fn terminal(ctx: Context) -> Self {
        Self::at(ctx, Step::End)
    }

    pub(crate) fn at(ctx: Context, step: Step) -> Self {
        Self { ctx, step }
    }

    /// The context the chain resumes with on [`run`](Self::run)
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Resume the chain with the context this middleware was called with
    pub fn run(self) -> MiddlewareResult {
        self.step.resume(self.ctx)
    }

    /// Resume the chain, letting downstream middleware observe `ctx` instead
    pub fn run_with(self, ctx: Context) -> MiddlewareResult {
        self.step.resume(ctx)
    }

    /// Give up single-use semantics for a handle that can resume the chain
    /// any number of times. Only fan-out middleware (request batching) needs
    /// this.
    pub fn into_replayable(self) -> ReplayableNext {
        ReplayableNext { step: self.step }
    }

    pub(crate) fn into_step(self) -> Step {
        self.step
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("path", &self.ctx.request().path())
            .finish_non_exhaustive()
    }
}

/// Reusable handle on the remainder of a chain, see [`Next::into_replayable`]
#[derive(Clone)]
pub struct ReplayableNext {
    step: Step,
}

impl ReplayableNext {
    pub fn run_with(&self, ctx: Context) -> MiddlewareResult {
        self.step.resume(ctx)
    }
}

/// Functional middleware - simpler alternative using closures
pub struct FunctionalMiddleware<F> {
    handler: F,
}

impl<F> FunctionalMiddleware<F>
where
    F: Fn(Context, Next) -> MiddlewareResult + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> Middleware for FunctionalMiddleware<F>
where
    F: Fn(Context, Next) -> MiddlewareResult + Send + Sync,
{
    fn handle(&self, ctx: Context, next: Next) -> MiddlewareResult {
        (self.handler)(ctx, next)
    }
}

/// Wrap a closure as middleware.
///
/// ```
/// use weft::{middleware_fn, Context, Next};
///
/// let hello = middleware_fn(|ctx: Context, _next: Next| {
///     ctx.response().set_body("hello");
///     Ok(())
/// });
/// # let _ = hello;
/// ```
pub fn middleware_fn<F>(handler: F) -> FunctionalMiddleware<F>
where
    F: Fn(Context, Next) -> MiddlewareResult + Send + Sync,
{
    FunctionalMiddleware::new(handler)
}

/// Anything that can be bound to a route or prefix: a single middleware, a
/// tuple of middleware run in order, or a prepared list.
pub trait IntoChain {
    fn into_chain(self) -> MiddlewareChain;
}

impl<M: Middleware + 'static> IntoChain for M {
    fn into_chain(self) -> MiddlewareChain {
        MiddlewareChain::new().with(self)
    }
}

impl IntoChain for Vec<Arc<dyn Middleware>> {
    fn into_chain(self) -> MiddlewareChain {
        MiddlewareChain::from(self)
    }
}

macro_rules! impl_into_chain_for_tuple {
    ($($name:ident),+) => {
        impl<$($name),+> IntoChain for ($($name,)+)
        where
            $($name: Middleware + 'static),+
        {
            #[allow(non_snake_case)]
            fn into_chain(self) -> MiddlewareChain {
                let ($($name,)+) = self;
                MiddlewareChain::new()$(.with($name))+
            }
        }
    };
}

impl_into_chain_for_tuple!(A, B);
impl_into_chain_for_tuple!(A, B, C);
impl_into_chain_for_tuple!(A, B, C, D);
impl_into_chain_for_tuple!(A, B, C, D, E);
impl_into_chain_for_tuple!(A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_helpers::{HttpMethod, HttpRequest};
    use crate::testing::{MockRequest, TestMiddleware};

    fn context(path: &str) -> Context {
        Context::new(HttpRequest::builder(HttpMethod::GET, path).build())
    }

    #[test]
    fn test_terminal_next_is_noop() {
        let next = Next::terminal(context("/"));
        assert_eq!(next.context().request().path(), "/");
        next.run().unwrap();
    }

    #[test]
    fn test_run_with_substitutes_context() {
        let seen = TestMiddleware::new();
        let chain = seen.clone().into_chain();

        let ctx = context("/original");
        let next = Next::new(ctx.clone(), Arc::new(ChainStep(chain)));
        next.run_with(ctx.with_request(ctx.request().with_path("/derived")))
            .unwrap();

        assert_eq!(seen.last_path().as_deref(), Some("/derived"));
    }

    #[test]
    fn test_replayable_runs_repeatedly() {
        let seen = TestMiddleware::new();
        let next = Next::new(context("/"), Arc::new(ChainStep(seen.clone().into_chain())));

        let replayable = next.into_replayable();
        replayable.run_with(context("/a")).unwrap();
        replayable.run_with(context("/b")).unwrap();

        assert_eq!(seen.count(), 2);
        assert_eq!(seen.last_path().as_deref(), Some("/b"));
    }

    #[test]
    fn test_into_chain_for_tuples_and_vecs() {
        let a = TestMiddleware::new();
        let b = TestMiddleware::new();
        assert_eq!((a.clone(), b.clone(), a.clone()).into_chain().len(), 3);

        let list: Vec<Arc<dyn Middleware>> = vec![Arc::new(a.clone()), Arc::new(b.clone())];
        MockRequest::get("/").run(list).unwrap();

        assert_eq!(a.count(), 1);
        assert_eq!(b.count(), 1);
    }

    struct ChainStep(MiddlewareChain);

    impl Continuation for ChainStep {
        fn resume(&self, ctx: Context) -> MiddlewareResult {
            self.0.execute(ctx)
        }
    }
}
