use std::fmt;
use std::sync::Arc;

use crate::{
    context::Context,
    traits_helpers::middleware::{Continuation, Middleware, MiddlewareResult, Next, Step},
};

/// One execution of a chain: the middleware and where to go after the last.
///
/// Every `Next` handed out during the run points into the same `ChainRun`
/// by position, so a run costs one allocation however long the chain is.
pub(crate) struct ChainRun {
    middleware_stack: Arc<[Arc<dyn Middleware>]>,
    tail: Step,
}

impl ChainRun {
    pub(crate) fn resume_at(run: &Arc<Self>, index: usize, ctx: Context) -> MiddlewareResult {
        match run.middleware_stack.get(index) {
            Some(middleware) => {
                let next = Next::at(ctx.clone(), Step::Chain(Arc::clone(run), index + 1));
                middleware.handle(ctx, next)
            }
            None => run.tail.resume(ctx),
        }
    }
}

/// Ordered middleware, run front to back through positional continuations.
///
/// A chain is itself [`Middleware`]: used inside another chain it runs its
/// own elements and then resumes the outer chain, so nesting chains behaves
/// the same as concatenating their middleware.
#[derive(Clone)]
pub struct MiddlewareChain {
    middleware_stack: Arc<[Arc<dyn Middleware>]>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::from(Vec::<Arc<dyn Middleware>>::new())
    }

    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        let mut middleware_stack = self.middleware_stack.to_vec();
        middleware_stack.push(middleware);
        self.middleware_stack = middleware_stack.into();
        self
    }

    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.use_middleware(Arc::new(middleware));
        self
    }

    /// Run the chain as a whole pipeline; the last element's `next` is a no-op
    pub fn execute(&self, ctx: Context) -> MiddlewareResult {
        self.run(ctx, Step::End)
    }

    /// Run the chain, resuming `tail` if the last element calls `next`
    pub fn execute_with(&self, ctx: Context, tail: Arc<dyn Continuation>) -> MiddlewareResult {
        self.run(ctx, Step::Resume(tail))
    }

    fn run(&self, ctx: Context, tail: Step) -> MiddlewareResult {
        let run = Arc::new(ChainRun {
            middleware_stack: Arc::clone(&self.middleware_stack),
            tail,
        });
        ChainRun::resume_at(&run, 0, ctx)
    }

    pub fn len(&self) -> usize {
        self.middleware_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware_stack.is_empty()
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for MiddlewareChain {
    fn handle(&self, ctx: Context, next: Next) -> MiddlewareResult {
        self.run(ctx, next.into_step())
    }
}

impl From<Vec<Arc<dyn Middleware>>> for MiddlewareChain {
    fn from(middleware_stack: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            middleware_stack: middleware_stack.into(),
        }
    }
}

impl FromIterator<Arc<dyn Middleware>> for MiddlewareChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Middleware>>>(iter: I) -> Self {
        Self {
            middleware_stack: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("len", &self.middleware_stack.len())
            .finish()
    }
}
