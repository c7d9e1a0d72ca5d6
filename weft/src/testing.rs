//! Helpers for testing middleware without a server.
//!
//! ```
//! use weft::testing::{MockRequest, TestMiddleware};
//!
//! let handler = TestMiddleware::new();
//! MockRequest::get("/hello").run(handler.clone()).unwrap();
//! assert!(handler.ran());
//! ```

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::{
    context::Context,
    http_helpers::{Body, HttpMethod, HttpRequest, HttpRequestBuilder},
    traits_helpers::middleware::{IntoChain, Middleware, MiddlewareResult, Next},
};

/// Builds a request, wraps it in a fresh [`Context`] and runs middleware on it
pub struct MockRequest {
    builder: HttpRequestBuilder,
    attributes: Vec<(String, String, Arc<dyn Any + Send + Sync>)>,
}

impl MockRequest {
    pub fn new(method: HttpMethod, uri: &str) -> Self {
        Self {
            builder: HttpRequest::builder(method, uri),
            attributes: Vec::new(),
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(HttpMethod::GET, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(HttpMethod::POST, uri)
    }

    pub fn put(uri: &str) -> Self {
        Self::new(HttpMethod::PUT, uri)
    }

    pub fn delete(uri: &str) -> Self {
        Self::new(HttpMethod::DELETE, uri)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    pub fn remote_ip(mut self, remote_ip: &str) -> Self {
        self.builder = self.builder.remote_ip(remote_ip);
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Pre-populate a context attribute before the chain runs
    pub fn context_attr<T: Send + Sync + 'static>(
        mut self,
        namespace: &str,
        name: &str,
        value: T,
    ) -> Self {
        self.attributes.push((namespace.to_string(), name.to_string(), Arc::new(value)));
        self
    }

    pub fn context(self) -> Context {
        let ctx = Context::new(self.builder.build());
        for (namespace, name, value) in self.attributes {
            ctx.put_shared(&namespace, &name, value);
        }
        ctx
    }

    /// Run `chain` as a whole pipeline and hand back the entry context
    pub fn run(self, chain: impl IntoChain) -> anyhow::Result<Context> {
        let ctx = self.context();
        chain.into_chain().execute(ctx.clone())?;
        Ok(ctx)
    }
}

#[derive(Default)]
struct TestState {
    calls: AtomicUsize,
    last_path: Mutex<Option<String>>,
}

/// Middleware that records its invocations.
///
/// Clones share the same record, so keep a clone to inspect after handing
/// one to a chain. Calls `next` unless told otherwise with
/// [`run_next`](Self::run_next).
#[derive(Clone)]
pub struct TestMiddleware {
    state: Arc<TestState>,
    run_next: bool,
}

impl TestMiddleware {
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            run_next: true,
        }
    }

    pub fn run_next(mut self, run_next: bool) -> Self {
        self.run_next = run_next;
        self
    }

    pub fn ran(&self) -> bool {
        self.count() > 0
    }

    pub fn count(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Request path seen on the most recent call
    pub fn last_path(&self) -> Option<String> {
        self.state.last_path.lock().clone()
    }
}

impl Default for TestMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for TestMiddleware {
    fn handle(&self, ctx: Context, next: Next) -> MiddlewareResult {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        *self.state.last_path.lock() = Some(ctx.request().path().to_string());

        if self.run_next { next.run() } else { Ok(()) }
    }
}
