//! Per-request state threaded through a middleware pipeline.

mod attributes;
pub use self::attributes::Attributes;

use std::any::Any;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::http_helpers::{HttpRequest, HttpResponse};

/// One request/response pair plus its attribute store.
///
/// A `Context` is created once when a request enters the pipeline and lives
/// for exactly that request. Cloning is cheap and every clone observes the
/// same response and attributes.
///
/// Components that want downstream middleware to see a different request
/// never mutate the request in place; they call
/// [`with_request`](Self::with_request) and pass the derived context on.
/// The derived context keeps the response and the attribute store, so
/// attributes set before a path rewrite remain visible after it.
#[derive(Clone, Debug)]
pub struct Context {
    request: Arc<HttpRequest>,
    response: Arc<Mutex<HttpResponse>>,
    attributes: Arc<Mutex<Attributes>>,
}

impl Context {
    /// Wrap a request with an empty (200, no body) response
    pub fn new(request: HttpRequest) -> Self {
        Self::with_response(request, HttpResponse::new())
    }

    pub fn with_response(request: HttpRequest, response: HttpResponse) -> Self {
        Self {
            request: Arc::new(request),
            response: Arc::new(Mutex::new(response)),
            attributes: Arc::new(Mutex::new(Attributes::new())),
        }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Lock the response for reading or writing.
    ///
    /// Drop the guard before calling `next`; downstream middleware lock the
    /// same response.
    pub fn response(&self) -> MutexGuard<'_, HttpResponse> {
        self.response.lock()
    }

    /// Snapshot of the response as it stands now
    pub fn response_snapshot(&self) -> HttpResponse {
        self.response.lock().clone()
    }

    /// Derive a context that reports `request` but shares this context's
    /// response and attributes. `self` is left untouched.
    pub fn with_request(&self, request: HttpRequest) -> Context {
        Context {
            request: Arc::new(request),
            response: Arc::clone(&self.response),
            attributes: Arc::clone(&self.attributes),
        }
    }

    /// Store an attribute, overwriting any previous value for the key
    pub fn put<T: Send + Sync + 'static>(&self, namespace: &str, name: &str, value: T) {
        self.attributes.lock().insert(namespace, name, value);
    }

    pub(crate) fn put_shared(
        &self,
        namespace: &str,
        name: &str,
        value: Arc<dyn Any + Send + Sync>,
    ) {
        self.attributes.lock().insert_shared(namespace, name, value);
    }

    /// Read an attribute; `None` when it is absent or not a `T`
    pub fn get<T: Send + Sync + 'static>(&self, namespace: &str, name: &str) -> Option<Arc<T>> {
        self.attributes.lock().get(namespace, name)
    }

    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.attributes.lock().contains(namespace, name)
    }

    pub fn remove(&self, namespace: &str, name: &str) -> bool {
        self.attributes.lock().remove(namespace, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_helpers::HttpMethod;

    fn context(path: &str) -> Context {
        Context::new(HttpRequest::builder(HttpMethod::GET, path).build())
    }

    #[test]
    fn test_attributes_survive_derivation() {
        let ctx = context("/foo/bar");
        ctx.put("foo", "bar", "baz".to_string());

        let derived = ctx.with_request(ctx.request().with_path("/bar"));

        assert_eq!(*derived.get::<String>("foo", "bar").unwrap(), "baz");
        assert_eq!(derived.request().path(), "/bar");
        assert_eq!(ctx.request().path(), "/foo/bar");
    }

    #[test]
    fn test_derived_context_shares_response_and_attributes() {
        let ctx = context("/");
        let derived = ctx.with_request(ctx.request().with_path("/other"));

        derived.response().set_status(404);
        derived.put("ns", "written", true);

        assert_eq!(ctx.response().status, 404);
        assert!(*ctx.get::<bool>("ns", "written").unwrap());
    }

    #[test]
    fn test_get_type_mismatch_is_absent() {
        let ctx = context("/");
        ctx.put("ns", "count", 3usize);

        assert!(ctx.get::<i64>("ns", "count").is_none());
        assert_eq!(*ctx.get::<usize>("ns", "count").unwrap(), 3);
    }

    #[test]
    fn test_remove() {
        let ctx = context("/");
        ctx.put("ns", "key", 1u8);

        assert!(ctx.contains("ns", "key"));
        assert!(ctx.remove("ns", "key"));
        assert!(!ctx.contains("ns", "key"));
    }
}
