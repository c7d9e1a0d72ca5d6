use std::collections::HashMap;
use std::sync::Arc;

use super::{Body, HttpMethod};

/// A fully parsed inbound request.
///
/// Requests are immutable once built. Components that need downstream
/// middleware to see something different (a stripped path, a proxied client
/// IP) derive a modified copy with [`with_path`](Self::with_path) or
/// [`with_remote_ip`](Self::with_remote_ip) and hand it on through a new
/// [`Context`](crate::Context). The body is shared between copies.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    method: HttpMethod,
    path: String,
    headers: Vec<(String, String)>,
    query_params: HashMap<String, String>,
    remote_ip: String,
    body: Arc<Body>,
}

impl HttpRequest {
    pub fn builder(method: HttpMethod, uri: &str) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, uri)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get a reference to the headers
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Get a specific header value by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check if a header exists
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn remote_ip(&self) -> &str {
        &self.remote_ip
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Copy of this request reporting a different path
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..self.clone()
        }
    }

    /// Copy of this request reporting a different client address
    pub fn with_remote_ip(&self, remote_ip: impl Into<String>) -> Self {
        Self {
            remote_ip: remote_ip.into(),
            ..self.clone()
        }
    }
}

pub struct HttpRequestBuilder {
    method: HttpMethod,
    path: String,
    headers: Vec<(String, String)>,
    query_params: HashMap<String, String>,
    remote_ip: String,
    body: Body,
}

impl HttpRequestBuilder {
    /// Start a request for `uri`; a `?query` suffix is split off and decoded
    /// into query parameters.
    pub fn new(method: HttpMethod, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, query),
            None => (uri, ""),
        };

        // Form decoding into owned strings is lossy rather than fallible
        let query_params: Vec<(String, String)> =
            serde_urlencoded::from_str(query).unwrap_or_default();

        Self {
            method,
            path: path.to_string(),
            headers: Vec::new(),
            query_params: query_params.into_iter().collect(),
            remote_ip: "127.0.0.1".to_string(),
            body: Body::Empty,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn remote_ip(mut self, remote_ip: impl Into<String>) -> Self {
        self.remote_ip = remote_ip.into();
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            path: self.path,
            headers: self.headers,
            query_params: self.query_params,
            remote_ip: self.remote_ip,
            body: Arc::new(self.body),
        }
    }
}
