//! Request batching.
//!
//! A `POST` to the batch path (`/batch` by default) carries a list of
//! requests. The rest of the chain after the [`Batcher`] runs once per
//! sub-request, each with its own fresh context, and the responses come back
//! together in one JSON body. Middleware after the batcher need no batching
//! awareness at all.
//!
//! Request body:
//!
//! ```json
//! {"requests": [
//!     {"method": "GET", "path": "/users/1", "queryParams": {"full": "true"},
//!      "headers": {"Accept": "text/plain"}, "body": null}
//! ]}
//! ```
//!
//! Response body:
//!
//! ```json
//! {"responses": [{"status": 200, "headers": {}, "body": "..."}]}
//! ```
//!
//! Where the batcher sits matters. Install it before the router so each
//! sub-request is routed, and before the error handler so failures are
//! reported per sub-request. Sub-request contexts carry the
//! `batcher`/`originalRequest` and `batcher`/`batchId` attributes; the batch
//! ID is shared by every sub-request of one batch.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{
    context::Context,
    http_helpers::{HttpMethod, HttpRequest},
    traits_helpers::middleware::{Middleware, MiddlewareResult, Next, ReplayableNext},
};

/// Attribute namespace used by the batcher
pub const NS: &str = "batcher";
/// Attribute holding the batch request itself
pub const ORIGINAL_REQUEST: &str = "originalRequest";
/// Attribute holding the ID shared by all sub-requests of a batch
pub const BATCH_ID: &str = "batchId";

const DEFAULT_PATH: &str = "/batch";

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("malformed batch body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("unsupported method '{0}' in batch")]
    Method(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub query_params: HashMap<String, String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl BatchRequest {
    /// Build the sub-request; the client address is inherited from `parent`
    fn as_sub_request(&self, parent: &HttpRequest) -> Result<HttpRequest, BatchError> {
        let method = HttpMethod::from_string(&self.method)
            .ok_or_else(|| BatchError::Method(self.method.clone()))?;

        let mut builder = HttpRequest::builder(method, &self.path).remote_ip(parent.remote_ip());
        for (name, value) in &self.query_params {
            builder = builder.query_param(name, value);
        }
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &self.body {
            builder = builder.body(body.as_str());
        }
        Ok(builder.build())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequestList {
    pub requests: Vec<BatchRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponseList {
    pub responses: Vec<BatchResponse>,
}

#[derive(Debug, Clone)]
pub struct Batcher {
    path: String,
}

impl Batcher {
    pub fn new() -> Self {
        Self::with_path(DEFAULT_PATH)
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The batch request a sub-request came from
    pub fn original_request(ctx: &Context) -> Option<Arc<HttpRequest>> {
        ctx.get::<HttpRequest>(NS, ORIGINAL_REQUEST)
    }

    pub fn batch_id(ctx: &Context) -> Option<Arc<String>> {
        ctx.get::<String>(NS, BATCH_ID)
    }

    fn parse(&self, request: &HttpRequest) -> Result<Vec<HttpRequest>, BatchError> {
        let list: BatchRequestList = request.body().parse_json()?;
        list.requests
            .iter()
            .map(|sub| sub.as_sub_request(request))
            .collect()
    }

    fn handle_sub_request(
        &self,
        request: HttpRequest,
        original: &Arc<HttpRequest>,
        batch_id: &str,
        next: &ReplayableNext,
    ) -> anyhow::Result<BatchResponse> {
        let ctx = Context::new(request);
        ctx.put_shared(NS, ORIGINAL_REQUEST, original.clone());
        ctx.put(NS, BATCH_ID, batch_id.to_string());

        next.run_with(ctx.clone())?;

        let response = ctx.response_snapshot();
        Ok(BatchResponse {
            status: response.status,
            headers: response.headers.into_iter().collect(),
            body: response.body.map(|body| body.to_text()).unwrap_or_default(),
        })
    }
}

impl Default for Batcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for Batcher {
    fn handle(&self, ctx: Context, next: Next) -> MiddlewareResult {
        let request = ctx.request();
        if request.method() != HttpMethod::POST || request.path() != self.path {
            return next.run();
        }

        let sub_requests = match self.parse(request) {
            Ok(sub_requests) => sub_requests,
            Err(err) => {
                debug!(error = %err, "rejecting batch request");
                ctx.response().set_status(400).set_body("Bad batch request");
                return Ok(());
            }
        };

        let batch_id = Uuid::new_v4().to_string();
        let original = Arc::new(request.clone());
        let next = next.into_replayable();
        debug!(batch_id = %batch_id, size = sub_requests.len(), "running batch");

        let mut responses = Vec::with_capacity(sub_requests.len());
        for sub_request in sub_requests {
            responses.push(self.handle_sub_request(sub_request, &original, &batch_id, &next)?);
        }

        let body = serde_json::to_value(BatchResponseList { responses })?;
        ctx.response()
            .set_status(200)
            .set_header("Content-Type", "application/json")
            .set_body(body);
        Ok(())
    }
}
