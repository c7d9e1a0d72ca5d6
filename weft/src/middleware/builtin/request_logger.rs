use std::time::Instant;

use tracing::{info, warn};

use crate::{
    context::Context,
    traits_helpers::middleware::{Middleware, MiddlewareResult, Next},
};

/// Emits one `info` event per request with status, method, path, client
/// address and elapsed time.
///
/// Install it first so every request is logged and the timing covers the
/// whole pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogger;

impl RequestLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for RequestLogger {
    fn handle(&self, ctx: Context, next: Next) -> MiddlewareResult {
        let start = Instant::now();
        let result = next.run();
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let status = ctx.response().status;
        let request = ctx.request();
        match &result {
            Ok(()) => info!(
                status,
                method = %request.method(),
                path = request.path(),
                remote_ip = request.remote_ip(),
                elapsed_ms,
                "request"
            ),
            Err(err) => warn!(
                status,
                method = %request.method(),
                path = request.path(),
                remote_ip = request.remote_ip(),
                elapsed_ms,
                error = %err,
                "request failed"
            ),
        }

        result
    }
}
