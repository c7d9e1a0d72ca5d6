use tracing::{debug, error};

use crate::{
    context::Context,
    http_helpers::HttpError,
    traits_helpers::middleware::{Middleware, MiddlewareResult, Next},
};

type ErrorCallback = Box<dyn Fn(&anyhow::Error) + Send + Sync>;

/// Catches errors returned from further down the chain.
///
/// An [`HttpError`] sets the response status and message it carries. Any
/// other error becomes `500 Internal Server Error` so internals do not leak to
/// the client. An optional callback sees every caught error.
///
/// Install it near the top of the pipeline, above anything that may fail.
#[derive(Default)]
pub struct ErrorHandler {
    on_error: Option<ErrorCallback>,
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback<F>(on_error: F) -> Self
    where
        F: Fn(&anyhow::Error) + Send + Sync + 'static,
    {
        Self {
            on_error: Some(Box::new(on_error)),
        }
    }
}

impl Middleware for ErrorHandler {
    fn handle(&self, ctx: Context, next: Next) -> MiddlewareResult {
        let Err(err) = next.run() else {
            return Ok(());
        };

        {
            let mut response = ctx.response();
            match err.downcast_ref::<HttpError>() {
                Some(http) => {
                    debug!(status = http.status(), path = ctx.request().path(), "{}", http);
                    response.set_status(http.status()).set_body(http.message());
                }
                None => {
                    error!(path = ctx.request().path(), error = %err, "unhandled error");
                    response.set_status(500).set_body("Internal Server Error");
                }
            }
        }

        if let Some(on_error) = &self.on_error {
            on_error(&err);
        }
        Ok(())
    }
}
