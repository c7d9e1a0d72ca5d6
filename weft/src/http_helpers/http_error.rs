/// An error that knows which HTTP status and message should reach the client.
///
/// Middleware return it (via `?` or `.into()`) to short-circuit a request;
/// the [`ErrorHandler`](crate::middleware::ErrorHandler) turns it into a
/// response. Without an error handler installed it propagates out of the
/// pipeline like any other error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("HTTP Error: {status} - {message}")]
pub struct HttpError {
    status: u16,
    message: String,
}

impl HttpError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(401, "Unauthorized")
    }

    pub fn forbidden() -> Self {
        Self::new(403, "Forbidden")
    }

    pub fn not_found() -> Self {
        Self::new(404, "Not Found")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(405, "Method Not Allowed")
    }

    pub fn too_many_requests() -> Self {
        Self::new(429, "Too Many Requests")
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// The message returned to the client (without the status prefix)
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = HttpError::not_found();
        assert_eq!(err.to_string(), "HTTP Error: 404 - Not Found");
        assert_eq!(err.message(), "Not Found");
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = HttpError::bad_request("missing id").into();
        let http = err.downcast_ref::<HttpError>().unwrap();
        assert_eq!(http.status(), 400);
        assert_eq!(http.message(), "missing id");
    }
}
