use crate::{
    context::Context,
    traits_helpers::middleware::{Middleware, MiddlewareResult, Next},
};

type IpGetter = Box<dyn Fn(&Context) -> Option<String> + Send + Sync>;

/// Reports a different client address to the rest of the chain.
///
/// Useful behind a load balancer or proxy that passes the real client IP some
/// other way, typically a header. When no alternate address is available the
/// request passes through unchanged.
pub struct AlternateRemoteIp {
    ip_getter: IpGetter,
}

impl AlternateRemoteIp {
    /// Use whatever `ip_getter` returns; `None` keeps the original address
    pub fn new<F>(ip_getter: F) -> Self
    where
        F: Fn(&Context) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            ip_getter: Box::new(ip_getter),
        }
    }

    /// Use the value of the `header` request header, when present
    pub fn from_header(header: impl Into<String>) -> Self {
        let header = header.into();
        Self::new(move |ctx| ctx.request().header(&header).map(str::to_string))
    }
}

impl Middleware for AlternateRemoteIp {
    fn handle(&self, ctx: Context, next: Next) -> MiddlewareResult {
        match (self.ip_getter)(&ctx) {
            Some(ip) => {
                let derived = ctx.with_request(ctx.request().with_remote_ip(ip));
                next.run_with(derived)
            }
            None => next.run(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockRequest, TestMiddleware};
    use crate::traits_helpers::middleware::middleware_fn;

    fn capture_ip() -> (TestMiddleware, impl Middleware) {
        let seen = TestMiddleware::new();
        let record = middleware_fn(|ctx: Context, next: Next| {
            ctx.put("test", "ip", ctx.request().remote_ip().to_string());
            next.run()
        });
        (seen, record)
    }

    #[test]
    fn test_header_overrides_ip() {
        let (seen, record) = capture_ip();

        let ctx = MockRequest::get("/")
            .remote_ip("10.0.0.1")
            .header("X-Real-IP", "203.0.113.7")
            .run((AlternateRemoteIp::from_header("x-real-ip"), record, seen.clone()))
            .unwrap();

        assert!(seen.ran());
        assert_eq!(*ctx.get::<String>("test", "ip").unwrap(), "203.0.113.7");
        // The entry request is not modified in place
        assert_eq!(ctx.request().remote_ip(), "10.0.0.1");
    }

    #[test]
    fn test_missing_header_keeps_ip() {
        let (seen, record) = capture_ip();

        let ctx = MockRequest::get("/")
            .remote_ip("10.0.0.1")
            .run((AlternateRemoteIp::from_header("X-Real-IP"), record, seen.clone()))
            .unwrap();

        assert!(seen.ran());
        assert_eq!(*ctx.get::<String>("test", "ip").unwrap(), "10.0.0.1");
    }

    #[test]
    fn test_custom_getter() {
        let (_, record) = capture_ip();
        let first_hop = AlternateRemoteIp::new(|ctx| {
            ctx.request()
                .header("X-Forwarded-For")
                .and_then(|v| v.split(',').next())
                .map(|ip| ip.trim().to_string())
        });

        let ctx = MockRequest::get("/")
            .header("X-Forwarded-For", "198.51.100.2, 10.0.0.9")
            .run((first_hop, record))
            .unwrap();

        assert_eq!(*ctx.get::<String>("test", "ip").unwrap(), "198.51.100.2");
    }
}
