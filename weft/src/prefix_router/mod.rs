//! Routing on path prefixes, with optional fallthrough.
//!
//! If a request path starts with one of the configured prefixes, regardless
//! of HTTP method, the associated chain runs with the prefix stripped from the
//! request path. This "mounts" middleware on a sub-path without that
//! middleware needing to know its prefix.
//!
//! With fallthrough enabled, a bound chain that calls `next` hands the request
//! to the **next binding in the list**, whether or not that binding's prefix
//! matches. Given:
//!
//! ```text
//! router.with_fallthrough();
//! router.prefix("/foo", a);   // calls next
//! router.prefix("/bar", b);   // handles the request
//! router.prefix("/baz", c);
//! ```
//!
//! a request for `/foo/stuff.txt` runs `a` and then `b`, both seeing the path
//! `/stuff.txt`; `c` never runs since `b` did not call next.
//!
//! This supports API version rollup, where each version's router only handles
//! endpoints added or changed in that version:
//!
//! ```text
//! router.with_fallthrough();
//! router.prefix("/v2", v2_router);
//! router.prefix("/v1", v1_router);
//! ```
//!
//! A `/v2/...` endpoint the v2 router does not handle is retried against the
//! v1 router with the same stripped path. A `/v1/...` request goes straight
//! to v1.
//!
//! Each binding strips its *own* prefix, even when reached by cascade. For a
//! cascaded binding whose prefix does not match the request that rewritten
//! path is not meaningful.

mod prefix;
pub use self::prefix::Prefix;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::{
    context::Context,
    traits_helpers::middleware::{Continuation, IntoChain, Middleware, MiddlewareResult, Next},
};

#[derive(Debug, Default)]
pub struct PrefixRouter {
    fallthrough: bool,
    prefixes: Vec<Prefix>,
}

impl PrefixRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fallthrough for this router
    pub fn with_fallthrough(mut self) -> Self {
        self.fallthrough = true;
        self
    }

    pub fn set_fallthrough(&mut self, fallthrough: bool) -> &mut Self {
        self.fallthrough = fallthrough;
        self
    }

    pub fn fallthrough(&self) -> bool {
        self.fallthrough
    }

    /// Bind `chain` to `prefix`. Bindings are tried in the order added.
    pub fn prefix(&mut self, prefix: &str, chain: impl IntoChain) -> &mut Self {
        self.prefixes.push(Prefix::new(prefix, chain.into_chain()));
        self
    }

    pub fn prefixes(&self) -> &[Prefix] {
        &self.prefixes
    }

    fn find_matching_index(&self, path: &str) -> Option<usize> {
        self.prefixes.iter().position(|prefix| prefix.matches(path))
    }

    /// Run bindings starting at `index`, cascading by position while
    /// fallthrough is on and each chain calls next. Returns `false` when the
    /// list ran out, i.e. nothing handled the request.
    fn call_from_index(&self, index: usize, path: &str, ctx: &Context) -> anyhow::Result<bool> {
        for (i, prefix) in self.prefixes.iter().enumerate().skip(index) {
            let sub_path = prefix.sub_path(path);
            debug!(
                prefix = prefix.as_str(),
                path,
                sub_path = %sub_path,
                index = i,
                "prefix dispatch"
            );

            let sub_ctx = ctx.with_request(ctx.request().with_path(sub_path));
            let end = Arc::new(EndMarker::default());
            let step: Arc<dyn Continuation> = end.clone();
            let next = Next::new(sub_ctx.clone(), step);
            prefix.chain().handle(sub_ctx, next)?;

            if !(self.fallthrough && end.ran()) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Middleware for PrefixRouter {
    fn handle(&self, ctx: Context, next: Next) -> MiddlewareResult {
        let path = ctx.request().path().to_string();

        let handled = match self.find_matching_index(&path) {
            Some(index) => self.call_from_index(index, &path, &ctx)?,
            None => false,
        };

        if handled {
            Ok(())
        } else {
            debug!(path = %path, "no prefix handled the request");
            next.run()
        }
    }
}

/// Continuation that only records whether a bound chain called next
#[derive(Default)]
struct EndMarker {
    ran: AtomicBool,
}

impl EndMarker {
    fn ran(&self) -> bool {
        self.ran.load(Ordering::Acquire)
    }
}

impl Continuation for EndMarker {
    fn resume(&self, _ctx: Context) -> MiddlewareResult {
        self.ran.store(true, Ordering::Release);
        Ok(())
    }
}
