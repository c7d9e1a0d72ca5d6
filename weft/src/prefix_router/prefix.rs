use crate::middleware::MiddlewareChain;

/// A path prefix bound to a chain inside a [`PrefixRouter`](super::PrefixRouter)
#[derive(Debug, Clone)]
pub struct Prefix {
    // Always ends with '/'
    prefix: String,
    chain: MiddlewareChain,
}

impl Prefix {
    pub fn new(prefix: &str, chain: MiddlewareChain) -> Self {
        let mut prefix = prefix.to_string();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { prefix, chain }
    }

    /// Boundary-aware prefix test: `/foo` matches `/foo`, `/foo/` and
    /// `/foo/anything` but not `/foobar`.
    pub fn matches(&self, path: &str) -> bool {
        let exact = path.len() + 1 == self.prefix.len() && self.prefix.starts_with(path);
        exact || path.starts_with(&self.prefix)
    }

    /// `path` with this prefix removed, always starting with `/`.
    ///
    /// Only meaningful for paths this prefix [`matches`](Self::matches).
    /// A cascaded binding gets called with whatever path the request had,
    /// in which case the result is whatever is left after cutting off as
    /// many bytes as the prefix is long.
    pub fn sub_path(&self, path: &str) -> String {
        let cut = if path.ends_with('/') {
            self.prefix.len()
        } else {
            self.prefix.len() - 1
        };
        let rest = path.get(cut..).unwrap_or_default();
        if rest.starts_with('/') {
            rest.to_string()
        } else {
            format!("/{rest}")
        }
    }

    pub fn chain(&self) -> &MiddlewareChain {
        &self.chain
    }

    /// The configured prefix, normalized to end with `/`
    pub fn as_str(&self) -> &str {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(p: &str) -> Prefix {
        Prefix::new(p, MiddlewareChain::new())
    }

    #[test]
    fn test_matches() {
        let p = prefix("/foo");

        assert!(!p.matches("/"));

        assert!(p.matches("/foo"));
        assert!(p.matches("/foo/"));
        assert!(p.matches("/foo/bar"));
        assert!(p.matches("/foo/bar/baz"));

        assert!(!p.matches("/bar"));
        assert!(!p.matches("/bar/foo"));
        assert!(!p.matches("/foobar"));
    }

    #[test]
    fn test_sub_path() {
        let p = prefix("/foo");

        assert_eq!(p.sub_path("/foo/bar"), "/bar");
        assert_eq!(p.sub_path("/foo/bar/baz"), "/bar/baz");
        assert_eq!(p.sub_path("/foo/bar/"), "/bar/");
    }

    #[test]
    fn test_root() {
        let p = prefix("/");
        assert!(p.matches("/"));
        assert!(p.matches("/foo"));
        assert!(p.matches("/foo/bar"));

        assert_eq!(p.sub_path("/"), "/");
        assert_eq!(p.sub_path("/foo"), "/foo");
        assert_eq!(p.sub_path("/foo/bar"), "/foo/bar");
    }

    #[test]
    fn test_trailing_slash() {
        let p = prefix("/foo/");

        assert!(p.matches("/foo"));
        assert_eq!(p.sub_path("/foo"), "/");

        assert!(p.matches("/foo/"));
        assert_eq!(p.sub_path("/foo/"), "/");

        assert!(p.matches("/foo/bar"));
        assert_eq!(p.sub_path("/foo/bar"), "/bar");
    }

    #[test]
    fn test_long_prefix() {
        let p = prefix("/foo/bar");

        assert!(p.matches("/foo/bar"));
        assert!(p.matches("/foo/bar/"));
        assert!(p.matches("/foo/bar/baz"));
        assert!(p.matches("/foo/bar/baz/buz"));

        assert_eq!(p.sub_path("/foo/bar/baz"), "/baz");
        assert_eq!(p.sub_path("/foo/bar/baz/buz"), "/baz/buz");
    }

    #[test]
    fn test_sub_path_of_unrelated_path_does_not_panic() {
        let p = prefix("/baz/long/prefix");

        assert_eq!(p.sub_path("/bar"), "/");
        assert_eq!(p.sub_path("/barbazqux/more/stuff"), "/stuff");
    }
}
