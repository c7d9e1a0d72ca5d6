use std::fmt;

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::middleware::MiddlewareChain;

/// Marks a path segment as a named parameter: `/users/:id`
pub const PARAM_SIGIL: char = ':';

/// Problems detected while registering routes. Never raised per request.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("prefix route '{path}' cannot contain path parameter '{param}'")]
    ParamInPrefix { path: String, param: String },

    #[error("route '{path}' declares path parameter '{param}' more than once")]
    DuplicateParam { path: String, param: String },

    #[error("route '{path}' does not compile to a valid pattern: {source}")]
    InvalidPattern {
        path: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled path pattern bound to a chain.
///
/// Plain routes match the whole request path; parameter segments capture any
/// run of characters other than `/`, including none. Prefix routes (mounts)
/// match their declared path exactly or followed by `/` and anything else.
/// Literal segments are matched verbatim: a `.` in a declared path only
/// matches a `.`.
pub struct Route {
    path: String,
    pattern: Regex,
    param_names: Vec<String>,
    chain: MiddlewareChain,
    // Declared path without trailing slash; `Some` only for prefix routes
    mount_point: Option<String>,
}

impl Route {
    pub fn new(path: &str, chain: MiddlewareChain) -> Result<Self, RouteError> {
        let mut param_names: Vec<String> = Vec::new();
        let mut parts = Vec::new();
        for segment in segments(path) {
            let Some(name) = segment.strip_prefix(PARAM_SIGIL) else {
                parts.push(regex::escape(segment));
                continue;
            };
            if param_names.iter().any(|seen| seen == name) {
                return Err(RouteError::DuplicateParam {
                    path: path.to_string(),
                    param: name.to_string(),
                });
            }
            param_names.push(name.to_string());
            parts.push("([^/]*)".to_string());
        }

        let regex = format!("^/{}$", parts.join("/"));
        Ok(Self {
            path: path.to_string(),
            pattern: compile(path, &regex)?,
            param_names,
            chain,
            mount_point: None,
        })
    }

    /// A route matching `path` and everything beneath it
    pub fn prefix(path: &str, chain: MiddlewareChain) -> Result<Self, RouteError> {
        let segments = segments(path);
        if let Some(param) = segments.iter().find(|s| s.starts_with(PARAM_SIGIL)) {
            return Err(RouteError::ParamInPrefix {
                path: path.to_string(),
                param: param.to_string(),
            });
        }

        // Mounting at "/" leaves an empty base so every path matches
        let mount_point = match segments.as_slice() {
            [""] => String::new(),
            _ => format!("/{}", segments.join("/")),
        };
        let regex = format!("(?s)^{}(?:/.*)?$", regex::escape(&mount_point));

        Ok(Self {
            path: path.to_string(),
            pattern: compile(path, &regex)?,
            param_names: Vec::new(),
            chain,
            mount_point: Some(mount_point),
        })
    }

    /// The path as declared at registration
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parameter names in declaration order
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn is_prefix(&self) -> bool {
        self.mount_point.is_some()
    }

    pub fn chain(&self) -> &MiddlewareChain {
        &self.chain
    }

    /// Full-string match of `path`, returning captured parameters by name
    /// (empty for literal and prefix routes).
    pub fn matches(&self, path: &str) -> Option<FxHashMap<String, String>> {
        let captures = self.pattern.captures(path)?;
        Some(
            self.param_names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let value = captures.get(i + 1).map_or("", |m| m.as_str());
                    (name.clone(), value.to_string())
                })
                .collect(),
        )
    }

    /// The part of a matched `path` below this route's mount point.
    ///
    /// An exact match on the mount point becomes `/`, so the mounted chain
    /// always sees an absolute path. Plain routes return `path` unchanged.
    pub fn strip_prefix<'a>(&self, path: &'a str) -> &'a str {
        let Some(mount_point) = &self.mount_point else {
            return path;
        };
        match path.get(mount_point.len()..) {
            Some(rest) if rest.starts_with('/') => rest,
            _ => "/",
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("pattern", &self.pattern.as_str())
            .field("param_names", &self.param_names)
            .field("prefix", &self.is_prefix())
            .finish()
    }
}

/// Declared path split on `/`, ignoring the leading slash and any trailing ones
fn segments(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let mut segments: Vec<&str> = trimmed.split('/').collect();
    while segments.len() > 1 && segments.last() == Some(&"") {
        segments.pop();
    }
    segments
}

fn compile(path: &str, regex: &str) -> Result<Regex, RouteError> {
    Regex::new(regex).map_err(|source| RouteError::InvalidPattern {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(path: &str) -> Route {
        Route::new(path, MiddlewareChain::new()).unwrap()
    }

    fn mount(path: &str) -> Route {
        Route::prefix(path, MiddlewareChain::new()).unwrap()
    }

    #[test]
    fn test_root() {
        let result = route("/").matches("/").unwrap();
        assert_eq!(result.len(), 0, "Incorrect number of path parameter matches");
    }

    #[test]
    fn test_literal_path() {
        let result = route("/foo/bar/baz").matches("/foo/bar/baz").unwrap();
        assert_eq!(result.len(), 0, "Incorrect number of path parameter matches");
    }

    #[test]
    fn test_params() {
        let route = route("/foos/:fooId/bars/:barId");
        assert_eq!(route.param_names(), ["fooId", "barId"]);

        let result = route.matches("/foos/foo1/bars/bar37").unwrap();
        assert_eq!(result.len(), 2, "Incorrect number of path parameter matches");
        assert_eq!(result["fooId"], "foo1");
        assert_eq!(result["barId"], "bar37");
    }

    #[test]
    fn test_empty_param_segment_is_captured() {
        let result = route("/users/:id/posts").matches("/users//posts").unwrap();
        assert_eq!(result["id"], "");
    }

    #[test]
    fn test_param_does_not_span_slash() {
        assert!(route("/users/:id").matches("/users/a/b").is_none());
    }

    #[test]
    fn test_no_match() {
        assert!(route("/foo").matches("/foo/bar/baz").is_none());
        assert!(route("/foo/bar").matches("/foo").is_none());
    }

    #[test]
    fn test_match_is_full_string() {
        assert!(route("/foo").matches("/foobar").is_none());
        assert!(route("/foo").matches("/x/foo").is_none());
    }

    #[test]
    fn test_trailing_slash_in_declaration_is_ignored() {
        let route = route("/foo/");
        assert!(route.matches("/foo").is_some());
        assert!(route.matches("/foo/").is_none());
    }

    #[test]
    fn test_literal_metacharacters_are_escaped() {
        // Deliberate deviation: literal segments used to be fed to the regex
        // engine unescaped, so "." matched any character.
        let route = route("/files/a.b/(x)");
        assert!(route.matches("/files/a.b/(x)").is_some());
        assert!(route.matches("/files/axb/(x)").is_none());
        assert!(route.matches("/files/a.b/x").is_none());
    }

    #[test]
    fn test_prefix_matches() {
        let route = mount("/foo");
        assert!(route.is_prefix());

        assert!(route.matches("/foo").is_some());
        assert!(route.matches("/foo/").is_some());
        assert!(route.matches("/foo/bar").is_some());
        assert!(route.matches("/foo/bar/baz").is_some());

        assert!(route.matches("/foo1").is_none());
        assert!(route.matches("/foobar").is_none());
        assert!(route.matches("/bar/foo").is_none());
    }

    #[test]
    fn test_prefix_strip() {
        let route = mount("/foo");
        assert_eq!(route.strip_prefix("/foo/bar"), "/bar");
        assert_eq!(route.strip_prefix("/foo/bar/baz"), "/bar/baz");
        assert_eq!(route.strip_prefix("/foo/"), "/");
        assert_eq!(route.strip_prefix("/foo"), "/");
    }

    #[test]
    fn test_prefix_with_trailing_slash() {
        let route = mount("/foo/");
        assert!(route.matches("/foo").is_some());
        assert_eq!(route.strip_prefix("/foo/bar"), "/bar");
    }

    #[test]
    fn test_root_prefix_matches_everything() {
        let route = mount("/");
        assert!(route.matches("/").is_some());
        assert!(route.matches("/foo").is_some());
        assert!(route.matches("/foo/bar").is_some());

        assert_eq!(route.strip_prefix("/foo/bar"), "/foo/bar");
        assert_eq!(route.strip_prefix("/"), "/");
    }

    #[test]
    fn test_prefix_rejects_params() {
        let err = Route::prefix("/users/:id", MiddlewareChain::new()).unwrap_err();
        assert!(matches!(
            err,
            RouteError::ParamInPrefix { ref param, .. } if param == ":id"
        ));
    }

    #[test]
    fn test_repeated_param_name_rejected() {
        let err = Route::new("/a/:id/b/:id", MiddlewareChain::new()).unwrap_err();
        assert!(matches!(
            err,
            RouteError::DuplicateParam { ref param, .. } if param == "id"
        ));
        assert_eq!(
            err.to_string(),
            "route '/a/:id/b/:id' declares path parameter 'id' more than once"
        );
    }

    #[test]
    fn test_plain_route_strip_is_identity() {
        assert_eq!(route("/foo").strip_prefix("/foo"), "/foo");
    }
}
