use std::str::FromStr;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::Route;

/// Error type for typed parameter extraction
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    /// The parameter was not declared on the matched route
    #[error("Path parameter '{0}' not found")]
    NotFound(String),
    /// The captured value did not parse
    #[error("Failed to parse path parameter '{name}': {message}")]
    ParseError { name: String, message: String },
}

/// Outcome of matching one request against a [`Route`].
///
/// Stored in the request's context under `router`/`match` while the route's
/// chain runs; see [`Router::route_match`](super::Router::route_match).
#[derive(Debug, Clone)]
pub struct RouteMatch {
    route: Arc<Route>,
    params: FxHashMap<String, String>,
}

impl RouteMatch {
    pub(crate) fn new(route: Arc<Route>, params: FxHashMap<String, String>) -> Self {
        Self { route, params }
    }

    /// The declared path of the route that matched
    pub fn matched_path(&self) -> &str {
        self.route.path()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub(crate) fn route_arc(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &FxHashMap<String, String> {
        &self.params
    }

    /// Parse a captured parameter into `T`
    pub fn parse_param<T>(&self, name: &str) -> Result<T, ParamError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self
            .param(name)
            .ok_or_else(|| ParamError::NotFound(name.to_string()))?;

        value.parse::<T>().map_err(|e| ParamError::ParseError {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::MiddlewareChain;

    fn matched(pattern: &str, path: &str) -> RouteMatch {
        let route = Arc::new(Route::new(pattern, MiddlewareChain::new()).unwrap());
        let params = route.matches(path).unwrap();
        RouteMatch::new(route, params)
    }

    #[test]
    fn test_accessors() {
        let m = matched("/users/:user/preferences", "/users/alice/preferences");
        assert_eq!(m.matched_path(), "/users/:user/preferences");
        assert_eq!(m.param("user"), Some("alice"));
        assert_eq!(m.param("other"), None);
    }

    #[test]
    fn test_parse_param() {
        let m = matched("/orders/:id", "/orders/42");
        assert_eq!(m.parse_param::<u32>("id").unwrap(), 42);
        assert!(matches!(
            m.parse_param::<u32>("missing"),
            Err(ParamError::NotFound(_))
        ));

        let m = matched("/orders/:id", "/orders/abc");
        assert!(matches!(
            m.parse_param::<u32>("id"),
            Err(ParamError::ParseError { .. })
        ));
    }
}
