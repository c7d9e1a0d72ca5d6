//! Namespaced, type-checked storage for request-scoped data.
//!
//! Middleware share data with each other through the attribute store of the
//! request's [`Context`](crate::Context). Keys are `(namespace, name)` pairs;
//! namespaces only exist to keep unrelated middleware from colliding.
//!
//! # Examples
//!
//! ```
//! use weft::context::Attributes;
//!
//! #[derive(Debug)]
//! struct UserId(String);
//!
//! let mut attrs = Attributes::new();
//! attrs.insert("auth", "user", UserId("alice".to_string()));
//!
//! let user = attrs.get::<UserId>("auth", "user").unwrap();
//! assert_eq!(user.0, "alice");
//!
//! // Wrong type reads the same as a missing key
//! assert!(attrs.get::<String>("auth", "user").is_none());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

pub(crate) type AttributeValue = Arc<dyn Any + Send + Sync>;

#[derive(Default, Clone)]
pub struct Attributes {
    // namespace -> name -> value
    map: FxHashMap<String, FxHashMap<String, AttributeValue>>,
}

impl Attributes {
    /// Create an empty attribute store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, unconditionally replacing whatever was under the key.
    pub fn insert<T: Send + Sync + 'static>(&mut self, namespace: &str, name: &str, value: T) {
        self.insert_shared(namespace, name, Arc::new(value));
    }

    pub(crate) fn insert_shared(&mut self, namespace: &str, name: &str, value: AttributeValue) {
        self.map
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }

    /// Get a value if it is present **and** of type `T`.
    ///
    /// A missing key and a value of another type both yield `None`.
    pub fn get<T: Send + Sync + 'static>(&self, namespace: &str, name: &str) -> Option<Arc<T>> {
        self.map
            .get(namespace)
            .and_then(|names| names.get(name))
            .and_then(|value| Arc::clone(value).downcast::<T>().ok())
    }

    /// Check whether anything (of any type) is stored under the key.
    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.map
            .get(namespace)
            .is_some_and(|names| names.contains_key(name))
    }

    /// Remove a value, returning whether one was stored.
    pub fn remove(&mut self, namespace: &str, name: &str) -> bool {
        let Some(names) = self.map.get_mut(namespace) else {
            return false;
        };
        let removed = names.remove(name).is_some();
        if names.is_empty() {
            self.map.remove(namespace);
        }
        removed
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Get the number of values stored across all namespaces.
    pub fn len(&self) -> usize {
        self.map.values().map(|names| names.len()).sum()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<(&str, &str)> = self
            .map
            .iter()
            .flat_map(|(ns, names)| names.keys().map(move |name| (ns.as_str(), name.as_str())))
            .collect();
        f.debug_struct("Attributes").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct UserId(String);

    #[derive(Debug, PartialEq)]
    struct RequestId(String);

    #[test]
    fn test_insert_and_get() {
        let mut attrs = Attributes::new();

        attrs.insert("auth", "user", UserId("alice".to_string()));
        attrs.insert("trace", "id", RequestId("req-123".to_string()));

        assert_eq!(attrs.get::<UserId>("auth", "user").unwrap().0, "alice");
        assert_eq!(attrs.get::<RequestId>("trace", "id").unwrap().0, "req-123");
    }

    #[test]
    fn test_insert_overwrites() {
        let mut attrs = Attributes::new();

        attrs.insert("auth", "user", UserId("alice".to_string()));
        attrs.insert("auth", "user", UserId("bob".to_string()));

        assert_eq!(attrs.get::<UserId>("auth", "user").unwrap().0, "bob");
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_overwrite_with_different_type() {
        let mut attrs = Attributes::new();

        attrs.insert("foo", "bar", 42u32);
        attrs.insert("foo", "bar", "baz".to_string());

        assert!(attrs.get::<u32>("foo", "bar").is_none());
        assert_eq!(*attrs.get::<String>("foo", "bar").unwrap(), "baz");
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let mut attrs = Attributes::new();

        attrs.insert("router", "match", 1u8);
        attrs.insert("batcher", "match", 2u8);

        assert_eq!(*attrs.get::<u8>("router", "match").unwrap(), 1);
        assert_eq!(*attrs.get::<u8>("batcher", "match").unwrap(), 2);
    }

    #[test]
    fn test_mismatch_and_absent_are_both_none() {
        let mut attrs = Attributes::new();
        attrs.insert("foo", "bar", "baz".to_string());

        assert!(attrs.get::<u64>("foo", "bar").is_none());
        assert!(attrs.get::<String>("foo", "missing").is_none());
        assert!(attrs.get::<String>("missing", "bar").is_none());
        assert!(attrs.contains("foo", "bar"));
    }

    #[test]
    fn test_remove_and_len() {
        let mut attrs = Attributes::new();
        assert!(attrs.is_empty());

        attrs.insert("a", "x", 1i32);
        attrs.insert("a", "y", 2i32);
        attrs.insert("b", "x", 3i32);
        assert_eq!(attrs.len(), 3);

        assert!(attrs.remove("a", "x"));
        assert!(!attrs.remove("a", "x"));
        assert!(!attrs.remove("nope", "x"));
        assert_eq!(attrs.len(), 2);

        assert!(attrs.remove("a", "y"));
        assert!(attrs.remove("b", "x"));
        assert!(attrs.is_empty());
    }
}
