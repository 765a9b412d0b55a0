//! Privacy policies.
//!
//! A policy decides, from a key's textual form alone, whether the key is
//! private. Symbols have no textual form and are always public.

use std::fmt;
use std::sync::Arc;

use crate::key::PropertyKey;

/// Marker used by [`AccessPolicy::default`].
pub const DEFAULT_MARKER: char = '_';

/// Decides which keys a view hides.
#[derive(Clone)]
pub struct AccessPolicy {
    /// The predicate applied to textual keys.
    predicate: Arc<dyn Fn(&str) -> bool + Send + Sync>,

    /// Human readable description, for logs.
    description: String,
}

impl AccessPolicy {
    /// Treat every name starting with `marker` as private.
    pub fn marker(marker: char) -> Self {
        Self {
            predicate: Arc::new(move |name: &str| name.starts_with(marker)),
            description: format!("names starting with '{}'", marker),
        }
    }

    /// Use a caller-supplied predicate.
    pub fn from_fn<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            description: description.into(),
        }
    }

    /// A policy that hides nothing.
    pub fn open() -> Self {
        Self::from_fn("nothing", |_| false)
    }

    /// Check if `key` is private.
    pub fn is_private(&self, key: &PropertyKey) -> bool {
        match key {
            PropertyKey::Name(name) => self.is_private_name(name),
            PropertyKey::Symbol(_) => false,
        }
    }

    /// Check if a textual key is private.
    pub fn is_private_name(&self, name: &str) -> bool {
        (self.predicate)(name)
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::marker(DEFAULT_MARKER)
    }
}

impl fmt::Debug for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessPolicy")
            .field("description", &self.description)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Symbol;

    #[test]
    fn test_default_marker() {
        let policy = AccessPolicy::default();
        assert!(policy.is_private(&PropertyKey::from("_jimous")));
        assert!(policy.is_private(&PropertyKey::from("_")));
        assert!(!policy.is_private(&PropertyKey::from("cool")));
        assert!(!policy.is_private(&PropertyKey::from("a_b")));
        assert!(!policy.is_private(&PropertyKey::from("")));
    }

    #[test]
    fn test_custom_marker() {
        let policy = AccessPolicy::marker('$');
        assert!(policy.is_private(&PropertyKey::from("$secret")));
        assert!(!policy.is_private(&PropertyKey::from("_secret")));
        assert_eq!(policy.description(), "names starting with '$'");
    }

    #[test]
    fn test_symbols_are_public() {
        let everything = AccessPolicy::from_fn("everything", |_| true);
        assert!(everything.is_private(&PropertyKey::from("name")));
        assert!(!everything.is_private(&PropertyKey::from(Symbol::new("_id"))));
    }

    #[test]
    fn test_private_name_agrees_with_key_check() {
        let policy = AccessPolicy::default();
        for name in ["_jimous", "cool", "", "_"] {
            assert_eq!(
                policy.is_private_name(name),
                policy.is_private(&PropertyKey::from(name))
            );
        }
    }

    #[test]
    fn test_open_policy() {
        let policy = AccessPolicy::open();
        assert!(!policy.is_private(&PropertyKey::from("_jimous")));
    }
}
