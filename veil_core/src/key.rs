//! Property keys.
//!
//! A record is keyed either by a textual name or by an opaque symbol. Symbols
//! are unique by construction and are never considered private.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest valid array index, `2^32 - 2`.
const MAX_ARRAY_INDEX: u64 = u32::MAX as u64 - 1;

/// An opaque, unforgeable symbolic key.
///
/// Two symbols are equal only if one is a clone of the other, even when they
/// share a description.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    id: Uuid,
    description: Option<String>,
}

impl Symbol {
    /// Create a new symbol with a human readable description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: Some(description.into()),
        }
    }

    /// Create a new symbol without a description.
    pub fn anonymous() -> Self {
        Self {
            id: Uuid::new_v4(),
            description: None,
        }
    }

    /// Get the symbol's description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Get the identity of this symbol.
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description.as_deref().unwrap_or(""))
    }
}

/// The key of a record property.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKey {
    /// A textual property name.
    Name(String),

    /// A symbolic key.
    Symbol(Symbol),
}

impl PropertyKey {
    /// Get the textual form of this key, `None` for symbols.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Symbol(_) => None,
        }
    }

    /// Check if this key is a symbol.
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    /// Interpret this key as an array index.
    ///
    /// Only canonical decimal names (no sign, no leading zeros) in the range
    /// `0..=2^32 - 2` qualify.
    pub fn as_array_index(&self) -> Option<u32> {
        let name = self.name()?;
        if name.is_empty() || (name.len() > 1 && name.starts_with('0')) {
            return None;
        }
        if !name.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index: u64 = name.parse().ok()?;
        if index > MAX_ARRAY_INDEX {
            return None;
        }
        u32::try_from(index).ok()
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{}", name),
            Self::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for PropertyKey {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl From<Symbol> for PropertyKey {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl From<&Symbol> for PropertyKey {
    fn from(symbol: &Symbol) -> Self {
        Self::Symbol(symbol.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_are_unique() {
        let a = Symbol::new("id");
        let b = Symbol::new("id");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.description(), Some("id"));
        assert_eq!(Symbol::anonymous().description(), None);
    }

    #[test]
    fn test_array_index() {
        assert_eq!(PropertyKey::from("0").as_array_index(), Some(0));
        assert_eq!(PropertyKey::from("42").as_array_index(), Some(42));
        assert_eq!(
            PropertyKey::from("4294967294").as_array_index(),
            Some(4_294_967_294)
        );
        assert_eq!(PropertyKey::from("4294967295").as_array_index(), None);
        assert_eq!(PropertyKey::from("01").as_array_index(), None);
        assert_eq!(PropertyKey::from("-1").as_array_index(), None);
        assert_eq!(PropertyKey::from("1.5").as_array_index(), None);
        assert_eq!(PropertyKey::from("").as_array_index(), None);
        assert_eq!(PropertyKey::from(Symbol::new("0")).as_array_index(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(PropertyKey::from("cool").to_string(), "cool");
        assert_eq!(PropertyKey::from(Symbol::new("id")).to_string(), "Symbol(id)");
        assert_eq!(Symbol::anonymous().to_string(), "Symbol()");
    }
}
