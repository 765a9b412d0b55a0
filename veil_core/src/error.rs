use std::io;
use thiserror::Error;

use crate::key::PropertyKey;
use crate::operation::Operation;

pub type Result<T> = std::result::Result<T, ViewError>;

/// Errors raised by records and the views wrapping them.
///
/// None of these leave the record partially modified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("property is inaccessible: '{operation}' on {key}")]
    PropertyInaccessible {
        key: PropertyKey,
        operation: Operation,
    },

    #[error("cannot perform '{operation}' on a view that has been revoked")]
    ViewRevoked { operation: Operation },

    #[error("cannot assign to read only property '{0}'")]
    ReadOnly(PropertyKey),

    #[error("cannot redefine or delete non-configurable property '{0}'")]
    NonConfigurable(PropertyKey),

    #[error("record is not an object: {0}")]
    NotAnObject(String),
}

impl ViewError {
    /// Check if this error was caused by the privacy policy.
    pub fn is_inaccessible(&self) -> bool {
        matches!(self, Self::PropertyInaccessible { .. })
    }

    /// Check if this error was caused by revocation.
    pub fn is_revoked(&self) -> bool {
        matches!(self, Self::ViewRevoked { .. })
    }
}

/// Errors raised while loading a [`ViewConfig`](crate::config::ViewConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
