//! Structural operations mediated by a view.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A structural operation on a record.
///
/// Names follow the reflection traps they correspond to, so that error
/// messages read like "cannot perform 'get' on a revoked view".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Property read.
    Get,

    /// Plain property assignment.
    Set,

    /// Existence check.
    Has,

    /// Property deletion.
    DeleteProperty,

    /// Descriptor-style property definition.
    DefineProperty,

    /// Key enumeration.
    OwnKeys,

    /// Own-property introspection.
    GetOwnPropertyDescriptor,
}

impl Operation {
    /// Get the trap name of this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Has => "has",
            Self::DeleteProperty => "deleteProperty",
            Self::DefineProperty => "defineProperty",
            Self::OwnKeys => "ownKeys",
            Self::GetOwnPropertyDescriptor => "getOwnPropertyDescriptor",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
