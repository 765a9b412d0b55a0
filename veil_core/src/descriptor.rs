//! Property slots and descriptors.
//!
//! A [`Property`] is what a record actually stores for a key. A
//! [`PropertyDescriptor`] is a partial description of a property used by
//! descriptor-style definition, where every field is optional.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ViewError};
use crate::key::PropertyKey;

/// A fully specified property slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// The stored value.
    pub value: Value,

    /// Whether plain assignment may change the value.
    pub writable: bool,

    /// Whether the property shows up in `keys()`.
    pub enumerable: bool,

    /// Whether the property may be deleted or have its attributes changed.
    pub configurable: bool,
}

impl Property {
    /// Create a slot the way plain assignment does: every flag set.
    pub fn data(value: Value) -> Self {
        Self {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }
}

/// A partial property description.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumerable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value field.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the writable flag.
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    /// Set the enumerable flag.
    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    /// Set the configurable flag.
    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    /// Build a brand new slot. Missing flags default to `false` and a
    /// missing value to `null`.
    pub fn to_property(&self) -> Property {
        Property {
            value: self.value.clone().unwrap_or(Value::Null),
            writable: self.writable.unwrap_or(false),
            enumerable: self.enumerable.unwrap_or(false),
            configurable: self.configurable.unwrap_or(false),
        }
    }

    /// Merge this descriptor over an existing slot. Missing fields keep
    /// their current value.
    pub fn merge_into(&self, existing: &Property) -> Property {
        Property {
            value: self.value.clone().unwrap_or_else(|| existing.value.clone()),
            writable: self.writable.unwrap_or(existing.writable),
            enumerable: self.enumerable.unwrap_or(existing.enumerable),
            configurable: self.configurable.unwrap_or(existing.configurable),
        }
    }

    /// Check that this descriptor may be applied to `existing`.
    ///
    /// A configurable slot accepts anything. A non-configurable slot rejects
    /// becoming configurable, a change of enumerability and, when it is also
    /// non-writable, any change of value or a switch back to writable.
    pub fn validate_against(&self, key: &PropertyKey, existing: &Property) -> Result<()> {
        if existing.configurable {
            return Ok(());
        }

        let reject = || -> Result<()> { Err(ViewError::NonConfigurable(key.clone())) };

        if self.configurable == Some(true) {
            return reject();
        }
        if matches!(self.enumerable, Some(enumerable) if enumerable != existing.enumerable) {
            return reject();
        }
        if !existing.writable {
            if self.writable == Some(true) {
                return reject();
            }
            if matches!(&self.value, Some(value) if *value != existing.value) {
                return reject();
            }
        }

        Ok(())
    }
}

impl From<Property> for PropertyDescriptor {
    fn from(property: Property) -> Self {
        Self {
            value: Some(property.value),
            writable: Some(property.writable),
            enumerable: Some(property.enumerable),
            configurable: Some(property.configurable),
        }
    }
}
