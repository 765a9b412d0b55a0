//! Dynamic records.
//!
//! A [`Record`] is an open-ended, ordered mapping from [`PropertyKey`] to
//! [`Property`]. It is a shared handle: clones point at the same storage, so
//! a view built over a clone sees every direct change live.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::descriptor::{Property, PropertyDescriptor};
use crate::error::{Result, ViewError};
use crate::key::PropertyKey;

#[derive(Debug, Default)]
struct Slots {
    properties: HashMap<PropertyKey, Property>,
    // Insertion order; array indices and symbols are re-sorted on read
    order: Vec<PropertyKey>,
}

impl Slots {
    fn insert(&mut self, key: PropertyKey, property: Property) {
        if self.properties.insert(key.clone(), property).is_none() {
            self.order.push(key);
        }
    }

    fn remove(&mut self, key: &PropertyKey) {
        if self.properties.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }

    fn ordered_keys(&self) -> Vec<PropertyKey> {
        let mut indices: Vec<(u32, &PropertyKey)> = Vec::new();
        let mut names = Vec::new();
        let mut symbols = Vec::new();

        for key in &self.order {
            match (key.as_array_index(), key) {
                (Some(index), _) => indices.push((index, key)),
                (None, PropertyKey::Name(_)) => names.push(key.clone()),
                (None, PropertyKey::Symbol(_)) => symbols.push(key.clone()),
            }
        }
        indices.sort_by_key(|(index, _)| *index);

        indices
            .into_iter()
            .map(|(_, key)| key.clone())
            .chain(names)
            .chain(symbols)
            .collect()
    }
}

/// A shared, ordered property record.
#[derive(Debug, Clone, Default)]
pub struct Record {
    slots: Arc<RwLock<Slots>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON object, one plain data property per entry.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => {
                let record = Self::new();
                {
                    let mut slots = record.slots.write();
                    for (name, value) in map {
                        slots.insert(PropertyKey::Name(name), Property::data(value));
                    }
                }
                Ok(record)
            }
            other => Err(ViewError::NotAnObject(other.to_string())),
        }
    }

    /// Add a plain data property, replacing any existing slot for `key`.
    ///
    /// Intended for construction. Unlike [`Record::set`] and
    /// [`Record::define_property`] it skips every attribute check: a
    /// non-writable or non-configurable slot is overwritten with a plain
    /// data property, keeping its position.
    pub fn with(self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Self {
        self.slots
            .write()
            .insert(key.into(), Property::data(value.into()));
        self
    }

    /// Get the current value of `key`, `None` when absent.
    pub fn get(&self, key: impl Into<PropertyKey>) -> Option<Value> {
        let key = key.into();
        self.slots
            .read()
            .properties
            .get(&key)
            .map(|property| property.value.clone())
    }

    /// Assign `value` to `key`, creating a plain data property if absent.
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        let mut slots = self.slots.write();

        if let Some(property) = slots.properties.get_mut(&key) {
            if !property.writable {
                return Err(ViewError::ReadOnly(key));
            }
            property.value = value;
            return Ok(());
        }

        slots.insert(key, Property::data(value));
        Ok(())
    }

    /// Check if `key` is present.
    pub fn has(&self, key: impl Into<PropertyKey>) -> bool {
        self.has_own_property(key)
    }

    /// Check if `key` is an own property. Records have no prototype chain,
    /// so this agrees with [`Record::has`].
    pub fn has_own_property(&self, key: impl Into<PropertyKey>) -> bool {
        let key = key.into();
        self.slots.read().properties.contains_key(&key)
    }

    /// Delete `key`. Returns whether a property was removed.
    pub fn delete(&self, key: impl Into<PropertyKey>) -> Result<bool> {
        let key = key.into();
        let mut slots = self.slots.write();

        let configurable = match slots.properties.get(&key) {
            Some(property) => property.configurable,
            None => return Ok(false),
        };
        if !configurable {
            return Err(ViewError::NonConfigurable(key));
        }

        slots.remove(&key);
        Ok(true)
    }

    /// Define or update `key` from a descriptor.
    pub fn define_property(
        &self,
        key: impl Into<PropertyKey>,
        descriptor: &PropertyDescriptor,
    ) -> Result<()> {
        let key = key.into();
        let mut slots = self.slots.write();

        let property = match slots.properties.get(&key) {
            Some(existing) => {
                descriptor.validate_against(&key, existing)?;
                descriptor.merge_into(existing)
            }
            None => descriptor.to_property(),
        };
        slots.insert(key, property);

        Ok(())
    }

    /// Get a complete descriptor for `key`.
    pub fn get_own_property_descriptor(
        &self,
        key: impl Into<PropertyKey>,
    ) -> Option<PropertyDescriptor> {
        let key = key.into();
        self.slots
            .read()
            .properties
            .get(&key)
            .cloned()
            .map(PropertyDescriptor::from)
    }

    /// Every key, in natural order: array indices ascending, then names in
    /// insertion order, then symbols in insertion order.
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        self.slots.read().ordered_keys()
    }

    /// Enumerable name keys, in natural order.
    pub fn keys(&self) -> Vec<String> {
        let slots = self.slots.read();
        slots
            .ordered_keys()
            .into_iter()
            .filter(|key| {
                slots
                    .properties
                    .get(key)
                    .is_some_and(|property| property.enumerable)
            })
            .filter_map(|key| key.name().map(str::to_string))
            .collect()
    }

    /// Export enumerable name keys as a JSON object.
    pub fn to_json(&self) -> Value {
        let slots = self.slots.read();
        let mut map = Map::new();
        for key in slots.ordered_keys() {
            if let (PropertyKey::Name(name), Some(property)) = (&key, slots.properties.get(&key)) {
                if property.enumerable {
                    map.insert(name.clone(), property.value.clone());
                }
            }
        }
        Value::Object(map)
    }

    pub fn len(&self) -> usize {
        self.slots.read().properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if two handles share the same storage.
    pub fn ptr_eq(&self, other: &Record) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots)
    }
}
