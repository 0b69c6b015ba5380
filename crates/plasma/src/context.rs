//! The shared context through which properties see each other.
//!
//! Properties never hold references to one another. Every value a property
//! needs is resolved by name through a [`PlasmaContext`], and every value it
//! produces is published under its own name by whoever drives the graph. This
//! is what allows a graph to be rewired without changing property code.

use std::collections::HashMap;

use crate::{PlasmaError, PropertyName, PropertyValue};

/// A registry of named current values.
///
/// Writers follow a single-writer-per-name discipline: only the driver, on
/// behalf of the owning property, publishes a computed name.
pub trait PlasmaContext {
    /// Returns the current value published under `name`.
    fn get(&self, name: &str) -> Option<PropertyValue>;

    /// Publishes `value` under `name`, replacing any previous value.
    fn set(&mut self, name: PropertyName, value: PropertyValue);
}

/// An in-memory [`PlasmaContext`] backed by a hash map.
#[derive(Debug, Clone, Default)]
pub struct ValueRegistry {
    values: HashMap<PropertyName, PropertyValue>,
}

impl ValueRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `value` under a string name.
    ///
    /// Returns [`PlasmaError::InvalidName`] if `name` is empty.
    pub fn insert(
        &mut self,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<(), PlasmaError> {
        let name = PropertyName::new(name).ok_or(PlasmaError::InvalidName)?;
        self.values.insert(name, value.into());
        Ok(())
    }

    /// Returns `true` if a value is published under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of published values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing has been published.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PlasmaContext for ValueRegistry {
    fn get(&self, name: &str) -> Option<PropertyValue> {
        self.values.get(name).cloned()
    }

    fn set(&mut self, name: PropertyName, value: PropertyValue) {
        self.values.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_previous_value() {
        let mut registry = ValueRegistry::new();
        registry.insert("t_rad", vec![5000.0]).unwrap();
        registry.set(PropertyName::new("t_rad").unwrap(), vec![6000.0].into());

        let value = registry.get("t_rad").unwrap();
        assert_eq!(value.as_cell_values(), Some(&[6000.0][..]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_insert_rejects_empty_name() {
        let mut registry = ValueRegistry::new();
        assert_eq!(
            registry.insert("", vec![1.0]),
            Err(PlasmaError::InvalidName)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_get_unknown_name_is_none() {
        assert!(ValueRegistry::new().get("levels").is_none());
    }
}
