//! Resource model: a bookable room.

use super::Id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A bookable room or space.
///
/// # Example
/// ```
/// use campus_market_core::models::Resource;
///
/// let room = Resource::new("Study Room 201".into(), "Library".into(), 4);
/// assert!(room.is_active());
/// assert_eq!(room.capacity(), 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    id: Id,
    name: String,
    location: String,
    capacity: u32,
    attributes: BTreeMap<String, String>,
    active: bool,
}

impl Resource {
    /// Create a new active resource.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(name: String, location: String, capacity: u32) -> Self {
        assert!(capacity >= 1, "capacity must be at least 1");
        Self {
            id: super::new_id(),
            name,
            location,
            capacity,
            attributes: BTreeMap::new(),
            active: true,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, key: String, value: String) {
        self.attributes.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "capacity must be at least 1")]
    fn zero_capacity_panics() {
        Resource::new("X".into(), "Y".into(), 0);
    }
}
