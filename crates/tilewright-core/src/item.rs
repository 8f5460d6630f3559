use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// An element placed within a level, such as a sprite.
pub trait LevelItem: fmt::Debug + Send + Sync {
    /// Name of the item type that produced this item.
    fn type_name(&self) -> &str;

    /// Position in level units.
    fn position(&self) -> (i32, i32);

    /// Draw/sort priority; higher sorts later.
    fn sort(&self) -> i32 {
        0
    }

    fn as_any(&self) -> &dyn Any;
}

/// A class-like descriptor for one kind of placeable element.
pub trait ItemType: Send + Sync {
    fn name(&self) -> &str;

    /// Sort priority shared by every item of this type.
    fn sort(&self) -> i32 {
        0
    }

    /// Create a fresh item of this type at `(x, y)`.
    fn spawn(&self, x: i32, y: i32) -> Box<dyn LevelItem>;
}

/// Ordered item types owned by one level type.
#[derive(Default, Clone)]
pub struct ItemTypeRegistry {
    types: Vec<Arc<dyn ItemType>>,
}

impl ItemTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item type. Names must be unique within one registry.
    pub fn register(&mut self, item_type: Arc<dyn ItemType>) -> Result<()> {
        if self.get(item_type.name()).is_some() {
            return Err(Error::DuplicateItemType(item_type.name().to_string()));
        }
        self.types.push(item_type);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ItemType>> {
        self.types.iter().find(|t| t.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ItemType>> {
        self.types.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl fmt::Debug for ItemTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::FakeItemType;

    #[test]
    fn registration_keeps_order() {
        let mut registry = ItemTypeRegistry::new();
        registry.register(Arc::new(FakeItemType::new("b", 0))).unwrap();
        registry.register(Arc::new(FakeItemType::new("a", 5))).unwrap();
        assert_eq!(registry.names(), vec!["b", "a"]);
        assert_eq!(registry.get("a").map(|t| t.sort()), Some(5));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ItemTypeRegistry::new();
        registry.register(Arc::new(FakeItemType::new("sprite", 0))).unwrap();
        let err = registry
            .register(Arc::new(FakeItemType::new("sprite", 1)))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateItemType(name) if name == "sprite"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn spawned_items_carry_type_sort() {
        let item_type = FakeItemType::new("coin", 3);
        let item = item_type.spawn(4, 8);
        assert_eq!(item.type_name(), "coin");
        assert_eq!(item.sort(), 3);
        assert_eq!(item.position(), (4, 8));
    }
}
