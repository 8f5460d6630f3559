//! Level contracts that game modules implement.
//!
//! A [`LevelType`] is the class-like descriptor of one level format. The host
//! only ever holds it through a [`LevelTypeHandle`], which runs the type's
//! one-time class setup and owns the resulting item type registry.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::Serialize;

use crate::error::{Error, LevelError, Result};
use crate::item::{ItemTypeRegistry, LevelItem};
use crate::resource::Icon;

/// Whether a level type is edited in a 2D or 3D view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dimensions {
    #[serde(rename = "2d")]
    TwoD,
    #[serde(rename = "3d")]
    ThreeD,
}

/// A named preset used to seed a new level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelTemplate {
    pub name: String,
}

impl LevelTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An editable in-memory level.
pub trait Level: fmt::Debug + Send + Sync {
    fn items(&self) -> &[Box<dyn LevelItem>];

    fn add_item(&mut self, item: Box<dyn LevelItem>);

    fn remove_item(&mut self, index: usize) -> Option<Box<dyn LevelItem>>;

    fn as_any(&self) -> &dyn Any;
}

/// Reusable body of a 2D level: items kept in ascending sort order.
///
/// Items with equal sort keep their insertion order.
#[derive(Debug, Default)]
pub struct Level2d {
    items: Vec<Box<dyn LevelItem>>,
}

impl Level2d {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Box<dyn LevelItem>] {
        &self.items
    }

    pub fn insert(&mut self, item: Box<dyn LevelItem>) {
        let sort = item.sort();
        let at = self.items.partition_point(|existing| existing.sort() <= sort);
        self.items.insert(at, item);
    }

    pub fn remove(&mut self, index: usize) -> Option<Box<dyn LevelItem>> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Class-like descriptor for one kind of level format within a game.
pub trait LevelType: Send + Sync {
    /// Stable identifier, unique among the level types of one game.
    fn id(&self) -> &str;

    /// Human-readable type name.
    fn type_name(&self) -> &str;

    fn icon(&self) -> &Icon;

    fn dimensions(&self) -> Dimensions {
        Dimensions::TwoD
    }

    fn templates(&self) -> &[LevelTemplate] {
        &[]
    }

    fn file_extension(&self) -> &str {
        "bin"
    }

    /// One-time class setup: register this level type's item types.
    fn register_item_types(&self, _registry: &mut ItemTypeRegistry) -> Result<()> {
        Ok(())
    }

    /// Fast, best-effort format sniff. Must be pure and must not panic.
    fn validate(&self, _data: &[u8]) -> bool {
        false
    }

    /// Decode a level from data that already passed [`validate`](Self::validate).
    fn load_from_bytes(&self, data: &[u8]) -> std::result::Result<Box<dyn Level>, LevelError>;

    /// Create a blank level from one of this type's templates.
    fn new_level(&self, template: &LevelTemplate) -> Box<dyn Level>;

    /// Encode a level previously created by this type.
    fn save(&self, level: &dyn Level) -> std::result::Result<Vec<u8>, LevelError>;
}

struct LevelTypeSlot {
    descriptor: Box<dyn LevelType>,
    item_types: OnceLock<std::result::Result<ItemTypeRegistry, String>>,
}

/// Shared handle to a level type descriptor.
///
/// Cloning shares the descriptor; games that inherit a level type hold the
/// same handle as their parent.
#[derive(Clone)]
pub struct LevelTypeHandle {
    slot: Arc<LevelTypeSlot>,
}

impl LevelTypeHandle {
    pub fn new(descriptor: impl LevelType + 'static) -> Self {
        Self {
            slot: Arc::new(LevelTypeSlot {
                descriptor: Box::new(descriptor),
                item_types: OnceLock::new(),
            }),
        }
    }

    pub fn descriptor(&self) -> &dyn LevelType {
        self.slot.descriptor.as_ref()
    }

    pub fn id(&self) -> &str {
        self.descriptor().id()
    }

    pub fn type_name(&self) -> &str {
        self.descriptor().type_name()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.descriptor().dimensions()
    }

    pub fn templates(&self) -> &[LevelTemplate] {
        self.descriptor().templates()
    }

    pub fn file_extension(&self) -> &str {
        self.descriptor().file_extension()
    }

    /// Run the class setup. The setup body runs at most once per handle;
    /// later calls return the remembered outcome.
    pub fn init_class(&self) -> Result<()> {
        match self.init_outcome() {
            Ok(_) => Ok(()),
            Err(reason) => Err(Error::ClassInit {
                level_type: self.id().to_string(),
                reason: reason.clone(),
            }),
        }
    }

    fn init_outcome(&self) -> &std::result::Result<ItemTypeRegistry, String> {
        self.slot.item_types.get_or_init(|| {
            let mut registry = ItemTypeRegistry::new();
            self.descriptor()
                .register_item_types(&mut registry)
                .map(|()| {
                    tracing::debug!(
                        level_type = self.id(),
                        item_types = registry.len(),
                        "level type initialized"
                    );
                    registry
                })
                .map_err(|e| e.to_string())
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.item_types.get().is_some()
    }

    /// Item types registered by the class setup, once it has succeeded.
    pub fn item_types(&self) -> Option<&ItemTypeRegistry> {
        self.slot.item_types.get().and_then(|r| r.as_ref().ok())
    }

    pub fn validate(&self, data: &[u8]) -> bool {
        self.descriptor().validate(data)
    }

    /// Decode `data`, rejecting it up front if the format sniff fails.
    pub fn load_from_bytes(&self, data: &[u8]) -> Result<Box<dyn Level>> {
        self.init_class()?;
        if !self.validate(data) {
            return Err(LevelError::Format(self.type_name().to_string()).into());
        }
        Ok(self.descriptor().load_from_bytes(data)?)
    }

    pub fn new_level(&self, template: &LevelTemplate) -> Result<Box<dyn Level>> {
        self.init_class()?;
        Ok(self.descriptor().new_level(template))
    }

    pub fn save(&self, level: &dyn Level) -> Result<Vec<u8>> {
        Ok(self.descriptor().save(level)?)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl PartialEq for LevelTypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for LevelTypeHandle {}

impl fmt::Debug for LevelTypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelTypeHandle")
            .field("id", &self.id())
            .field("type_name", &self.type_name())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
