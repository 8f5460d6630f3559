//! Registration API handed to a game module's entry point.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::game::{GameRecord, GameRecordBuilder};
use crate::level::LevelTypeHandle;
use crate::resource::{Icon, ResourceResolver};
use crate::text;

/// The record a module is allowed to modify while it loads, plus read
/// access to its parent and the resource tree.
///
/// Every call acts on this context's own record. Nothing outside it is
/// touched, so independent contexts never interfere with each other.
pub struct LoadContext<'a> {
    record: GameRecordBuilder,
    resolver: &'a ResourceResolver,
}

impl<'a> LoadContext<'a> {
    pub fn new(record: GameRecordBuilder, resolver: &'a ResourceResolver) -> Self {
        Self { record, resolver }
    }

    pub fn module_id(&self) -> &str {
        self.record.module_id()
    }

    /// The already-loaded parent game, if this game inherits from one.
    pub fn parent(&self) -> Option<&GameRecord> {
        self.record.parent().map(Arc::as_ref)
    }

    pub fn lineage(&self) -> Vec<&str> {
        self.record.lineage()
    }

    pub fn game_name(&self) -> &str {
        &self.record.display_name
    }

    pub fn set_game_name(&mut self, name: impl Into<String>) {
        self.record.display_name = name.into();
    }

    pub fn game_icon(&self) -> &Icon {
        &self.record.icon
    }

    pub fn set_game_icon(&mut self, icon: Icon) {
        self.record.icon = icon;
    }

    pub fn level_types(&self) -> &[LevelTypeHandle] {
        self.record.level_types()
    }

    /// Append a level type and run its one-time class setup.
    ///
    /// A level type whose id is already present, whether added here or
    /// inherited, is rejected. If the class setup fails the level type is
    /// removed again.
    pub fn add_level_type(&mut self, level_type: LevelTypeHandle) -> Result<()> {
        if self.record.level_types.iter().any(|t| t.id() == level_type.id()) {
            return Err(Error::DuplicateLevelType(level_type.id().to_string()));
        }
        self.record.level_types.push(level_type);
        let added = &self.record.level_types[self.record.level_types.len() - 1];
        if let Err(e) = added.init_class() {
            self.record.level_types.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Resolve an icon along this game's lineage, or the placeholder.
    pub fn icon(&self, name: &str) -> Icon {
        self.resolver.icon_or_placeholder(&self.lineage(), name)
    }

    /// The most specific copy of a data file along this game's lineage.
    pub fn resource(&self, name: &str) -> Result<PathBuf> {
        self.resolver.resolve(&self.lineage(), name)
    }

    /// Every copy of a data file along this game's lineage, general first.
    pub fn resources(&self, name: &str) -> Vec<PathBuf> {
        self.resolver.resolve_all(&self.lineage(), name)
    }

    /// Publish a type object for games that inherit from this one.
    pub fn export<T: Any + Send + Sync>(&mut self, name: &str, value: T) {
        self.record.exports.insert(name, Arc::new(value));
    }

    /// Fetch a type object published by the nearest ancestor that exports `name`.
    pub fn parent_export<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.parent()
            .and_then(|parent| parent.find_export::<T>(name))
            .ok_or_else(|| Error::MissingExport(name.to_string()))
    }

    pub fn translate(&self, english: &str, replacements: &[(&str, &str)]) -> String {
        text::translate(english, replacements)
    }

    pub fn into_record(self) -> GameRecordBuilder {
        self.record
    }
}
