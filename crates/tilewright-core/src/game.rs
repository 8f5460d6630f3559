//! Per-game identity records.
//!
//! A [`GameRecordBuilder`] is the mutable record that exists while one game
//! module runs its entry point. Once the entry point returns it is frozen
//! into an immutable [`GameRecord`], shared by `Arc` between the registry
//! and any child games.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::level::LevelTypeHandle;
use crate::module::GameModule;
use crate::resource::Icon;

type ExportValue = Arc<dyn Any + Send + Sync>;

/// Named type objects a module publishes for its descendants.
#[derive(Default, Clone)]
pub struct Exports {
    entries: Vec<(String, ExportValue)>,
}

impl Exports {
    /// Publish `value` under `name`, replacing any earlier value.
    pub fn insert<T: Any + Send + Sync>(&mut self, name: &str, value: Arc<T>) {
        let value: ExportValue = value;
        self.entries.retain(|(existing, _)| existing != name);
        self.entries.push((name.to_string(), value));
    }

    /// Fetch `name` if it exists and has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .and_then(|(_, value)| Arc::clone(value).downcast::<T>().ok())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Exports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Finished, read-only identity of one game.
pub struct GameRecord {
    module_id: String,
    parent: Option<Arc<GameRecord>>,
    display_name: String,
    icon: Icon,
    level_types: Vec<LevelTypeHandle>,
    exports: Exports,
    module: Arc<dyn GameModule>,
}

impl GameRecord {
    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    pub fn parent(&self) -> Option<&Arc<GameRecord>> {
        self.parent.as_ref()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn icon(&self) -> &Icon {
        &self.icon
    }

    pub fn level_types(&self) -> &[LevelTypeHandle] {
        &self.level_types
    }

    pub fn exports(&self) -> &Exports {
        &self.exports
    }

    /// The module instance whose entry point produced this record.
    pub fn module(&self) -> &Arc<dyn GameModule> {
        &self.module
    }

    /// This record followed by its ancestors, most specific first.
    pub fn ancestry(&self) -> impl Iterator<Item = &GameRecord> {
        std::iter::successors(Some(self), |record| record.parent.as_deref())
    }

    /// Module ids from the root ancestor down to this game.
    pub fn lineage(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.ancestry().map(|r| r.module_id.as_str()).collect();
        ids.reverse();
        ids
    }

    pub fn inherits_from(&self, module_id: &str) -> bool {
        self.ancestry().skip(1).any(|r| r.module_id == module_id)
    }

    /// Look up an export on this record, then on each ancestor in turn.
    pub fn find_export<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.ancestry().find_map(|record| record.exports.get::<T>(name))
    }
}

impl fmt::Debug for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameRecord")
            .field("module_id", &self.module_id)
            .field("parent", &self.parent.as_ref().map(|p| p.module_id()))
            .field("display_name", &self.display_name)
            .field("icon", &self.icon)
            .field("level_types", &self.level_types)
            .field("exports", &self.exports)
            .finish()
    }
}

/// A game record under construction.
#[derive(Debug)]
pub struct GameRecordBuilder {
    pub(crate) module_id: String,
    pub(crate) parent: Option<Arc<GameRecord>>,
    pub(crate) display_name: String,
    pub(crate) icon: Icon,
    pub(crate) level_types: Vec<LevelTypeHandle>,
    pub(crate) exports: Exports,
}

impl GameRecordBuilder {
    /// Start a record, seeded from `parent` when given.
    ///
    /// The parent's name, icon, and level type list are copied. The level
    /// type handles themselves are shared, but the list is a snapshot.
    pub fn create(module_id: &str, parent: Option<Arc<GameRecord>>) -> Self {
        let (display_name, icon, level_types) = match parent.as_deref() {
            Some(p) => (p.display_name.clone(), p.icon.clone(), p.level_types.clone()),
            None => (String::new(), Icon::placeholder(), Vec::new()),
        };
        Self {
            module_id: module_id.to_string(),
            parent,
            display_name,
            icon,
            level_types,
            exports: Exports::default(),
        }
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    pub fn parent(&self) -> Option<&Arc<GameRecord>> {
        self.parent.as_ref()
    }

    pub fn level_types(&self) -> &[LevelTypeHandle] {
        &self.level_types
    }

    pub fn lineage(&self) -> Vec<&str> {
        let mut ids = self.parent.as_deref().map(GameRecord::lineage).unwrap_or_default();
        ids.push(&self.module_id);
        ids
    }

    pub fn build(self, module: Arc<dyn GameModule>) -> GameRecord {
        GameRecord {
            module_id: self.module_id,
            parent: self.parent,
            display_name: self.display_name,
            icon: self.icon,
            level_types: self.level_types,
            exports: self.exports,
            module,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::test_helpers::{FakeLevelType, FnModule, noop_main};

    fn freeze(builder: GameRecordBuilder) -> Arc<GameRecord> {
        Arc::new(builder.build(Arc::new(FnModule(noop_main))))
    }

    fn fake(id: &str) -> LevelTypeHandle {
        LevelTypeHandle::new(FakeLevelType::new(id, b"FAKE"))
    }

    #[test]
    fn root_record_starts_empty() {
        let record = freeze(GameRecordBuilder::create("root", None));
        assert_eq!(record.display_name(), "");
        assert!(record.icon().is_placeholder());
        assert!(record.level_types().is_empty());
        assert!(record.parent().is_none());
        assert_eq!(record.lineage(), vec!["root"]);
    }

    #[test]
    fn clone_copies_parent_attributes() {
        let mut builder = GameRecordBuilder::create("base", None);
        builder.display_name = "Base".into();
        builder.icon = Icon {
            small: Some(PathBuf::from("sm.png")),
            large: None,
        };
        builder.level_types.push(fake("one"));
        let base = freeze(builder);

        let child = GameRecordBuilder::create("child", Some(Arc::clone(&base)));
        assert_eq!(child.display_name, "Base");
        assert_eq!(child.icon, *base.icon());
        assert_eq!(child.level_types(), base.level_types());
        assert_eq!(child.lineage(), vec!["base", "child"]);
    }

    #[test]
    fn level_type_list_is_a_snapshot() {
        let mut builder = GameRecordBuilder::create("base", None);
        builder.level_types.push(fake("one"));
        let base = freeze(builder);

        let mut child = GameRecordBuilder::create("child", Some(Arc::clone(&base)));
        child.level_types.push(fake("two"));
        assert_eq!(base.level_types().len(), 1);
        assert_eq!(child.level_types().len(), 2);
        assert!(child.level_types()[0].ptr_eq(&base.level_types()[0]));
    }

    #[test]
    fn exports_resolve_through_ancestors() {
        let mut builder = GameRecordBuilder::create("base", None);
        builder.exports.insert("answer", Arc::new(42u32));
        let base = freeze(builder);
        let child = freeze(GameRecordBuilder::create("child", Some(Arc::clone(&base))));

        assert_eq!(child.find_export::<u32>("answer").as_deref(), Some(&42));
        assert!(child.find_export::<String>("answer").is_none());
        assert!(child.exports().is_empty());
        assert!(child.inherits_from("base"));
        assert!(!base.inherits_from("base"));
    }

    #[test]
    fn re_export_replaces_value() {
        let mut exports = Exports::default();
        exports.insert("v", Arc::new(1u8));
        exports.insert("v", Arc::new(2u8));
        assert_eq!(exports.names().count(), 1);
        assert_eq!(exports.get::<u8>("v").as_deref(), Some(&2));
    }
}
