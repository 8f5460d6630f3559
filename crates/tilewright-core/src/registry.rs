use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::game::GameRecord;
use crate::level::{Dimensions, LevelTypeHandle};
use crate::text::translate;

/// Flat lookup tables of every loaded game.
///
/// Concrete games are kept in catalog order; abstract games are only
/// reachable as parents and never listed.
#[derive(Debug, Default)]
pub struct GameRegistry {
    games: Vec<Arc<GameRecord>>,
    index: HashMap<String, usize>,
    abstract_games: HashMap<String, Arc<GameRecord>>,
}

/// Serializable overview of one concrete game, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub id: String,
    pub name: String,
    pub lineage: Vec<String>,
    pub level_types: Vec<LevelTypeSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelTypeSummary {
    pub id: String,
    pub name: String,
    pub extension: String,
    pub dimensions: Dimensions,
    pub templates: Vec<String>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `module_id` is taken in either table.
    pub fn contains_id(&self, module_id: &str) -> bool {
        self.index.contains_key(module_id) || self.abstract_games.contains_key(module_id)
    }

    pub fn insert(&mut self, record: Arc<GameRecord>) -> Result<()> {
        self.ensure_unique(record.module_id())?;
        self.index.insert(record.module_id().to_string(), self.games.len());
        self.games.push(record);
        Ok(())
    }

    pub fn insert_abstract(&mut self, record: Arc<GameRecord>) -> Result<()> {
        self.ensure_unique(record.module_id())?;
        self.abstract_games.insert(record.module_id().to_string(), record);
        Ok(())
    }

    fn ensure_unique(&self, module_id: &str) -> Result<()> {
        if self.contains_id(module_id) {
            return Err(Error::Config(format!("duplicate game id '{module_id}'")));
        }
        Ok(())
    }

    /// A concrete game by id.
    pub fn get(&self, module_id: &str) -> Option<&Arc<GameRecord>> {
        self.index.get(module_id).map(|&i| &self.games[i])
    }

    pub fn get_abstract(&self, module_id: &str) -> Option<&Arc<GameRecord>> {
        self.abstract_games.get(module_id)
    }

    /// Resolve a parent id: abstract games first, then concrete games.
    pub fn resolve_parent(&self, module_id: &str) -> Option<&Arc<GameRecord>> {
        self.get_abstract(module_id).or_else(|| self.get(module_id))
    }

    /// Concrete games in catalog order.
    pub fn concrete_games(&self) -> impl Iterator<Item = &Arc<GameRecord>> {
        self.games.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.games.iter().map(|g| g.module_id()).collect()
    }

    pub fn abstract_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.abstract_games.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// File-dialog filters: one per level type of every concrete game,
    /// then a catch-all.
    pub fn file_filters(&self) -> Vec<String> {
        let mut filters: Vec<String> = self
            .games
            .iter()
            .flat_map(|game| game.level_types())
            .map(|t| {
                translate(
                    "[name] (*.[ext])",
                    &[("[name]", t.type_name()), ("[ext]", t.file_extension())],
                )
            })
            .collect();
        filters.push(translate("All files (*)", &[]));
        filters
    }

    /// Pick the level type that should decode `data`, by content rather
    /// than file extension. The first match in catalog order wins.
    pub fn detect_level_type(&self, data: &[u8]) -> Option<(&Arc<GameRecord>, &LevelTypeHandle)> {
        self.games.iter().find_map(|game| {
            game.level_types()
                .iter()
                .find(|t| t.validate(data))
                .map(|t| (game, t))
        })
    }

    pub fn summaries(&self) -> Vec<GameSummary> {
        self.games
            .iter()
            .map(|game| GameSummary {
                id: game.module_id().to_string(),
                name: game.display_name().to_string(),
                lineage: game.lineage().into_iter().map(String::from).collect(),
                level_types: game
                    .level_types()
                    .iter()
                    .map(|t| LevelTypeSummary {
                        id: t.id().to_string(),
                        name: t.type_name().to_string(),
                        extension: t.file_extension().to_string(),
                        dimensions: t.dimensions(),
                        templates: t.templates().iter().map(|tpl| tpl.name.clone()).collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameRecordBuilder;
    use crate::test_helpers::{FakeLevelType, FnModule, noop_main};

    fn record(id: &str, level_types: &[(&'static str, &'static [u8])]) -> Arc<GameRecord> {
        let mut builder = GameRecordBuilder::create(id, None);
        builder.display_name = id.to_uppercase();
        for &(type_id, magic) in level_types {
            builder
                .level_types
                .push(LevelTypeHandle::new(FakeLevelType::new(type_id, magic)));
        }
        Arc::new(builder.build(Arc::new(FnModule(noop_main))))
    }

    #[test]
    fn ids_are_unique_across_tables() {
        let mut registry = GameRegistry::new();
        registry.insert_abstract(record("base", &[])).unwrap();
        assert!(matches!(registry.insert(record("base", &[])), Err(Error::Config(_))));
        registry.insert(record("game", &[])).unwrap();
        assert!(registry.insert_abstract(record("game", &[])).is_err());
        assert_eq!(registry.ids(), vec!["game"]);
        assert_eq!(registry.abstract_ids(), vec!["base"]);
    }

    #[test]
    fn parent_resolution_prefers_abstract() {
        let mut registry = GameRegistry::new();
        registry.insert_abstract(record("base", &[])).unwrap();
        registry.insert(record("game", &[])).unwrap();
        assert_eq!(registry.resolve_parent("base").unwrap().module_id(), "base");
        assert_eq!(registry.resolve_parent("game").unwrap().module_id(), "game");
        assert!(registry.resolve_parent("other").is_none());
        assert!(registry.get("base").is_none());
    }

    #[test]
    fn detection_uses_catalog_order() {
        let mut registry = GameRegistry::new();
        registry.insert(record("first", &[("a", b"AAAA")])).unwrap();
        registry.insert(record("second", &[("b", b"AA"), ("c", b"CC")])).unwrap();

        let (game, level_type) = registry.detect_level_type(b"AAAA data").unwrap();
        assert_eq!(game.module_id(), "first");
        assert_eq!(level_type.id(), "a");

        let (game, level_type) = registry.detect_level_type(b"CC").unwrap();
        assert_eq!(game.module_id(), "second");
        assert_eq!(level_type.id(), "c");

        assert!(registry.detect_level_type(b"zz").is_none());
    }

    #[test]
    fn filters_list_every_level_type() {
        let mut registry = GameRegistry::new();
        registry.insert(record("first", &[("a", b"AAAA")])).unwrap();
        let filters = registry.file_filters();
        assert_eq!(filters, vec!["Fake a (*.fake)".to_string(), "All files (*)".to_string()]);
    }

    #[test]
    fn summaries_serialize() {
        let mut registry = GameRegistry::new();
        registry.insert(record("first", &[("a", b"AAAA")])).unwrap();
        let json = serde_json::to_value(registry.summaries()).unwrap();
        assert_eq!(json[0]["id"], "first");
        assert_eq!(json[0]["level_types"][0]["extension"], "fake");
        assert_eq!(json[0]["level_types"][0]["dimensions"], "2d");
    }

    #[test]
    fn summaries_report_3d_level_types() {
        let mut builder = GameRecordBuilder::create("deep", None);
        builder.level_types.push(LevelTypeHandle::new(
            FakeLevelType::new("world", b"WRLD").with_dimensions(Dimensions::ThreeD),
        ));
        let mut registry = GameRegistry::new();
        registry
            .insert(Arc::new(builder.build(Arc::new(FnModule(noop_main)))))
            .unwrap();

        let summaries = registry.summaries();
        assert_eq!(summaries[0].level_types[0].dimensions, Dimensions::ThreeD);
        let json = serde_json::to_value(&summaries).unwrap();
        assert_eq!(json[0]["level_types"][0]["dimensions"], "3d");
    }
}
