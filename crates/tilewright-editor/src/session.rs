//! Open level documents and the file flows that act on them.
//!
//! Every flow either completes or leaves the session exactly as it was:
//! a failed open adds nothing, and a failed write keeps the document's
//! path and state.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tilewright_core::{GameRegistry, LevelDocument};
use uuid::Uuid;

use crate::error::{EditorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug)]
pub struct OpenDocument {
    pub document: LevelDocument,
    /// Concrete game whose level type decoded or created the level.
    pub game_id: String,
    pub path: Option<PathBuf>,
}

pub struct Session {
    registry: Arc<GameRegistry>,
    documents: HashMap<DocumentId, OpenDocument>,
    order: Vec<DocumentId>,
    max_open: usize,
}

impl Session {
    pub fn new(registry: Arc<GameRegistry>, max_open: usize) -> Self {
        Self {
            registry,
            documents: HashMap::new(),
            order: Vec::new(),
            max_open,
        }
    }

    /// Open level data, choosing the level type by content.
    pub fn open_bytes(&mut self, data: &[u8], path: Option<PathBuf>) -> Result<DocumentId> {
        self.ensure_capacity()?;
        let (game, level_type) = self
            .registry
            .detect_level_type(data)
            .ok_or(EditorError::UnrecognizedLevel)?;
        let document = LevelDocument::open(level_type, data)?;
        let game_id = game.module_id().to_string();
        tracing::info!(
            game = %game_id,
            level_type = level_type.id(),
            items = document.level().items().len(),
            "opened level"
        );
        Ok(self.insert(OpenDocument {
            document,
            game_id,
            path,
        }))
    }

    pub fn open_path(&mut self, path: &Path) -> Result<DocumentId> {
        let data = std::fs::read(path).map_err(|e| EditorError::io(path, e))?;
        self.open_bytes(&data, Some(path.to_path_buf()))
    }

    /// Create a level from the selection of the new-level dialog.
    pub fn new_level(
        &mut self,
        game_id: &str,
        level_type_index: usize,
        template_index: usize,
    ) -> Result<DocumentId> {
        self.ensure_capacity()?;
        let game = self
            .registry
            .get(game_id)
            .ok_or_else(|| EditorError::UnknownGame(game_id.to_string()))?;
        let level_type = game.level_types().get(level_type_index).ok_or_else(|| {
            EditorError::NoSuchLevelType {
                game: game_id.to_string(),
                index: level_type_index,
            }
        })?;
        let template = level_type.templates().get(template_index).ok_or_else(|| {
            EditorError::NoSuchTemplate {
                level_type: level_type.id().to_string(),
                index: template_index,
            }
        })?;
        let document = LevelDocument::new_from_template(level_type, template)?;
        tracing::info!(
            game = game_id,
            level_type = level_type.id(),
            template = %template.name,
            "created level"
        );
        Ok(self.insert(OpenDocument {
            document,
            game_id: game_id.to_string(),
            path: None,
        }))
    }

    pub fn get(&self, id: DocumentId) -> Option<&OpenDocument> {
        self.documents.get(&id)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Result<&mut OpenDocument> {
        self.documents
            .get_mut(&id)
            .ok_or(EditorError::NoSuchDocument(id))
    }

    /// Write the document to its own path.
    pub fn save(&mut self, id: DocumentId) -> Result<PathBuf> {
        let path = self
            .get_mut(id)?
            .path
            .clone()
            .ok_or(EditorError::NoPath(id))?;
        self.save_as(id, &path)?;
        Ok(path)
    }

    /// Write the document to `path`, which becomes its path.
    pub fn save_as(&mut self, id: DocumentId, path: &Path) -> Result<()> {
        let open = self.get_mut(id)?;
        let data = open.document.export_copy()?;
        std::fs::write(path, data).map_err(|e| EditorError::io(path, e))?;
        open.document.mark_saved()?;
        open.path = Some(path.to_path_buf());
        tracing::info!(document = %id, path = %path.display(), "saved level");
        Ok(())
    }

    /// Write a copy to `path` without changing the document's path or state.
    pub fn save_copy_as(&self, id: DocumentId, path: &Path) -> Result<()> {
        let open = self.get(id).ok_or(EditorError::NoSuchDocument(id))?;
        let data = open.document.export_copy()?;
        std::fs::write(path, data).map_err(|e| EditorError::io(path, e))
    }

    /// Remove a document. Unsaved changes are the caller's concern.
    pub fn close(&mut self, id: DocumentId) -> Result<OpenDocument> {
        let open = self
            .documents
            .remove(&id)
            .ok_or(EditorError::NoSuchDocument(id))?;
        self.order.retain(|&other| other != id);
        if open.document.state().has_unsaved_changes() {
            tracing::warn!(document = %id, "closed level with unsaved changes");
        }
        Ok(open)
    }

    /// Open documents in the order they were opened.
    pub fn ids(&self) -> &[DocumentId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.documents
            .values()
            .any(|open| open.document.state().has_unsaved_changes())
    }

    fn ensure_capacity(&self) -> Result<()> {
        if self.documents.len() >= self.max_open {
            return Err(EditorError::TooManyDocuments(self.max_open));
        }
        Ok(())
    }

    fn insert(&mut self, open: OpenDocument) -> DocumentId {
        let id = DocumentId::new();
        self.documents.insert(id, open);
        self.order.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewright_core::test_helpers::{FakeItem, FakeLevelType, FnModule};
    use tilewright_core::{
        LevelState, LevelTypeHandle, LoadContext, ModuleLoader, ModuleTable, ResourceResolver,
        load_catalog,
    };

    fn fake_main(ctx: &mut LoadContext<'_>) -> tilewright_core::Result<()> {
        ctx.add_level_type(LevelTypeHandle::new(FakeLevelType::new("fake", b"FAKE")))
    }

    fn registry() -> Arc<GameRegistry> {
        let mut table = ModuleTable::new();
        table.register("game", || Box::new(FnModule(fake_main))).unwrap();
        let loader = ModuleLoader::new(table, ResourceResolver::new("unused"));
        let catalog = load_catalog(r#"<games><game id="game" /></games>"#, &loader).unwrap();
        Arc::new(catalog.into_parts().1)
    }

    fn session() -> Session {
        Session::new(registry(), 2)
    }

    #[test]
    fn open_detects_level_type() {
        let mut session = session();
        let id = session.open_bytes(b"FAKE\x01\x02\x03", None).unwrap();
        let open = session.get(id).unwrap();
        assert_eq!(open.game_id, "game");
        assert_eq!(open.document.level().items().len(), 1);
        assert_eq!(open.document.state(), LevelState::Loaded);
    }

    #[test]
    fn failed_open_leaves_session_untouched() {
        let mut session = session();
        assert!(matches!(
            session.open_bytes(b"????", None),
            Err(EditorError::UnrecognizedLevel)
        ));
        assert!(matches!(
            session.open_bytes(b"FAKE\x04", None),
            Err(EditorError::Core(_))
        ));
        assert!(session.is_empty());
    }

    #[test]
    fn new_level_checks_selection() {
        let mut session = session();
        assert!(matches!(
            session.new_level("nope", 0, 0),
            Err(EditorError::UnknownGame(_))
        ));
        assert!(matches!(
            session.new_level("game", 1, 0),
            Err(EditorError::NoSuchLevelType { index: 1, .. })
        ));
        assert!(matches!(
            session.new_level("game", 0, 3),
            Err(EditorError::NoSuchTemplate { index: 3, .. })
        ));
        let id = session.new_level("game", 0, 0).unwrap();
        assert!(session.get(id).unwrap().path.is_none());
    }

    #[test]
    fn capacity_is_enforced() {
        let mut session = session();
        session.new_level("game", 0, 0).unwrap();
        session.new_level("game", 0, 0).unwrap();
        assert!(matches!(
            session.new_level("game", 0, 0),
            Err(EditorError::TooManyDocuments(2))
        ));
    }

    #[test]
    fn save_flows_update_path_and_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();
        let id = session.new_level("game", 0, 0).unwrap();
        assert!(matches!(session.save(id), Err(EditorError::NoPath(_))));

        session
            .get_mut(id)
            .unwrap()
            .document
            .edit(|level| level.add_item(Box::new(FakeItem::new("coin", 0, (1, 2)))))
            .unwrap();
        assert!(session.has_unsaved_changes());

        let copy = dir.path().join("copy.fake");
        session.save_copy_as(id, &copy).unwrap();
        assert_eq!(std::fs::read(&copy).unwrap(), b"FAKE\x01\x01\x02");
        assert!(session.get(id).unwrap().path.is_none());
        assert!(session.has_unsaved_changes());

        let target = dir.path().join("level.fake");
        session.save_as(id, &target).unwrap();
        assert_eq!(session.get(id).unwrap().path.as_deref(), Some(target.as_path()));
        assert_eq!(session.get(id).unwrap().document.state(), LevelState::Saved);
        assert_eq!(session.save(id).unwrap(), target);
    }

    #[test]
    fn failed_write_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();
        let id = session.new_level("game", 0, 0).unwrap();
        session.get_mut(id).unwrap().document.edit(|_| ()).unwrap();

        let bad = dir.path().join("missing/level.fake");
        assert!(matches!(session.save_as(id, &bad), Err(EditorError::Io { .. })));
        let open = session.get(id).unwrap();
        assert_eq!(open.document.state(), LevelState::Modified);
        assert!(open.path.is_none());
    }

    #[test]
    fn open_path_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.fake");
        std::fs::write(&path, b"FAKE\x00").unwrap();

        let mut session = session();
        let first = session.open_path(&path).unwrap();
        let second = session.new_level("game", 0, 0).unwrap();
        assert_eq!(session.ids(), &[first, second]);

        let closed = session.close(first).unwrap();
        assert_eq!(closed.path.as_deref(), Some(path.as_path()));
        assert_eq!(session.ids(), &[second]);
        assert!(matches!(session.close(first), Err(EditorError::NoSuchDocument(_))));
        assert!(matches!(
            session.open_path(&dir.path().join("absent")),
            Err(EditorError::Io { .. })
        ));
    }
}
