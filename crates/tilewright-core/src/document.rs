use serde::Serialize;

use crate::error::{Error, Result};
use crate::level::{Level, LevelTemplate, LevelTypeHandle};

/// Lifecycle of one level instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LevelState {
    Unloaded,
    Loaded,
    Modified,
    Saved,
}

impl LevelState {
    pub fn on_load(self) -> Result<Self> {
        match self {
            LevelState::Unloaded => Ok(LevelState::Loaded),
            from => Err(Error::InvalidTransition { from, action: "load" }),
        }
    }

    pub fn on_edit(self) -> Result<Self> {
        match self {
            LevelState::Loaded | LevelState::Modified | LevelState::Saved => {
                Ok(LevelState::Modified)
            },
            from => Err(Error::InvalidTransition { from, action: "edit" }),
        }
    }

    pub fn on_save(self) -> Result<Self> {
        match self {
            LevelState::Loaded | LevelState::Modified | LevelState::Saved => {
                Ok(LevelState::Saved)
            },
            from => Err(Error::InvalidTransition { from, action: "save" }),
        }
    }

    pub fn has_unsaved_changes(self) -> bool {
        self == LevelState::Modified
    }
}

/// A level together with its level type and lifecycle state.
///
/// Documents only exist once decoding has fully succeeded, so a failed
/// open never exposes a half-built level.
#[derive(Debug)]
pub struct LevelDocument {
    level_type: LevelTypeHandle,
    level: Box<dyn Level>,
    state: LevelState,
}

impl LevelDocument {
    pub fn open(level_type: &LevelTypeHandle, data: &[u8]) -> Result<Self> {
        let level = level_type.load_from_bytes(data)?;
        Ok(Self {
            level_type: level_type.clone(),
            level,
            state: LevelState::Unloaded.on_load()?,
        })
    }

    pub fn new_from_template(level_type: &LevelTypeHandle, template: &LevelTemplate) -> Result<Self> {
        let level = level_type.new_level(template)?;
        Ok(Self {
            level_type: level_type.clone(),
            level,
            state: LevelState::Unloaded.on_load()?,
        })
    }

    pub fn level_type(&self) -> &LevelTypeHandle {
        &self.level_type
    }

    pub fn level(&self) -> &dyn Level {
        self.level.as_ref()
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    /// Apply an edit and mark the document modified.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut dyn Level) -> R) -> Result<R> {
        let next = self.state.on_edit()?;
        let out = f(self.level.as_mut());
        self.state = next;
        Ok(out)
    }

    /// Encode the level. The state only moves to `Saved` if encoding succeeds.
    pub fn save(&mut self) -> Result<Vec<u8>> {
        let next = self.state.on_save()?;
        let data = self.level_type.save(self.level.as_ref())?;
        self.state = next;
        Ok(data)
    }

    /// Encode the level without touching the lifecycle state.
    pub fn export_copy(&self) -> Result<Vec<u8>> {
        self.level_type.save(self.level.as_ref())
    }

    /// Record that bytes from [`export_copy`](Self::export_copy) were persisted.
    pub fn mark_saved(&mut self) -> Result<()> {
        self.state = self.state.on_save()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FakeItem, FakeLevelType};

    fn fake_type() -> LevelTypeHandle {
        LevelTypeHandle::new(FakeLevelType::new("fake", b"FAKE"))
    }

    #[test]
    fn transitions_follow_lifecycle() {
        assert_eq!(LevelState::Unloaded.on_load().unwrap(), LevelState::Loaded);
        assert_eq!(LevelState::Loaded.on_edit().unwrap(), LevelState::Modified);
        assert_eq!(LevelState::Modified.on_save().unwrap(), LevelState::Saved);
        assert_eq!(LevelState::Saved.on_edit().unwrap(), LevelState::Modified);
        assert!(LevelState::Unloaded.on_edit().is_err());
        assert!(LevelState::Unloaded.on_save().is_err());
        assert!(LevelState::Loaded.on_load().is_err());
    }

    #[test]
    fn edit_then_save_round_trips() {
        let handle = fake_type();
        let mut doc = LevelDocument::open(&handle, b"FAKE\x00").unwrap();
        assert_eq!(doc.state(), LevelState::Loaded);

        doc.edit(|level| level.add_item(Box::new(FakeItem::new("coin", 0, (3, 4)))))
            .unwrap();
        assert_eq!(doc.state(), LevelState::Modified);
        assert!(doc.state().has_unsaved_changes());

        let bytes = doc.save().unwrap();
        assert_eq!(doc.state(), LevelState::Saved);

        let reopened = LevelDocument::open(&handle, &bytes).unwrap();
        assert_eq!(reopened.level().items().len(), 1);
    }

    #[test]
    fn export_copy_keeps_state() {
        let handle = fake_type();
        let template = LevelTemplate::new("Blank");
        let mut doc = LevelDocument::new_from_template(&handle, &template).unwrap();
        doc.edit(|_| ()).unwrap();
        doc.export_copy().unwrap();
        assert_eq!(doc.state(), LevelState::Modified);

        doc.mark_saved().unwrap();
        assert_eq!(doc.state(), LevelState::Saved);
    }

    #[test]
    fn failed_open_yields_no_document() {
        let handle = fake_type();
        assert!(LevelDocument::open(&handle, b"junk").is_err());
        assert!(LevelDocument::open(&handle, b"FAKE").is_err());
    }
}
