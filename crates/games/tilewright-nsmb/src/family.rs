use std::any::Any;
use std::sync::Arc;

use tilewright_core::{ItemTypeRegistry, Level, Level2d, LevelError, LevelItem, Result};

use crate::archive::U8Archive;
use crate::course::CourseFile;
use crate::sprite::{SpriteItem, SpriteItemType, decode_sprites, encode_sprites};

/// Archive path of the main course file.
pub const COURSE_PATH: &str = "course/course1.bin";

/// Editable level shared by the NSMB games.
///
/// Only sprites are decoded; the rest of the archive and the other course
/// blocks are carried through untouched.
#[derive(Debug, Default)]
pub struct NsmbLevel {
    pub body: Level2d,
    archive: U8Archive,
    course: CourseFile,
}

impl NsmbLevel {
    pub fn archive(&self) -> &U8Archive {
        &self.archive
    }

    pub fn course(&self) -> &CourseFile {
        &self.course
    }
}

impl Level for NsmbLevel {
    fn items(&self) -> &[Box<dyn LevelItem>] {
        self.body.items()
    }

    fn add_item(&mut self, item: Box<dyn LevelItem>) {
        self.body.insert(item);
    }

    fn remove_item(&mut self, index: usize) -> Option<Box<dyn LevelItem>> {
        self.body.remove(index)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Shared behavior exported by the abstract NSMB module.
///
/// Concrete games fetch it with `parent_export::<NsmbFamily>` and build
/// their level types on top of it, naming their own sprite type and the
/// course block that holds sprites.
#[derive(Debug, Clone, Copy, Default)]
pub struct NsmbFamily;

impl NsmbFamily {
    /// Fast container sniff. Does not look inside the archive.
    pub fn sniff(&self, data: &[u8]) -> bool {
        U8Archive::sniff(data)
    }

    /// Class setup common to every NSMB level type.
    pub fn register_item_types(
        &self,
        registry: &mut ItemTypeRegistry,
        sprite_type: &str,
    ) -> Result<()> {
        registry.register(Arc::new(SpriteItemType::new(sprite_type)))
    }

    pub fn blank_level(&self, sprite_block: usize) -> NsmbLevel {
        let mut course = CourseFile::default();
        course.set_block(sprite_block, encode_sprites([]));
        let mut archive = U8Archive::new();
        archive.set(COURSE_PATH, course.encode());
        NsmbLevel {
            body: Level2d::new(),
            archive,
            course,
        }
    }

    pub fn load_level(
        &self,
        data: &[u8],
        sprite_type: &str,
        sprite_block: usize,
    ) -> std::result::Result<NsmbLevel, LevelError> {
        let archive = U8Archive::decode(data)?;
        let course = archive
            .get(COURSE_PATH)
            .map(CourseFile::decode)
            .transpose()?
            .unwrap_or_default();

        let mut body = Level2d::new();
        if let Some(block) = course.block(sprite_block).filter(|b| !b.is_empty()) {
            for sprite in decode_sprites(sprite_type, block)? {
                body.insert(Box::new(sprite));
            }
        }
        tracing::debug!(
            files = archive.files().len(),
            sprites = body.len(),
            "decoded NSMB level archive"
        );
        Ok(NsmbLevel {
            body,
            archive,
            course,
        })
    }

    /// Encode a level built by this family. Items that are not sprites
    /// cannot be stored and fail the save.
    pub fn save_level(
        &self,
        level: &dyn Level,
        sprite_block: usize,
    ) -> std::result::Result<Vec<u8>, LevelError> {
        let level = level
            .as_any()
            .downcast_ref::<NsmbLevel>()
            .ok_or_else(|| LevelError::Format("NSMB level".into()))?;

        let sprites = level
            .items()
            .iter()
            .map(|item| {
                item.as_any().downcast_ref::<SpriteItem>().ok_or_else(|| {
                    LevelError::CorruptData(format!(
                        "item type '{}' cannot be stored in a sprite block",
                        item.type_name()
                    ))
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut course = level.course.clone();
        course.set_block(sprite_block, encode_sprites(sprites));
        let mut archive = level.archive.clone();
        archive.set(COURSE_PATH, course.encode());
        Ok(archive.encode())
    }
}
