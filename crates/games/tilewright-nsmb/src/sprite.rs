use std::any::Any;

use tilewright_core::{ItemType, LevelError, LevelItem};

/// Size of one sprite record: id, x, y, eight settings bytes, two pad bytes.
pub const SPRITE_RECORD_LEN: usize = 16;
pub const SPRITE_TERMINATOR: [u8; 4] = [0xFF; 4];

/// Sprites draw above tiles and entrances.
pub const SPRITE_SORT: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteItem {
    type_name: String,
    pub sprite_id: u16,
    pub x: u16,
    pub y: u16,
    pub settings: [u8; 8],
}

impl SpriteItem {
    pub fn new(type_name: &str, sprite_id: u16, x: u16, y: u16) -> Self {
        Self {
            type_name: type_name.to_string(),
            sprite_id,
            x,
            y,
            settings: [0; 8],
        }
    }
}

impl LevelItem for SpriteItem {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn position(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }

    fn sort(&self) -> i32 {
        SPRITE_SORT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Base sprite item type. Each concrete game registers one under its own name.
#[derive(Debug, Clone)]
pub struct SpriteItemType {
    name: String,
}

impl SpriteItemType {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl ItemType for SpriteItemType {
    fn name(&self) -> &str {
        &self.name
    }

    fn sort(&self) -> i32 {
        SPRITE_SORT
    }

    fn spawn(&self, x: i32, y: i32) -> Box<dyn LevelItem> {
        let clamp = |v: i32| v.clamp(0, u16::MAX as i32) as u16;
        Box::new(SpriteItem::new(&self.name, 0, clamp(x), clamp(y)))
    }
}

fn be16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

/// Decode a terminated sprite block. Every sprite gets `type_name`.
pub fn decode_sprites(type_name: &str, data: &[u8]) -> Result<Vec<SpriteItem>, LevelError> {
    let mut sprites = Vec::new();
    let mut rest = data;
    loop {
        if rest.starts_with(&SPRITE_TERMINATOR) {
            return Ok(sprites);
        }
        if rest.len() < SPRITE_RECORD_LEN {
            return Err(LevelError::CorruptData(format!(
                "sprite block ends without terminator after {} sprites",
                sprites.len()
            )));
        }
        let (record, tail) = rest.split_at(SPRITE_RECORD_LEN);
        let mut settings = [0u8; 8];
        settings.copy_from_slice(&record[6..14]);
        sprites.push(SpriteItem {
            type_name: type_name.to_string(),
            sprite_id: be16(&record[0..2]),
            x: be16(&record[2..4]),
            y: be16(&record[4..6]),
            settings,
        });
        rest = tail;
    }
}

pub fn encode_sprites<'a>(sprites: impl IntoIterator<Item = &'a SpriteItem>) -> Vec<u8> {
    let mut out = Vec::new();
    for sprite in sprites {
        out.extend_from_slice(&sprite.sprite_id.to_be_bytes());
        out.extend_from_slice(&sprite.x.to_be_bytes());
        out.extend_from_slice(&sprite.y.to_be_bytes());
        out.extend_from_slice(&sprite.settings);
        out.extend_from_slice(&[0, 0]);
    }
    out.extend_from_slice(&SPRITE_TERMINATOR);
    out
}
