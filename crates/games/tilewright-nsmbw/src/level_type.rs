use tilewright_core::{Icon, ItemTypeRegistry, Level, LevelError, LevelTemplate, LevelType, Result};
use tilewright_nsmb::NsmbFamily;

pub const LEVEL_TYPE_ID: &str = "nsmbw-level";
pub const SPRITE_TYPE_NAME: &str = "NSMBW Sprite";

/// Course block that holds the sprite list.
pub const SPRITE_BLOCK: usize = 7;

pub struct NsmbwLevelType {
    family: NsmbFamily,
    type_name: String,
    icon: Icon,
    templates: Vec<LevelTemplate>,
}

impl NsmbwLevelType {
    pub fn new(family: NsmbFamily, type_name: String, icon: Icon) -> Self {
        Self {
            family,
            type_name,
            icon,
            templates: vec![LevelTemplate::new("Blank level")],
        }
    }
}

impl LevelType for NsmbwLevelType {
    fn id(&self) -> &str {
        LEVEL_TYPE_ID
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn icon(&self) -> &Icon {
        &self.icon
    }

    fn templates(&self) -> &[LevelTemplate] {
        &self.templates
    }

    fn file_extension(&self) -> &str {
        "arc"
    }

    fn register_item_types(&self, registry: &mut ItemTypeRegistry) -> Result<()> {
        self.family.register_item_types(registry, SPRITE_TYPE_NAME)
    }

    fn validate(&self, data: &[u8]) -> bool {
        self.family.sniff(data)
    }

    fn load_from_bytes(&self, data: &[u8]) -> std::result::Result<Box<dyn Level>, LevelError> {
        let level = self.family.load_level(data, SPRITE_TYPE_NAME, SPRITE_BLOCK)?;
        Ok(Box::new(level))
    }

    fn new_level(&self, _template: &LevelTemplate) -> Box<dyn Level> {
        Box::new(self.family.blank_level(SPRITE_BLOCK))
    }

    fn save(&self, level: &dyn Level) -> std::result::Result<Vec<u8>, LevelError> {
        self.family.save_level(level, SPRITE_BLOCK)
    }
}
