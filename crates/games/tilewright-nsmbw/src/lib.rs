//! New Super Mario Bros. Wii.
//!
//! Inherits from the abstract NSMB module and adds the `.arc` level type.

mod level_type;

use tilewright_core::{GameModule, LevelTypeHandle, LoadContext, Result};
use tilewright_nsmb::{FAMILY_EXPORT, NsmbFamily};

pub use level_type::{NsmbwLevelType, SPRITE_BLOCK, SPRITE_TYPE_NAME};

pub const MODULE_ID: &str = "newsupermariobroswii";

pub struct NsmbwModule;

impl GameModule for NsmbwModule {
    fn main(&self, ctx: &mut LoadContext<'_>) -> Result<()> {
        let family = ctx.parent_export::<NsmbFamily>(FAMILY_EXPORT)?;
        let name = ctx.translate("New Super Mario Bros. Wii", &[]);
        ctx.set_game_name(name);
        let icon = ctx.icon("nsmbw");
        ctx.set_game_icon(icon.clone());

        let type_name = ctx.translate("New Super Mario Bros. Wii Level", &[]);
        let level_type = NsmbwLevelType::new(*family, type_name, icon);
        ctx.add_level_type(LevelTypeHandle::new(level_type))?;
        tracing::debug!(
            module_id = ctx.module_id(),
            level_types = ctx.level_types().len(),
            "registered NSMBW level type"
        );
        Ok(())
    }
}

pub fn module() -> Box<dyn GameModule> {
    Box::new(NsmbwModule)
}
