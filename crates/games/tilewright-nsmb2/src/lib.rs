//! New Super Mario Bros. 2. Only the display attributes differ from the
//! abstract NSMB module.

use tilewright_core::{GameModule, LoadContext, Result};

pub const MODULE_ID: &str = "newsupermariobros2";

pub struct Nsmb2Module;

impl GameModule for Nsmb2Module {
    fn main(&self, ctx: &mut LoadContext<'_>) -> Result<()> {
        let name = ctx.translate("New Super Mario Bros. 2", &[]);
        ctx.set_game_name(name);
        let icon = ctx.icon("nsmb2");
        if icon.is_placeholder() {
            tracing::debug!(module_id = ctx.module_id(), "no NSMB2 icon, using placeholder");
        }
        ctx.set_game_icon(icon);
        Ok(())
    }
}

pub fn module() -> Box<dyn GameModule> {
    Box::new(Nsmb2Module)
}
