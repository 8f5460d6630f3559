//! Abstract "New Super Mario Bros." module.
//!
//! Registers no level types of its own. It exports [`NsmbFamily`], which
//! concrete NSMB games use to build their level types.

pub mod archive;
pub mod course;
pub mod family;
pub mod sprite;

use tilewright_core::{GameModule, LoadContext, Result};

pub use archive::U8Archive;
pub use family::{COURSE_PATH, NsmbFamily, NsmbLevel};
pub use sprite::{SpriteItem, SpriteItemType};

pub const MODULE_ID: &str = "abstract_newsupermariobros";

/// Export name under which [`NsmbFamily`] is published.
pub const FAMILY_EXPORT: &str = "nsmb_family";

pub struct AbstractNsmbModule;

impl GameModule for AbstractNsmbModule {
    fn main(&self, ctx: &mut LoadContext<'_>) -> Result<()> {
        ctx.export(FAMILY_EXPORT, NsmbFamily);
        tracing::debug!(module_id = ctx.module_id(), "exported NSMB family");
        Ok(())
    }
}

pub fn module() -> Box<dyn GameModule> {
    Box::new(AbstractNsmbModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewright_core::{ModuleLoader, ModuleTable, ResourceResolver};

    #[test]
    fn abstract_module_exports_family_only() {
        let mut table = ModuleTable::new();
        table.register(MODULE_ID, module).unwrap();
        let loader = ModuleLoader::new(table, ResourceResolver::new("unused"));

        let record = loader.load(MODULE_ID, None).unwrap();
        assert!(record.level_types().is_empty());
        assert!(record.find_export::<NsmbFamily>(FAMILY_EXPORT).is_some());
    }
}
