use tilewright_core::{ModuleTable, Result};

/// Registration table of every game module compiled into this build.
///
/// The abstract NSMB module is always present; concrete games are behind
/// their cargo features.
pub fn builtin_modules() -> Result<ModuleTable> {
    let mut table = ModuleTable::new();
    table.register(tilewright_nsmb::MODULE_ID, tilewright_nsmb::module)?;
    #[cfg(feature = "nsmbw")]
    table.register(tilewright_nsmbw::MODULE_ID, tilewright_nsmbw::module)?;
    #[cfg(feature = "nsmb2")]
    table.register(tilewright_nsmb2::MODULE_ID, tilewright_nsmb2::module)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abstract_module_is_always_registered() {
        let table = builtin_modules().unwrap();
        assert!(table.contains(tilewright_nsmb::MODULE_ID));
    }

    #[cfg(all(feature = "nsmbw", feature = "nsmb2"))]
    #[test]
    fn default_features_register_every_game() {
        let table = builtin_modules().unwrap();
        assert_eq!(
            table.ids(),
            vec![
                "abstract_newsupermariobros",
                "newsupermariobros2",
                "newsupermariobroswii"
            ]
        );
    }
}
