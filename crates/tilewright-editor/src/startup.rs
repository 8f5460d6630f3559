use std::path::{Path, PathBuf};

use tilewright_core::{ModuleLoader, ModuleTable, ResourceResolver, load_catalog_file};

use crate::app::Editor;
use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::modules::builtin_modules;

/// Files that must exist in the data directory before anything loads.
pub const REQUIRED_DATA_FILES: &[&str] = &["icon.png", "splash.png"];

/// Required paths that do not exist. A missing data directory is reported
/// as itself rather than as each file inside it.
pub fn missing_files(data_dir: &Path) -> Vec<PathBuf> {
    if !data_dir.is_dir() {
        return vec![data_dir.to_path_buf()];
    }
    REQUIRED_DATA_FILES
        .iter()
        .map(|name| data_dir.join(name))
        .filter(|path| !path.is_file())
        .collect()
}

/// Start the editor with every compiled-in game module.
pub fn boot(config: EditorConfig) -> Result<Editor> {
    boot_with(config, builtin_modules()?)
}

/// Validate the config, check required files, then load the catalog
/// through `table`. Any failure aborts startup.
pub fn boot_with(config: EditorConfig, table: ModuleTable) -> Result<Editor> {
    config.validate()?;

    let missing = missing_files(&config.data_dir);
    if !missing.is_empty() {
        return Err(EditorError::MissingFiles(missing));
    }

    let loader = ModuleLoader::new(table, ResourceResolver::new(&config.gameinfo_dir));
    let catalog = load_catalog_file(&config.catalog_path(), &loader)?;
    Ok(Editor::new(config, catalog))
}
