//! Layered lookup of per-game resource files.
//!
//! Every game owns a directory `<root>/<module_id>/`. A lookup walks the
//! game's lineage from the most general ancestor to the game itself and
//! collects each copy of the file it finds, so a child game can override
//! single files of its parent and inherit the rest.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// Directory holding the small icon variants, relative to a game directory.
pub const SMALL_ICON_DIR: &str = "ico/sm";
/// Directory holding the large icon variants, relative to a game directory.
pub const LARGE_ICON_DIR: &str = "ico/lg";

/// Opaque icon handle: resolved paths of the small and large variants.
///
/// An icon with neither variant is the placeholder shown when a game
/// provides no artwork.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Icon {
    pub small: Option<PathBuf>,
    pub large: Option<PathBuf>,
}

impl Icon {
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.small.is_none() && self.large.is_none()
    }
}

/// Relative paths of the two icon variants for `name`.
pub fn icon_file_names(name: &str) -> (String, String) {
    (
        format!("{SMALL_ICON_DIR}/icon-{name}.png"),
        format!("{LARGE_ICON_DIR}/icon-{name}.png"),
    )
}

/// True if `name` is a non-empty relative path of plain components.
fn is_contained(name: &str) -> bool {
    let path = Path::new(name);
    path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Resolves resource names against a lineage of game directories.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    root: PathBuf,
}

impl ResourceResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Storage directory of one game.
    pub fn game_dir(&self, module_id: &str) -> PathBuf {
        self.root.join(module_id)
    }

    /// Every copy of `name` along `lineage`, least to most specific.
    ///
    /// `lineage` lists module ids general-first and ends with the game itself.
    /// Names that could leave a game directory match nothing.
    pub fn resolve_all(&self, lineage: &[&str], name: &str) -> Vec<PathBuf> {
        if !is_contained(name) {
            tracing::warn!(name, "rejecting resource name outside the game directory");
            return Vec::new();
        }
        lineage
            .iter()
            .map(|id| self.game_dir(id).join(name))
            .filter(|path| path.is_file())
            .collect()
    }

    /// The most specific copy of `name` along `lineage`.
    pub fn resolve(&self, lineage: &[&str], name: &str) -> Result<PathBuf> {
        self.resolve_all(lineage, name)
            .pop()
            .ok_or_else(|| Error::ResourceNotFound {
                module_id: lineage.last().copied().unwrap_or_default().to_string(),
                name: name.to_string(),
            })
    }

    /// Resolve both variants of the icon `name`. Fails only if neither exists.
    pub fn icon(&self, lineage: &[&str], name: &str) -> Result<Icon> {
        let (small_name, large_name) = icon_file_names(name);
        let icon = Icon {
            small: self.resolve(lineage, &small_name).ok(),
            large: self.resolve(lineage, &large_name).ok(),
        };
        if icon.is_placeholder() {
            return Err(Error::ResourceNotFound {
                module_id: lineage.last().copied().unwrap_or_default().to_string(),
                name: format!("icon-{name}"),
            });
        }
        Ok(icon)
    }

    /// Like [`icon`](Self::icon), but a missing icon becomes the placeholder.
    pub fn icon_or_placeholder(&self, lineage: &[&str], name: &str) -> Icon {
        match self.icon(lineage, name) {
            Ok(icon) => icon,
            Err(e) => {
                tracing::warn!(icon = name, error = %e, "using placeholder icon");
                Icon::placeholder()
            },
        }
    }
}
