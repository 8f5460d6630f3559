use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tilewright_core::Icon;
use tilewright_core::resource::icon_file_names;

/// Application icons from `<data_dir>/ico/{sm,lg}/icon-<name>.png`,
/// resolved once per name.
#[derive(Debug)]
pub struct AppIcons {
    data_dir: PathBuf,
    cache: HashMap<String, Icon>,
}

impl AppIcons {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache: HashMap::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Icon for `name`; a placeholder when neither size exists.
    pub fn get(&mut self, name: &str) -> &Icon {
        let data_dir = &self.data_dir;
        self.cache.entry(name.to_string()).or_insert_with(|| {
            let (small, large) = icon_file_names(name);
            let existing = |rel: String| Some(data_dir.join(rel)).filter(|p| p.is_file());
            let icon = Icon {
                small: existing(small),
                large: existing(large),
            };
            if icon.is_placeholder() {
                tracing::warn!(icon = name, "application icon not found, using placeholder");
            }
            icon
        })
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
