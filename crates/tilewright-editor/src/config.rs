use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{EditorError, Result};

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "tilewright.toml";

/// Top-level editor configuration, loaded from `tilewright.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Directory holding `games.xml` and one resource folder per game.
    pub gameinfo_dir: PathBuf,
    /// Application data: startup images and app icons.
    pub data_dir: PathBuf,
    /// Catalog file name inside `gameinfo_dir`.
    pub catalog_file: String,
    pub session: SessionConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            gameinfo_dir: PathBuf::from("gameinfo"),
            data_dir: PathBuf::from("data"),
            catalog_file: "games.xml".to_string(),
            session: SessionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_open_documents: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_open_documents: 32,
        }
    }
}

impl EditorConfig {
    pub fn catalog_path(&self) -> PathBuf {
        self.gameinfo_dir.join(&self.catalog_file)
    }

    pub fn validate(&self) -> Result<()> {
        if self.gameinfo_dir.as_os_str().is_empty() {
            return Err(EditorError::Config("gameinfo_dir must not be empty".into()));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(EditorError::Config("data_dir must not be empty".into()));
        }
        if self.catalog_file.is_empty() {
            return Err(EditorError::Config("catalog_file must not be empty".into()));
        }
        if self.session.max_open_documents == 0 {
            return Err(EditorError::Config(
                "session.max_open_documents must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Load `tilewright.toml` from the working directory, then apply
    /// environment overrides.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from `path` if it exists, falling back to defaults, then apply
    /// `TILEWRIGHT_*` environment overrides.
    pub fn load_from(path: &Path) -> Self {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<EditorConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "loaded configuration");
                    cfg
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), "failed to parse config: {e}, using defaults");
                    EditorConfig::default()
                },
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "no config file found, using defaults");
                EditorConfig::default()
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides read through `lookup`; empty or unparsable values
    /// are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("TILEWRIGHT_GAMEINFO_DIR")
            && !dir.is_empty()
        {
            self.gameinfo_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("TILEWRIGHT_DATA_DIR")
            && !dir.is_empty()
        {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("TILEWRIGHT_CATALOG_FILE")
            && !file.is_empty()
        {
            self.catalog_file = file;
        }
        if let Some(val) = lookup("TILEWRIGHT_MAX_OPEN_DOCUMENTS")
            && let Ok(n) = val.parse::<usize>()
        {
            self.session.max_open_documents = n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = EditorConfig::default();
        assert_eq!(cfg.catalog_path(), PathBuf::from("gameinfo/games.xml"));
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.session.max_open_documents, 32);
        cfg.validate().unwrap();
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
gameinfo_dir = "/opt/tilewright/gameinfo"

[session]
max_open_documents = 4
"#;
        let cfg: EditorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.gameinfo_dir, PathBuf::from("/opt/tilewright/gameinfo"));
        assert_eq!(cfg.catalog_file, "games.xml");
        assert_eq!(cfg.session.max_open_documents, 4);
    }

    #[test]
    fn validate_rejects_zero_documents() {
        let cfg = EditorConfig {
            session: SessionConfig {
                max_open_documents: 0,
            },
            ..EditorConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(EditorError::Config(_))));
    }

    #[test]
    fn validate_rejects_empty_catalog_name() {
        let cfg = EditorConfig {
            catalog_file: String::new(),
            ..EditorConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn overrides_skip_empty_and_bad_values() {
        let mut cfg = EditorConfig::default();
        cfg.apply_overrides(|key| match key {
            "TILEWRIGHT_GAMEINFO_DIR" => Some("/srv/games".to_string()),
            "TILEWRIGHT_DATA_DIR" => Some(String::new()),
            "TILEWRIGHT_MAX_OPEN_DOCUMENTS" => Some("many".to_string()),
            _ => None,
        });
        assert_eq!(cfg.gameinfo_dir, PathBuf::from("/srv/games"));
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.session.max_open_documents, 32);
    }

    #[test]
    fn load_from_falls_back_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tilewright.toml");
        std::fs::write(&path, "gameinfo_dir = [").unwrap();
        let cfg = EditorConfig::load_from(&path);
        assert_eq!(cfg.catalog_file, "games.xml");

        std::fs::write(&path, "catalog_file = \"catalog.xml\"").unwrap();
        assert_eq!(EditorConfig::load_from(&path).catalog_file, "catalog.xml");
    }
}
