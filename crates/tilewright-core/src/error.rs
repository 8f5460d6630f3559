use thiserror::Error;

/// Result alias used throughout the module system.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading the game catalog, game modules, and resources.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or inconsistent catalog (missing parent, duplicate id, bad XML).
    #[error("catalog error: {0}")]
    Config(String),

    /// A game module could not be instantiated or its entry point failed.
    #[error("failed to load game module '{module_id}': {source}")]
    ModuleLoad {
        module_id: String,
        #[source]
        source: Box<Error>,
    },

    /// No game module is registered under the requested id.
    #[error("no game module registered under '{0}'")]
    UnknownModule(String),

    /// Another module load is already running on this loader.
    #[error("module '{0}' is still loading")]
    LoadInProgress(String),

    /// Neither the game nor any of its ancestors provides the resource.
    #[error("resource '{name}' not found for game '{module_id}' or its ancestors")]
    ResourceNotFound { module_id: String, name: String },

    /// The same level type was added to one game twice.
    #[error("level type '{0}' is already registered for this game")]
    DuplicateLevelType(String),

    /// The same item type was registered on one level type twice.
    #[error("item type '{0}' is already registered for this level type")]
    DuplicateItemType(String),

    /// One-time level type setup failed; the failure is remembered.
    #[error("level type '{level_type}' failed to initialize: {reason}")]
    ClassInit { level_type: String, reason: String },

    /// No ancestor exported a value with this name and type.
    #[error("no ancestor module exports '{0}' with the requested type")]
    MissingExport(String),

    /// A level document was driven through an impossible lifecycle step.
    #[error("cannot {action} a level in the {from:?} state")]
    InvalidTransition {
        from: crate::document::LevelState,
        action: &'static str,
    },

    /// Free-form failure reported by a game module's entry point.
    #[error("{0}")]
    Module(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Level(#[from] LevelError),
}

impl Error {
    /// Wrap `source` as a load failure of `module_id`.
    pub fn module_load(module_id: &str, source: Error) -> Self {
        Error::ModuleLoad {
            module_id: module_id.to_string(),
            source: Box::new(source),
        }
    }
}

/// Errors raised while decoding or encoding level data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The data does not look like this level type at all.
    #[error("data is not a {0}")]
    Format(String),

    /// The data passed the format sniff but could not be fully decoded.
    #[error("corrupt level data: {0}")]
    CorruptData(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_load_names_module_and_cause() {
        let err = Error::module_load("nsmbw", Error::UnknownModule("nsmbw".into()));
        let msg = err.to_string();
        assert!(msg.contains("'nsmbw'"));
        assert!(msg.contains("no game module registered"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn level_errors_convert() {
        let err: Error = LevelError::CorruptData("short read".into()).into();
        assert!(matches!(err, Error::Level(LevelError::CorruptData(_))));
    }
}
