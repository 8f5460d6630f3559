use std::path::PathBuf;

use thiserror::Error;

use crate::session::DocumentId;

pub type Result<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Startup files absent from the data directory.
    #[error("required files are missing: {}", join_paths(.0))]
    MissingFiles(Vec<PathBuf>),

    #[error(transparent)]
    Core(#[from] tilewright_core::Error),

    #[error("no level type recognizes this data")]
    UnrecognizedLevel,

    #[error("unknown game '{0}'")]
    UnknownGame(String),

    #[error("game '{game}' has no level type #{index}")]
    NoSuchLevelType { game: String, index: usize },

    #[error("level type '{level_type}' has no template #{index}")]
    NoSuchTemplate { level_type: String, index: usize },

    #[error("no open document {0}")]
    NoSuchDocument(DocumentId),

    #[error("document {0} has never been saved to a file")]
    NoPath(DocumentId),

    #[error("cannot open more than {0} documents")]
    TooManyDocuments(usize),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("usage: {0}")]
    Usage(String),
}

impl EditorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EditorError::Io {
            path: path.into(),
            source,
        }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_lists_every_path() {
        let err = EditorError::MissingFiles(vec![
            PathBuf::from("data/icon.png"),
            PathBuf::from("data/splash.png"),
        ]);
        assert_eq!(
            err.to_string(),
            "required files are missing: data/icon.png, data/splash.png"
        );
    }

    #[test]
    fn core_errors_pass_through() {
        let err: EditorError = tilewright_core::Error::Config("bad".into()).into();
        assert_eq!(err.to_string(), "catalog error: bad");
    }
}
