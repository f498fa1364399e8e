use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for storyloom operations
#[derive(Debug, Error)]
pub enum StoryloomError {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Config errors
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    // Persistence port errors
    #[error("Storage error for key '{key}': {message}")]
    Storage { key: String, message: String },

    // Remote backend errors
    #[error("Backend request failed: {0}")]
    Backend(String),

    #[error("Project id '{0}' already exists")]
    ProjectExists(String),

    // Store errors
    #[error("Chapter '{0}' not found in scene store")]
    ChapterNotFound(String),

    #[error("Scene '{scene_id}' not found in chapter '{chapter_id}'")]
    SceneNotFound { chapter_id: String, scene_id: String },

    #[error("Cannot move scene from position {from} to {to} in a chapter of {len} scenes")]
    InvalidMove { from: usize, to: usize, len: usize },
}

/// Result type alias for storyloom operations
pub type Result<T> = std::result::Result<T, StoryloomError>;

impl StoryloomError {
    /// Build a storage error for `key`.
    pub fn storage(key: &str, message: impl std::fmt::Display) -> Self {
        StoryloomError::Storage {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    /// Build a backend error from anything displayable.
    pub fn backend(message: impl std::fmt::Display) -> Self {
        StoryloomError::Backend(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_names_key() {
        let err = StoryloomError::storage("scene_builder_store_novel", "cache directory is not writable");
        assert_eq!(
            err.to_string(),
            "Storage error for key 'scene_builder_store_novel': cache directory is not writable"
        );
    }

    #[test]
    fn test_backend_error_message() {
        let err = StoryloomError::backend("503 Service Unavailable");
        assert_eq!(
            err.to_string(),
            "Backend request failed: 503 Service Unavailable"
        );
    }
}
