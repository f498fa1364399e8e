//! Storyloom core: the chapter and scene store of a manuscript, and its
//! reconciliation with a local cache and a remote backend.
//!
//! The [`store::SceneStore`] groups scenes under chapter entries. Untrusted
//! input (cached JSON, backend records, seeds) always passes through the
//! normalizers in [`scene`], [`chapter`] and [`store`], which never fail.
//! [`reconciler::SceneStoreReconciler`] owns a store, writes every change
//! to the cache and pushes debounced writes to a [`backend::StorageBackend`].
#![warn(missing_docs)]

/// Configuration options
pub mod config;

/// Error (common error types)
pub mod error;

/// Scenes and scene normalization
pub mod scene;

/// Chapter entries of the scene store
pub mod chapter;

/// Scene store and its edit operations
pub mod store;

/// Manuscript chapters
pub mod manuscript;

/// Default scene titles and reindexing
pub mod reindex;

/// Merging backend data into the scene store
pub mod merge;

/// Key-value persistence port
pub mod storage;

/// Remote backend port and the local backend
pub mod backend;

/// Debounced scheduling of remote writes
pub mod scheduler;

/// Store reconciliation with cache and backend
pub mod reconciler;

/// One-shot scene seeds
pub mod seed;

/// Utility functions
pub mod utils;

pub use error::{Result, StoryloomError};
pub use reconciler::SceneStoreReconciler;
pub use store::SceneStore;
