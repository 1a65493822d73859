//! Error types for docimport-core.

use thiserror::Error;

use crate::importer::Role;

/// Failure reported by a [`crate::contract::ContentStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store refused the write (constraint violation, validation, ...).
    #[error("{0}")]
    Rejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Transport, IO or other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Failure of a single import step.
///
/// The message of every variant is also appended to the importer's error log,
/// so callers usually only need to decide whether to continue.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The source-file term could not be resolved; the whole file is skipped.
    #[error("Problem creating file tax item \"{slug}\" for {path}: {source}")]
    GroupingTerm {
        slug: String,
        path: String,
        #[source]
        source: StoreError,
    },

    /// The record for one entity could not be inserted or updated.
    #[error("Problem inserting/updating post for {role} \"{name}\": {source}")]
    Write {
        role: Role,
        name: String,
        #[source]
        source: StoreError,
    },
}

/// Invalid [`crate::config::ImportConfig`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("throttle_batch must be at least 1")]
    ZeroThrottleBatch,
}

/// Snapshot load/save failures of [`crate::memory_store::MemoryStore`].
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
