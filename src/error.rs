//! Error types shared by the providers, the reconciler and snapshots

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::reconcile::ItemId;

/// Failure reported by a tree provider while listing children.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("entry not found: {0}")]
    NotFound(String),

    #[error("failed to list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("listing timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure of a reconciliation request. The UI tree is never partially
/// mutated when one of these is returned.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to list children of {key}: {source}")]
    Provider {
        key: String,
        #[source]
        source: ProviderError,
    },

    #[error("item {0} is no longer attached to the tree")]
    Detached(ItemId),
}

/// Malformed outline text passed to `ArenaTree::from_outline`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OutlineError {
    #[error("line {line}: duplicate key '{key}'")]
    DuplicateKey { line: usize, key: String },

    #[error("line {line}: indentation jumps more than one level")]
    IndentJump { line: usize },

    #[error("line {line}: indentation must be a multiple of two spaces")]
    OddIndent { line: usize },

    #[error("line {line}: expected a single top-level node")]
    MultipleRoots { line: usize },

    #[error("outline is empty")]
    Empty,
}

/// Failure while reading or writing a UI tree snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot root key does not match the tree root")]
    RootMismatch,
}
