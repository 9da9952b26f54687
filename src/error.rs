//! Failures that stop a validation run.
//!
//! Defects in plugin metadata are never reported through these types; they
//! become diagnostics on the descriptor. Only a repository that cannot be
//! loaded or a plugin that cannot be found end up here.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a metadata repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A fact document could not be read.
    #[error("failed to read fact document {path:?}: {source}")]
    Io {
        /// Path of the document.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fact document is not valid JSON or does not match the expected layout.
    #[error("failed to parse fact document {origin}: {source}")]
    Parse {
        /// Path or description of the document source.
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised when a caller asks for a plugin by URI.
#[derive(Debug, Error)]
pub enum DescribeError {
    /// The requested URI is not declared as a plugin in the repository.
    #[error("no plugin with URI '{uri}' found")]
    NotFound {
        /// URI that was looked up.
        uri: String,
    },

    /// The repository backing the request could not be loaded.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
