//! Error handling.

use std::path::PathBuf;

use pkg_types::Name;

/// An error that can occur when querying or mutating an installed-package database.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A query pattern was not valid for the requested [`crate::MatchMode`].
    #[error("invalid {mode} pattern '{pattern}': {context}")]
    InvalidPattern {
        /// The match mode the pattern was evaluated under.
        mode: &'static str,
        /// The offending pattern.
        pattern: String,
        /// What was wrong with it.
        context: String,
    },

    /// `register_pkg` was called for a package already present, without `force`.
    #[error("package {name} is already registered (use force to overwrite)")]
    AlreadyRegistered {
        /// The conflicting package's name.
        name: Name,
    },

    /// `register_finale` was called with no open transaction.
    #[error("no transaction is open to finalize")]
    NoOpenTransaction,

    /// Acquiring the database's advisory lock failed.
    #[error("could not acquire database lock at {path}: {source}")]
    Lock {
        /// The lock file's path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An I/O error occurred at a path.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A query referenced a package that is not present in the database.
    #[error("no such package: {name}")]
    NotFound {
        /// The requested package's name.
        name: String,
    },

    /// A package record failed to emit or parse as a manifest document.
    #[error(transparent)]
    Manifest(#[from] pkg_manifest::Error),
}
