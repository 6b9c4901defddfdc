//! Error handling.

use std::path::PathBuf;

/// An error that can occur while running an install/upgrade transaction.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error at a path, during extraction, rename, or cleanup.
    #[error("I/O error at {path:?} while {context}:\n{source}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// What was being done to it.
        context: &'static str,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A path resolved outside of the package's prefix or the install root.
    #[error(transparent)]
    Path(#[from] pkg_types::Error),

    /// Reading the archive, or one of its entries, failed.
    #[error(transparent)]
    Archive(#[from] pkg_compress::Error),

    /// The embedded `+MANIFEST` entry failed to parse.
    #[error(transparent)]
    Manifest(#[from] pkg_manifest::Error),

    /// Applying a packing list to the parsed manifest failed.
    #[error(transparent)]
    Plist(#[from] pkg_plist::Error),

    /// A lifecycle hook script failed.
    #[error(transparent)]
    Script(#[from] pkg_script::Error),

    /// The local package database reported an error.
    #[error(transparent)]
    Database(#[from] pkg_db::Error),

    /// The archive had no `+MANIFEST` entry.
    #[error("archive is missing its +MANIFEST entry")]
    MissingManifest,

    /// An archive entry was neither a directory, regular file, symlink, nor hardlink.
    #[error("unsupported archive entry type for {path:?}")]
    UnsupportedEntryType {
        /// The offending entry's path.
        path: PathBuf,
    },

    /// A hardlink entry referenced a link target that was never seen earlier in the archive.
    #[error("hardlink {path:?} references unknown target {target:?}")]
    UnknownHardlinkTarget {
        /// The hardlink entry's path.
        path: PathBuf,
        /// The link target named by the entry.
        target: PathBuf,
    },

    /// `CheckConflicts` found a file claimed by another already-registered package.
    #[error("file {path} is already owned by package {owner}")]
    FileConflict {
        /// The conflicting path.
        path: String,
        /// The owning package's name.
        owner: String,
    },

    /// `CheckConflicts` found the package already registered and neither `force` nor an upgrade
    /// was requested.
    #[error("package {name} is already installed (use force to reinstall)")]
    AlreadyInstalled {
        /// The conflicting package's name.
        name: String,
    },

    /// The transaction was cancelled via its cooperative cancellation flag.
    #[error("transaction cancelled")]
    Cancelled,

    /// Writing the metalog failed.
    #[error("failed to write metalog entry to {path:?}:\n{source}")]
    Metalog {
        /// The metalog file's path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl Error {
    /// Shorthand for [`Error::Io`].
    pub fn io(path: impl Into<PathBuf>, context: &'static str, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), context, source }
    }
}
