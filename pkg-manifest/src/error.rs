//! Error handling.

use std::path::PathBuf;

/// Errors produced while serializing or parsing a package manifest.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A value read from the manifest document could not be represented as a [`pkg_types`]
    /// type.
    #[error(transparent)]
    Types(#[from] pkg_types::Error),

    /// I/O error at a path.
    #[error("I/O error at path {path:?} while {context}:\n{source}")]
    IoPath {
        /// The path at which the error occurred.
        path: PathBuf,
        /// The operation in progress.
        context: &'static str,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The document could not be parsed as JSON/UCL or YAML.
    #[error("failed to parse manifest as {format}: {source}")]
    Parse {
        /// Which parser was attempted.
        format: &'static str,
        /// The underlying error, stringified (the JSON/YAML crates' error types don't share a
        /// common trait object worth wrapping just for this).
        source: String,
    },

    /// The document could not be serialized.
    #[error("failed to emit manifest as {format}: {source}")]
    Emit {
        /// Which emitter was used.
        format: &'static str,
        /// The underlying error, stringified.
        source: String,
    },

    /// A `files` entry's key was not valid percent-encoded UTF-8.
    #[error("invalid percent-encoded path in manifest: {0}")]
    InvalidPercentEncoding(String),

    /// A message's `minimum_version`/`maximum_version` predicate failed to parse.
    #[error("invalid message version predicate {0:?}: {1}")]
    InvalidVersionPredicate(String, #[source] pkg_types::Error),

    /// A required field was absent when converting a [`crate::Manifest`] into a
    /// [`pkg_types::Package`].
    #[error("manifest is missing required field {0:?}")]
    MissingField(&'static str),

    /// A message's `type` key was not one of `always | install | remove | upgrade`.
    #[error("invalid message type {0:?}")]
    InvalidMessageType(String),
}
