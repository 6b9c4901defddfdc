//! Error handling.

use std::path::PathBuf;

/// An error that can occur while fetching or validating repository content.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error.
    #[error("I/O error while {context}: {source}")]
    Io {
        /// The context in which the error occurred.
        context: &'static str,
        /// The source error.
        source: std::io::Error,
    },

    /// Fetching an item from the repository failed.
    #[error(transparent)]
    Fetch(#[from] pkg_fetch::Error),

    /// An archive could not be read or an entry within it could not be extracted.
    #[error(transparent)]
    Archive(#[from] pkg_compress::Error),

    /// Signature or fingerprint verification failed.
    #[error(transparent)]
    Signer(#[from] pkg_signer::Error),

    /// A fetch did not succeed (`NotFound`, `Cancel`, `NoNetwork`, `Fatal`).
    #[error("fetch of {what} from {repo} did not succeed: {outcome:?}")]
    FetchFailed {
        /// What was being fetched (e.g. `meta.conf`, a manifest archive).
        what: &'static str,
        /// The repository name.
        repo: String,
        /// The outcome reported by the fetch layer.
        outcome: pkg_fetch::FetchOutcome,
    },

    /// `meta.conf`'s JSON body failed to parse.
    #[error("malformed meta.conf: {0}")]
    MetaJson(#[source] serde_json::Error),

    /// `meta.conf` failed validation against the embedded v2 schema.
    #[error("meta.conf failed schema validation: {reason}")]
    MetaSchema {
        /// A human-readable description of the first validation failure.
        reason: String,
    },

    /// The requested entry was not present in the archive.
    #[error("entry {name:?} not found in archive")]
    EntryNotFound {
        /// The entry name that was requested.
        name: String,
    },

    /// No signature record in the archive validated against the repository's trust
    /// configuration.
    #[error("no valid, trusted signature found for {path}")]
    Untrusted {
        /// The archive the signature check was performed on.
        path: PathBuf,
    },

    /// The repository is configured with `signature_type = none` but a caller asked for a
    /// verified fetch.
    #[error("repository {repo} has signature verification disabled")]
    SignatureDisabled {
        /// The repository name.
        repo: String,
    },
}

impl Error {
    /// Builds an [`Error::Io`] with the given context.
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}
