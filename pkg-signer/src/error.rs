//! Error handling.

use std::path::PathBuf;

/// The error that can occur when signing, verifying, or managing the fingerprint trust store.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error.
    #[error("I/O error while {context}: {source}")]
    Io {
        /// The context in which the error occurred.
        context: String,
        /// The source error.
        source: std::io::Error,
    },

    /// A signature could not be produced or verified by the underlying cryptographic primitive.
    #[error("signature operation failed for {kind}: {reason}")]
    Crypto {
        /// Which signer kind failed.
        kind: &'static str,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// A signature's wire-format magic (`$PKGSIGN:TYPE$`) referenced an unknown signer kind.
    #[error("unknown signer kind in signature wire format: {kind}")]
    UnknownSignerKind {
        /// The unrecognized kind string.
        kind: String,
    },

    /// No trusted key's fingerprint could validate any signature record in the payload.
    #[error("no trusted and valid signature found")]
    Untrusted,

    /// A fingerprint appeared in `revoked/` and is refused regardless of `trusted/`.
    #[error("fingerprint {fingerprint} is revoked")]
    Revoked {
        /// The revoked fingerprint, hex-encoded.
        fingerprint: String,
    },

    /// A fingerprint definition file (`{{function=sha256, fingerprint=<hex>}}`) failed to parse.
    #[error("malformed fingerprint file {path}: {reason}")]
    MalformedFingerprintFile {
        /// The path of the fingerprint file.
        path: PathBuf,
        /// A human-readable description of the problem.
        reason: String,
    },
}

impl Error {
    /// Builds an [`Error::Io`] with the given context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }
}
