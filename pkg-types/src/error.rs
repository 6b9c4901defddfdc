//! Error handling.

use std::path::PathBuf;

/// An error that can occur when constructing or validating a core data type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An invalid absolute path.
    #[error("The path {0} is not absolute")]
    InvalidAbsolutePath(String),

    /// An invalid ABI string.
    #[error("Invalid ABI string: {0}")]
    InvalidAbi(String),

    /// An invalid timestamp (in seconds since the epoch).
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// An invalid archive (flat) size in bytes.
    #[error("Invalid flat size: {0}")]
    InvalidFlatSize(String),

    /// An invalid license expression.
    #[error("Invalid license '{value}': {reason}")]
    InvalidLicense {
        /// The offending license string.
        value: String,
        /// Why it is considered invalid.
        reason: String,
    },

    /// An invalid license logic operator.
    #[error("Invalid license logic: {0}")]
    InvalidLicenseLogic(String),

    /// An invalid maintainer string.
    #[error("Invalid maintainer: {0}")]
    InvalidMaintainer(String),

    /// An invalid package name.
    #[error("Invalid package name: {0}")]
    InvalidName(String),

    /// An invalid package size in bytes.
    #[error("Invalid package size: {0}")]
    InvalidPkgSize(String),

    /// An invalid shared-library name.
    #[error("Invalid shared-library name: {0}")]
    InvalidSoname(String),

    /// An invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An invalid version string.
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// An invalid version comparison operator.
    #[error("Invalid version comparison: {0}")]
    InvalidVersionComparison(String),

    /// An invalid version requirement (comparison operator plus version).
    #[error("Invalid version requirement: {0}")]
    InvalidVersionRequirement(String),

    /// A duplicate key was inserted into a uniqueness-constrained collection.
    #[error("Duplicate {kind} entry: {key}")]
    Duplicate {
        /// What kind of collection rejected the insert (e.g. "file", "dependency").
        kind: &'static str,
        /// The key that was already present.
        key: String,
    },

    /// A path that is supposed to be relative to a package prefix escapes it.
    #[error("Path {0} escapes the package root")]
    PathEscapesRoot(PathBuf),
}
