//! The unit of work a [`crate::Fetcher`] operates on.

/// A repository-relative item to fetch, plus the conditional-GET state needed to support
/// `UpToDate` short-circuiting.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FetchItem {
    /// Path of the item relative to the repository root.
    pub relpath: String,
    /// The locally-cached modification time, used as `If-Modified-Since` (HTTP) or as the
    /// `ims_epoch` argument of the SSH/TCP line protocol.
    pub mtime: Option<i64>,
}

impl FetchItem {
    /// Creates a [`FetchItem`] with no previously-known modification time.
    pub fn new(relpath: impl Into<String>) -> Self {
        Self { relpath: relpath.into(), mtime: None }
    }

    /// Creates a [`FetchItem`] carrying a previously-cached modification time for conditional
    /// fetches.
    pub fn with_mtime(relpath: impl Into<String>, mtime: i64) -> Self {
        Self { relpath: relpath.into(), mtime: Some(mtime) }
    }
}
