//! The result of a single fetch attempt.

/// Outcome of a `fetch(repo, dest, item)` call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FetchOutcome {
    /// The destination already matched `item.mtime`; nothing was transferred.
    UpToDate,
    /// The item was transferred successfully.
    Ok,
    /// The remote reported the item does not exist.
    NotFound,
    /// The caller's progress callback requested cancellation.
    Cancel,
    /// No network path to the remote could be established.
    NoNetwork,
    /// An unrecoverable transport or protocol error occurred.
    Fatal,
}
