//! The terminal result of a transaction.

/// The terminal result of an install/upgrade transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// A fresh install or upgrade completed; the DB record was committed.
    Installed,
    /// The requested package (same name, version, and checksum) was already installed; nothing
    /// was touched.
    AlreadyInstalled,
}
