//! The narrow installed-package database interface the installer drives.
//!
//! This is deliberately *not* a SQLite binding: the real installed-package database is an
//! external collaborator, consulted here only through this trait. [`FileDatabase`] is a
//! file-backed reference implementation good enough to drive the installer and its tests;
//! [`MemoryDatabase`] is a pure in-memory implementation for unit tests that don't need
//! persistence.

use pkg_types::Name;
use pkg_types::Package;
use pkg_types::Soname;

use crate::Error;
use crate::MatchMode;

/// The outcome a caller reports to [`PackageDatabase::register_finale`], mirroring the
/// `pkgdb_register_finale(db, result_code)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionOutcome {
    /// The transaction completed; the pending record becomes permanent.
    Commit,
    /// The transaction failed; the pending record is discarded.
    Abort,
}

/// The narrow query/register interface the installer uses to consult and update the
/// installed-package database.
///
/// Implementations own whatever locking/persistence scheme they like; the installer only
/// requires the operations below and the invariant that a successful `register_pkg` followed by
/// `register_finale(Commit)` is durably visible to subsequent `query` calls, while
/// `register_finale(Abort)` leaves the database exactly as it was before `register_pkg`.
pub trait PackageDatabase {
    /// Opens the database, acquiring whatever lock the implementation uses.
    fn open(&mut self) -> Result<(), Error>;

    /// Closes the database, releasing any held lock.
    fn close(&mut self) -> Result<(), Error>;

    /// Returns every registered package whose name matches `pattern` under `mode`.
    fn query(&self, pattern: &str, mode: MatchMode) -> Result<Vec<Package>, Error>;

    /// Registers `pkg` as pending. Returns [`Error::AlreadyRegistered`] if a package of the same
    /// name is already registered and `force` is `false`.
    ///
    /// The registration is provisional until [`Self::register_finale`] is called with
    /// [`TransactionOutcome::Commit`].
    fn register_pkg(&mut self, pkg: Package, force: bool) -> Result<(), Error>;

    /// Finalizes the most recent [`Self::register_pkg`] call: commits it permanently, or aborts
    /// and discards it (`Rollback`: "the DB transaction is explicitly aborted via
    /// `register_finale(db, error_code)`").
    fn register_finale(&mut self, outcome: TransactionOutcome) -> Result<(), Error>;

    /// Removes a previously committed package's record entirely (used by the installer's
    /// split-upgrade and deinstall paths).
    fn unregister_pkg(&mut self, name: &Name) -> Result<(), Error>;

    /// Returns how many other registered packages still reference `dir` as an owned directory,
    /// besides `pkg` itself.
    fn is_dir_used(&self, pkg: &Name, dir: &str) -> Result<usize, Error>;

    /// Returns whether any registered package claims to own `path`.
    fn file_exists(&self, path: &str) -> Result<bool, Error>;

    /// Returns whether any registered package provides `soname`.
    fn is_shlib_provided(&self, soname: &Soname) -> Result<bool, Error>;

    /// Returns whether any registered package provides virtual capability `capability`.
    fn is_provided(&self, capability: &str) -> Result<bool, Error>;

    /// Updates the captured installed content of `path`'s config file record for `pkg`, so the
    /// next upgrade's 3-way merge has an accurate `local` baseline.
    fn update_config_file_content(&mut self, pkg: &Name, path: &str, content: String) -> Result<(), Error>;
}
