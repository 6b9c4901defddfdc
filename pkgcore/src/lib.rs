#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

//! The top-level facade wiring every `pkg-*` crate together: a
//! [`Context`] that owns the installed-package database handle and active repository set, an
//! aggregated [`Error`] spanning every sub-crate's error type, and the [`ExitCode`] taxonomy
//! used throughout as the standard outcome codes.
//!
//! What this crate deliberately does **not** do: implement the
//! SQLite-backed database itself (see [`pkg_db::PackageDatabase`] for the trait boundary), solve
//! dependencies, parse a CLI, load a configuration file, or execute scripts outside the hooks
//! [`pkg_script`] already exposes.

mod context;
mod error;
mod exit_code;

pub use context::Context;
pub use error::Error;
pub use exit_code::ExitCode;

// Re-exported so a `Context` consumer can build the values its methods take without also
// depending on every sub-crate directly.
pub use pkg_db::FileDatabase;
pub use pkg_db::MatchMode;
pub use pkg_db::MemoryDatabase;
pub use pkg_db::PackageDatabase;
pub use pkg_installer::InstallReport;
pub use pkg_installer::InstallSettings;
pub use pkg_installer::Outcome as InstallOutcome;
pub use pkg_types::Repository;
