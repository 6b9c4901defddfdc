#![doc = include_str!("../README.md")]

//! The narrow installed-package database interface the installer consults and updates (spec
//! §6). The real database (SQLite-backed) is an external collaborator this workspace does not
//! implement; [`PackageDatabase`] is the trait boundary, with [`FileDatabase`] and
//! [`MemoryDatabase`] as reference implementations behind it.

mod database;
mod error;
mod file_db;
mod memory;
mod query;

pub use database::PackageDatabase;
pub use database::TransactionOutcome;
pub use error::Error;
pub use file_db::FileDatabase;
pub use memory::MemoryDatabase;
pub use query::MatchMode;
pub use query::Selector;
