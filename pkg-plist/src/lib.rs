#![doc = include_str!("../README.md")]

//! Packing-list parsing and keyword expansion.

mod error;
pub mod keyword;
mod parser;
mod plist;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::Error;
pub use keyword::KeywordAction;
pub use keyword::KeywordDefinition;
pub use parser::parse_plist;
pub use parser::parse_plist_file;
pub use plist::Plist;
pub use plist::PlistEntry;
