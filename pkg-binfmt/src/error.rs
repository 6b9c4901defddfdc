//! Error handling.

use std::path::PathBuf;

/// Errors produced while analyzing an ELF or Mach-O binary.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error at a path.
    #[error("I/O error at path {path} while {context}:\n{source}")]
    IoPath {
        /// The path at which the error occurred.
        path: PathBuf,
        /// The operation in progress, completing "I/O error at path {path} while ".
        context: &'static str,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The file is shorter than a fixed-size header requires.
    #[error("truncated binary: need {needed} bytes at offset {offset}, have {available}")]
    Truncated {
        /// The offset the read started at.
        offset: usize,
        /// The number of bytes required.
        needed: usize,
        /// The number of bytes actually available.
        available: usize,
    },

    /// Neither an ELF nor a Mach-O magic was recognized.
    #[error("unrecognized binary format (magic {0:#010x})")]
    UnknownFormat(u32),

    /// A FAT Mach-O container had no arch slices.
    #[error("FAT Mach-O has no architecture slices")]
    EmptyFatBinary,

    /// The ELF parser (`goblin`) rejected the file.
    #[error("ELF parse error: {0}")]
    Elf(#[from] goblin::error::Error),

    /// A value read from the binary could not be represented as a [`pkg_types`] type.
    #[error(transparent)]
    Types(#[from] pkg_types::Error),
}
