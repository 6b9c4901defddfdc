//! Command line argument handling.

use std::path::PathBuf;

use clap::Parser;

/// Inspect an ELF or Mach-O/FAT binary's ABI and shared-library dependencies.
#[derive(Clone, Debug, Parser)]
#[command(about, author, name = "pkg-binfmt", version)]
pub struct Cli {
    /// Log verbosity level.
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// The binary to analyze.
    pub path: PathBuf,

    /// The host ABI to classify required libraries against (`OS:major[.minor]:arch`).
    #[arg(long)]
    pub host_abi: Option<String>,

    /// Preferred architecture when the binary is a FAT/Universal Mach-O container.
    #[arg(long)]
    pub arch_hint: Option<String>,
}
