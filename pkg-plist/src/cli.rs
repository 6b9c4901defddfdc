//! Command-line argument handling for the `pkg-plist` binary.

use std::path::PathBuf;

use clap::Parser;

/// Parse a packing list and print its expanded entries as JSON.
#[derive(Debug, Parser)]
#[command(name = "pkg-plist", version, about)]
pub struct Cli {
    /// Path to the packing list to parse.
    pub plist: PathBuf,

    /// Directory to look up `<keyword>.ucl` definitions for unrecognized keywords in.
    #[arg(long)]
    pub keyword_dir: Option<PathBuf>,
}
