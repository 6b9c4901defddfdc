//! Command line argument handling.

use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;

/// Read or rewrite a package manifest document.
#[derive(Clone, Debug, Parser)]
#[command(about, author, name = "pkg-manifest", version)]
pub struct Cli {
    /// Log verbosity level.
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// The manifest document to read. Reads stdin when omitted.
    pub path: Option<PathBuf>,

    /// The output format to re-emit the manifest as.
    #[arg(long, value_enum, default_value_t = CliFormat::JsonCompact)]
    pub format: CliFormat,

    /// Omit the `files`/`config`/`directories` sections.
    #[arg(long)]
    pub no_files: bool,

    /// Include `timestamp` and the `repository`/`relocated` annotations.
    #[arg(long)]
    pub local_metadata: bool,
}

/// The `--format` values, mirroring [`pkg_manifest::Format`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliFormat {
    /// Single-line JSON.
    JsonCompact,
    /// Indented JSON.
    Json,
    /// YAML.
    Yaml,
    /// UCL (emitted as indented JSON; see [`pkg_manifest::format`] module docs).
    Ucl,
}

impl From<CliFormat> for pkg_manifest::Format {
    fn from(value: CliFormat) -> Self {
        match value {
            CliFormat::JsonCompact => pkg_manifest::Format::JsonCompact,
            CliFormat::Json => pkg_manifest::Format::Json,
            CliFormat::Yaml => pkg_manifest::Format::Yaml,
            CliFormat::Ucl => pkg_manifest::Format::Ucl,
        }
    }
}
