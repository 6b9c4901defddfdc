//! Package archive compression.

use serde::Deserialize;
use serde::Serialize;
use strum::AsRefStr;
use strum::Display;
use strum::EnumString;
use strum::IntoStaticStr;
use strum::VariantNames;

/// The compression algorithm used for a package archive, keyed by its tar-archive file
/// extension (`tzst`, `txz`, `tbz`, `tgz`).
#[derive(
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    EnumString,
    Eq,
    IntoStaticStr,
    PartialEq,
    Serialize,
    VariantNames,
)]
#[serde(untagged)]
pub enum CompressionAlgorithm {
    /// Gzip-compressed tar archive (`tgz`).
    #[serde(rename = "tgz")]
    #[strum(to_string = "tgz")]
    Gzip,

    /// Bzip2-compressed tar archive (`tbz`).
    #[serde(rename = "tbz")]
    #[strum(to_string = "tbz")]
    Bzip2,

    /// Xz-compressed tar archive (`txz`).
    #[serde(rename = "txz")]
    #[strum(to_string = "txz")]
    Xz,

    /// Zstd-compressed tar archive (`tzst`).
    #[default]
    #[serde(rename = "tzst")]
    #[strum(to_string = "tzst")]
    Zstd,
}
