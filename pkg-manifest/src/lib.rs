#![doc = include_str!("../README.md")]

mod error;
pub use crate::error::Error;

mod percent;

mod manifest;
pub use crate::manifest::Manifest;
pub use crate::manifest::ManifestDependency;
pub use crate::manifest::ManifestDirectoryAttrs;
pub use crate::manifest::ManifestDirectoryEntry;
pub use crate::manifest::ManifestFlags;
pub use crate::manifest::ManifestMessage;

mod format;
pub use crate::format::EmitOptions;
pub use crate::format::Format;
pub use crate::format::emit;
pub use crate::format::parse;
pub use crate::format::parse_manifest;
