#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

//! Repository-side operations: fetching and validating `meta.conf`, fetching
//! manifest/data archives with signed-archive extraction, and resolving/fetching individual
//! package archives.

mod archive;
mod cache;
mod error;
mod meta;
mod repository;

pub use archive::ExtractedArchive;
pub use archive::SignatureRecord;
pub use archive::walk_and_extract;
pub use cache::cached_name;
pub use cache::cached_path;
pub use error::Error;
pub use meta::parse_meta;
pub use repository::fetch_data;
pub use repository::fetch_manifests;
pub use repository::fetch_meta;
pub use repository::fetch_package;
pub use repository::mirror_package;
