#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod abi;
pub use abi::Abi;
pub use abi::Arch;
pub use abi::Os;

mod compression;
pub use compression::CompressionAlgorithm;

mod date;
pub use date::Timestamp;

mod error;
pub use error::Error;

mod license;
pub use license::License;
pub use license::LicenseLogic;

mod macros;
use macros::regex_once;

mod maintainer;
pub use maintainer::Maintainer;

mod name;
pub use name::Name;

mod package;
pub use package::ConfigFile;
pub use package::ConfigMergeStatus;
pub use package::Message;
pub use package::MessageTrigger;
pub use package::Package;
pub use package::PackageDependency;
pub use package::PackageDirectory;
pub use package::PackageFile;
pub use package::PackageInstallReason;
pub use package::PackageOption;

mod path;
pub use path::AbsolutePath;

mod relation;
pub use relation::Dependency;
pub use relation::Group;
pub use relation::OptionalDependency;

mod repository;
pub use repository::IpPreference;
pub use repository::MirrorType;
pub use repository::Repository;
pub use repository::RepositoryKey;
pub use repository::RepositoryMeta;
pub use repository::SignatureType;

mod shlib;
pub use shlib::SharedLibraryDependency;
pub use shlib::Soname;

mod size;
pub use size::FlatSize;
pub use size::PkgSize;

mod url;
pub use url::Url;

mod version;
pub use version::Epoch;
pub use version::Pkgrel;
pub use version::Pkgver;
pub use version::SchemaVersion;
pub use version::Version;
pub use version::VersionComparison;
pub use version::VersionRequirement;
