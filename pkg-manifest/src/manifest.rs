//! The serde-facing document model: a `Manifest` mirrors [`pkg_types::Package`]
//! field-for-field using plain, serde-friendly types, with custom conversions doing the typed
//! parsing/validation that the domain model demands. Keeping the wire shape separate from
//! `Package` means a malformed document (bad version string, unknown license) fails in one
//! place instead of requiring every core type to grow its own `Deserialize` impl.

use std::str::FromStr;

use indexmap::IndexMap;
use pkg_types::Abi;
use pkg_types::FlatSize;
use pkg_types::License;
use pkg_types::LicenseLogic;
use pkg_types::Message;
use pkg_types::MessageTrigger;
use pkg_types::Name;
use pkg_types::Package;
use pkg_types::PackageDependency;
use pkg_types::PackageDirectory;
use pkg_types::PackageFile;
use pkg_types::PackageOption;
use pkg_types::PkgSize;
use pkg_types::Soname;
use pkg_types::Timestamp;
use pkg_types::Version;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::percent;

fn is_false(b: &bool) -> bool {
    !*b
}

/// A `deps` entry: `name → {origin, version, locked?}`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ManifestDependency {
    /// The dependency's origin (category/port path equivalent).
    pub origin: String,
    /// The exact version the depending package was built against.
    pub version: String,
    /// Whether this dependency is pinned against automatic upgrades.
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    /// Alternate dependencies satisfying an "this OR that" group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternates: Vec<ManifestDependency>,
}

/// A `directories` entry's long form: `{uname, gname, perm}`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ManifestDirectoryAttrs {
    /// Owning user name.
    pub uname: String,
    /// Owning group name.
    pub gname: String,
    /// Permission bits, as an octal string (e.g. `"0755"`).
    pub perm: String,
}

/// A `directories` value: either a bare `bool` (directory exists, default attributes) or the
/// long `{uname, gname, perm}` form.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ManifestDirectoryEntry {
    /// Bare presence marker.
    Flag(bool),
    /// Explicit ownership/permission attributes.
    Attrs(ManifestDirectoryAttrs),
}

/// A `messages` array entry.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ManifestMessage {
    /// The message text.
    pub message: String,
    /// `always | install | remove | upgrade`; absent means `always`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    /// For `upgrade`-type messages, the inclusive lower bound of the version interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_version: Option<String>,
    /// For `upgrade`-type messages, the inclusive upper bound of the version interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_version: Option<String>,
}

/// The canonical UCL/JSON package manifest document.
///
/// All fields are optional on the wire; `name` and `version` are required to convert a
/// `Manifest` back into a non-ephemeral [`Package`]. Collections default to empty and are
/// omitted from emitted output when empty, matching the convention of
/// skipping absent repeated keys rather than writing empty arrays.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Manifest {
    /// The package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The package origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// The package version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// The target architecture, as a bare string (legacy field, informational only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// The target ABI, in `OS:major[.minor]:arch` wire form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<String>,

    /// The one-line summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// The long-form description, percent-encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// The project's homepage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub www: Option<String>,
    /// The maintainer's contact string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
    /// The installation prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Installed size, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flatsize: Option<i64>,
    /// Archive size, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkgsize: Option<i64>,
    /// Build timestamp, seconds since the epoch. Only emitted under `local_metadata`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// `single | and/multi | or/dual`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licenselogic: Option<String>,
    /// Licenses under which the package is distributed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<String>,
    /// Free-form categories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Expected system users.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
    /// Expected system groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,

    /// Dependencies, keyed by name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub deps: IndexMap<String, ManifestDependency>,

    /// Regular files, keyed by percent-encoded path, valued by `sha256-or-"-"`. Omitted entirely
    /// (empty map) when the `no_files` emit flag is set.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub files: IndexMap<String, String>,
    /// The subset of `files` that are config files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub config: Vec<String>,
    /// Directories, keyed by path.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub directories: IndexMap<String, ManifestDirectoryEntry>,

    /// Current option values, keyed by option name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, String>,
    /// Default option values, keyed by option name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub option_defaults: IndexMap<String, String>,
    /// Human-readable option descriptions, keyed by option name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub option_descriptions: IndexMap<String, String>,

    /// Shell scripts, keyed by lifecycle point (`pre-install`, `post-install`, …).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scripts: IndexMap<String, String>,
    /// Lua scripts, keyed by lifecycle point; each key may carry several snippets.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub lua_scripts: IndexMap<String, Vec<String>>,

    /// Shared libraries this package requires.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shlibs_required: Vec<String>,
    /// Shared libraries this package provides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shlibs_provided: Vec<String>,
    /// Virtual capabilities provided.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<String>,
    /// Virtual capabilities required.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    /// UIDs this package conflicts with.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,

    /// Free-form annotations. Only `repository`/`relocated` are emitted under `local_metadata`
    /// unless the caller has populated others explicitly.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: IndexMap<String, String>,
    /// Install/upgrade/remove messages, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ManifestMessage>,

    /// The package archive's content checksum, `VERSION$TYPE$DIGEST` form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<String>,
    /// The repository-relative path to the package archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repopath: Option<String>,
    /// The on-disk path to the package archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Whether removal requires explicit confirmation.
    #[serde(default, skip_serializing_if = "is_false")]
    pub vital: bool,
    /// Whether this package was installed only to satisfy a dependency.
    #[serde(default, skip_serializing_if = "is_false")]
    pub automatic: bool,
    /// Whether this package is excluded from automatic upgrades.
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,

    /// A formula string describing this package's dependency expression, if the repository
    /// tracks one separately from `deps`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dep_formula: Option<String>,
}

/// Which keys a [`Manifest`] produced by [`Manifest::from_package`] includes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ManifestFlags {
    /// Omit the `files`/`config`/`directories` keys (the compact manifest shipped to clients).
    pub no_files: bool,
    /// Include `timestamp` and the `repository`/`relocated` annotations (local-database view).
    pub local_metadata: bool,
}

impl ManifestFlags {
    /// The default flag set used by [`Manifest::from_package`] with no customization: full
    /// file list, no local-only metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `no_files`.
    pub fn with_no_files(mut self, no_files: bool) -> Self {
        self.no_files = no_files;
        self
    }

    /// Sets `local_metadata`.
    pub fn with_local_metadata(mut self, local_metadata: bool) -> Self {
        self.local_metadata = local_metadata;
        self
    }
}

fn dependency_to_manifest(dep: &PackageDependency) -> ManifestDependency {
    ManifestDependency {
        origin: dep.origin.clone(),
        version: dep.version.to_string(),
        locked: dep.locked,
        alternates: dep.alternates.iter().map(dependency_to_manifest).collect(),
    }
}

fn dependency_from_manifest(dep: &ManifestDependency) -> Result<PackageDependency, Error> {
    Ok(PackageDependency {
        origin: dep.origin.clone(),
        version: Version::new(&dep.version).map_err(Error::Types)?,
        locked: dep.locked,
        alternates: dep
            .alternates
            .iter()
            .map(dependency_from_manifest)
            .collect::<Result<_, _>>()?,
    })
}

fn directory_entry(dir: &PackageDirectory) -> ManifestDirectoryEntry {
    ManifestDirectoryEntry::Attrs(ManifestDirectoryAttrs {
        uname: dir.uname.clone(),
        gname: dir.gname.clone(),
        perm: format!("{:04o}", dir.mode),
    })
}

fn message_type_string(when: MessageTrigger) -> String {
    when.to_string()
}

impl Manifest {
    /// Builds the wire document for `package`, selecting which optional sections to include
    /// per `flags`.
    pub fn from_package(package: &Package, flags: ManifestFlags) -> Manifest {
        let mut manifest = Manifest {
            name: Some(package.name.to_string()),
            origin: Some(package.origin.clone()),
            version: package.version.as_ref().map(ToString::to_string),
            arch: package.altabi.clone(),
            abi: package.abi.as_ref().map(ToString::to_string),
            comment: non_empty(&package.comment),
            desc: non_empty(&package.desc).map(|desc| percent::encode(&desc)),
            www: non_empty(&package.www),
            maintainer: non_empty(&package.maintainer),
            prefix: non_empty(&package.prefix),
            flatsize: package.flat_size.map(|size| *size.inner() as i64),
            pkgsize: package.pkg_size.map(|size| *size.inner() as i64),
            licenselogic: Some(package.license_logic.to_string()),
            licenses: package.licenses.iter().map(ToString::to_string).collect(),
            categories: package.categories.clone(),
            users: package.users.clone(),
            groups: package.groups.clone(),
            deps: package
                .deps
                .iter()
                .map(|(name, dep)| (name.to_string(), dependency_to_manifest(dep)))
                .collect(),
            options: package
                .options
                .iter()
                .map(|(key, opt)| (key.clone(), opt.value.clone()))
                .collect(),
            option_defaults: package
                .options
                .iter()
                .map(|(key, opt)| (key.clone(), opt.default.clone()))
                .collect(),
            option_descriptions: package
                .options
                .iter()
                .map(|(key, opt)| (key.clone(), opt.description.clone()))
                .collect(),
            shlibs_required: package.shlibs_required.iter().map(|s| s.inner().to_string()).collect(),
            shlibs_provided: package.shlibs_provided.iter().map(|s| s.inner().to_string()).collect(),
            provides: package.provides.iter().cloned().collect(),
            requires: package.requires.iter().cloned().collect(),
            conflicts: package.conflicts.iter().cloned().collect(),
            messages: package
                .messages
                .iter()
                .map(|msg| ManifestMessage {
                    message: msg.text.clone(),
                    r#type: Some(message_type_string(msg.when)),
                    minimum_version: msg
                        .version_range
                        .as_ref()
                        .and_then(|(min, _)| min.as_ref())
                        .map(ToString::to_string),
                    maximum_version: msg
                        .version_range
                        .as_ref()
                        .and_then(|(_, max)| max.as_ref())
                        .map(ToString::to_string),
                })
                .collect(),
            sum: package.checksum.clone(),
            vital: package.vital,
            automatic: package.automatic,
            locked: package.locked,
            ..Manifest::default()
        };

        if !flags.no_files {
            manifest.files = package
                .files
                .iter()
                .map(|(path, file)| (percent::encode(path), file.sha256.clone().unwrap_or_else(|| "-".to_string())))
                .collect();
            manifest.config = package.config_files.keys().cloned().collect();
            manifest.directories = package
                .dirs
                .iter()
                .map(|(path, dir)| (path.clone(), directory_entry(dir)))
                .collect();
        }

        if flags.local_metadata {
            manifest.timestamp = package.timestamp.map(|ts| *ts.inner());
            manifest.annotations = package.annotations.clone();
        } else {
            manifest.annotations = package
                .annotations
                .iter()
                .filter(|(key, _)| key.as_str() != "repository" && key.as_str() != "relocated")
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
        }

        manifest
    }

    /// Converts the document into a [`Package`], parsing and validating every typed field.
    ///
    /// ## Errors
    ///
    /// Returns an error if a required field (`name`, `version`) is missing, or if any field
    /// fails to parse as its [`pkg_types`] type.
    pub fn into_package(self) -> Result<Package, Error> {
        let name_str = self.name.ok_or(Error::MissingField("name"))?;
        let name = Name::from_str(&name_str).map_err(Error::Types)?;
        let origin = self.origin.unwrap_or_default();

        let mut package = Package::new(name, origin);
        package.version = self
            .version
            .as_deref()
            .map(Version::new)
            .transpose()
            .map_err(Error::Types)?;
        package.altabi = self.arch;
        package.abi = self.abi.as_deref().map(Abi::from_str).transpose().map_err(Error::Types)?;
        package.comment = self.comment.unwrap_or_default();
        package.desc = match self.desc {
            Some(desc) => percent::decode(&desc)?,
            None => String::new(),
        };
        package.www = self.www.unwrap_or_default();
        package.maintainer = self.maintainer.unwrap_or_default();
        package.prefix = self.prefix.unwrap_or_default();
        package.flat_size = self.flatsize.map(|v| FlatSize::new(v as u64));
        package.pkg_size = self.pkgsize.map(|v| PkgSize::new(v as u64));
        package.timestamp = self.timestamp.map(Timestamp::new);
        package.checksum = self.sum;
        package.license_logic = self
            .licenselogic
            .as_deref()
            .map(LicenseLogic::from_str)
            .transpose()
            .map_err(Error::Types)?
            .unwrap_or_default();
        package.licenses = self
            .licenses
            .iter()
            .map(|license| License::from_str(license))
            .collect::<Result<_, _>>()
            .map_err(Error::Types)?;
        package.categories = self.categories;
        package.users = self.users;
        package.groups = self.groups;
        package.vital = self.vital;
        package.automatic = self.automatic;
        package.locked = self.locked;

        for (name, dep) in &self.deps {
            let dep_name = Name::from_str(name).map_err(Error::Types)?;
            package
                .add_dependency(dep_name, dependency_from_manifest(dep)?)
                .map_err(Error::Types)?;
        }

        for (encoded_path, sum) in &self.files {
            let path = percent::decode(encoded_path)?;
            package
                .add_file(PackageFile {
                    path,
                    sha256: if sum == "-" { None } else { Some(sum.clone()) },
                    uname: String::new(),
                    gname: String::new(),
                    mode: 0,
                    flags: 0,
                })
                .map_err(Error::Types)?;
        }

        for (path, entry) in &self.directories {
            let (uname, gname, mode) = match entry {
                ManifestDirectoryEntry::Flag(_) => (String::new(), String::new(), 0),
                ManifestDirectoryEntry::Attrs(attrs) => (
                    attrs.uname.clone(),
                    attrs.gname.clone(),
                    u32::from_str_radix(attrs.perm.trim_start_matches('0'), 8).unwrap_or(0),
                ),
            };
            package
                .add_directory(PackageDirectory {
                    path: path.clone(),
                    uname,
                    gname,
                    mode,
                    flags: 0,
                    atime: None,
                    mtime: None,
                    noattrs: false,
                })
                .map_err(Error::Types)?;
        }

        for (key, value) in &self.options {
            package.options.insert(
                key.clone(),
                PackageOption {
                    value: value.clone(),
                    default: self.option_defaults.get(key).cloned().unwrap_or_default(),
                    description: self.option_descriptions.get(key).cloned().unwrap_or_default(),
                },
            );
        }

        for soname in &self.shlibs_required {
            package.shlibs_required.insert(Soname::from_str(soname).map_err(Error::Types)?);
        }
        for soname in &self.shlibs_provided {
            package.shlibs_provided.insert(Soname::from_str(soname).map_err(Error::Types)?);
        }
        package.provides = self.provides.into_iter().collect();
        package.requires = self.requires.into_iter().collect();
        package.conflicts = self.conflicts.into_iter().collect();

        for (key, value) in self.annotations {
            package.add_annotation(key, value).map_err(Error::Types)?;
        }

        for message in &self.messages {
            let when = message
                .r#type
                .as_deref()
                .map(MessageTrigger::from_str)
                .transpose()
                .map_err(|_| Error::InvalidMessageType(message.r#type.clone().unwrap_or_default()))?
                .unwrap_or(MessageTrigger::Always);
            let version_range = if when == MessageTrigger::Upgrade {
                let min = parse_version_bound(message.minimum_version.as_deref())?;
                let max = parse_version_bound(message.maximum_version.as_deref())?;
                (min.is_some() || max.is_some()).then_some((min, max))
            } else {
                None
            };
            package.messages.push(Message {
                when,
                version_range,
                text: message.message.clone(),
            });
        }

        // Re-derive config files from `self.config`, now that `files` has been populated.
        for path in &self.config {
            if let Some(file) = package.files.get(path).cloned() {
                package
                    .add_config_file(pkg_types::ConfigFile {
                        file,
                        content: None,
                        merge_status: pkg_types::ConfigMergeStatus::default(),
                    })
                    .map_err(Error::Types)?;
            }
        }

        Ok(package)
    }
}

fn parse_version_bound(value: Option<&str>) -> Result<Option<Version>, Error> {
    match value {
        None | Some("") => Ok(None),
        Some(s) => Version::new(s)
            .map(Some)
            .map_err(|source| Error::InvalidVersionPredicate(s.to_string(), source)),
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use pkg_types::Abi;
    use pkg_types::Arch;
    use pkg_types::Os;
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    fn sample_package() -> TestResult<Package> {
        let mut package = Package::new(Name::from_str("zsh")?, "shells/zsh".to_string());
        package.version = Some(Version::new("5.9-1")?);
        package.comment = "a shell".to_string();
        package.desc = "a very nice shell indeed".to_string();
        package.maintainer = "maintainer@example.org".to_string();
        package.www = "https://www.zsh.org/".to_string();
        package.prefix = "/usr/local".to_string();
        package.abi = Some(Abi::new(Os::FreeBSD, 14, None, Arch::Amd64));
        package.add_file(PackageFile {
            path: "/usr/local/bin/zsh".to_string(),
            sha256: Some("sha256$deadbeef".to_string()),
            uname: "root".to_string(),
            gname: "wheel".to_string(),
            mode: 0o755,
            flags: 0,
        })?;
        package.add_directory(PackageDirectory {
            path: "/usr/local/share/zsh".to_string(),
            uname: "root".to_string(),
            gname: "wheel".to_string(),
            mode: 0o755,
            flags: 0,
            atime: None,
            mtime: None,
            noattrs: false,
        })?;
        package.add_dependency(
            Name::from_str("ncurses")?,
            PackageDependency {
                origin: "devel/ncurses".to_string(),
                version: Version::new("6.4")?,
                locked: false,
                alternates: vec![],
            },
        )?;
        Ok(package)
    }

    #[rstest]
    fn round_trip_preserves_metadata() -> TestResult<()> {
        let package = sample_package()?;
        let manifest = Manifest::from_package(&package, ManifestFlags::new());
        let round_tripped = manifest.into_package()?;

        assert_eq!(round_tripped.name, package.name);
        assert_eq!(round_tripped.origin, package.origin);
        assert_eq!(round_tripped.version, package.version);
        assert_eq!(round_tripped.abi, package.abi);
        assert_eq!(round_tripped.files, package.files);
        assert_eq!(round_tripped.dirs, package.dirs);
        assert_eq!(round_tripped.deps, package.deps);
        Ok(())
    }

    #[rstest]
    fn no_files_flag_omits_file_sections() -> TestResult<()> {
        let package = sample_package()?;
        let manifest = Manifest::from_package(&package, ManifestFlags::new().with_no_files(true));
        assert!(manifest.files.is_empty());
        assert!(manifest.directories.is_empty());

        let round_tripped = manifest.into_package()?;
        assert!(round_tripped.files.is_empty());
        Ok(())
    }

    #[rstest]
    fn local_metadata_flag_carries_timestamp_and_repository_annotation() -> TestResult<()> {
        let mut package = sample_package()?;
        package.timestamp = Some(Timestamp::new(1_700_000_000));
        package.add_annotation("repository".to_string(), "local".to_string())?;

        let without = Manifest::from_package(&package, ManifestFlags::new());
        assert!(without.timestamp.is_none());
        assert!(!without.annotations.contains_key("repository"));

        let with = Manifest::from_package(&package, ManifestFlags::new().with_local_metadata(true));
        assert_eq!(with.timestamp, Some(1_700_000_000));
        assert_eq!(with.annotations.get("repository"), Some(&"local".to_string()));
        Ok(())
    }

    #[rstest]
    fn percent_encodes_non_ascii_file_paths() -> TestResult<()> {
        let mut package = sample_package()?;
        package.add_file(PackageFile {
            path: "/usr/local/share/zsh/caf\u{e9}.zwc".to_string(),
            sha256: None,
            uname: String::new(),
            gname: String::new(),
            mode: 0o644,
            flags: 0,
        })?;
        let manifest = Manifest::from_package(&package, ManifestFlags::new());
        assert!(manifest.files.keys().any(|k| k.contains("%C3%A9")));

        let round_tripped = manifest.into_package()?;
        assert!(round_tripped.files.contains_key("/usr/local/share/zsh/caf\u{e9}.zwc"));
        Ok(())
    }

    #[rstest]
    fn upgrade_message_carries_version_range() -> TestResult<()> {
        let mut package = sample_package()?;
        package.messages.push(Message {
            when: MessageTrigger::Upgrade,
            version_range: Some((Some(Version::new("5.0")?), Some(Version::new("5.8")?))),
            text: "rehash your completions".to_string(),
        });

        let manifest = Manifest::from_package(&package, ManifestFlags::new());
        let round_tripped = manifest.into_package()?;
        assert_eq!(round_tripped.messages.len(), 1);
        assert_eq!(round_tripped.messages[0].version_range, package.messages[0].version_range);
        Ok(())
    }

    #[rstest]
    fn missing_name_rejected() {
        let manifest = Manifest::default();
        assert!(matches!(manifest.into_package(), Err(Error::MissingField("name"))));
    }
}
