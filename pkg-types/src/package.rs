//! The installed-package data model.
//!
//! A [`Package`] is the in-memory form of everything that identifies a package once it has been
//! parsed from a manifest or extracted: its metadata, its dependency graph, its flat file list,
//! the configuration files the installer must merge rather than overwrite, and the annotations
//! and messages a maintainer attached to it. Collections use an owned `Vec` plus a side
//! `HashMap`/`IndexMap` index rather than the original's intrusive doubly-linked lists (see
//! Design Notes §9 "Pattern migration"), and reject duplicate keys on insertion instead of
//! silently shadowing or overwriting.

use std::collections::HashMap;
use std::collections::HashSet;

use indexmap::IndexMap;
use indexmap::IndexSet;
use serde::Deserialize;
use serde::Serialize;

use crate::AbsolutePath;
use crate::Abi;
use crate::Error;
use crate::FlatSize;
use crate::License;
use crate::LicenseLogic;
use crate::Name;
use crate::PkgSize;
use crate::Soname;
use crate::Timestamp;
use crate::Version;

/// Why a package was installed.
///
/// ## Examples
/// ```
/// use pkg_types::PackageInstallReason;
/// use std::str::FromStr;
///
/// assert_eq!(
///     PackageInstallReason::from_str("0").unwrap(),
///     PackageInstallReason::Explicit
/// );
/// assert_eq!(PackageInstallReason::Depend.to_string(), "1");
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
)]
#[repr(u8)]
pub enum PackageInstallReason {
    /// Explicitly requested by the user.
    #[strum(to_string = "0")]
    Explicit = 0,
    /// Pulled in to satisfy a dependency of another package.
    #[strum(to_string = "1")]
    Depend = 1,
}

/// A regular file placed by a package, recorded with the digest of its installed content and
/// the filesystem attributes the installer must restore.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackageFile {
    /// Absolute path.
    pub path: String,
    /// The file-form checksum text (`TYPE$DIGEST`), or `None` for the null-sum marker `-`.
    pub sha256: Option<String>,
    /// Owning user name.
    pub uname: String,
    /// Owning group name.
    pub gname: String,
    /// POSIX permission bits.
    pub mode: u32,
    /// BSD file flags (`chflags(2)`), zero if unset.
    pub flags: u32,
}

/// The outcome of a config-file 3-way merge, tracked per config file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigMergeStatus {
    /// No merge was necessary; the installed copy was untouched.
    #[default]
    NotNeeded,
    /// The merge completed and the result was written in place.
    Success,
    /// The merge produced overlapping edits; a `.pkgnew` was written instead.
    Failed,
    /// There is no previously-installed copy to merge against (fresh install).
    NotLocal,
}

/// A config file: a [`PackageFile`] whose content must be 3-way merged on upgrade rather than
/// overwritten, plus the outcome of the most recent merge attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigFile {
    /// The underlying file entry; always also present in `Package::files` at the same path.
    pub file: PackageFile,
    /// The installed file's content, captured for the next upgrade's 3-way merge.
    pub content: Option<String>,
    /// The result of the most recent merge.
    pub merge_status: ConfigMergeStatus,
}

/// A directory owned by a package.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackageDirectory {
    /// Absolute path (leading-slash form).
    pub path: String,
    /// Owning user name.
    pub uname: String,
    /// Owning group name.
    pub gname: String,
    /// POSIX permission bits.
    pub mode: u32,
    /// BSD file flags.
    pub flags: u32,
    /// Last-access time, if recorded.
    pub atime: Option<Timestamp>,
    /// Last-modification time, if recorded.
    pub mtime: Option<Timestamp>,
    /// Set once attribute restoration has been confirmed a no-op (directory pre-existed with
    /// matching attributes); skips the attribute pass during extraction.
    pub noattrs: bool,
}

/// A package option: a build/runtime toggle with a default and human description.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackageOption {
    /// The option's current value (`"on"`, `"off"`, or an arbitrary string).
    pub value: String,
    /// The option's default value.
    pub default: String,
    /// A human-readable description of what the option controls.
    pub description: String,
}

/// An entry in a package's dependency list: the referenced package's origin, the version
/// requirement the depending package was built against, and whether it is locked.
#[derive(Clone, Debug, PartialEq)]
pub struct PackageDependency {
    /// The dependency's origin (category/port path equivalent).
    pub origin: String,
    /// The exact version the depending package was built against.
    pub version: Version,
    /// Whether this dependency is pinned (excluded from automatic upgrades).
    pub locked: bool,
    /// Alternate dependencies satisfying an "this OR that" group, if any.
    pub alternates: Vec<PackageDependency>,
}

/// A message shown to the user at a particular point in the install/upgrade/deinstall
/// transaction, as produced by a package's Lua or shell hook.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// The point in the transaction this message applies to.
    pub when: MessageTrigger,
    /// For `Upgrade`-type messages, the version range this message is restricted to.
    pub version_range: Option<(Option<Version>, Option<Version>)>,
    /// The message text.
    pub text: String,
}

/// The transaction phase a [`Message`] is attached to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum MessageTrigger {
    /// Shown regardless of the triggering operation.
    Always,
    /// Shown after a fresh install.
    Install,
    /// Shown after an upgrade from a prior version.
    Upgrade,
    /// Shown after removal.
    Remove,
}

/// The complete set of installed artifacts owned by a package, plus its metadata, dependency
/// graph, and maintainer-supplied annotations and messages.
///
/// Collections reject duplicate entries on insertion (returning [`Error::Duplicate`]) rather
/// than silently overwriting, since a duplicate path or key in a packing list indicates a
/// malformed package.
#[derive(Clone, Debug, PartialEq)]
pub struct Package {
    /// The package name.
    pub name: Name,
    /// The package origin (category/port path equivalent).
    pub origin: String,
    /// The package version.
    pub version: Option<Version>,
    /// The one-line comment/summary.
    pub comment: String,
    /// The long-form description.
    pub desc: String,
    /// The maintainer's contact string.
    pub maintainer: String,
    /// The project's homepage.
    pub www: String,
    /// The installation root, relative to the system root.
    pub prefix: String,
    /// The target ABI this package was built for.
    pub abi: Option<Abi>,
    /// The legacy string-form ABI, kept for compatibility with older repositories.
    pub altabi: Option<String>,
    /// Installed size, in bytes.
    pub flat_size: Option<FlatSize>,
    /// Archive (on-disk, compressed) size, in bytes.
    pub pkg_size: Option<PkgSize>,
    /// When this package was built, as seconds since the epoch.
    pub timestamp: Option<Timestamp>,
    /// The package's content-addressed identity checksum, in `VERSION$TYPE$DIGEST` form.
    pub checksum: Option<String>,
    /// How `licenses` combine.
    pub license_logic: LicenseLogic,
    /// The licenses under which this package is distributed.
    pub licenses: Vec<License>,
    /// Free-form categories.
    pub categories: Vec<String>,
    /// System users this package expects to exist.
    pub users: Vec<String>,
    /// System groups this package expects to exist.
    pub groups: Vec<String>,
    /// Whether this package was installed only to satisfy another's dependency.
    pub automatic: bool,
    /// Whether this package is excluded from automatic upgrades/removal.
    pub locked: bool,
    /// Whether removing this package requires explicit confirmation.
    pub vital: bool,

    /// Dependencies, keyed by name; insertion order preserved.
    pub deps: IndexMap<Name, PackageDependency>,
    /// Reverse dependencies (packages that depend on this one), keyed by name.
    pub rdeps: IndexMap<Name, PackageDependency>,
    /// Regular files, keyed by path; insertion order preserved.
    pub files: IndexMap<String, PackageFile>,
    /// Config files, keyed by path; always a subset of `files` at the same path.
    pub config_files: IndexMap<String, ConfigFile>,
    /// Directories, keyed by path; insertion order preserved.
    pub dirs: IndexMap<String, PackageDirectory>,
    /// Options, keyed by name; insertion order preserved.
    pub options: IndexMap<String, PackageOption>,
    /// Shared libraries this package requires, normalized to the wire shlib-name format.
    pub shlibs_required: IndexSet<Soname>,
    /// Shared libraries this package provides, normalized to the wire shlib-name format.
    pub shlibs_provided: IndexSet<Soname>,
    /// Virtual capabilities this package provides.
    pub provides: IndexSet<String>,
    /// Virtual capabilities this package requires.
    pub requires: IndexSet<String>,
    /// UIDs of packages this package conflicts with.
    pub conflicts: IndexSet<String>,
    /// Free-form annotations, keyed by annotation key; insertion order preserved.
    pub annotations: IndexMap<String, String>,
    /// Messages to display at install/upgrade/remove time, in declaration order.
    pub messages: Vec<Message>,
}

impl Package {
    /// Creates an empty [`Package`] with the given name and origin.
    pub fn new(name: Name, origin: String) -> Self {
        Self {
            name,
            origin,
            version: None,
            comment: String::new(),
            desc: String::new(),
            maintainer: String::new(),
            www: String::new(),
            prefix: String::new(),
            abi: None,
            altabi: None,
            flat_size: None,
            pkg_size: None,
            timestamp: None,
            checksum: None,
            license_logic: LicenseLogic::default(),
            licenses: Vec::new(),
            categories: Vec::new(),
            users: Vec::new(),
            groups: Vec::new(),
            automatic: false,
            locked: false,
            vital: false,
            deps: IndexMap::new(),
            rdeps: IndexMap::new(),
            files: IndexMap::new(),
            config_files: IndexMap::new(),
            dirs: IndexMap::new(),
            options: IndexMap::new(),
            shlibs_required: IndexSet::new(),
            shlibs_provided: IndexSet::new(),
            provides: IndexSet::new(),
            requires: IndexSet::new(),
            conflicts: IndexSet::new(),
            annotations: IndexMap::new(),
            messages: Vec::new(),
        }
    }

    /// Returns whether this package has the minimal set of non-empty fields required
    /// of a non-ephemeral package: `name`, `origin`, `version`, `comment`, `desc`, `maintainer`,
    /// `www`, `prefix`.
    pub fn has_required_fields(&self) -> bool {
        !self.name.as_ref().is_empty()
            && !self.origin.is_empty()
            && self.version.is_some()
            && !self.comment.is_empty()
            && !self.desc.is_empty()
            && !self.maintainer.is_empty()
            && !self.www.is_empty()
            && !self.prefix.is_empty()
    }

    /// Records a file, rejecting a path that has already been recorded.
    pub fn add_file(&mut self, file: PackageFile) -> Result<(), Error> {
        if self.files.contains_key(&file.path) {
            return Err(Error::Duplicate {
                kind: "file",
                key: file.path,
            });
        }
        self.files.insert(file.path.clone(), file);
        Ok(())
    }

    /// Records a config file. The path must already be present in `files` (invariant: "a file
    /// in `config_files` also appears in `files`").
    pub fn add_config_file(&mut self, config: ConfigFile) -> Result<(), Error> {
        let path = config.file.path.clone();
        if !self.files.contains_key(&path) {
            return Err(Error::Duplicate {
                kind: "config file without matching file entry",
                key: path,
            });
        }
        if self.config_files.contains_key(&path) {
            return Err(Error::Duplicate { kind: "config file", key: path });
        }
        self.config_files.insert(path, config);
        Ok(())
    }

    /// Records a directory, rejecting a path that has already been recorded.
    pub fn add_directory(&mut self, dir: PackageDirectory) -> Result<(), Error> {
        if self.dirs.contains_key(&dir.path) {
            return Err(Error::Duplicate {
                kind: "directory",
                key: dir.path,
            });
        }
        self.dirs.insert(dir.path.clone(), dir);
        Ok(())
    }

    /// Records a dependency, rejecting a name that has already been recorded.
    pub fn add_dependency(&mut self, name: Name, dep: PackageDependency) -> Result<(), Error> {
        if self.deps.contains_key(&name) {
            return Err(Error::Duplicate {
                kind: "dependency",
                key: name.to_string(),
            });
        }
        self.deps.insert(name, dep);
        Ok(())
    }

    /// Records an annotation, rejecting a key that has already been recorded.
    pub fn add_annotation(&mut self, key: String, value: String) -> Result<(), Error> {
        if self.annotations.contains_key(&key) {
            return Err(Error::Duplicate { kind: "annotation", key });
        }
        self.annotations.insert(key, value);
        Ok(())
    }

    /// Resolves a packing-list-relative path against the package's installation prefix,
    /// rejecting any path that would escape it.
    pub fn resolve(&self, relative: &str) -> Result<std::path::PathBuf, Error> {
        let prefix = AbsolutePath::new(&format!("/{}", self.prefix.trim_start_matches('/')))?;
        prefix.join_checked(std::path::Path::new(relative))
    }

    /// Returns the subset of `shlibs_required` satisfied by a file this package itself installs
    ///.
    pub fn shlibs_satisfied_by_own_files(&self) -> HashSet<Soname> {
        let basenames: HashSet<&str> = self
            .files
            .keys()
            .filter_map(|path| path.rsplit('/').next())
            .collect();
        self.shlibs_required
            .iter()
            .filter(|soname| basenames.contains(soname.inner()))
            .cloned()
            .collect()
    }

    /// Runs the shared-library cleanup pass:
    /// 1. drops anything also self-provided,
    /// 2. drops anything satisfied by one of the package's own files,
    /// 3. empties `shlibs_provided` if the package carries the `no_provide_shlib` annotation.
    ///
    /// Ignore-list filtering (step 2 of spec's numbered list) is the caller's responsibility,
    /// since it depends on process-wide configuration this crate does not own.
    pub fn cleanup_shlibs(&mut self) {
        let self_provided: HashSet<Soname> = self.shlibs_provided.iter().cloned().collect();
        self.shlibs_required.retain(|s| !self_provided.contains(s));

        let satisfied_by_files = self.shlibs_satisfied_by_own_files();
        self.shlibs_required.retain(|s| !satisfied_by_files.contains(s));

        if self.annotations.contains_key("no_provide_shlib") {
            self.shlibs_provided.clear();
        }
    }

    /// Computes a per-path lookup of dependency [`PackageDependency::origin`]s, used by
    /// conflict detection against a local database.
    pub fn dependency_origins(&self) -> HashMap<&Name, &str> {
        self.deps.iter().map(|(name, dep)| (name, dep.origin.as_str())).collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0", PackageInstallReason::Explicit)]
    #[case("1", PackageInstallReason::Depend)]
    fn install_reason_roundtrip(#[case] input: &str, #[case] expected: PackageInstallReason) {
        assert_eq!(PackageInstallReason::from_str(input).unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[rstest]
    fn install_reason_rejects_unknown() {
        assert!(PackageInstallReason::from_str("2").is_err());
    }

    fn sample_file(path: &str) -> PackageFile {
        PackageFile {
            path: path.to_string(),
            sha256: None,
            uname: "root".to_string(),
            gname: "wheel".to_string(),
            mode: 0o644,
            flags: 0,
        }
    }

    #[rstest]
    fn package_rejects_duplicate_file() {
        let mut package = Package::new(Name::new("test".to_string()).unwrap(), "origin".to_string());
        package.add_file(sample_file("/usr/bin/foo")).unwrap();
        let err = package.add_file(sample_file("/usr/bin/foo")).unwrap_err();
        assert!(matches!(err, Error::Duplicate { kind: "file", .. }));
    }

    #[rstest]
    fn package_rejects_config_file_without_file_entry() {
        let mut package = Package::new(Name::new("test".to_string()).unwrap(), "origin".to_string());
        let config = ConfigFile {
            file: sample_file("/etc/foo.conf"),
            content: None,
            merge_status: ConfigMergeStatus::NotLocal,
        };
        assert!(package.add_config_file(config).is_err());
    }

    #[rstest]
    fn package_accepts_config_file_with_matching_file_entry() {
        let mut package = Package::new(Name::new("test".to_string()).unwrap(), "origin".to_string());
        package.add_file(sample_file("/etc/foo.conf")).unwrap();
        let config = ConfigFile {
            file: sample_file("/etc/foo.conf"),
            content: None,
            merge_status: ConfigMergeStatus::NotLocal,
        };
        package.add_config_file(config).unwrap();
        assert_eq!(package.config_files.len(), 1);
    }

    #[rstest]
    fn package_resolve_rejects_escape() {
        let mut package = Package::new(Name::new("test".to_string()).unwrap(), "origin".to_string());
        package.prefix = "/".to_string();
        assert!(package.resolve("../etc/passwd").is_err());
        assert!(package.resolve("usr/bin/foo").is_ok());
    }

    #[rstest]
    fn cleanup_shlibs_drops_self_provided_and_file_provided() {
        let mut package = Package::new(Name::new("test".to_string()).unwrap(), "origin".to_string());
        package.add_file(sample_file("/usr/lib/libA.so")).unwrap();
        package
            .shlibs_required
            .extend(["lib1.so", "libA.so"].map(|s| Soname::new(s.to_string()).unwrap()));
        package
            .shlibs_provided
            .insert(Soname::new("lib1.so".to_string()).unwrap());
        package.cleanup_shlibs();
        assert!(package.shlibs_required.is_empty());
    }

    #[rstest]
    fn cleanup_shlibs_honors_no_provide_shlib_annotation() {
        let mut package = Package::new(Name::new("test".to_string()).unwrap(), "origin".to_string());
        package
            .shlibs_provided
            .insert(Soname::new("libfoo.so".to_string()).unwrap());
        package
            .add_annotation("no_provide_shlib".to_string(), "yes".to_string())
            .unwrap();
        package.cleanup_shlibs();
        assert!(package.shlibs_provided.is_empty());
    }
}
