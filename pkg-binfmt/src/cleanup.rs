//! Shared-library cleanup pass and system-shlib scan.

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use log::debug;
use pkg_types::SharedLibraryDependency;
use pkg_types::Soname;
use walkdir::WalkDir;

use crate::Error;

/// Configuration for step 2 of the cleanup pass ("Removes entries matching configured ignore
/// glob/regex lists").
#[derive(Clone, Debug, Default)]
pub struct IgnoreList {
    /// Shell-glob patterns (`fnmatch`-style) matched against the soname text.
    pub globs: Vec<glob::Pattern>,
}

impl IgnoreList {
    fn matches(&self, soname: &str) -> bool {
        self.globs.iter().any(|pattern| pattern.matches(soname))
    }
}

/// Runs the analyzer's shared-library cleanup pass over a
/// raw `required`/`provided` pair, given the file-provides-library shortcut set computed by the
/// caller (`Package::shlibs_satisfied_by_own_files`, in `pkg-types`) and an [`IgnoreList`].
///
/// `provided` and `file_provided` are sets of *normalized* wire-form names
/// (`name[:Linux][:32]`, [`SharedLibraryDependency`]'s `Display` form) rather than bare
/// [`Soname`]s: an untagged `required` entry is only dropped by an untagged `provided` entry,
/// and a `:32`/`:Linux`-tagged `required` entry only by an identically-tagged one, so an
/// internal (compat-tagged) dependency and its plain counterpart are tracked independently.
///
/// Step 4 (emptying `shlibs_provided` for `no_provide_shlib`-annotated packages) is the caller's
/// responsibility since it is a package-level annotation, not a binfmt concern; see
/// `Package::cleanup_shlibs` in `pkg-types`.
pub fn cleanup_required(
    required: &mut Vec<SharedLibraryDependency>,
    provided: &HashSet<String>,
    file_provided: &HashSet<String>,
    ignore: &IgnoreList,
) {
    required.retain(|dep| {
        let normalized = dep.to_string();
        if provided.contains(&normalized) {
            debug!("binfmt: cleanup: {normalized} dropped (self-provided)");
            return false;
        }
        if file_provided.contains(&normalized) {
            debug!("binfmt: cleanup: {normalized} dropped (file-provides-library)");
            return false;
        }
        if ignore.matches(dep.soname.inner()) {
            debug!("binfmt: cleanup: {normalized} dropped (ignore list)");
            return false;
        }
        true
    });
}

/// A shared library discovered by the system scan, tagged with whether it lives under the
/// 32-bit compatibility tree.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SystemShlib {
    /// The library's soname.
    pub soname: Soname,
    /// Whether this entry was found under `/usr/lib32` (spec: "the last tagged compat_32").
    pub compat_32: bool,
}

/// Scans `/lib`, `/usr/lib`, and `/usr/lib32` under `root` for `libX.soVERSION` entries,
/// building the process-wide "system-provided" shlib set the installer uses to drop obviously
/// satisfied requirements.
///
/// # Errors
///
/// Returns an error if a scanned directory exists but cannot be read.
pub fn scan_system_shlibs(root: &Path) -> Result<HashSet<SystemShlib>, Error> {
    let mut found = HashSet::new();
    for (dir, compat_32) in [("lib", false), ("usr/lib", false), ("usr/lib32", true)] {
        let path: PathBuf = root.join(dir);
        if !path.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&path).max_depth(1).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if is_shared_object_name(&name) {
                found.insert(SystemShlib { soname: Soname::new(name.into_owned())?, compat_32 });
            }
        }
    }
    Ok(found)
}

/// Recognizes `libfoo.so`, `libfoo.so.1`, `libfoo.so.1.2.3`, `libfoo.dylib` naming conventions.
fn is_shared_object_name(name: &str) -> bool {
    name.contains(".so") || name.ends_with(".dylib")
}
