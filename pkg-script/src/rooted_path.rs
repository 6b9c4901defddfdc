//! Centralizes "strip leading slash, resolve relative to a pinned root" into a single helper,
//! since this workspace has no `openat`-based sandbox and
//! `#[forbid(unsafe_code)]` rules one out: traversal is rejected lexically instead, before the
//! path ever reaches the filesystem.

use std::path::Path;
use std::path::PathBuf;

use crate::Error;

/// A filesystem root a sandboxed script is confined to.
///
/// Every path a script hands in is absolute (by the package's own convention: plist entries are
/// always rooted at the install prefix) and is resolved against `root` after rejecting any `..`
/// component, rather than by following an `openat(rootfd, rel)` chain.
#[derive(Clone, Debug)]
pub struct RootedPath {
    root: PathBuf,
}

impl RootedPath {
    /// Pins `root` as the confinement boundary for subsequent [`Self::resolve`] calls.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The pinned root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `path` (absolute, `/`-rooted) to a concrete path under [`Self::root`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathEscape`] if `path` contains a `..` component.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, Error> {
        let stripped = path.strip_prefix('/').unwrap_or(path);
        let mut resolved = self.root.clone();
        for component in Path::new(stripped).components() {
            match component {
                std::path::Component::Normal(part) => resolved.push(part),
                std::path::Component::CurDir => {}
                std::path::Component::ParentDir => {
                    return Err(Error::PathEscape { path: PathBuf::from(path), root: self.root.clone() });
                }
                std::path::Component::RootDir | std::path::Component::Prefix(_) => {}
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_absolute_path_under_root() {
        let rooted = RootedPath::new("/var/pkg/root");
        assert_eq!(rooted.resolve("/usr/bin/zstd").unwrap(), Path::new("/var/pkg/root/usr/bin/zstd"));
    }

    #[test]
    fn rejects_parent_dir_escape() {
        let rooted = RootedPath::new("/var/pkg/root");
        assert!(matches!(rooted.resolve("/usr/../../etc/passwd"), Err(Error::PathEscape { .. })));
    }

    #[test]
    fn tolerates_missing_leading_slash() {
        let rooted = RootedPath::new("/var/pkg/root");
        assert_eq!(rooted.resolve("usr/bin/zstd").unwrap(), Path::new("/var/pkg/root/usr/bin/zstd"));
    }
}
