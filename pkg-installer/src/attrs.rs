//! Restoring the filesystem attributes a manifest records: permission bits, ownership, and
//! timestamps.

use std::fs::Permissions;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use filetime::FileTime;
use log::warn;
use pkg_types::Timestamp;

use crate::Error;

/// Resolves `uname`/`gname` to numeric ids via the system's user/group database, falling back
/// to `0` (root) with a `warn!` when the name is unknown locally — the same fallback `pkgng`
/// itself uses when installing a package built against a different machine's account names.
fn resolve_ids(uname: &str, gname: &str) -> (u32, u32) {
    let uid = uzers::get_user_by_name(uname).map(|user| user.uid()).unwrap_or_else(|| {
        warn!("unknown user '{uname}', restoring ownership as uid 0");
        0
    });
    let gid = uzers::get_group_by_name(gname).map(|group| group.gid()).unwrap_or_else(|| {
        warn!("unknown group '{gname}', restoring ownership as gid 0");
        0
    });
    (uid, gid)
}

/// Restores mode and ownership on a regular file or directory at `path`.
pub fn restore(path: &Path, mode: u32, uname: &str, gname: &str) -> Result<(), Error> {
    std::fs::set_permissions(path, Permissions::from_mode(mode))
        .map_err(|source| Error::io(path, "restoring permissions", source))?;
    let (uid, gid) = resolve_ids(uname, gname);
    if let Err(source) = std::os::unix::fs::chown(path, Some(uid), Some(gid)) {
        warn!("failed to restore ownership of {path:?} to {uid}:{gid}: {source}");
    }
    Ok(())
}

/// Restores ownership on a symlink at `path`, without following it. Mode bits on a symlink are
/// not meaningful on Linux and are left alone.
pub fn restore_symlink(path: &Path, uname: &str, gname: &str) -> Result<(), Error> {
    let (uid, gid) = resolve_ids(uname, gname);
    if let Err(source) = std::os::unix::fs::lchown(path, Some(uid), Some(gid)) {
        warn!("failed to restore ownership of symlink {path:?} to {uid}:{gid}: {source}");
    }
    Ok(())
}

/// Restores access/modification times on a directory at `path`, if the manifest recorded them.
pub fn restore_dir_times(path: &Path, atime: Option<Timestamp>, mtime: Option<Timestamp>) -> Result<(), Error> {
    let Some(mtime) = mtime else { return Ok(()) };
    let atime = atime.unwrap_or(mtime);
    filetime::set_file_times(
        path,
        FileTime::from_unix_time(*atime.inner(), 0),
        FileTime::from_unix_time(*mtime.inner(), 0),
    )
    .map_err(|source| Error::io(path, "restoring directory timestamps", source))
}

/// Returns whether the directory at `path` already has the given mode (used to decide whether a
/// pre-existing directory can be marked `noattrs` and skip the attribute-restoration pass).
pub fn dir_matches(path: &Path, mode: u32) -> bool {
    std::fs::metadata(path).map(|metadata| metadata.permissions().mode() & 0o7777 == mode).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn dir_matches_detects_equal_mode() -> TestResult {
        let dir = tempfile::tempdir()?;
        std::fs::set_permissions(dir.path(), Permissions::from_mode(0o755))?;
        assert!(dir_matches(dir.path(), 0o755));
        assert!(!dir_matches(dir.path(), 0o700));
        Ok(())
    }

    #[test]
    fn restore_sets_requested_mode() -> TestResult {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("f");
        std::fs::write(&file, b"x")?;
        restore(&file, 0o640, "root", "root")?;
        let mode = std::fs::metadata(&file)?.permissions().mode() & 0o7777;
        assert_eq!(mode, 0o640);
        Ok(())
    }
}
