//! Archive extraction algorithm.
//!
//! Every content entry (anything not prefixed `+`, and not a `signature`/`*.sig`/`*.pub` record,
//! all of which are the province of [`pkg_repo`](https://docs.rs/pkg-repo)'s signature
//! verification, not the installer) is written to a hidden temp name beside its final path, then
//! renamed into place once the whole archive has streamed through cleanly. Directories are
//! created immediately (idempotent via `create_dir_all`) rather than through an equivalent
//! hidden-name indirection: the property the hidden name protects against — a half-written
//! artifact becoming visible under its real name — only applies to file *content*, and
//! `create_dir_all` on an already-existing directory is already a no-op.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use log::debug;
use pkg_compress::tarball::TarballReader;
use pkg_script::RootedPath;
use pkg_types::ConfigMergeStatus;
use pkg_types::Package;
use tar::EntryType;

use crate::Error;
use crate::attrs;
use crate::merge;
use crate::metalog::Entry as MetalogEntry;
use crate::metalog::EntryKind;
use crate::metalog::Metalog;
use crate::rollback::RollbackStack;
use crate::settings::InstallSettings;
use crate::temp::hidden_temp_path;

/// Archive entry names the installer never writes to disk: the manifest and its signature
/// records, already consumed upstream of extraction.
fn is_non_content_entry(name: &str) -> bool {
    name.starts_with('+') || name == "signature" || name.ends_with(".sig") || name.ends_with(".pub")
}

/// The result of resolving a config file's new content against what's on disk.
struct ConfigResolution {
    /// What gets written to the hidden temp file.
    content: Vec<u8>,
    /// Whether the write lands on the real target (`Success`/`NotNeeded`/`NotLocal`) or on a
    /// `.pkgnew` sibling, leaving the target untouched (`Failed`).
    status: ConfigMergeStatus,
    /// The content the *next* upgrade should treat as this config file's installed baseline.
    next_baseline: String,
}

/// Extracts `archive_path`'s content entries under `root`, resolving config-file merges against
/// `old_package` (the previously-installed record, if this is an upgrade).
///
/// On success, `package`'s `files`/`config_files`/`dirs` maps are updated in place: file/symlink
/// checksums are filled in, directories that already matched on disk are marked `noattrs`, and
/// config files carry their resolved `merge_status` and new baseline `content`.
///
/// # Errors
///
/// Returns an error on any I/O failure, an archive entry of an unsupported type, a hardlink
/// whose target was not seen earlier in the archive, or if `cancel` is set.
pub fn extract(
    archive_path: &Path,
    root: &Path,
    package: &mut Package,
    old_package: Option<&Package>,
    settings: &InstallSettings,
    rollback: &mut RollbackStack,
    metalog: &Metalog,
    cancel: &AtomicBool,
) -> Result<(), Error> {
    let rooted = RootedPath::new(root);
    let mut reader = TarballReader::try_from(archive_path)?;
    let mut pending_renames: Vec<(PathBuf, PathBuf)> = Vec::new();
    let mut hardlink_sources: HashMap<String, PathBuf> = HashMap::new();
    let mut config_updates: Vec<(String, String, ConfigMergeStatus)> = Vec::new();

    for entry in reader.entries()? {
        if cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }

        let mut entry = entry?;
        let raw_name = entry.path().to_string_lossy().into_owned();
        let relpath = raw_name.trim_start_matches("./").trim_start_matches('/').to_string();
        if is_non_content_entry(&relpath) || settings.is_ignored(&relpath) {
            continue;
        }

        let absolute = format!("/{relpath}");
        let target = rooted.resolve(&absolute)?;
        let entry_type = entry.raw().header().entry_type();

        if entry_type == EntryType::Directory {
            extract_directory(&target, &relpath, &absolute, package, metalog, rollback)?;
        } else if entry_type == EntryType::Symlink {
            extract_symlink(&mut entry, &target, &relpath, &absolute, package, metalog, rollback, &mut pending_renames)?;
        } else if entry_type == EntryType::Link {
            extract_hardlink(&mut entry, &target, &relpath, &absolute, package, &hardlink_sources, metalog, rollback, &mut pending_renames)?;
        } else if entry.is_file() {
            extract_regular_file(
                &mut entry,
                &target,
                &relpath,
                &absolute,
                package,
                old_package,
                settings,
                metalog,
                rollback,
                &mut pending_renames,
                &mut hardlink_sources,
                &mut config_updates,
            )?;
        } else {
            return Err(Error::UnsupportedEntryType { path: target });
        }
    }

    // Bottom-up: deepest paths renamed first, so a directory is never renamed into before the
    // files it contains exist under their final names.
    pending_renames.sort_by_key(|(_, final_path)| std::cmp::Reverse(final_path.components().count()));
    for (temp, final_path) in &pending_renames {
        std::fs::rename(temp, final_path).map_err(|source| Error::io(final_path, "renaming into place", source))?;
    }

    for (path, content, status) in config_updates {
        if let Some(config) = package.config_files.get_mut(&path) {
            config.content = Some(content);
            config.merge_status = status;
        }
    }

    Ok(())
}

fn extract_directory(
    target: &Path,
    relpath: &str,
    absolute: &str,
    package: &mut Package,
    metalog: &Metalog,
    rollback: &mut RollbackStack,
) -> Result<(), Error> {
    let already_existed = target.exists();
    if !already_existed {
        std::fs::create_dir_all(target).map_err(|source| Error::io(target, "creating directory", source))?;
        rollback.push(target.to_path_buf());
    }

    let (mode, uname, gname, flags, atime, mtime) = match package.dirs.get(absolute) {
        Some(dir) => (dir.mode, dir.uname.clone(), dir.gname.clone(), dir.flags, dir.atime, dir.mtime),
        None => (0o755, "root".to_string(), "wheel".to_string(), 0, None, None),
    };

    let noattrs = already_existed && attrs::dir_matches(target, mode);
    if noattrs {
        debug!("{relpath}: directory attributes already match, skipping restoration");
    } else {
        attrs::restore(target, mode, &uname, &gname)?;
        attrs::restore_dir_times(target, atime, mtime)?;
    }
    if let Some(dir) = package.dirs.get_mut(absolute) {
        dir.noattrs = noattrs;
    }

    metalog.record(&MetalogEntry {
        relpath: relpath.to_string(),
        kind: EntryKind::Dir,
        uname,
        gname,
        mode,
        flags,
        link_target: None,
    })
}

#[allow(clippy::too_many_arguments)]
fn extract_symlink(
    entry: &mut pkg_compress::tarball::TarballEntry,
    target: &Path,
    relpath: &str,
    absolute: &str,
    package: &mut Package,
    metalog: &Metalog,
    rollback: &mut RollbackStack,
    pending_renames: &mut Vec<(PathBuf, PathBuf)>,
) -> Result<(), Error> {
    let link_target = entry
        .raw()
        .link_name()
        .map_err(|source| Error::io(target, "reading symlink target", source))?
        .ok_or_else(|| Error::UnsupportedEntryType { path: target.to_path_buf() })?
        .to_string_lossy()
        .into_owned();

    let parent = target.parent().expect("resolved path always has a parent");
    std::fs::create_dir_all(parent).map_err(|source| Error::io(parent, "creating parent directory", source))?;
    let file_name = target.file_name().and_then(|name| name.to_str()).unwrap_or("entry");
    let temp = hidden_temp_path(parent, file_name);

    std::os::unix::fs::symlink(&link_target, &temp)
        .map_err(|source| Error::io(&temp, "creating symlink", source))?;
    rollback.push(temp.clone());

    let (uname, gname, mode, flags) = match package.files.get(absolute) {
        Some(file) => (file.uname.clone(), file.gname.clone(), file.mode, file.flags),
        None => ("root".to_string(), "wheel".to_string(), 0o777, 0),
    };
    attrs::restore_symlink(&temp, &uname, &gname)?;

    if let Some(file) = package.files.get_mut(absolute) {
        file.sha256 = Some(pkg_checksum::compute_symlink_target(&link_target, pkg_checksum::ChecksumType::Sha256Hex).to_file_form());
    }

    pending_renames.push((temp, target.to_path_buf()));
    metalog.record(&MetalogEntry {
        relpath: relpath.to_string(),
        kind: EntryKind::Symlink,
        uname,
        gname,
        mode,
        flags,
        link_target: Some(link_target),
    })
}

#[allow(clippy::too_many_arguments)]
fn extract_hardlink(
    entry: &mut pkg_compress::tarball::TarballEntry,
    target: &Path,
    relpath: &str,
    absolute: &str,
    package: &Package,
    hardlink_sources: &HashMap<String, PathBuf>,
    metalog: &Metalog,
    rollback: &mut RollbackStack,
    pending_renames: &mut Vec<(PathBuf, PathBuf)>,
) -> Result<(), Error> {
    let link_name = entry
        .raw()
        .link_name()
        .map_err(|source| Error::io(target, "reading hardlink target", source))?
        .ok_or_else(|| Error::UnsupportedEntryType { path: target.to_path_buf() })?
        .to_string_lossy()
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_string();

    let source = hardlink_sources.get(&link_name).cloned().ok_or_else(|| Error::UnknownHardlinkTarget {
        path: target.to_path_buf(),
        target: PathBuf::from(&link_name),
    })?;

    let parent = target.parent().expect("resolved path always has a parent");
    std::fs::create_dir_all(parent).map_err(|source| Error::io(parent, "creating parent directory", source))?;
    let file_name = target.file_name().and_then(|name| name.to_str()).unwrap_or("entry");
    let temp = hidden_temp_path(parent, file_name);

    std::fs::hard_link(&source, &temp).map_err(|source_err| Error::io(&temp, "creating hardlink", source_err))?;
    rollback.push(temp.clone());
    pending_renames.push((temp, target.to_path_buf()));

    let (uname, gname, mode, flags) = match package.files.get(absolute) {
        Some(file) => (file.uname.clone(), file.gname.clone(), file.mode, file.flags),
        None => ("root".to_string(), "wheel".to_string(), 0o644, 0),
    };
    metalog.record(&MetalogEntry {
        relpath: relpath.to_string(),
        kind: EntryKind::File,
        uname,
        gname,
        mode,
        flags,
        link_target: None,
    })
}

#[allow(clippy::too_many_arguments)]
fn extract_regular_file(
    entry: &mut pkg_compress::tarball::TarballEntry,
    target: &Path,
    relpath: &str,
    absolute: &str,
    package: &mut Package,
    old_package: Option<&Package>,
    settings: &InstallSettings,
    metalog: &Metalog,
    rollback: &mut RollbackStack,
    pending_renames: &mut Vec<(PathBuf, PathBuf)>,
    hardlink_sources: &mut HashMap<String, PathBuf>,
    config_updates: &mut Vec<(String, String, ConfigMergeStatus)>,
) -> Result<(), Error> {
    let archive_content = entry.content()?;

    let parent = target.parent().expect("resolved path always has a parent");
    std::fs::create_dir_all(parent).map_err(|source| Error::io(parent, "creating parent directory", source))?;
    let file_name = target.file_name().and_then(|name| name.to_str()).unwrap_or("entry");
    let temp = hidden_temp_path(parent, file_name);

    let is_config = package.config_files.contains_key(absolute);
    let final_path = if is_config {
        let resolution =
            resolve_config_content(&archive_content, target, absolute, old_package, settings.mergetool.as_deref())?;
        config_updates.push((absolute.to_string(), resolution.next_baseline, resolution.status));
        write_temp_content(&temp, &resolution.content)?;
        if resolution.status == ConfigMergeStatus::Failed {
            let mut pkgnew = target.as_os_str().to_os_string();
            pkgnew.push(".pkgnew");
            PathBuf::from(pkgnew)
        } else {
            target.to_path_buf()
        }
    } else {
        write_temp_content(&temp, &archive_content)?;
        target.to_path_buf()
    };
    rollback.push(temp.clone());

    let (uname, gname, mode, flags) = match package.files.get(absolute) {
        Some(file) => (file.uname.clone(), file.gname.clone(), file.mode, file.flags),
        None => ("root".to_string(), "wheel".to_string(), 0o644, 0),
    };
    attrs::restore(&temp, mode, &uname, &gname)?;

    if let Some(file) = package.files.get_mut(absolute) {
        file.sha256 = Some(
            pkg_checksum::compute(&archive_content, pkg_checksum::ChecksumType::Sha256Hex).to_file_form(),
        );
    }

    hardlink_sources.insert(relpath.to_string(), temp.clone());
    pending_renames.push((temp, final_path));
    metalog.record(&MetalogEntry {
        relpath: relpath.to_string(),
        kind: EntryKind::File,
        uname,
        gname,
        mode,
        flags,
        link_target: None,
    })
}

fn resolve_config_content(
    remote: &[u8],
    target: &Path,
    absolute: &str,
    old_package: Option<&Package>,
    mergetool: Option<&str>,
) -> Result<ConfigResolution, Error> {
    let remote_text = String::from_utf8_lossy(remote).into_owned();

    let Ok(local_text) = std::fs::read_to_string(target) else {
        // No previously-installed copy on disk: fresh install of this config file path.
        return Ok(ConfigResolution {
            content: remote.to_vec(),
            status: ConfigMergeStatus::NotLocal,
            next_baseline: remote_text,
        });
    };

    let base_text =
        old_package.and_then(|old| old.config_files.get(absolute)).and_then(|config| config.content.clone());

    let result = merge::merge_config(base_text.as_deref(), &local_text, &remote_text, mergetool)?;
    let next_baseline = if result.status == ConfigMergeStatus::Failed { local_text } else { result.content.clone() };
    Ok(ConfigResolution { content: result.content.into_bytes(), status: result.status, next_baseline })
}

fn write_temp_content(temp: &Path, content: &[u8]) -> Result<(), Error> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp)
        .map_err(|source| Error::io(temp, "creating hidden temp file", source))?;
    file.write_all(content).map_err(|source| Error::io(temp, "writing hidden temp file", source))
}
