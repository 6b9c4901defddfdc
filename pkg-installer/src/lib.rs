#![doc = include_str!("../README.md")]

//! The transactional extract-rename-commit installer: `Parse → CheckConflicts →
//! RegisterPending → PreScripts → Extract → CleanupOld(upgrade only) → Commit → PostScripts`,
//! with a LIFO rollback on any failure before `Commit`.

mod attrs;
mod error;
mod extract;
mod merge;
mod metalog;
mod outcome;
mod rollback;
mod settings;
mod temp;

pub use error::Error;
pub use merge::MergeResult;
pub use merge::merge_config;
pub use metalog::Entry as MetalogEntry;
pub use metalog::EntryKind as MetalogEntryKind;
pub use metalog::Metalog;
pub use outcome::Outcome;
pub use rollback::RollbackStack;
pub use settings::InstallSettings;

use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc;

use log::info;
use log::warn;
use pkg_compress::tarball::TarballReader;
use pkg_db::MatchMode;
use pkg_db::PackageDatabase;
use pkg_db::TransactionOutcome;
use pkg_manifest::Manifest;
use pkg_script::Hook;
use pkg_script::RootedPath;
use pkg_script::Script;
use pkg_types::Message;
use pkg_types::MessageTrigger;
use pkg_types::Name;
use pkg_types::Package;
use pkg_types::Version;

/// The outcome of a completed install/upgrade transaction, plus the messages the package wants
/// shown at this point in its lifecycle.
#[derive(Debug)]
pub struct InstallReport {
    /// Whether the transaction installed/upgraded the package or found it already present.
    pub outcome: Outcome,
    /// Messages applicable to this transaction, in declaration order.
    pub messages: Vec<Message>,
}

/// A package's lifecycle hook bodies, parsed out of its `+MANIFEST`. Kept separate
/// from [`Package`], which has no field for script bodies (see DESIGN.md, "Manifest fields with
/// no Package counterpart").
#[derive(Clone, Debug, Default)]
struct HookScripts {
    shell: Vec<(Hook, String)>,
    lua: Vec<(Hook, Vec<String>)>,
}

impl HookScripts {
    fn from_manifest(manifest: &Manifest) -> Self {
        let mut shell = Vec::new();
        for (key, body) in &manifest.scripts {
            match Hook::from_str(key) {
                Ok(hook) => shell.push((hook, body.clone())),
                Err(_) => warn!("manifest declares an unknown script hook '{key}', ignoring"),
            }
        }
        let mut lua = Vec::new();
        for (key, bodies) in &manifest.lua_scripts {
            match Hook::from_str(key) {
                Ok(hook) => lua.push((hook, bodies.clone())),
                Err(_) => warn!("manifest declares an unknown lua script hook '{key}', ignoring"),
            }
        }
        Self { shell, lua }
    }

    fn shell_for(&self, hook: Hook) -> Option<&str> {
        self.shell.iter().find(|(candidate, _)| *candidate == hook).map(|(_, body)| body.as_str())
    }

    fn lua_for(&self, hook: Hook) -> impl Iterator<Item = &str> {
        self.lua.iter().filter(move |(candidate, _)| *candidate == hook).flat_map(|(_, bodies)| bodies.iter().map(String::as_str))
    }

    fn is_empty(&self) -> bool {
        self.shell.is_empty() && self.lua.is_empty()
    }
}

/// Drives a single install/upgrade transaction against a [`PackageDatabase`].
#[derive(Debug)]
pub struct Installer<'db, D: PackageDatabase> {
    db: &'db mut D,
    settings: InstallSettings,
}

impl<'db, D: PackageDatabase> Installer<'db, D> {
    /// Creates an installer driving `db` under `settings`.
    pub fn new(db: &'db mut D, settings: InstallSettings) -> Self {
        Self { db, settings }
    }

    /// Runs the full install/upgrade transaction for the archive at `archive_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive can't be parsed, a conflicting file or package is found,
    /// a lifecycle script fails, extraction fails, or the transaction is cancelled. On any error
    /// returned here, every temp path reserved during this call has already been rolled back and
    /// the pending database record, if any, has been aborted.
    pub fn install(&mut self, archive_path: &Path) -> Result<InstallReport, Error> {
        self.install_cancelable(archive_path, &AtomicBool::new(false))
    }

    /// As [`Self::install`], but checked against a caller-supplied cancellation flag.
    pub fn install_cancelable(
        &mut self,
        archive_path: &Path,
        cancel: &AtomicBool,
    ) -> Result<InstallReport, Error> {
        // Parse
        let (manifest, mut package) = parse_archive(archive_path)?;
        let scripts = HookScripts::from_manifest(&manifest);

        // CheckConflicts
        let old_package = self.find_registered(package.name.as_ref())?;
        if let Some(old) = &old_package {
            if !self.settings.force && old.version == package.version && old.checksum == package.checksum {
                info!("{} is already installed at {:?}, nothing to do", package.name, package.version);
                return Ok(InstallReport { outcome: Outcome::AlreadyInstalled, messages: Vec::new() });
            }
            if old.locked && !self.settings.force {
                return Err(Error::AlreadyInstalled { name: package.name.to_string() });
            }
        }
        self.check_file_conflicts(&package, old_package.as_ref())?;

        // RegisterPending
        let force_register = self.settings.force || old_package.is_some();
        match self.db.register_pkg(package.clone(), force_register) {
            Ok(()) => {}
            Err(pkg_db::Error::AlreadyRegistered { name }) => {
                if self.settings.developer_mode {
                    return Err(Error::AlreadyInstalled { name: name.to_string() });
                }
                warn!("package {name} is already installed, skipping (use force to reinstall)");
                return Ok(InstallReport { outcome: Outcome::AlreadyInstalled, messages: Vec::new() });
            }
            Err(source) => return Err(source.into()),
        }

        match self.run_transaction(
            archive_path,
            &mut package,
            old_package.as_ref(),
            &scripts,
            cancel,
        ) {
            Ok(()) => {
                self.db.register_finale(TransactionOutcome::Commit)?;
                let trigger =
                    if old_package.is_some() { MessageTrigger::Upgrade } else { MessageTrigger::Install };
                let from_version = old_package.as_ref().and_then(|old| old.version.clone());
                let messages = applicable_messages(&package, trigger, from_version.as_ref());
                Ok(InstallReport { outcome: Outcome::Installed, messages })
            }
            Err(err) => {
                if let Err(abort_err) = self.db.register_finale(TransactionOutcome::Abort) {
                    warn!("failed to abort pending database registration after rollback: {abort_err}");
                }
                Err(err)
            }
        }
    }

    fn run_transaction(
        &mut self,
        archive_path: &Path,
        package: &mut Package,
        old_package: Option<&Package>,
        scripts: &HookScripts,
        cancel: &AtomicBool,
    ) -> Result<(), Error> {
        let (tx, rx) = mpsc::channel::<String>();
        let mut rollback = RollbackStack::new();
        let metalog = Metalog::new(self.settings.metalog_path.clone());

        let result = self.run_transaction_steps(archive_path, package, old_package, scripts, &mut rollback, &metalog, cancel, &tx);

        match result {
            Ok(()) => {
                for message in rx.try_iter() {
                    info!("script message: {message}");
                }
                Ok(())
            }
            Err(err) => {
                // Nothing before `Commit` may survive a failed transaction.
                rollback.unwind();
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn run_transaction_steps(
        &mut self,
        archive_path: &Path,
        package: &mut Package,
        old_package: Option<&Package>,
        scripts: &HookScripts,
        rollback: &mut RollbackStack,
        metalog: &Metalog,
        cancel: &AtomicBool,
        tx: &mpsc::Sender<String>,
    ) -> Result<(), Error> {
        // Split-upgrade mode removes the old package entirely before installing the new one.
        if let Some(old) = old_package {
            if self.settings.split_upgrade {
                self.cleanup_old_files(old, package, true, cancel)?;
            }
        }

        if !scripts.is_empty() {
            run_hooks(Hook::PreInstall, scripts, &self.settings.root, tx)?;
        }

        extract::extract(
            archive_path,
            &self.settings.root,
            package,
            old_package,
            &self.settings,
            rollback,
            metalog,
            cancel,
        )?;

        // Non-split upgrades install the new package first, then sweep files the old package
        // owned that the new one doesn't.
        if let Some(old) = old_package {
            if !self.settings.split_upgrade {
                self.cleanup_old_files(old, package, false, cancel)?;
            }
        }

        if !scripts.is_empty() {
            run_hooks(Hook::PostInstall, scripts, &self.settings.root, tx)?;
        }

        Ok(())
    }

    /// Removes a previously-installed package's files/directories on disk. `full_remove` is set for split-upgrade mode (remove everything regardless of
    /// whether `new` still owns the path); otherwise only paths `new` doesn't own (or which are
    /// now ignored) are swept.
    fn cleanup_old_files(
        &mut self,
        old: &Package,
        new: &Package,
        full_remove: bool,
        cancel: &AtomicBool,
    ) -> Result<(), Error> {
        let rooted = RootedPath::new(&self.settings.root);
        for (path, _file) in &old.files {
            if cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            let still_owned = !full_remove
                && new.files.contains_key(path)
                && !self.settings.is_ignored(path.trim_start_matches('/'));
            if still_owned {
                continue;
            }

            let target = rooted.resolve(path)?;
            let Ok(metadata) = std::fs::symlink_metadata(&target) else { continue };

            if self.settings.backup_libraries {
                self.backup_if_shared_library(old, path, &target)?;
            }

            let removed = if metadata.is_dir() {
                std::fs::remove_dir(&target)
            } else {
                std::fs::remove_file(&target)
            };
            match removed {
                Ok(()) => info!("cleanup trigger: removed {path} owned by previous {}", old.name),
                Err(source) => warn!("cleanup: failed to remove {path:?}: {source}"),
            }
        }

        let mut stale_dirs: Vec<&String> =
            old.dirs.keys().filter(|path| full_remove || !new.dirs.contains_key(*path)).collect();
        stale_dirs.sort_by_key(|path| std::cmp::Reverse(path.matches('/').count()));
        for path in stale_dirs {
            if self.db.is_dir_used(&old.name, path)? > 0 {
                continue;
            }
            let target = rooted.resolve(path)?;
            let _ = std::fs::remove_dir(&target);
        }
        Ok(())
    }

    fn backup_if_shared_library(&self, old: &Package, path: &str, target: &Path) -> Result<(), Error> {
        let Some(basename) = path.rsplit('/').next() else { return Ok(()) };
        if !old.shlibs_provided.iter().any(|soname| soname.inner() == basename) {
            return Ok(());
        }
        std::fs::create_dir_all(&self.settings.backup_library_path)
            .map_err(|source| Error::io(&self.settings.backup_library_path, "creating shlib backup directory", source))?;
        let dest = self.settings.backup_library_path.join(basename);
        std::fs::copy(target, &dest).map_err(|source| Error::io(&dest, "backing up shared library", source))?;
        Ok(())
    }

    fn find_registered(&self, name: &str) -> Result<Option<Package>, Error> {
        Ok(self.db.query(name, MatchMode::Internal)?.into_iter().next())
    }

    fn check_file_conflicts(&self, package: &Package, old_package: Option<&Package>) -> Result<(), Error> {
        for path in package.files.keys() {
            if old_package.is_some_and(|old| old.files.contains_key(path)) {
                continue;
            }
            if self.db.file_exists(path)? {
                let owner = self.owner_of(path)?.map(|name| name.to_string()).unwrap_or_else(|| "?".to_string());
                return Err(Error::FileConflict { path: path.clone(), owner });
            }
        }
        Ok(())
    }

    fn owner_of(&self, path: &str) -> Result<Option<Name>, Error> {
        for pkg in self.db.query("", MatchMode::All)? {
            if pkg.files.contains_key(path) {
                return Ok(Some(pkg.name));
            }
        }
        Ok(None)
    }
}

/// Reads `archive_path`'s `+MANIFEST` entry and returns both its wire [`Manifest`] (carrying
/// script bodies `Package` has no field for) and the [`Package`] it converts into.
fn parse_archive(archive_path: &Path) -> Result<(Manifest, Package), Error> {
    let mut reader = TarballReader::try_from(archive_path)?;
    let mut entry = reader.read_entry("+MANIFEST")?.ok_or(Error::MissingManifest)?;
    let content = entry.content()?;
    let text = String::from_utf8_lossy(&content);
    let manifest = pkg_manifest::parse_manifest(&text)?;
    let package = manifest.clone().into_package()?;
    Ok((manifest, package))
}

fn run_hooks(hook: Hook, scripts: &HookScripts, root: &Path, messages: &mpsc::Sender<String>) -> Result<(), Error> {
    if let Some(body) = scripts.shell_for(hook) {
        Script::Shell(body.to_string()).run(hook, root, messages)?;
    }
    for body in scripts.lua_for(hook) {
        Script::Lua(body.to_string()).run(hook, root, messages)?;
    }
    Ok(())
}

/// Selects the messages a package wants shown for `trigger`, honoring `Always`-type messages
/// regardless of trigger and, for `Upgrade`-type messages, the declared version-range predicate
/// against `from_version`.
pub fn applicable_messages(package: &Package, trigger: MessageTrigger, from_version: Option<&Version>) -> Vec<Message> {
    package
        .messages
        .iter()
        .filter(|message| {
            if message.when == MessageTrigger::Always {
                return true;
            }
            if message.when != trigger {
                return false;
            }
            if trigger != MessageTrigger::Upgrade {
                return true;
            }
            let Some((min, max)) = &message.version_range else { return true };
            let Some(from) = from_version else { return true };
            if let Some(min) = min {
                if from < min {
                    return false;
                }
            }
            if let Some(max) = max {
                if from > max {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}
