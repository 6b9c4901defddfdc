//! The top-level [`Context`]: owns the installed-package database handle, the active repository
//! set, and the ambient install/fetch settings, and wires them together into the operations a CLI
//! or higher-level dependency solver would drive.

use std::path::Path;
use std::path::PathBuf;

use log::info;
use pkg_db::MatchMode;
use pkg_db::PackageDatabase;
use pkg_fetch::FetchOutcome;
use pkg_fetch::FetchSettings;
use pkg_installer::InstallReport;
use pkg_installer::InstallSettings;
use pkg_installer::Installer;
use pkg_types::Package;
use pkg_types::Repository;
use pkg_types::RepositoryMeta;

use crate::Error;

/// Owns one installed-package database and the set of repositories configured against it.
///
/// Generic over the database implementation so callers can plug in [`pkg_db::FileDatabase`],
/// [`pkg_db::MemoryDatabase`], or their own `PackageDatabase`.
#[derive(Debug)]
pub struct Context<D: PackageDatabase> {
    db: D,
    cachedir: PathBuf,
    repos: Vec<Repository>,
    install_settings: InstallSettings,
    fetch_settings: FetchSettings,
}

impl<D: PackageDatabase> Context<D> {
    /// Opens `db` and returns a context with no configured repositories, default install
    /// settings (rooted at `/`), and fetch settings read from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `db.open()` fails.
    pub fn new(mut db: D, cachedir: impl Into<PathBuf>) -> Result<Self, Error> {
        db.open().map_err(Error::from).inspect_err(|error| error.log())?;
        Ok(Self {
            db,
            cachedir: cachedir.into(),
            repos: Vec::new(),
            install_settings: InstallSettings::default(),
            fetch_settings: FetchSettings::from_env(),
        })
    }

    /// Closes the underlying database handle, releasing any held lock.
    ///
    /// # Errors
    ///
    /// Returns an error if `db.close()` fails.
    pub fn close(&mut self) -> Result<(), Error> {
        self.db.close().map_err(Error::from).inspect_err(|error| error.log())?;
        Ok(())
    }

    /// Returns the install settings applied to every [`Self::install_archive`] call.
    pub fn install_settings(&self) -> &InstallSettings {
        &self.install_settings
    }

    /// Returns a mutable handle to the install settings, so callers can set `force`,
    /// `split_upgrade`, `root`, etc. before installing.
    pub fn install_settings_mut(&mut self) -> &mut InstallSettings {
        &mut self.install_settings
    }

    /// Returns the fetch settings applied to every repository operation.
    pub fn fetch_settings(&self) -> &FetchSettings {
        &self.fetch_settings
    }

    /// Replaces the fetch settings (e.g. to override the environment-derived defaults in tests).
    pub fn set_fetch_settings(&mut self, settings: FetchSettings) {
        self.fetch_settings = settings;
    }

    /// Returns the currently configured repositories, in priority order as configured.
    pub fn repos(&self) -> &[Repository] {
        &self.repos
    }

    /// Adds `repo` to the active set, or replaces the existing entry with the same name.
    pub fn add_repo(&mut self, repo: Repository) {
        if let Some(existing) = self.repos.iter_mut().find(|candidate| candidate.name == repo.name) {
            *existing = repo;
        } else {
            self.repos.push(repo);
        }
    }

    /// Removes the repository named `name`, if configured.
    pub fn remove_repo(&mut self, name: &str) {
        self.repos.retain(|repo| repo.name != name);
    }

    fn repo(&self, name: &str) -> Result<&Repository, Error> {
        self.repos.iter().find(|repo| repo.name == name).ok_or_else(|| Error::UnknownRepo { name: name.to_string() })
    }

    fn repo_mut(&mut self, name: &str) -> Result<&mut Repository, Error> {
        self.repos.iter_mut().find(|repo| repo.name == name).ok_or_else(|| Error::UnknownRepo { name: name.to_string() })
    }

    /// Fetches and parses `meta.conf` for the repository named `name`, storing it for subsequent
    /// fetch operations to consult.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRepo`] if no such repository is configured, [`Error::FetchNotOk`]
    /// if the fetch didn't transfer a document, or [`Error::Repo`] for a transport/parse/signer
    /// failure.
    pub fn refresh_repo(&mut self, name: &str) -> Result<RepositoryMeta, Error> {
        self.refresh_repo_inner(name).inspect_err(|error| error.log())
    }

    fn refresh_repo_inner(&mut self, name: &str) -> Result<RepositoryMeta, Error> {
        let last_mtime = self.repo(name)?.meta.as_ref().and_then(|meta| meta.eol_timestamp).map(|ts| *ts.inner());
        let fetch_settings = self.fetch_settings.clone();
        let repo = self.repo(name)?.clone();
        let (outcome, meta) = pkg_repo::fetch_meta(&repo, last_mtime, &fetch_settings)?;
        let Some(meta) = meta else {
            return Err(Error::FetchNotOk { what: "meta.conf", repo: name.to_string(), outcome });
        };
        if meta.is_deprecated() {
            log::warn!("repository '{name}' serves a deprecated v1 meta.conf");
        }
        self.repo_mut(name)?.meta = Some(meta.clone());
        info!("refreshed meta.conf for repository '{name}' (revision {})", meta.revision);
        Ok(meta)
    }

    /// Fetches `name-version`'s package archive from the repository `repo_name` into this
    /// context's cache directory, without installing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRepo`] if no such repository is configured, [`Error::MissingMeta`]
    /// if [`Self::refresh_repo`] hasn't been called for it, [`Error::FetchNotOk`] if the transfer
    /// didn't succeed, or [`Error::Repo`] for a transport/archive/signer failure.
    pub fn fetch_package(&self, repo_name: &str, name: &str, version: &str) -> Result<PathBuf, Error> {
        self.fetch_package_inner(repo_name, name, version).inspect_err(|error| error.log())
    }

    fn fetch_package_inner(&self, repo_name: &str, name: &str, version: &str) -> Result<PathBuf, Error> {
        let repo = self.repo(repo_name)?;
        let meta = repo.meta.as_ref().ok_or_else(|| Error::MissingMeta { name: repo_name.to_string() })?;
        let (outcome, path) = pkg_repo::fetch_package(repo, meta, name, version, &self.cachedir, &self.fetch_settings)?;
        if outcome != FetchOutcome::Ok {
            return Err(Error::FetchNotOk { what: "package archive", repo: repo_name.to_string(), outcome });
        }
        Ok(path)
    }

    /// Runs the full transactional install/upgrade for the archive at `archive_path` (spec
    /// §4.9). Settings are taken from [`Self::install_settings`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Installer`] for any failure during the transaction; by the time this
    /// returns, any partial state has already been rolled back (see [`pkg_installer::Installer`]).
    pub fn install_archive(&mut self, archive_path: &Path) -> Result<InstallReport, Error> {
        let settings = self.install_settings.clone();
        let mut installer = Installer::new(&mut self.db, settings);
        installer.install(archive_path).map_err(Error::from).inspect_err(|error| error.log())
    }

    /// Fetches `name-version` from `repo_name` and installs it in one step.
    ///
    /// # Errors
    ///
    /// Returns any error [`Self::fetch_package`] or [`Self::install_archive`] would. Each of
    /// those already logs its own error, so this does not log again.
    pub fn fetch_and_install(&mut self, repo_name: &str, name: &str, version: &str) -> Result<InstallReport, Error> {
        let archive_path = self.fetch_package(repo_name, name, version)?;
        self.install_archive(&archive_path)
    }

    /// Returns every installed package whose name matches `pattern` under `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn query(&self, pattern: &str, mode: MatchMode) -> Result<Vec<Package>, Error> {
        self.db.query(pattern, mode).map_err(Error::from).inspect_err(|error| error.log())
    }

    /// Returns the single installed package named `name`, if any (shorthand for
    /// [`Self::query`] with [`MatchMode::Internal`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn installed(&self, name: &str) -> Result<Option<Package>, Error> {
        Ok(self.query(name, MatchMode::Internal)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use pkg_db::MemoryDatabase;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn unknown_repo_is_an_error() -> TestResult {
        let mut ctx = Context::new(MemoryDatabase::new(), "/tmp/pkgcore-cache")?;
        let result = ctx.refresh_repo("nonexistent");
        assert!(matches!(result, Err(Error::UnknownRepo { .. })));
        Ok(())
    }

    #[test]
    fn fetch_without_refresh_is_missing_meta() -> TestResult {
        let mut ctx = Context::new(MemoryDatabase::new(), "/tmp/pkgcore-cache")?;
        ctx.add_repo(Repository::new("example".to_string(), "https://example.org/repo".parse()?));
        let result = ctx.fetch_package("example", "zstd", "1.5.6");
        assert!(matches!(result, Err(Error::MissingMeta { .. })));
        Ok(())
    }

    #[test]
    fn add_repo_replaces_same_named_entry() -> TestResult {
        let mut ctx = Context::new(MemoryDatabase::new(), "/tmp/pkgcore-cache")?;
        ctx.add_repo(Repository::new("example".to_string(), "https://example.org/a".parse()?));
        ctx.add_repo(Repository::new("example".to_string(), "https://example.org/b".parse()?));
        assert_eq!(ctx.repos().len(), 1);
        assert_eq!(ctx.repos()[0].url.to_string(), "https://example.org/b");
        Ok(())
    }

    #[test]
    fn query_with_no_installed_packages_is_empty() -> TestResult {
        let ctx = Context::new(MemoryDatabase::new(), "/tmp/pkgcore-cache")?;
        assert!(ctx.installed("zstd")?.is_none());
        Ok(())
    }
}
