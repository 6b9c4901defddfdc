//! A file-backed reference [`PackageDatabase`], good enough to drive the installer end to end
//! without a SQLite dependency.
//!
//! One advisory lock file per database directory, acquired with `create_new` and released
//! on `Drop`; one record file per registered
//! package, named `<name>.json`.

use std::fs;
use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;

use log::debug;
use log::warn;
use pkg_manifest::EmitOptions;
use pkg_manifest::emit;
use pkg_manifest::parse;
use pkg_types::Name;
use pkg_types::Package;
use pkg_types::Soname;

use crate::Error;
use crate::MatchMode;
use crate::PackageDatabase;
use crate::TransactionOutcome;
use crate::query;

/// The lock file name within a database directory.
const LOCK_FILE_NAME: &str = "db.lck";
/// The subdirectory holding one record file per committed package.
const RECORDS_DIR: &str = "local";
/// The subdirectory holding the single pending (uncommitted) record, if any.
const PENDING_DIR: &str = "pending";

/// An advisory, process-wide lock over a database directory. Held for the lifetime of the
/// [`FileDatabase`] value that acquired it.
#[derive(Debug)]
struct DatabaseLock {
    path: PathBuf,
}

impl DatabaseLock {
    fn acquire(base_path: &Path) -> Result<Self, Error> {
        let path = base_path.join(LOCK_FILE_NAME);
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| Error::Lock { path: path.clone(), source })?;
        Ok(Self { path })
    }
}

impl Drop for DatabaseLock {
    fn drop(&mut self) {
        if let Err(source) = fs::remove_file(&self.path) {
            warn!("failed to release database lock {}: {source}", self.path.display());
        }
    }
}

/// A file-backed [`PackageDatabase`] implementation.
///
/// Records are stored as manifest documents (`pkg_types::Package` itself derives neither
/// `Serialize` nor `Deserialize` — its wire form is `pkg_manifest::Manifest`, per this
/// workspace's "Manifest wire format" decision), one `<name>.json` per package.
#[derive(Debug)]
pub struct FileDatabase {
    base_path: PathBuf,
    lock: Option<DatabaseLock>,
}

impl FileDatabase {
    /// Creates a handle to the database rooted at `base_path`. Call [`Self::open`] to acquire
    /// the lock and create the directory structure.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into(), lock: None }
    }

    fn records_dir(&self) -> PathBuf {
        self.base_path.join(RECORDS_DIR)
    }

    fn pending_dir(&self) -> PathBuf {
        self.base_path.join(PENDING_DIR)
    }

    fn record_path(&self, name: &Name) -> PathBuf {
        self.records_dir().join(format!("{name}.json"))
    }

    fn pending_path(&self, name: &Name) -> PathBuf {
        self.pending_dir().join(format!("{name}.json"))
    }

    fn write_record(path: &Path, pkg: &Package) -> Result<(), Error> {
        let options = EmitOptions::new().with_format(pkg_manifest::Format::Json).with_local_metadata(true);
        let text = emit(pkg, &options)?;
        fs::write(path, text).map_err(|source| Error::Io { path: path.to_path_buf(), source })
    }

    fn read_record(path: &Path) -> Result<Package, Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        Ok(parse(&text)?)
    }

    fn all_records(dir: &Path) -> Result<Vec<Package>, Error> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in fs::read_dir(dir).map_err(|source| Error::Io { path: dir.to_path_buf(), source })? {
            let entry = entry.map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                out.push(Self::read_record(&entry.path())?);
            }
        }
        Ok(out)
    }
}

impl PackageDatabase for FileDatabase {
    fn open(&mut self) -> Result<(), Error> {
        fs::create_dir_all(self.records_dir()).map_err(|source| Error::Io { path: self.records_dir(), source })?;
        fs::create_dir_all(self.pending_dir()).map_err(|source| Error::Io { path: self.pending_dir(), source })?;
        self.lock = Some(DatabaseLock::acquire(&self.base_path)?);
        debug!("acquired database lock at {}", self.base_path.display());
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.lock = None;
        Ok(())
    }

    fn query(&self, pattern: &str, mode: MatchMode) -> Result<Vec<Package>, Error> {
        let mut out = Vec::new();
        for pkg in Self::all_records(&self.records_dir())? {
            if query::matches(mode, pattern, pkg.name.as_ref(), true)? {
                out.push(pkg);
            }
        }
        Ok(out)
    }

    fn register_pkg(&mut self, pkg: Package, force: bool) -> Result<(), Error> {
        if !force && self.record_path(&pkg.name).is_file() {
            return Err(Error::AlreadyRegistered { name: pkg.name });
        }
        if force && self.record_path(&pkg.name).is_file() {
            debug!("{} is already registered; forcing re-registration", pkg.name);
        }
        Self::write_record(&self.pending_path(&pkg.name), &pkg)?;
        Ok(())
    }

    fn register_finale(&mut self, outcome: TransactionOutcome) -> Result<(), Error> {
        let mut pending = fs::read_dir(self.pending_dir())
            .map_err(|source| Error::Io { path: self.pending_dir(), source })?
            .filter_map(|e| e.ok())
            .collect::<Vec<_>>();
        let Some(entry) = pending.pop() else {
            return Err(Error::NoOpenTransaction);
        };
        match outcome {
            TransactionOutcome::Commit => {
                let name = entry.path().file_name().expect("pending record has a file name").to_owned();
                fs::rename(entry.path(), self.records_dir().join(name))
                    .map_err(|source| Error::Io { path: entry.path(), source })?;
            }
            TransactionOutcome::Abort => {
                fs::remove_file(entry.path()).map_err(|source| Error::Io { path: entry.path(), source })?;
            }
        }
        Ok(())
    }

    fn unregister_pkg(&mut self, name: &Name) -> Result<(), Error> {
        let path = self.record_path(name);
        if path.is_file() {
            fs::remove_file(&path).map_err(|source| Error::Io { path, source })?;
        }
        Ok(())
    }

    fn is_dir_used(&self, pkg: &Name, dir: &str) -> Result<usize, Error> {
        Ok(Self::all_records(&self.records_dir())?
            .into_iter()
            .filter(|p| &p.name != pkg && p.dirs.contains_key(dir))
            .count())
    }

    fn file_exists(&self, path: &str) -> Result<bool, Error> {
        Ok(Self::all_records(&self.records_dir())?.iter().any(|p| p.files.contains_key(path)))
    }

    fn is_shlib_provided(&self, soname: &Soname) -> Result<bool, Error> {
        Ok(Self::all_records(&self.records_dir())?
            .iter()
            .any(|p| p.shlibs_provided.contains(soname)))
    }

    fn is_provided(&self, capability: &str) -> Result<bool, Error> {
        Ok(Self::all_records(&self.records_dir())?
            .iter()
            .any(|p| p.provides.iter().any(|c| c == capability)))
    }

    fn update_config_file_content(&mut self, pkg: &Name, path: &str, content: String) -> Result<(), Error> {
        let record_path = self.record_path(pkg);
        let mut package = Self::read_record(&record_path)?;
        let config = package
            .config_files
            .get_mut(path)
            .ok_or_else(|| Error::NotFound { name: path.to_string() })?;
        config.content = Some(content);
        Self::write_record(&record_path, &package)
    }
}
