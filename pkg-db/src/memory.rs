//! A pure in-memory [`PackageDatabase`], for tests that don't need persistence.

use indexmap::IndexMap;
use pkg_types::Name;
use pkg_types::Package;
use pkg_types::Soname;

use crate::Error;
use crate::MatchMode;
use crate::PackageDatabase;
use crate::TransactionOutcome;
use crate::query;

/// An in-memory reference [`PackageDatabase`] backed by an [`IndexMap`].
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    packages: IndexMap<Name, Package>,
    pending: Option<(Name, Package)>,
    open: bool,
}

impl MemoryDatabase {
    /// Creates an empty, unopened database.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PackageDatabase for MemoryDatabase {
    fn open(&mut self) -> Result<(), Error> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.open = false;
        Ok(())
    }

    fn query(&self, pattern: &str, mode: MatchMode) -> Result<Vec<Package>, Error> {
        let mut out = Vec::new();
        for pkg in self.packages.values() {
            if query::matches(mode, pattern, pkg.name.as_ref(), true)? {
                out.push(pkg.clone());
            }
        }
        Ok(out)
    }

    fn register_pkg(&mut self, pkg: Package, force: bool) -> Result<(), Error> {
        if !force && self.packages.contains_key(&pkg.name) {
            return Err(Error::AlreadyRegistered { name: pkg.name });
        }
        self.pending = Some((pkg.name.clone(), pkg));
        Ok(())
    }

    fn register_finale(&mut self, outcome: TransactionOutcome) -> Result<(), Error> {
        let (name, pkg) = self.pending.take().ok_or(Error::NoOpenTransaction)?;
        if outcome == TransactionOutcome::Commit {
            self.packages.insert(name, pkg);
        }
        Ok(())
    }

    fn unregister_pkg(&mut self, name: &Name) -> Result<(), Error> {
        self.packages.shift_remove(name);
        Ok(())
    }

    fn is_dir_used(&self, pkg: &Name, dir: &str) -> Result<usize, Error> {
        Ok(self
            .packages
            .iter()
            .filter(|(name, p)| *name != pkg && p.dirs.contains_key(dir))
            .count())
    }

    fn file_exists(&self, path: &str) -> Result<bool, Error> {
        Ok(self.packages.values().any(|p| p.files.contains_key(path)))
    }

    fn is_shlib_provided(&self, soname: &Soname) -> Result<bool, Error> {
        Ok(self.packages.values().any(|p| p.shlibs_provided.contains(soname)))
    }

    fn is_provided(&self, capability: &str) -> Result<bool, Error> {
        Ok(self.packages.values().any(|p| p.provides.iter().any(|c| c == capability)))
    }

    fn update_config_file_content(&mut self, pkg: &Name, path: &str, content: String) -> Result<(), Error> {
        let package = self.packages.get_mut(pkg).ok_or_else(|| Error::NotFound { name: pkg.to_string() })?;
        let config = package
            .config_files
            .get_mut(path)
            .ok_or_else(|| Error::NotFound { name: path.to_string() })?;
        config.content = Some(content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use testresult::TestResult;

    use super::*;

    fn sample_package(name: &str) -> Package {
        Package::new(Name::from_str(name).unwrap(), format!("category/{name}"))
    }

    #[test]
    fn register_pkg_is_invisible_until_commit() -> TestResult {
        let mut db = MemoryDatabase::new();
        db.open()?;
        db.register_pkg(sample_package("zlib"), false)?;
        assert!(db.query("zlib", MatchMode::Internal)?.is_empty());
        db.register_finale(TransactionOutcome::Commit)?;
        assert_eq!(db.query("zlib", MatchMode::Internal)?.len(), 1);
        Ok(())
    }

    #[test]
    fn aborted_transaction_is_discarded() -> TestResult {
        let mut db = MemoryDatabase::new();
        db.open()?;
        db.register_pkg(sample_package("zlib"), false)?;
        db.register_finale(TransactionOutcome::Abort)?;
        assert!(db.query("zlib", MatchMode::Internal)?.is_empty());
        Ok(())
    }

    #[test]
    fn register_without_force_rejects_duplicate() -> TestResult {
        let mut db = MemoryDatabase::new();
        db.register_pkg(sample_package("zlib"), false)?;
        db.register_finale(TransactionOutcome::Commit)?;
        let result = db.register_pkg(sample_package("zlib"), false);
        assert!(matches!(result, Err(Error::AlreadyRegistered { .. })));
        Ok(())
    }

    #[test]
    fn unregister_removes_committed_package() -> TestResult {
        let mut db = MemoryDatabase::new();
        let name = Name::from_str("zlib")?;
        db.register_pkg(sample_package("zlib"), false)?;
        db.register_finale(TransactionOutcome::Commit)?;
        db.unregister_pkg(&name)?;
        assert!(db.query("zlib", MatchMode::Internal)?.is_empty());
        Ok(())
    }
}
