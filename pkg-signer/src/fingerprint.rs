//! Fingerprint-mode trust store.
//!
//! A repository configured with `signature_type = fingerprint` ships `.sig`/`.pub` entries
//! alongside its archives instead of relying on a single repository-wide public key (collected by
//! `pkg-repo`'s archive walk; see `pkg_repo::archive::walk_and_extract`). Each candidate pubkey is
//! checked against a `trusted/` and `revoked/` directory of SHA-256 fingerprints: a single trusted
//! and valid signature satisfies the repository, a revoked fingerprint is rejected outright even
//! if otherwise valid.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use pkg_checksum::ChecksumType;
use serde::Deserialize;

use crate::Error;

/// The result of checking a fingerprint against the trust store.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrustOutcome {
    /// The fingerprint is present under `trusted/` and not under `revoked/`.
    Trusted,
    /// The fingerprint is present under `revoked/`, regardless of its trusted status.
    Revoked,
    /// The fingerprint is not recorded anywhere in the trust store.
    Unknown,
}

#[derive(Deserialize)]
struct FingerprintFile {
    function: String,
    fingerprint: String,
}

/// A `trusted/` + `revoked/` directory pair of SHA-256 pubkey fingerprints.
#[derive(Clone, Debug)]
pub struct FingerprintStore {
    trusted_dir: PathBuf,
    revoked_dir: PathBuf,
}

impl FingerprintStore {
    /// Opens a fingerprint store rooted at `fingerprint_dir`, expecting `trusted/` and `revoked/`
    /// subdirectories.
    pub fn new(fingerprint_dir: impl Into<PathBuf>) -> Self {
        let fingerprint_dir = fingerprint_dir.into();
        Self {
            trusted_dir: fingerprint_dir.join("trusted"),
            revoked_dir: fingerprint_dir.join("revoked"),
        }
    }

    /// Computes the SHA-256 fingerprint of a raw public key blob, as lowercase hex.
    pub fn fingerprint_of(key_bytes: &[u8]) -> String {
        hex::encode(pkg_checksum::compute(key_bytes, ChecksumType::Sha256Hex).raw())
    }

    /// Checks whether `fingerprint` (lowercase hex SHA-256) is trusted, revoked, or unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if a fingerprint file exists but cannot be read or parsed.
    pub fn check(&self, fingerprint: &str) -> Result<TrustOutcome, Error> {
        if self.contains(&self.revoked_dir, fingerprint)? {
            return Ok(TrustOutcome::Revoked);
        }
        if self.contains(&self.trusted_dir, fingerprint)? {
            return Ok(TrustOutcome::Trusted);
        }
        Ok(TrustOutcome::Unknown)
    }

    /// Returns `Ok(())` if `fingerprint` is trusted and not revoked, or the appropriate error
    /// otherwise ([`Error::Revoked`] or [`Error::Untrusted`]).
    pub fn require_trusted(&self, fingerprint: &str) -> Result<(), Error> {
        match self.check(fingerprint)? {
            TrustOutcome::Trusted => Ok(()),
            TrustOutcome::Revoked => Err(Error::Revoked { fingerprint: fingerprint.to_string() }),
            TrustOutcome::Unknown => Err(Error::Untrusted),
        }
    }

    fn contains(&self, dir: &Path, fingerprint: &str) -> Result<bool, Error> {
        if !dir.is_dir() {
            return Ok(false);
        }
        let entries = fs::read_dir(dir).map_err(|source| Error::io("reading fingerprint directory", source))?;
        for entry in entries {
            let entry = entry.map_err(|source| Error::io("reading fingerprint directory entry", source))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let contents = fs::read_to_string(&path)
                .map_err(|source| Error::io("reading fingerprint file", source))?;
            let parsed: FingerprintFile = pkg_parsers::custom_ini::from_str(&contents)
                .map_err(|source| Error::MalformedFingerprintFile { path: path.clone(), reason: source.to_string() })?;
            if parsed.function.eq_ignore_ascii_case("sha256")
                && parsed.fingerprint.eq_ignore_ascii_case(fingerprint)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn trusted_fingerprint_is_reported_trusted() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("trusted")).unwrap();
        fs::create_dir(dir.path().join("revoked")).unwrap();
        let fingerprint = FingerprintStore::fingerprint_of(b"a-public-key");
        fs::write(
            dir.path().join("trusted").join("jane.fp"),
            format!("function=sha256\nfingerprint={fingerprint}\n"),
        )
        .unwrap();

        let store = FingerprintStore::new(dir.path());
        assert_eq!(store.check(&fingerprint).unwrap(), TrustOutcome::Trusted);
        store.require_trusted(&fingerprint).unwrap();
    }

    #[test]
    fn revoked_takes_precedence_over_trusted() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("trusted")).unwrap();
        fs::create_dir(dir.path().join("revoked")).unwrap();
        let fingerprint = FingerprintStore::fingerprint_of(b"a-public-key");
        fs::write(
            dir.path().join("trusted").join("jane.fp"),
            format!("function=sha256\nfingerprint={fingerprint}\n"),
        )
        .unwrap();
        fs::write(
            dir.path().join("revoked").join("jane.fp"),
            format!("function=sha256\nfingerprint={fingerprint}\n"),
        )
        .unwrap();

        let store = FingerprintStore::new(dir.path());
        assert_eq!(store.check(&fingerprint).unwrap(), TrustOutcome::Revoked);
        assert!(matches!(store.require_trusted(&fingerprint), Err(Error::Revoked { .. })));
    }

    #[test]
    fn unknown_fingerprint_is_untrusted() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("trusted")).unwrap();
        fs::create_dir(dir.path().join("revoked")).unwrap();

        let store = FingerprintStore::new(dir.path());
        assert_eq!(store.check("deadbeef").unwrap(), TrustOutcome::Unknown);
        assert!(matches!(store.require_trusted("deadbeef"), Err(Error::Untrusted)));
    }
}
