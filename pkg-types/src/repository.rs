//! Repository identity and the `meta` (v2) schema served by a repository's `meta.conf`.

use std::collections::HashMap;
use std::fmt::Display;
use std::fmt::Formatter;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::Timestamp;
use crate::Url;

/// How a repository's mirror list is discovered.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MirrorType {
    /// No mirror discovery; `url` is used directly.
    #[default]
    None,
    /// Mirrors discovered via a DNS `SRV` lookup.
    Srv,
    /// Mirrors discovered by parsing `URL: <url>` lines from an HTTP response.
    Http,
}

/// How a repository's authenticity is established.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SignatureType {
    /// No signature checking.
    #[default]
    None,
    /// A single repository signing key (`pubkey_path`).
    Pubkey,
    /// A directory of trusted fingerprints (`fingerprint_dir`).
    Fingerprint,
}

/// Which IP family to prefer when a repository's host resolves to both.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IpPreference {
    /// No preference; use whatever the resolver returns first.
    #[default]
    Any,
    /// Prefer IPv4.
    V4,
    /// Prefer IPv6.
    V6,
}

/// A signing key advertised by a repository's `meta.conf`, keyed by name.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct RepositoryKey {
    /// The public key material, as published.
    pub pubkey: String,
    /// The kind of key (e.g. `rsa`, `ecdsa`, `eddsa`).
    pub key_type: String,
}

/// The v2 `meta.conf` schema served by a repository, describing the layout of its manifest and
/// data archives.
///
/// ## Examples
/// ```
/// use pkg_types::RepositoryMeta;
///
/// let meta = RepositoryMeta::new(2, "packaging-team".to_string());
/// assert_eq!(meta.version, 2);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryMeta {
    /// The schema version this `meta.conf` was written against. `1` is accepted with a
    /// deprecation notice; `2` is current.
    pub version: u32,
    /// The maintainer responsible for this repository instance.
    pub maintainer: String,
    /// The upstream source this repository mirrors, if any.
    pub source: Option<String>,
    /// The package archive format (e.g. `tzst`).
    pub packing_format: String,
    /// Name of the manifests archive, e.g. `manifests.pkg`.
    pub manifests_file: String,
    /// Name of the manifests archive's compressed counterpart.
    pub manifests_archive: String,
    /// Name of the conflicts index file.
    pub conflicts_file: String,
    /// Name of the conflicts archive's compressed counterpart.
    pub conflicts_archive: String,
    /// Name of the per-package file-list index, if published.
    pub filesite_file: Option<String>,
    /// Name of the filesite archive's compressed counterpart.
    pub filesite_archive: Option<String>,
    /// Name of the extra-data archive (groups, search indexes).
    pub data_file: String,
    /// Name of the data archive's compressed counterpart.
    pub data_archive: String,
    /// An opaque identifier for the upstream source this snapshot derives from.
    pub source_identifier: Option<String>,
    /// The monotonically increasing revision of this repository snapshot.
    pub revision: u64,
    /// When this snapshot stops receiving updates, if scheduled.
    pub eol_timestamp: Option<Timestamp>,
    /// Signing keys advertised by this repository, keyed by name.
    pub keys: HashMap<String, RepositoryKey>,
}

impl RepositoryMeta {
    /// Creates a minimal [`RepositoryMeta`] with the given version and maintainer, leaving the
    /// remaining fields at their defaults.
    pub fn new(version: u32, maintainer: String) -> Self {
        Self {
            version,
            maintainer,
            source: None,
            packing_format: "tzst".to_string(),
            manifests_file: "manifests".to_string(),
            manifests_archive: "manifests.pkg".to_string(),
            conflicts_file: "conflicts".to_string(),
            conflicts_archive: "conflicts.pkg".to_string(),
            filesite_file: None,
            filesite_archive: None,
            data_file: "data".to_string(),
            data_archive: "data.pkg".to_string(),
            source_identifier: None,
            revision: 0,
            eol_timestamp: None,
            keys: HashMap::new(),
        }
    }

    /// Whether this meta declares a schema version old enough to warrant a deprecation notice
    /// (version 1, superseded by the current version 2 schema).
    pub fn is_deprecated(&self) -> bool {
        self.version == 1
    }
}

/// A configured package repository.
///
/// Repositories are process-wide: the active set is owned by the top-level context and consulted
/// read-only by fetch and query operations.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Repository {
    /// The repository's configured name, used to key it in the active set.
    pub name: String,
    /// The base URL used when `mirror_type` is [`MirrorType::None`], or as the fallback host for
    /// mirror discovery otherwise.
    pub url: Url,
    /// How this repository's mirror list is discovered.
    pub mirror_type: MirrorType,
    /// How this repository's authenticity is established.
    pub signature_type: SignatureType,
    /// Path to the repository's signing public key, when `signature_type` is
    /// [`SignatureType::Pubkey`].
    pub pubkey_path: Option<PathBuf>,
    /// Directory of trusted fingerprints, when `signature_type` is
    /// [`SignatureType::Fingerprint`].
    pub fingerprint_dir: Option<PathBuf>,
    /// The most recently fetched `meta.conf`, once available.
    pub meta: Option<RepositoryMeta>,
    /// Resolution order among configured repositories; lower values are preferred.
    pub priority: i32,
    /// Whether this repository participates in fetch/query operations.
    pub enabled: bool,
    /// Per-repository environment-variable overrides (e.g. proxy settings).
    pub env: Vec<(String, String)>,
    /// Which IP family to prefer when this repository's host resolves to both.
    pub ip_preference: IpPreference,
    /// Fingerprints trusted for this repository's signatures.
    pub trusted_fps: Vec<String>,
    /// Fingerprints explicitly revoked for this repository.
    pub revoked_fps: Vec<String>,
}

impl Repository {
    /// Creates a new, enabled [`Repository`] with no signature checking and default priority.
    pub fn new(name: String, url: Url) -> Self {
        Self {
            name,
            url,
            mirror_type: MirrorType::default(),
            signature_type: SignatureType::default(),
            pubkey_path: None,
            fingerprint_dir: None,
            meta: None,
            priority: 0,
            enabled: true,
            env: Vec::new(),
            ip_preference: IpPreference::default(),
            trusted_fps: Vec::new(),
            revoked_fps: Vec::new(),
        }
    }

    /// Whether `fingerprint` is trusted and not revoked for this repository.
    pub fn trusts_fingerprint(&self, fingerprint: &str) -> bool {
        self.trusted_fps.iter().any(|fp| fp == fingerprint)
            && !self.revoked_fps.iter().any(|fp| fp == fingerprint)
    }
}

impl Display for Repository {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{} ({})", self.name, self.url)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn meta_v1_is_deprecated() {
        let meta = RepositoryMeta::new(1, "example".to_string());
        assert!(meta.is_deprecated());
    }

    #[rstest]
    fn meta_v2_is_current() {
        let meta = RepositoryMeta::new(2, "example".to_string());
        assert!(!meta.is_deprecated());
    }

    #[rstest]
    fn repository_trusts_fingerprint_unless_revoked() {
        let mut repo = Repository::new(
            "example".to_string(),
            Url::from_str("https://example.org/repo").unwrap(),
        );
        repo.trusted_fps.push("abc123".to_string());
        assert!(repo.trusts_fingerprint("abc123"));
        repo.revoked_fps.push("abc123".to_string());
        assert!(!repo.trusts_fingerprint("abc123"));
    }

    #[rstest]
    fn repository_display() {
        let repo = Repository::new(
            "example".to_string(),
            Url::from_str("https://example.org/repo").unwrap(),
        );
        assert_eq!(repo.to_string(), "example (https://example.org/repo)");
    }
}
