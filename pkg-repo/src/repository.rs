//! High-level repository operations: `fetch_meta`, `fetch_manifests`, `fetch_data`,
//! `fetch_package`, `mirror_package`.
//!
//! Each operation composes [`pkg_fetch::fetch`] with [`crate::archive::walk_and_extract`] and, if
//! the repository has signature checking enabled, a [`pkg_signer::Signer`] verification pass over
//! the extracted content.

use std::fs;
use std::fs::File;
use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use log::debug;
use log::warn;
use pkg_fetch::FetchItem;
use pkg_fetch::FetchOutcome;
use pkg_fetch::FetchSettings;
use pkg_fetch::RepoEndpoint;
use pkg_fetch::no_progress;
use pkg_signer::EcdsaSigner;
use pkg_signer::Ed25519Signer;
use pkg_signer::FingerprintStore;
use pkg_signer::Signer;
use pkg_signer::SignerKind;
use pkg_signer::RsaSigner;
use pkg_signer::detect_signer_kind;
use pkg_types::Repository;
use pkg_types::RepositoryMeta;
use pkg_types::SignatureType;

use crate::Error;
use crate::archive;
use crate::cache;
use crate::meta;

/// Fetches and parses `meta.conf`, verifying a detached `meta.conf.sig` when the repository is
/// configured for pubkey-mode signing.
///
/// Fingerprint-mode repositories are not verified at this step: fingerprint
/// records as an artifact of the per-archive tar walk (§4.6 "Signed archive extraction"), and
/// `meta.conf` itself is not tar-formatted, so there is no embedded record stream to check it
/// against.
///
/// # Errors
///
/// Returns [`Error::Fetch`] if the transport fails, [`Error::MetaJson`]/[`Error::MetaSchema`] if
/// the fetched document is malformed, or a signer error if pubkey verification fails.
pub fn fetch_meta(
    repo: &Repository,
    last_mtime: Option<i64>,
    settings: &FetchSettings,
) -> Result<(FetchOutcome, Option<RepositoryMeta>), Error> {
    let endpoint = RepoEndpoint::from(repo);
    let item = match last_mtime {
        Some(mtime) => FetchItem::with_mtime("meta.conf", mtime),
        None => FetchItem::new("meta.conf"),
    };

    let mut buf = Vec::new();
    let outcome = pkg_fetch::fetch(&endpoint, &item, settings, &mut buf, &mut no_progress())?;
    if outcome != FetchOutcome::Ok {
        return Ok((outcome, None));
    }

    if repo.signature_type == SignatureType::Pubkey {
        verify_pubkey_detached(repo, &endpoint, settings, &buf)?;
    } else if repo.signature_type == SignatureType::Fingerprint {
        debug!("repository {} uses fingerprint signing; meta.conf is not separately verified", repo.name);
    }

    let meta = meta::parse_meta(&buf)?;
    Ok((outcome, Some(meta)))
}

fn verify_pubkey_detached(
    repo: &Repository,
    endpoint: &RepoEndpoint,
    settings: &FetchSettings,
    content: &[u8],
) -> Result<(), Error> {
    let pubkey_path = repo.pubkey_path.as_ref().ok_or_else(|| Error::SignatureDisabled { repo: repo.name.clone() })?;

    let mut sig_buf = Vec::new();
    let outcome = pkg_fetch::fetch(endpoint, &FetchItem::new("meta.conf.sig"), settings, &mut sig_buf, &mut no_progress())?;
    if outcome != FetchOutcome::Ok {
        return Err(Error::FetchFailed { what: "meta.conf.sig", repo: repo.name.clone(), outcome });
    }

    let (kind, raw_sig) = detect_signer_kind(&sig_buf)?;
    signer_for(kind).verify(pubkey_path, raw_sig, &mut Cursor::new(content))?;
    Ok(())
}

/// Fetches the manifests archive declared in `meta`, verifies it, and extracts `meta.manifests_file`
/// into `dest`.
///
/// # Errors
///
/// Returns [`Error::Fetch`] if the transport fails, [`Error::Archive`]/[`Error::EntryNotFound`] if
/// the archive cannot be read, or a signer error if verification fails.
pub fn fetch_manifests(
    repo: &Repository,
    meta: &RepositoryMeta,
    last_mtime: Option<i64>,
    settings: &FetchSettings,
    dest: &mut impl Write,
) -> Result<FetchOutcome, Error> {
    fetch_archive_entry(repo, &meta.manifests_archive, &meta.manifests_file, last_mtime, settings, dest)
}

/// Fetches the data archive declared in `meta`, verifies it, and extracts `meta.data_file` into
/// `dest`.
///
/// # Errors
///
/// Returns [`Error::Fetch`] if the transport fails, [`Error::Archive`]/[`Error::EntryNotFound`] if
/// the archive cannot be read, or a signer error if verification fails.
pub fn fetch_data(
    repo: &Repository,
    meta: &RepositoryMeta,
    last_mtime: Option<i64>,
    settings: &FetchSettings,
    dest: &mut impl Write,
) -> Result<FetchOutcome, Error> {
    fetch_archive_entry(repo, &meta.data_archive, &meta.data_file, last_mtime, settings, dest)
}

fn fetch_archive_entry(
    repo: &Repository,
    archive_relpath: &str,
    entry_name: &str,
    last_mtime: Option<i64>,
    settings: &FetchSettings,
    dest: &mut impl Write,
) -> Result<FetchOutcome, Error> {
    let endpoint = RepoEndpoint::from(repo);
    let item = match last_mtime {
        Some(mtime) => FetchItem::with_mtime(archive_relpath, mtime),
        None => FetchItem::new(archive_relpath),
    };

    let tmp = tempfile::NamedTempFile::new().map_err(|source| Error::io("creating temp file for archive fetch", source))?;
    let mut tmp_file = tmp.reopen().map_err(|source| Error::io("reopening temp file for archive fetch", source))?;
    let outcome = pkg_fetch::fetch(&endpoint, &item, settings, &mut tmp_file, &mut no_progress())?;
    if outcome != FetchOutcome::Ok {
        return Ok(outcome);
    }

    let extracted = archive::walk_and_extract(tmp.path(), entry_name)?;
    let content = extracted.content.clone().expect("walk_and_extract guarantees content on success");
    verify_extracted(repo, &extracted, &content)?;
    dest.write_all(&content).map_err(|source| Error::io("writing extracted archive entry", source))?;
    Ok(outcome)
}

/// Fetches `packages/<cached_name>` into `cachedir`, verifying the archive's embedded `+MANIFEST`
/// against its signature entries if the repository has signing enabled.
///
/// # Errors
///
/// Returns [`Error::Fetch`] if the transport fails, or a signer/archive error if verification
/// fails.
pub fn fetch_package(
    repo: &Repository,
    meta: &RepositoryMeta,
    name: &str,
    version: &str,
    cachedir: &Path,
    settings: &FetchSettings,
) -> Result<(FetchOutcome, PathBuf), Error> {
    fetch_package_to(repo, meta, name, version, cachedir, true, settings)
}

/// Fetches a package archive into an arbitrary `dest_dir` rather than the configured cache
/// directory, without bucketing under `Hashed/`.
///
/// # Errors
///
/// Returns [`Error::Fetch`] if the transport fails, or a signer/archive error if verification
/// fails.
pub fn mirror_package(
    repo: &Repository,
    meta: &RepositoryMeta,
    name: &str,
    version: &str,
    dest_dir: &Path,
    settings: &FetchSettings,
) -> Result<(FetchOutcome, PathBuf), Error> {
    fetch_package_to(repo, meta, name, version, dest_dir, false, settings)
}

fn fetch_package_to(
    repo: &Repository,
    meta: &RepositoryMeta,
    name: &str,
    version: &str,
    out_dir: &Path,
    hashed: bool,
    settings: &FetchSettings,
) -> Result<(FetchOutcome, PathBuf), Error> {
    let extension = meta.packing_format.trim_start_matches('.');
    let relname = cache::cached_name(name, version, extension, hashed);
    let dest_path = out_dir.join(&relname);
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::io("creating cache directory", source))?;
    }

    let endpoint = RepoEndpoint::from(repo);
    let item = FetchItem::new(format!("packages/{relname}"));
    let mut file = File::create(&dest_path).map_err(|source| Error::io("creating cached package file", source))?;
    let outcome = pkg_fetch::fetch(&endpoint, &item, settings, &mut file, &mut no_progress())?;
    drop(file);

    if outcome != FetchOutcome::Ok {
        return Ok((outcome, dest_path));
    }

    if repo.signature_type != SignatureType::None {
        let extracted = archive::walk_and_extract(&dest_path, "+MANIFEST")?;
        let content = extracted.content.clone().expect("walk_and_extract guarantees content on success");
        verify_extracted(repo, &extracted, &content)?;
    }

    Ok((outcome, dest_path))
}

fn verify_extracted(repo: &Repository, extracted: &archive::ExtractedArchive, content: &[u8]) -> Result<(), Error> {
    match repo.signature_type {
        SignatureType::None => Ok(()),
        SignatureType::Pubkey => {
            let signature = extracted.signature.as_ref().ok_or_else(|| Error::Untrusted { path: PathBuf::new() })?;
            let pubkey_path = repo.pubkey_path.as_ref().ok_or_else(|| Error::SignatureDisabled { repo: repo.name.clone() })?;
            let (kind, raw_sig) = detect_signer_kind(signature)?;
            signer_for(kind).verify(pubkey_path, raw_sig, &mut Cursor::new(content))?;
            Ok(())
        }
        SignatureType::Fingerprint => {
            let fingerprint_dir = repo.fingerprint_dir.as_ref().ok_or_else(|| Error::SignatureDisabled { repo: repo.name.clone() })?;
            let store = FingerprintStore::new(fingerprint_dir);

            for sig_record in &extracted.sig_records {
                let Some(pub_record) = extracted.pub_records.iter().find(|p| p.name == sig_record.name) else {
                    continue;
                };
                let fingerprint = FingerprintStore::fingerprint_of(&pub_record.content);
                if store.require_trusted(&fingerprint).is_err() {
                    continue;
                }
                let (kind, raw_sig) = detect_signer_kind(&sig_record.content)?;
                if signer_for(kind).verify_with_key_bytes(&pub_record.content, raw_sig, &mut Cursor::new(content)).is_ok() {
                    return Ok(());
                }
                warn!("fingerprint {fingerprint} is trusted but signature {} did not verify", sig_record.name);
            }
            Err(Error::Untrusted { path: PathBuf::new() })
        }
    }
}

fn signer_for(kind: SignerKind) -> Box<dyn Signer> {
    match kind {
        SignerKind::Rsa => Box::new(RsaSigner::verifier()),
        SignerKind::Ecdsa => Box::new(EcdsaSigner::verifier()),
        SignerKind::Ed25519 => Box::new(Ed25519Signer::verifier()),
    }
}
