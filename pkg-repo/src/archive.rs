//! Signed archive extraction.
//!
//! Walks a tar archive via [`pkg_compress::tarball::TarballReader`] once, collecting signature
//! and pubkey records alongside the single requested content entry, so the caller can feed the
//! records to whichever trust mechanism the repository is configured for (§4.4).

use std::path::Path;

use pkg_compress::tarball::TarballReader;

use crate::Error;

/// A named signature or pubkey entry collected during an archive walk.
#[derive(Clone, Debug)]
pub struct SignatureRecord {
    /// The entry's basename with its `.sig`/`.pub` suffix stripped.
    pub name: String,
    /// The raw entry content.
    pub content: Vec<u8>,
}

/// The result of walking a signed archive for one requested entry.
#[derive(Clone, Debug, Default)]
pub struct ExtractedArchive {
    /// The content of the requested entry, if found.
    pub content: Option<Vec<u8>>,
    /// The content of a top-level `signature` entry (pubkey mode).
    pub signature: Option<Vec<u8>>,
    /// `<name>.sig` entries collected for fingerprint-mode verification.
    pub sig_records: Vec<SignatureRecord>,
    /// `<name>.pub` entries collected for fingerprint-mode verification.
    pub pub_records: Vec<SignatureRecord>,
}

/// Walks `archive_path`, extracting the entry named `target_name` and collecting every
/// `signature`/`.sig`/`.pub` entry along the way.
///
/// # Errors
///
/// Returns [`Error::Archive`] if the archive cannot be opened or an entry cannot be read, or
/// [`Error::EntryNotFound`] if `target_name` is absent from the archive.
pub fn walk_and_extract(archive_path: &Path, target_name: &str) -> Result<ExtractedArchive, Error> {
    let mut reader = TarballReader::try_from(archive_path)?;
    let mut extracted = ExtractedArchive::default();

    for entry in reader.entries()? {
        let mut entry = entry?;
        let path = entry.path().to_path_buf();
        let Some(name) = path.to_str() else { continue };

        if name == "signature" {
            extracted.signature = Some(entry.content()?);
            continue;
        }
        if let Some(stem) = name.strip_suffix(".sig") {
            extracted.sig_records.push(SignatureRecord { name: stem.to_string(), content: entry.content()? });
            continue;
        }
        if let Some(stem) = name.strip_suffix(".pub") {
            extracted.pub_records.push(SignatureRecord { name: stem.to_string(), content: entry.content()? });
            continue;
        }
        if name == target_name {
            extracted.content = Some(entry.content()?);
        }
    }

    if extracted.content.is_none() {
        return Err(Error::EntryNotFound { name: target_name.to_string() });
    }
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use pkg_compress::compression::CompressionSettings;
    use pkg_compress::tarball::TarballBuilder;
    use tempfile::NamedTempFile;
    use testresult::TestResult;

    use super::*;

    fn append(builder: &mut TarballBuilder, name: &str, content: &[u8]) -> TestResult {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.inner_mut().append_data(&mut header, name, content)?;
        Ok(())
    }

    #[test]
    fn collects_signature_records_and_extracts_the_target() -> TestResult {
        let archive = NamedTempFile::with_suffix(".tar")?;
        {
            let file = archive.reopen()?;
            let mut builder = TarballBuilder::new(file, &CompressionSettings::None)?;
            append(&mut builder, "+MANIFEST", b"manifest-bytes")?;
            append(&mut builder, "jane.sig", b"sig-bytes")?;
            append(&mut builder, "jane.pub", b"pub-bytes")?;
            builder.finish()?;
        }

        let extracted = walk_and_extract(archive.path(), "+MANIFEST")?;
        assert_eq!(extracted.content.as_deref(), Some(&b"manifest-bytes"[..]));
        assert_eq!(extracted.sig_records.len(), 1);
        assert_eq!(extracted.sig_records[0].name, "jane");
        assert_eq!(extracted.pub_records[0].content, b"pub-bytes");
        Ok(())
    }

    #[test]
    fn missing_target_entry_is_an_error() -> TestResult {
        let archive = NamedTempFile::with_suffix(".tar")?;
        {
            let file = archive.reopen()?;
            let mut builder = TarballBuilder::new(file, &CompressionSettings::None)?;
            append(&mut builder, "+MANIFEST", b"bytes")?;
            builder.finish()?;
        }

        let result = walk_and_extract(archive.path(), "+COMPACT_MANIFEST");
        assert!(matches!(result, Err(Error::EntryNotFound { .. })));
        Ok(())
    }

    #[test]
    fn pubkey_mode_signature_entry_is_collected() -> TestResult {
        let archive = NamedTempFile::with_suffix(".tar")?;
        {
            let file = archive.reopen()?;
            let mut builder = TarballBuilder::new(file, &CompressionSettings::None)?;
            append(&mut builder, "+MANIFEST", b"bytes")?;
            append(&mut builder, "signature", b"the-signature")?;
            builder.finish()?;
        }

        let extracted = walk_and_extract(archive.path(), "+MANIFEST")?;
        assert_eq!(extracted.signature.as_deref(), Some(&b"the-signature"[..]));
        Ok(())
    }
}
