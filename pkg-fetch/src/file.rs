//! The `file://`-scheme transport: a plain filesystem copy, useful for local repository mirrors
//! and tests.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::Error;
use crate::FetchItem;
use crate::FetchOutcome;

/// Copies `base_dir.join(item.relpath)` into `dest`, honoring `item.mtime` as a conditional
/// fetch against the source file's own modification time.
///
/// # Errors
///
/// Returns [`Error::Io`] for anything other than a missing source file.
pub fn fetch_file(base_dir: &Path, item: &FetchItem, dest: &mut impl Write) -> Result<FetchOutcome, Error> {
    let path = base_dir.join(&item.relpath);
    let metadata = match fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(FetchOutcome::NotFound),
        Err(source) => return Err(Error::io("statting local fetch source", source)),
    };

    if let Some(cached_mtime) = item.mtime {
        if let Ok(modified) = metadata.modified() {
            if let Ok(duration) = modified.duration_since(std::time::UNIX_EPOCH) {
                if duration.as_secs() as i64 <= cached_mtime {
                    return Ok(FetchOutcome::UpToDate);
                }
            }
        }
    }

    let mut source = fs::File::open(&path).map_err(|source| Error::io("opening local fetch source", source))?;
    std::io::copy(&mut source, dest).map_err(|source| Error::io("copying local fetch source", source))?;
    Ok(FetchOutcome::Ok)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn copies_an_up_to_date_miss() -> TestResult {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a.pkg"), b"contents")?;
        let mut dest = Vec::new();
        let outcome = fetch_file(dir.path(), &FetchItem::new("a.pkg"), &mut dest)?;
        assert_eq!(outcome, FetchOutcome::Ok);
        assert_eq!(dest, b"contents");
        Ok(())
    }

    #[test]
    fn reports_missing_source_as_not_found() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut dest = Vec::new();
        let outcome = fetch_file(dir.path(), &FetchItem::new("missing.pkg"), &mut dest)?;
        assert_eq!(outcome, FetchOutcome::NotFound);
        Ok(())
    }
}
