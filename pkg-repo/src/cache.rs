//! Local cache path layout.
//!
//! `<cachedir>/[Hashed/<prefix>/]<name-version>.<ext>`: the `Hashed` prefix directory spreads
//! cached archives across 256 buckets keyed by the first byte of the basename's SHA-256 digest,
//! avoiding a single directory holding every cached package when a repository opts into it.

use std::path::Path;
use std::path::PathBuf;

use sha2::Digest as _;
use sha2::Sha256;

/// Returns the local cache filename for `name-version.extension`, optionally bucketed under a
/// `Hashed/<prefix>/` subdirectory.
pub fn cached_name(name: &str, version: &str, extension: &str, hashed: bool) -> String {
    let basename = format!("{name}-{version}.{extension}");
    if !hashed {
        return basename;
    }
    let digest = Sha256::digest(basename.as_bytes());
    let prefix = hex::encode(&digest[..1]);
    format!("Hashed/{prefix}/{basename}")
}

/// Joins `cachedir` with the result of [`cached_name`].
pub fn cached_path(cachedir: &Path, name: &str, version: &str, extension: &str, hashed: bool) -> PathBuf {
    cachedir.join(cached_name(name, version, extension, hashed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unhashed_name_is_flat() {
        assert_eq!(cached_name("foo", "1.0.0", "tzst", false), "foo-1.0.0.tzst");
    }

    #[test]
    fn hashed_name_is_bucketed() {
        let name = cached_name("foo", "1.0.0", "tzst", true);
        assert!(name.starts_with("Hashed/"));
        assert!(name.ends_with("foo-1.0.0.tzst"));
    }

    #[test]
    fn hashing_is_deterministic() {
        assert_eq!(cached_name("foo", "1.0.0", "tzst", true), cached_name("foo", "1.0.0", "tzst", true));
    }

    #[test]
    fn cached_path_joins_cachedir() {
        let path = cached_path(Path::new("/var/cache/pkg"), "foo", "1.0.0", "tzst", false);
        assert_eq!(path, Path::new("/var/cache/pkg/foo-1.0.0.tzst"));
    }
}
