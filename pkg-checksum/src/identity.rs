//! Package-identity digest: a single hash over every identity-relevant field of a
//! package, used to detect whether two manifests describe the same package content.

use crate::Checksum;
use crate::ChecksumType;
use crate::compute;

/// One `(field, value)` pair contributing to a package-identity digest.
///
/// Field tags are: `name`, `origin`, `version`, `arch`,
/// `opt_name`/`opt_value` (per package option), `required_shlib`/`provided_shlib` (per shared
/// library), `user`/`group` (per owned account), and `depend` (per dependency, keyed by its
/// origin-version uid).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChecksumEntry {
    pub field: &'static str,
    pub value: String,
}

impl ChecksumEntry {
    /// Creates a new entry.
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self { field, value: value.into() }
    }
}

/// Computes a package-identity [`Checksum`] over `entries`.
///
/// `entries` is sorted by `(field, value)` before hashing regardless of the order given by the
/// caller, then each entry's field bytes followed by its value bytes are fed into the digest
/// with no separators. This mirrors the original `pkg_checksum_generate`/`DL_SORT` behavior so
/// the two implementations agree on digests for identical packages.
pub fn generate_pkg_identity(mut entries: Vec<ChecksumEntry>, checksum_type: ChecksumType) -> Checksum {
    entries.sort_by(|a, b| a.field.cmp(b.field).then_with(|| a.value.cmp(&b.value)));

    let mut bytes = Vec::new();
    for entry in &entries {
        bytes.extend_from_slice(entry.field.as_bytes());
        bytes.extend_from_slice(entry.value.as_bytes());
    }

    compute(&bytes, checksum_type)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    /// Scenario **S3**: identity digest of a minimal package (name `test`, origin `origin`, no
    /// version, default wildcard arch, no deps/shlibs/users/groups/options).
    #[rstest]
    fn s3_pkg_identity_digest() {
        let entries = vec![
            ChecksumEntry::new("name", "test"),
            ChecksumEntry::new("origin", "origin"),
            ChecksumEntry::new("arch", "*"),
        ];
        let checksum = generate_pkg_identity(entries, ChecksumType::Sha256Hex);
        assert_eq!(
            checksum.to_string(),
            "2$1$22c6baf7d22b7035be18ffe04f43717f907f4848b3d5d72bfc44bb8435053ea4"
        );
    }

    #[rstest]
    fn sort_order_is_field_then_value() {
        let a = generate_pkg_identity(
            vec![ChecksumEntry::new("depend", "b"), ChecksumEntry::new("depend", "a")],
            ChecksumType::Sha256Hex,
        );
        let b = generate_pkg_identity(
            vec![ChecksumEntry::new("depend", "a"), ChecksumEntry::new("depend", "b")],
            ChecksumType::Sha256Hex,
        );
        assert_eq!(a, b, "caller-supplied order must not affect the digest");
    }
}
