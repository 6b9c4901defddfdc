#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

//! Versioned, content-addressed checksums.
//!
//! A [`Checksum`] is the textual form `VERSION$TYPE$DIGEST`; the "file" form used inside a
//! manifest's `files` map drops the `VERSION$` prefix and is just `TYPE$DIGEST`. `VERSION` is
//! currently always `2`.

mod base32;
mod error;
mod identity;

pub use error::Error;
pub use identity::ChecksumEntry;
pub use identity::generate_pkg_identity;

use std::fmt::Display;
use std::fmt::Formatter;
use std::io::Read;
use std::str::FromStr;

use blake2::Blake2b512;
use blake2::Blake2s256;
use blake2::Digest;
use sha2::Sha256;

/// The current checksum wire-format version.
pub const CURRENT_VERSION: u32 = 2;

/// The hash algorithm plus encoding used for a [`Checksum`]'s digest.
///
/// Numeric values are part of the wire format and must
/// never be reordered.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[repr(u32)]
pub enum ChecksumType {
    /// SHA-256, z-base32 encoded.
    Sha256Base32 = 0,
    /// SHA-256, lowercase hex encoded.
    Sha256Hex = 1,
    /// BLAKE2b-512, z-base32 encoded.
    Blake2Base32 = 2,
    /// SHA-256, raw bytes.
    Sha256Raw = 3,
    /// BLAKE2b-512, raw bytes.
    Blake2Raw = 4,
    /// BLAKE2s-256, z-base32 encoded.
    Blake2sBase32 = 5,
    /// BLAKE2s-256, raw bytes.
    Blake2sRaw = 6,
}

impl ChecksumType {
    /// Parses a `ChecksumType` from its wire-format numeric id.
    pub fn from_id(id: u32) -> Option<Self> {
        Some(match id {
            0 => Self::Sha256Base32,
            1 => Self::Sha256Hex,
            2 => Self::Blake2Base32,
            3 => Self::Sha256Raw,
            4 => Self::Blake2Raw,
            5 => Self::Blake2sBase32,
            6 => Self::Blake2sRaw,
            _ => return None,
        })
    }

    /// Returns the wire-format numeric id for this type.
    pub fn id(self) -> u32 {
        self as u32
    }

    /// The undigested byte length of this type's underlying hash function, used by callers that
    /// need to size an output buffer ahead of time.
    pub fn raw_len(self) -> usize {
        match self {
            Self::Sha256Base32 | Self::Sha256Hex | Self::Sha256Raw => 32,
            Self::Blake2Base32 | Self::Blake2Raw => 64,
            Self::Blake2sBase32 | Self::Blake2sRaw => 32,
        }
    }

    fn digest(self, bytes: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256Base32 | Self::Sha256Hex | Self::Sha256Raw => {
                Sha256::digest(bytes).to_vec()
            }
            Self::Blake2Base32 | Self::Blake2Raw => Blake2b512::digest(bytes).to_vec(),
            Self::Blake2sBase32 | Self::Blake2sRaw => Blake2s256::digest(bytes).to_vec(),
        }
    }

    fn is_raw(self) -> bool {
        matches!(self, Self::Sha256Raw | Self::Blake2Raw | Self::Blake2sRaw)
    }

    fn is_base32(self) -> bool {
        matches!(self, Self::Sha256Base32 | Self::Blake2Base32 | Self::Blake2sBase32)
    }

    fn encode(self, raw: &[u8]) -> String {
        if self.is_raw() {
            // Raw digests are handled by the caller via `Checksum::raw`; this path is only hit
            // when formatting a raw checksum as text, in which case we fall back to hex so the
            // text form stays printable.
            base32::to_hex(raw)
        } else if self.is_base32() {
            base32::encode(raw)
        } else {
            base32::to_hex(raw)
        }
    }
}

/// A versioned, typed content digest.
///
/// Produced by [`compute`], [`compute_reader`] or [`compute_symlink_target`]; parsed back from
/// text with [`Checksum::parse`]/[`Checksum::parse_file_form`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Checksum {
    version: u32,
    checksum_type: ChecksumType,
    raw: Vec<u8>,
}

impl Checksum {
    /// The checksum's wire version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The checksum's type.
    pub fn checksum_type(&self) -> ChecksumType {
        self.checksum_type
    }

    /// The raw digest bytes, regardless of the type's textual encoding.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Renders the "file" form (`TYPE$DIGEST`, no version prefix) used in a manifest's `files`
    /// map.
    pub fn to_file_form(&self) -> String {
        format!("{}${}", self.checksum_type.id(), self.checksum_type.encode(&self.raw))
    }

    /// Parses the full `VERSION$TYPE$DIGEST` form.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut parts = text.splitn(3, '$');
        let version: u32 = parts
            .next()
            .ok_or_else(|| Error::Invalid(text.to_string()))?
            .parse()
            .map_err(|_| Error::Invalid(text.to_string()))?;
        Self::parse_rest(version, parts, text)
    }

    /// Parses the "file" form (`TYPE$DIGEST`, version implied as [`CURRENT_VERSION`]).
    pub fn parse_file_form(text: &str) -> Result<Self, Error> {
        let mut parts = text.splitn(2, '$');
        let type_id: u32 = parts
            .next()
            .ok_or_else(|| Error::Invalid(text.to_string()))?
            .parse()
            .map_err(|_| Error::Invalid(text.to_string()))?;
        let digest = parts.next().ok_or_else(|| Error::Invalid(text.to_string()))?;
        let checksum_type = ChecksumType::from_id(type_id).ok_or(Error::UnsupportedType(type_id))?;
        let raw = decode_digest(checksum_type, digest)?;
        Ok(Self { version: CURRENT_VERSION, checksum_type, raw })
    }

    fn parse_rest<'a>(
        version: u32,
        mut parts: impl Iterator<Item = &'a str>,
        text: &str,
    ) -> Result<Self, Error> {
        let type_id: u32 = parts
            .next()
            .ok_or_else(|| Error::Invalid(text.to_string()))?
            .parse()
            .map_err(|_| Error::Invalid(text.to_string()))?;
        let digest = parts.next().ok_or_else(|| Error::Invalid(text.to_string()))?;
        let checksum_type = ChecksumType::from_id(type_id).ok_or(Error::UnsupportedType(type_id))?;
        let raw = decode_digest(checksum_type, digest)?;
        Ok(Self { version, checksum_type, raw })
    }

    /// Validates that the file at `path` matches `expected_text` (full `VERSION$TYPE$DIGEST`
    /// form), without reading beyond the declared content once a mismatch is already certain to
    /// have occurred is not attempted: the whole file is always read, matching spec's "reads the
    /// file fully" contract for [`compute_reader`].
    pub fn validate(path: &std::path::Path, expected_text: &str) -> Result<bool, Error> {
        let expected = Self::parse(expected_text)?;
        let mut file = std::fs::File::open(path).map_err(Error::Io)?;
        let actual = compute_reader(&mut file, expected.checksum_type)?;
        Ok(actual.raw == expected.raw)
    }
}

impl Display for Checksum {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}${}${}", self.version, self.checksum_type.id(), self.checksum_type.encode(&self.raw))
    }
}

impl FromStr for Checksum {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn decode_digest(checksum_type: ChecksumType, digest: &str) -> Result<Vec<u8>, Error> {
    if checksum_type.is_base32() {
        base32::decode(digest).ok_or_else(|| Error::Invalid(digest.to_string()))
    } else {
        base32::from_hex(digest).ok_or_else(|| Error::Invalid(digest.to_string()))
    }
}

/// Computes a [`Checksum`] over `bytes`.
pub fn compute(bytes: &[u8], checksum_type: ChecksumType) -> Checksum {
    Checksum { version: CURRENT_VERSION, checksum_type, raw: checksum_type.digest(bytes) }
}

/// Computes a [`Checksum`] by reading `reader` to the end. No seek restoration is attempted or
/// required.
pub fn compute_reader<R: Read>(reader: &mut R, checksum_type: ChecksumType) -> Result<Checksum, Error> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).map_err(Error::Io)?;
    Ok(compute(&buf, checksum_type))
}

/// Computes a [`Checksum`] over the *target* string of a symlink, not the content it points to
///.
pub fn compute_symlink_target(target: &str, checksum_type: ChecksumType) -> Checksum {
    compute(target.as_bytes(), checksum_type)
}

/// Returns whether `text` is a syntactically valid checksum: well-formed `VERSION$TYPE$...`,
/// version equal to [`CURRENT_VERSION`], and a known type. `expected_len` is accepted for
/// parity with the C API but, matching the reference implementation, is not checked against
/// `text`'s actual length beyond the `< 4` minimum-length guard below.
pub fn is_valid(text: &str, expected_len: usize) -> bool {
    let _ = expected_len;
    if text.len() < 4 {
        return false;
    }
    let mut parts = text.splitn(3, '$');
    let Some(version) = parts.next().and_then(|v| v.parse::<u32>().ok()) else {
        return false;
    };
    if version != CURRENT_VERSION {
        return false;
    }
    let Some(type_id) = parts.next().and_then(|v| v.parse::<u32>().ok()) else {
        return false;
    };
    ChecksumType::from_id(type_id).is_some()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;
    use tempfile::tempdir;

    use super::*;

    /// Scenario **S2**: file checksum of `foo` containing `"bar\n"`.
    #[rstest]
    fn s2_file_checksum_sha256_hex() {
        let checksum = compute(b"bar\n", ChecksumType::Sha256Hex);
        assert_eq!(
            checksum.to_file_form(),
            "1$7d865e959b2466918c9863afca942d0fb89d7c9ac0c99bafc3749504ded97730"
        );
    }

    #[rstest]
    fn s2_file_checksum_blake2_base32() {
        let checksum = compute(b"bar\n", ChecksumType::Blake2Base32);
        assert_eq!(
            checksum.to_file_form(),
            "2$gf8mcrnmm6p6hg6wa9xkfb98zo8g6nxu8z4q7s93boz8hzf5ogrsr4qgpsb7utd6speio3op18ocyrsa9ms8jj15byttiq7ofbih8gn"
        );
    }

    /// Scenario **S1**: checksum of a symlink's target string `foo`.
    #[rstest]
    fn s1_symlink_checksum() {
        let checksum = compute_symlink_target("foo", ChecksumType::Sha256Hex);
        assert_eq!(
            checksum.to_file_form(),
            "1$2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae"
        );
    }

    #[rstest]
    fn s5_is_valid() {
        assert!(!is_valid("mehe", 2));
        assert!(is_valid(
            "2$1$66004b00bfb27c5e6e68b8d6e31c3a5a7a43a3f9cc8e0eb4c1b4a0ee9e8cdd32",
            66
        ));
        assert!(!is_valid("2$42$aaaa", 66));
    }

    #[rstest]
    fn parse_roundtrips_display() {
        let checksum = compute(b"hello world", ChecksumType::Sha256Hex);
        let text = format!("{checksum}");
        let parsed = Checksum::parse(&text).unwrap();
        assert_eq!(parsed, checksum);
    }

    #[rstest]
    fn parse_rejects_unknown_type() {
        assert!(matches!(Checksum::parse("2$42$aaaa"), Err(Error::UnsupportedType(42))));
    }

    #[rstest]
    fn validate_matches_file_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foo");
        std::fs::File::create(&path).unwrap().write_all(b"bar\n").unwrap();
        let checksum = compute(b"bar\n", ChecksumType::Sha256Hex);
        let expected = format!("{checksum}");
        assert!(Checksum::validate(&path, &expected).unwrap());
    }

    #[rstest]
    fn validate_detects_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foo");
        std::fs::File::create(&path).unwrap().write_all(b"not bar\n").unwrap();
        let checksum = compute(b"bar\n", ChecksumType::Sha256Hex);
        let expected = format!("{checksum}");
        assert!(!Checksum::validate(&path, &expected).unwrap());
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    fn arb_checksum_type() -> impl Strategy<Value = ChecksumType> {
        prop_oneof![
            Just(ChecksumType::Sha256Base32),
            Just(ChecksumType::Sha256Hex),
            Just(ChecksumType::Blake2Base32),
            Just(ChecksumType::Sha256Raw),
            Just(ChecksumType::Blake2Raw),
            Just(ChecksumType::Blake2sBase32),
            Just(ChecksumType::Blake2sRaw),
        ]
    }

    proptest! {
        /// `parse(Display(compute(bytes))) == compute(bytes)` for every checksum type.
        #[test]
        fn checksum_display_round_trips_through_parse(
            bytes in proptest::collection::vec(any::<u8>(), 0..256),
            checksum_type in arb_checksum_type(),
        ) {
            let checksum = compute(&bytes, checksum_type);
            let parsed = Checksum::parse(&checksum.to_string())?;
            prop_assert_eq!(parsed, checksum);
        }

        /// `parse_file_form(to_file_form(compute(bytes)))` recovers the same type and digest.
        #[test]
        fn checksum_file_form_round_trips(
            bytes in proptest::collection::vec(any::<u8>(), 0..256),
            checksum_type in arb_checksum_type(),
        ) {
            let checksum = compute(&bytes, checksum_type);
            let parsed = Checksum::parse_file_form(&checksum.to_file_form())?;
            prop_assert_eq!(parsed.checksum_type(), checksum.checksum_type());
            prop_assert_eq!(parsed.raw(), checksum.raw());
        }

        /// Every freshly computed checksum's text form passes [`is_valid`], regardless of the
        /// `expected_len` argument.
        #[test]
        fn every_computed_checksum_is_valid(
            bytes in proptest::collection::vec(any::<u8>(), 0..256),
            checksum_type in arb_checksum_type(),
            expected_len in 0usize..128,
        ) {
            let checksum = compute(&bytes, checksum_type);
            prop_assert!(is_valid(&checksum.to_string(), expected_len));
        }
    }
}
