//! The pluggable signer contract.

use std::fmt::Debug;
use std::io::Read;
use std::path::Path;

use crate::Error;

/// Identifies which cryptographic technology a [`Signer`] implements.
///
/// Mirrors the plugin `name` a signer registers under: the value also appears,
/// upper-cased, after the `$PKGSIGN:` wire-format magic.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SignerKind {
    /// RSA-PKCS1-v1.5, legacy pre-hashed-hex quirk preserved for compatibility.
    Rsa,
    /// ECDSA over SHA-256, DER-encoded `ECDSA-Sig-Value`.
    Ecdsa,
    /// Ed25519 over a BLAKE2 digest of the archive.
    Ed25519,
}

/// A pluggable signature provider.
///
/// Corresponds to the plugin contract `new`/`free`/`sign`/`verify`/`verify_cert`.
/// `new`/`free` map onto ordinary Rust construction and `Drop`; the remaining three are trait
/// methods so that `Box<dyn Signer>` can stand in for the original's opaque `ctx` handle.
pub trait Signer: Debug {
    /// Returns which [`SignerKind`] this signer implements.
    fn kind(&self) -> SignerKind;

    /// Signs the content read from `archive`, returning the raw (unwrapped) signature bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if reading `archive` fails or the underlying cryptographic operation
    /// fails.
    fn sign(&self, archive: &mut dyn Read) -> Result<Vec<u8>, Error>;

    /// Verifies `signature` (raw bytes, no `$PKGSIGN:` wrapper) against the content read from
    /// `archive`, using the public key at `key_path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crypto`] if the signature does not verify, or an I/O error if `key_path`
    /// or `archive` cannot be read.
    fn verify(&self, key_path: &Path, signature: &[u8], archive: &mut dyn Read)
    -> Result<(), Error>;

    /// Verifies `signature` against `archive` using an in-memory public key (fingerprint mode,
    /// where the key is embedded in the signed payload rather than loaded from a repository's
    /// configured key file).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crypto`] if the signature does not verify.
    fn verify_with_key_bytes(
        &self,
        key_bytes: &[u8],
        signature: &[u8],
        archive: &mut dyn Read,
    ) -> Result<(), Error>;
}
