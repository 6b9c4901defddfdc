//! Ed25519 signer: signs over a BLAKE2b-512 digest of the raw archive bytes.

use std::io::Read;

use blake2::Blake2b512;
use blake2::Digest as _;
use ed25519_dalek::Signature;
use ed25519_dalek::Signer as _;
use ed25519_dalek::SigningKey;
use ed25519_dalek::VerifyingKey;
use ed25519_dalek::Verifier as _;

use crate::Error;
use crate::Signer;
use crate::SignerKind;

/// Ed25519 signer operating on a BLAKE2b-512 pre-image of the archive content.
#[derive(Debug)]
pub struct Ed25519Signer {
    signing_key: Option<SigningKey>,
}

impl Ed25519Signer {
    /// Creates an [`Ed25519Signer`] able to verify only (no private key loaded).
    pub fn verifier() -> Self {
        Self { signing_key: None }
    }

    /// Creates an [`Ed25519Signer`] able to sign, from a raw 32-byte seed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crypto`] if `seed` is not exactly 32 bytes.
    pub fn from_seed_bytes(seed: &[u8]) -> Result<Self, Error> {
        let seed: [u8; 32] = seed.try_into().map_err(|_| Error::Crypto {
            kind: "ed25519",
            reason: "seed must be exactly 32 bytes".to_string(),
        })?;
        Ok(Self { signing_key: Some(SigningKey::from_bytes(&seed)) })
    }

    fn digest(mut content: impl Read) -> Result<[u8; 64], Error> {
        let mut hasher = Blake2b512::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = content
                .read(&mut buf)
                .map_err(|source| Error::io("reading archive content for Ed25519 signing", source))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hasher.finalize().into())
    }
}

impl Signer for Ed25519Signer {
    fn kind(&self) -> SignerKind {
        SignerKind::Ed25519
    }

    fn sign(&self, archive: &mut dyn Read) -> Result<Vec<u8>, Error> {
        let signing_key = self.signing_key.as_ref().ok_or_else(|| Error::Crypto {
            kind: "ed25519",
            reason: "no private key loaded".to_string(),
        })?;
        let digest = Self::digest(archive)?;
        Ok(signing_key.sign(&digest).to_bytes().to_vec())
    }

    fn verify(
        &self,
        key_path: &std::path::Path,
        signature: &[u8],
        archive: &mut dyn Read,
    ) -> Result<(), Error> {
        let key_bytes = std::fs::read(key_path)
            .map_err(|source| Error::io("reading Ed25519 public key", source))?;
        self.verify_with_key_bytes(&key_bytes, signature, archive)
    }

    fn verify_with_key_bytes(
        &self,
        key_bytes: &[u8],
        signature: &[u8],
        archive: &mut dyn Read,
    ) -> Result<(), Error> {
        let key_bytes: [u8; 32] = key_bytes.try_into().map_err(|_| Error::Crypto {
            kind: "ed25519",
            reason: "public key must be exactly 32 bytes".to_string(),
        })?;
        let verifying_key = VerifyingKey::from_bytes(&key_bytes).map_err(|source| Error::Crypto {
            kind: "ed25519",
            reason: source.to_string(),
        })?;
        let signature_bytes: [u8; 64] = signature.try_into().map_err(|_| Error::Crypto {
            kind: "ed25519",
            reason: "signature must be exactly 64 bytes".to_string(),
        })?;
        let signature = Signature::from_bytes(&signature_bytes);
        let digest = Self::digest(archive)?;
        verifying_key
            .verify(&digest, &signature)
            .map_err(|source| Error::Crypto { kind: "ed25519", reason: source.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rand::rngs::OsRng;

    use super::*;

    #[test]
    fn sign_then_verify_round_trips() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let seed = signing_key.to_bytes();

        let signer = Ed25519Signer::from_seed_bytes(&seed).unwrap();
        let signature = signer.sign(&mut Cursor::new(b"archive-bytes")).unwrap();

        let verifying_key = signing_key.verifying_key();
        let verifier = Ed25519Signer::verifier();
        verifier
            .verify_with_key_bytes(
                verifying_key.as_bytes(),
                &signature,
                &mut Cursor::new(b"archive-bytes"),
            )
            .unwrap();

        assert!(
            verifier
                .verify_with_key_bytes(
                    verifying_key.as_bytes(),
                    &signature,
                    &mut Cursor::new(b"tampered-bytes"),
                )
                .is_err()
        );
    }
}
