//! The legacy RSA/OSSL signer.
//!
//! Preserved exactly as a historical compatibility quirk: the
//! pre-hashed input fed to RSA-PKCS1-v1.5-with-SHA-1 is the 64-character lowercase hex string of
//! `SHA-256(archive)`, not the raw SHA-256 digest bytes.

use std::io::Read;

use rsa::Pkcs1v15Sign;
use rsa::RsaPrivateKey;
use rsa::RsaPublicKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pkcs8::DecodePublicKey;
use sha1::Digest as _;
use sha1::Sha1;
use sha2::Sha256;

use crate::Error;
use crate::Signer;
use crate::SignerKind;

/// RSA-PKCS1-v1.5 signer using the legacy pre-hashed-hex scheme.
#[derive(Debug)]
pub struct RsaSigner {
    private_key: Option<RsaPrivateKey>,
}

impl RsaSigner {
    /// Creates an [`RsaSigner`] able to verify only (no private key loaded).
    pub fn verifier() -> Self {
        Self { private_key: None }
    }

    /// Creates an [`RsaSigner`] able to sign, loading a PKCS#8 PEM private key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crypto`] if `pem` is not a valid PKCS#8-encoded RSA private key.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, Error> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem).map_err(|source| Error::Crypto {
            kind: "rsa",
            reason: source.to_string(),
        })?;
        Ok(Self { private_key: Some(private_key) })
    }

    /// Computes the legacy pre-hash input: the lowercase hex string of `SHA-256(content)`.
    fn legacy_prehash(mut content: impl Read) -> Result<[u8; 20], Error> {
        use sha2::Digest as _;
        let mut sha256 = Sha256::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = content.read(&mut buf).map_err(|source| {
                Error::io("reading archive content for RSA signing", source)
            })?;
            if n == 0 {
                break;
            }
            sha256.update(&buf[..n]);
        }
        let hex_digest = hex::encode(sha256.finalize());
        let mut sha1 = Sha1::new();
        sha1.update(hex_digest.as_bytes());
        Ok(sha1.finalize().into())
    }
}

impl Signer for RsaSigner {
    fn kind(&self) -> SignerKind {
        SignerKind::Rsa
    }

    fn sign(&self, archive: &mut dyn Read) -> Result<Vec<u8>, Error> {
        let private_key = self.private_key.as_ref().ok_or_else(|| Error::Crypto {
            kind: "rsa",
            reason: "no private key loaded".to_string(),
        })?;
        let prehash = Self::legacy_prehash(archive)?;
        private_key
            .sign(Pkcs1v15Sign::new::<Sha1>(), &prehash)
            .map_err(|source| Error::Crypto { kind: "rsa", reason: source.to_string() })
    }

    fn verify(
        &self,
        key_path: &std::path::Path,
        signature: &[u8],
        archive: &mut dyn Read,
    ) -> Result<(), Error> {
        let pem = std::fs::read_to_string(key_path)
            .map_err(|source| Error::io("reading RSA public key", source))?;
        self.verify_with_key_bytes(pem.as_bytes(), signature, archive)
    }

    fn verify_with_key_bytes(
        &self,
        key_bytes: &[u8],
        signature: &[u8],
        archive: &mut dyn Read,
    ) -> Result<(), Error> {
        let pem = std::str::from_utf8(key_bytes).map_err(|_| Error::Crypto {
            kind: "rsa",
            reason: "public key is not valid UTF-8 PEM".to_string(),
        })?;
        let public_key =
            RsaPublicKey::from_public_key_pem(pem).map_err(|source| Error::Crypto {
                kind: "rsa",
                reason: source.to_string(),
            })?;
        let prehash = Self::legacy_prehash(archive)?;
        public_key
            .verify(Pkcs1v15Sign::new::<Sha1>(), &prehash, signature)
            .inspect_err(|source| log::debug!("RSA signature verification failed: {source}"))
            .map_err(|source| Error::Crypto { kind: "rsa", reason: source.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rsa::pkcs8::EncodePrivateKey;
    use rsa::pkcs8::EncodePublicKey;
    use rsa::pkcs8::LineEnding;

    use super::*;

    #[test]
    fn legacy_prehash_is_sha1_of_hex_sha256() {
        let prehash_a = RsaSigner::legacy_prehash(Cursor::new(b"bar\n")).unwrap();
        let prehash_b = RsaSigner::legacy_prehash(Cursor::new(b"bar\n")).unwrap();
        assert_eq!(prehash_a, prehash_b);
        let prehash_other = RsaSigner::legacy_prehash(Cursor::new(b"baz\n")).unwrap();
        assert_ne!(prehash_a, prehash_other);
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let public_key = RsaPublicKey::from(&private_key);
        let pem = private_key.to_pkcs8_pem(LineEnding::LF).unwrap();

        let signer = RsaSigner::from_pkcs8_pem(&pem).unwrap();
        let signature = signer.sign(&mut Cursor::new(b"archive-bytes")).unwrap();

        let public_pem = public_key.to_public_key_pem(LineEnding::LF).unwrap();
        let verifier = RsaSigner::verifier();
        verifier
            .verify_with_key_bytes(
                public_pem.as_bytes(),
                &signature,
                &mut Cursor::new(b"archive-bytes"),
            )
            .unwrap();

        assert!(
            verifier
                .verify_with_key_bytes(
                    public_pem.as_bytes(),
                    &signature,
                    &mut Cursor::new(b"tampered-bytes"),
                )
                .is_err()
        );
    }
}
