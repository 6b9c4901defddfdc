//! ECDSA (NIST P-256) signer: SHA-256 over the raw archive, DER-encoded `ECDSA-Sig-Value`.

use std::io::Read;

use ecdsa::SigningKey;
use ecdsa::VerifyingKey;
use ecdsa::signature::Signer as _;
use ecdsa::signature::Verifier as _;
use p256::NistP256;
use p256::pkcs8::DecodePrivateKey;
use p256::pkcs8::DecodePublicKey;

use crate::Error;
use crate::Signer;
use crate::SignerKind;

/// ECDSA-over-P256 signer, producing/consuming DER-encoded signatures.
#[derive(Debug)]
pub struct EcdsaSigner {
    signing_key: Option<SigningKey<NistP256>>,
}

impl EcdsaSigner {
    /// Creates an [`EcdsaSigner`] able to verify only (no private key loaded).
    pub fn verifier() -> Self {
        Self { signing_key: None }
    }

    /// Creates an [`EcdsaSigner`] able to sign, loading a PKCS#8 PEM private key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crypto`] if `pem` is not a valid PKCS#8-encoded P-256 private key.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, Error> {
        let signing_key =
            SigningKey::<NistP256>::from_pkcs8_pem(pem).map_err(|source| Error::Crypto {
                kind: "ecdsa",
                reason: source.to_string(),
            })?;
        Ok(Self { signing_key: Some(signing_key) })
    }

    fn read_all(mut content: impl Read) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        content
            .read_to_end(&mut buf)
            .map_err(|source| Error::io("reading archive content for ECDSA signing", source))?;
        Ok(buf)
    }
}

impl Signer for EcdsaSigner {
    fn kind(&self) -> SignerKind {
        SignerKind::Ecdsa
    }

    fn sign(&self, archive: &mut dyn Read) -> Result<Vec<u8>, Error> {
        let signing_key = self.signing_key.as_ref().ok_or_else(|| Error::Crypto {
            kind: "ecdsa",
            reason: "no private key loaded".to_string(),
        })?;
        let content = Self::read_all(archive)?;
        let signature: ecdsa::Signature<NistP256> = signing_key.try_sign(&content).map_err(
            |source| Error::Crypto { kind: "ecdsa", reason: source.to_string() },
        )?;
        Ok(signature.to_der().as_bytes().to_vec())
    }

    fn verify(
        &self,
        key_path: &std::path::Path,
        signature: &[u8],
        archive: &mut dyn Read,
    ) -> Result<(), Error> {
        let pem = std::fs::read_to_string(key_path)
            .map_err(|source| Error::io("reading ECDSA public key", source))?;
        self.verify_with_key_bytes(pem.as_bytes(), signature, archive)
    }

    fn verify_with_key_bytes(
        &self,
        key_bytes: &[u8],
        signature: &[u8],
        archive: &mut dyn Read,
    ) -> Result<(), Error> {
        let pem = std::str::from_utf8(key_bytes).map_err(|_| Error::Crypto {
            kind: "ecdsa",
            reason: "public key is not valid UTF-8 PEM".to_string(),
        })?;
        let verifying_key =
            VerifyingKey::<NistP256>::from_public_key_pem(pem).map_err(|source| Error::Crypto {
                kind: "ecdsa",
                reason: source.to_string(),
            })?;
        let signature = ecdsa::Signature::<NistP256>::from_der(signature).map_err(|source| {
            Error::Crypto { kind: "ecdsa", reason: source.to_string() }
        })?;
        let content = Self::read_all(archive)?;
        verifying_key
            .verify(&content, &signature)
            .map_err(|source| Error::Crypto { kind: "ecdsa", reason: source.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use ecdsa::pkcs8::EncodePrivateKey;
    use ecdsa::pkcs8::EncodePublicKey;
    use ecdsa::pkcs8::LineEnding;
    use p256::SecretKey;

    use super::*;

    #[test]
    fn sign_then_verify_round_trips() {
        let secret_key = SecretKey::random(&mut rand::thread_rng());
        let signing_key = SigningKey::<NistP256>::from(secret_key.clone());
        let pem = signing_key.to_pkcs8_pem(LineEnding::LF).unwrap();

        let signer = EcdsaSigner::from_pkcs8_pem(&pem).unwrap();
        let signature = signer.sign(&mut Cursor::new(b"archive-bytes")).unwrap();

        let public_pem =
            secret_key.public_key().to_public_key_pem(LineEnding::LF).unwrap();
        let verifier = EcdsaSigner::verifier();
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
