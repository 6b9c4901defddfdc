#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

//! Pluggable digital signature providers.
//!
//! Each [`Signer`] implementation signs and verifies package archives. The wire format embedded
//! in packaged archives is a `$PKGSIGN:TYPE$` magic followed by the raw signature bytes; if the
//! magic is absent the signature is assumed to be `rsa` ([`wire::detect_signer_kind`]).
//!
//! [`fingerprint`] implements the trust-store half of the component: a repository configured with
//! `signature_type = fingerprint` verifies a stream of signature/pubkey records against a
//! `trusted/` and `revoked/` directory of SHA-256 pubkey fingerprints.

mod ecdsa_signer;
mod ed25519_signer;
mod error;
pub mod fingerprint;
mod rsa_signer;
mod signer;
mod wire;

pub use ecdsa_signer::EcdsaSigner;
pub use ed25519_signer::Ed25519Signer;
pub use error::Error;
pub use fingerprint::{FingerprintStore, TrustOutcome};
pub use rsa_signer::RsaSigner;
pub use signer::{Signer, SignerKind};
pub use wire::{SIGNATURE_MAGIC_PREFIX, detect_signer_kind, wrap_signature};
