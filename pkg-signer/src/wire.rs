//! Signature wire-format framing: the `$PKGSIGN:TYPE$` magic prefix.

use crate::SignerKind;

/// The prefix that tags a signer kind on the wire, e.g. `$PKGSIGN:ECDSA$`.
pub const SIGNATURE_MAGIC_PREFIX: &str = "$PKGSIGN:";

/// Detects the [`SignerKind`] a signature blob was produced with.
///
/// If the blob does not start with [`SIGNATURE_MAGIC_PREFIX`], the signature is assumed to be
/// `rsa`.
///
/// Returns the detected kind and the remaining raw signature bytes (with the magic stripped).
pub fn detect_signer_kind(blob: &[u8]) -> Result<(SignerKind, &[u8]), crate::Error> {
    let Some(rest) = blob.strip_prefix(SIGNATURE_MAGIC_PREFIX.as_bytes()) else {
        return Ok((SignerKind::Rsa, blob));
    };
    let Some(dollar) = rest.iter().position(|&b| b == b'$') else {
        return Ok((SignerKind::Rsa, blob));
    };
    let (kind_bytes, payload) = rest.split_at(dollar);
    let payload = &payload[1..];
    let kind_str =
        std::str::from_utf8(kind_bytes).map_err(|_| crate::Error::UnknownSignerKind {
            kind: String::from_utf8_lossy(kind_bytes).into_owned(),
        })?;
    let kind: SignerKind =
        kind_str
            .to_ascii_lowercase()
            .parse()
            .map_err(|_| crate::Error::UnknownSignerKind {
                kind: kind_str.to_string(),
            })?;
    Ok((kind, payload))
}

/// Wraps a raw signature with the `$PKGSIGN:TYPE$` magic for a given [`SignerKind`].
pub fn wrap_signature(kind: SignerKind, raw: &[u8]) -> Vec<u8> {
    let mut out = format!("{SIGNATURE_MAGIC_PREFIX}{}$", kind.to_string().to_uppercase())
        .into_bytes();
    out.extend_from_slice(raw);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_rsa_signature_has_no_magic() {
        let (kind, payload) = detect_signer_kind(b"some-raw-bytes").unwrap();
        assert_eq!(kind, SignerKind::Rsa);
        assert_eq!(payload, b"some-raw-bytes");
    }

    #[test]
    fn wrapped_ecdsa_signature_round_trips() {
        let wrapped = wrap_signature(SignerKind::Ecdsa, b"der-bytes");
        let (kind, payload) = detect_signer_kind(&wrapped).unwrap();
        assert_eq!(kind, SignerKind::Ecdsa);
        assert_eq!(payload, b"der-bytes");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let blob = b"$PKGSIGN:DSA$garbage";
        assert!(detect_signer_kind(blob).is_err());
    }
}
