//! Percent-encoding for the `files` sub-object's paths: non-ASCII bytes and `%`
//! itself are escaped as `%XX`, since package paths may contain arbitrary UTF-8 but the document
//! format wants plain ASCII keys.

use crate::Error;

fn needs_escape(byte: u8) -> bool {
    byte == b'%' || !byte.is_ascii() || byte.is_ascii_control()
}

/// Percent-encodes non-ASCII bytes and `%` in `input`.
pub fn encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if needs_escape(byte) {
            out.push('%');
            out.push_str(&format!("{byte:02X}"));
        } else {
            out.push(byte as char);
        }
    }
    out
}

/// Decodes a string produced by [`encode`].
///
/// ## Errors
///
/// Returns [`Error::InvalidPercentEncoding`] if a `%` is not followed by two hex digits, or if
/// the decoded bytes are not valid UTF-8.
pub fn decode(input: &str) -> Result<String, Error> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .ok_or_else(|| Error::InvalidPercentEncoding(input.to_string()))?;
            let value = u8::from_str_radix(hex, 16).map_err(|_| Error::InvalidPercentEncoding(input.to_string()))?;
            out.push(value);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| Error::InvalidPercentEncoding(input.to_string()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("plain/ascii/path", "plain/ascii/path")]
    #[case("caf\u{e9}.txt", "caf%C3%A9.txt")]
    #[case("100%done", "100%25done")]
    fn round_trip(#[case] raw: &str, #[case] encoded: &str) {
        assert_eq!(encode(raw), encoded);
        assert_eq!(decode(encoded).unwrap(), raw);
    }

    #[rstest]
    fn decode_rejects_truncated_escape() {
        assert!(decode("%4").is_err());
    }

    #[rstest]
    fn decode_rejects_non_hex_escape() {
        assert!(decode("%zz").is_err());
    }
}
