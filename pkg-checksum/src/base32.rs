//! z-base32 encoding (Zimmermann's human-oriented base-32).
//!
//! <http://philzimmermann.com/docs/human-oriented-base-32-encoding.txt>
//!
//! This is bit-for-bit compatible with the original C `pkg_checksum_encode_base32` state
//! machine, not RFC 4648 base32 — the alphabet and bit packing both differ.

const ALPHABET: &[u8] = b"ybndrfg8ejkmcpqxot1uwisza345h769";

/// Encodes `input` as z-base32 text.
pub fn encode(input: &[u8]) -> String {
    let mut out = Vec::with_capacity(input.len() * 8 / 5 + 1);
    let mut remain: i32 = -1;

    for (i, &byte) in input.iter().enumerate() {
        let byte = byte as i32;
        match i % 5 {
            0 => {
                // 8 bits of input, 3 remain.
                remain = byte >> 5;
                out.push(ALPHABET[(byte & 0x1F) as usize]);
            }
            1 => {
                // 11 bits of input, 1 remains.
                let x = remain | (byte << 3);
                out.push(ALPHABET[(x & 0x1F) as usize]);
                out.push(ALPHABET[(x >> 5 & 0x1F) as usize]);
                remain = x >> 10;
            }
            2 => {
                // 9 bits of input, 4 remain.
                let x = remain | (byte << 1);
                out.push(ALPHABET[(x & 0x1F) as usize]);
                remain = x >> 5;
            }
            3 => {
                // 12 bits of input, 2 remain.
                let x = remain | (byte << 4);
                out.push(ALPHABET[(x & 0x1F) as usize]);
                out.push(ALPHABET[(x >> 5 & 0x1F) as usize]);
                remain = x >> 10 & 0x3;
            }
            4 => {
                // 10 bits of output, nothing remains.
                let x = remain | (byte << 2);
                out.push(ALPHABET[(x & 0x1F) as usize]);
                out.push(ALPHABET[(x >> 5 & 0x1F) as usize]);
                remain = -1;
            }
            _ => unreachable!(),
        }
    }
    if remain >= 0 {
        out.push(ALPHABET[remain as usize]);
    }

    // SAFETY-free: every pushed byte comes from ALPHABET, which is ASCII.
    String::from_utf8(out).expect("z-base32 alphabet is ASCII")
}

/// Decodes z-base32 text back to raw bytes. Returns `None` on an invalid character.
pub fn decode(input: &str) -> Option<Vec<u8>> {
    let mut lookup = [-1i8; 256];
    for (value, &ch) in ALPHABET.iter().enumerate() {
        lookup[ch as usize] = value as i8;
    }

    let mut out = Vec::new();
    let mut bit_buf: u32 = 0;
    let mut bit_count: u32 = 0;
    for ch in input.bytes() {
        let value = lookup[ch as usize];
        if value < 0 {
            return None;
        }
        bit_buf |= (value as u32) << bit_count;
        bit_count += 5;
        if bit_count >= 8 {
            out.push((bit_buf & 0xFF) as u8);
            bit_buf >>= 8;
            bit_count -= 8;
        }
    }
    Some(out)
}

/// Encodes `input` as lowercase hex, two characters per byte.
pub fn to_hex(input: &[u8]) -> String {
    input.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Decodes a lowercase (or uppercase) hex string back to raw bytes.
pub fn from_hex(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 {
        return None;
    }
    (0..input.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&input[i..i + 2], 16).ok())
        .collect()
}
