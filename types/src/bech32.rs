//! Prefixed base32 text encoding for addresses and node public keys.
//!
//! Format: `<hrp>_` + base32(payload) + base32(checksum, 8 chars)
//!
//! Checksum: first 5 bytes of Blake2b-256(hrp || payload).
//! Base32 alphabet: `13456789abcdefghijkmnopqrstuwxyz` (avoids ambiguous chars).

use crate::error::TypesError;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Human-readable prefix for account and node network addresses.
pub const ADDRESS_HRP: &str = "st";

/// Human-readable prefix for node (SDS p2p) public keys.
pub const NODE_PUBKEY_HRP: &str = "stsdspub";

const SEPARATOR: char = '_';

const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = BASE32_ALPHABET;
    let mut i = 0;
    while i < 32 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

const CHECKSUM_BYTES: usize = 5;
/// 40 bits → 8 characters.
const CHECKSUM_CHARS: usize = 8;

fn encode_base32(bytes: &[u8]) -> String {
    let num_chars = (bytes.len() * 8).div_ceil(5);
    let mut result = String::with_capacity(num_chars);

    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let idx = ((buffer >> bits_in_buffer) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[idx] as char);
        }
    }
    if bits_in_buffer > 0 {
        let idx = ((buffer << (5 - bits_in_buffer)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[idx] as char);
    }

    result
}

fn decode_base32(s: &str) -> Result<Vec<u8>, TypesError> {
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;
    let mut result = Vec::with_capacity(s.len() * 5 / 8);

    for c in s.bytes() {
        let val = if c < 128 { BASE32_DECODE[c as usize] } else { 0xFF };
        if val == 0xFF {
            return Err(TypesError::InvalidEncoding(format!(
                "invalid character {:?}",
                c as char
            )));
        }
        buffer = (buffer << 5) | val as u64;
        bits_in_buffer += 5;
        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            result.push((buffer >> bits_in_buffer) as u8);
        }
    }

    // Reject non-canonical trailing bits so every payload has one spelling.
    if encode_base32(&result) != s {
        return Err(TypesError::InvalidEncoding("non-canonical padding".into()));
    }
    Ok(result)
}

fn checksum(hrp: &str, payload: &[u8]) -> [u8; CHECKSUM_BYTES] {
    let mut hasher = Blake2b256::new();
    hasher.update(hrp.as_bytes());
    hasher.update(payload);
    let digest = hasher.finalize();
    let mut out = [0u8; CHECKSUM_BYTES];
    out.copy_from_slice(&digest[..CHECKSUM_BYTES]);
    out
}

/// Encode `payload` under the given human-readable prefix.
pub fn encode(hrp: &str, payload: &[u8]) -> String {
    format!(
        "{}{}{}{}",
        hrp,
        SEPARATOR,
        encode_base32(payload),
        encode_base32(&checksum(hrp, payload))
    )
}

/// Decode a string produced by [`encode`], checking prefix and checksum.
pub fn decode(hrp: &str, s: &str) -> Result<Vec<u8>, TypesError> {
    let (found, body) = s
        .split_once(SEPARATOR)
        .ok_or_else(|| TypesError::InvalidEncoding("missing separator".into()))?;
    if found != hrp {
        return Err(TypesError::WrongPrefix {
            expected: hrp.to_string(),
            found: found.to_string(),
        });
    }
    if body.len() < CHECKSUM_CHARS || !body.is_char_boundary(body.len() - CHECKSUM_CHARS) {
        return Err(TypesError::InvalidEncoding("too short".into()));
    }

    let (payload_part, checksum_part) = body.split_at(body.len() - CHECKSUM_CHARS);
    let payload = decode_base32(payload_part)?;
    let sum = decode_base32(checksum_part)?;
    if sum.as_slice() != checksum(hrp, &payload) {
        return Err(TypesError::InvalidChecksum);
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_prefixed_and_decodes() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF, 0x42, 0x00, 0x17];
        let s = encode(ADDRESS_HRP, &data);
        assert!(s.starts_with("st_"));
        assert_eq!(decode(ADDRESS_HRP, &s).unwrap(), data);
    }

    #[test]
    fn empty_payload_roundtrips() {
        let s = encode(ADDRESS_HRP, &[]);
        assert_eq!(decode(ADDRESS_HRP, &s).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn wrong_prefix_rejected() {
        let s = encode(NODE_PUBKEY_HRP, &[1, 2, 3]);
        assert!(matches!(
            decode(ADDRESS_HRP, &s),
            Err(TypesError::WrongPrefix { .. })
        ));
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let mut s = encode(ADDRESS_HRP, &[9u8; 20]);
        let last = s.pop().unwrap();
        s.push(if last == '1' { '3' } else { '1' });
        assert!(decode(ADDRESS_HRP, &s).is_err());
    }

    #[test]
    fn invalid_characters_rejected() {
        assert!(decode(ADDRESS_HRP, "st_0OIl2vvvvvvvvvvv").is_err());
        assert!(decode(ADDRESS_HRP, "st_").is_err());
        assert!(decode(ADDRESS_HRP, "no-separator").is_err());
    }

    #[test]
    fn non_ascii_body_does_not_panic() {
        assert!(decode(ADDRESS_HRP, "st_ééééééééé").is_err());
    }
}
