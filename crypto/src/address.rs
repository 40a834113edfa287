//! Node network address derivation.
//!
//! A node's network address is the first 20 bytes of Blake2b-256 over the raw
//! public key bytes. Only compressed secp256k1 keys (33 bytes, leading 0x02
//! or 0x03) are accepted as node identities.

use crate::error::CryptoError;
use crate::hash::blake2b_256;
use strato_types::{Address, KeyAlgorithm, PubKey};

const COMPRESSED_EVEN: u8 = 0x02;
const COMPRESSED_ODD: u8 = 0x03;

/// Check that `key` may be used as a node identity.
pub fn validate_node_pubkey(key: &PubKey) -> Result<(), CryptoError> {
    match key.algorithm() {
        KeyAlgorithm::Ed25519 => Err(CryptoError::UnsupportedKeyAlgorithm(
            KeyAlgorithm::Ed25519.as_str(),
        )),
        KeyAlgorithm::Secp256k1 => {
            let bytes = key.as_bytes();
            if bytes.len() != 33 {
                return Err(CryptoError::MalformedKey(format!(
                    "expected 33 bytes, got {}",
                    bytes.len()
                )));
            }
            if bytes[0] != COMPRESSED_EVEN && bytes[0] != COMPRESSED_ODD {
                return Err(CryptoError::MalformedKey(format!(
                    "bad prefix byte 0x{:02x}",
                    bytes[0]
                )));
            }
            Ok(())
        }
    }
}

/// Derive the network address of a node from its public key.
pub fn address_from_pubkey(key: &PubKey) -> Address {
    let digest = blake2b_256(key.as_bytes());
    let mut out = [0u8; Address::LEN];
    out.copy_from_slice(&digest[..Address::LEN]);
    Address::new(out)
}
