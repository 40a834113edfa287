//! Node public keys.

use crate::bech32::{self, NODE_PUBKEY_HRP};
use crate::error::TypesError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Signature scheme of a node public key.
///
/// Only [`KeyAlgorithm::Secp256k1`] is accepted for registration; Ed25519 keys
/// decode fine but are refused by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    Secp256k1,
    Ed25519,
}

impl KeyAlgorithm {
    fn tag(self) -> u8 {
        match self {
            Self::Secp256k1 => 0x01,
            Self::Ed25519 => 0x02,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, TypesError> {
        match tag {
            0x01 => Ok(Self::Secp256k1),
            0x02 => Ok(Self::Ed25519),
            other => Err(TypesError::UnknownKeyAlgorithm(other)),
        }
    }

    /// Expected encoded key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            Self::Secp256k1 => 33,
            Self::Ed25519 => 32,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Secp256k1 => "secp256k1",
            Self::Ed25519 => "ed25519",
        }
    }
}

/// A node's network identity key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PubKey {
    algorithm: KeyAlgorithm,
    bytes: Vec<u8>,
}

impl PubKey {
    /// Build a key, checking the length against the algorithm.
    pub fn new(algorithm: KeyAlgorithm, bytes: Vec<u8>) -> Result<Self, TypesError> {
        if bytes.len() != algorithm.key_len() {
            return Err(TypesError::InvalidPubKey(format!(
                "{} key must be {} bytes, got {}",
                algorithm.as_str(),
                algorithm.key_len(),
                bytes.len()
            )));
        }
        Ok(Self { algorithm, bytes })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Tagged bytes (algorithm tag followed by the key), the payload of the text form.
    pub fn to_tagged_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.bytes.len());
        out.push(self.algorithm.tag());
        out.extend_from_slice(&self.bytes);
        out
    }

    pub fn from_tagged_bytes(data: &[u8]) -> Result<Self, TypesError> {
        let (&tag, key) = data
            .split_first()
            .ok_or_else(|| TypesError::InvalidPubKey("empty key".into()))?;
        Self::new(KeyAlgorithm::from_tag(tag)?, key.to_vec())
    }

    /// Text form, `stsdspub_…`.
    pub fn to_bech32(&self) -> String {
        bech32::encode(NODE_PUBKEY_HRP, &self.to_tagged_bytes())
    }
}

impl FromStr for PubKey {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data = bech32::decode(NODE_PUBKEY_HRP, s)?;
        Self::from_tagged_bytes(&data)
    }
}

impl fmt::Display for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}

impl fmt::Debug for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubKey({}:", self.algorithm.as_str())?;
        for b in self.bytes.iter().take(4) {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "\u{2026})")
    }
}

impl Serialize for PubKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_bech32())
        } else {
            serializer.serialize_bytes(&self.to_tagged_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for PubKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            let data = <Vec<u8>>::deserialize(deserializer)?;
            Self::from_tagged_bytes(&data).map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secp_key(seed: u8) -> PubKey {
        let mut bytes = vec![seed; 33];
        bytes[0] = 0x02;
        PubKey::new(KeyAlgorithm::Secp256k1, bytes).unwrap()
    }

    #[test]
    fn text_form_roundtrips() {
        let key = secp_key(9);
        let s = key.to_string();
        assert!(s.starts_with("stsdspub_"));
        assert_eq!(s.parse::<PubKey>().unwrap(), key);
    }

    #[test]
    fn length_is_checked_per_algorithm() {
        assert!(PubKey::new(KeyAlgorithm::Secp256k1, vec![0; 32]).is_err());
        assert!(PubKey::new(KeyAlgorithm::Ed25519, vec![0; 32]).is_ok());
    }

    #[test]
    fn unknown_tag_rejected() {
        let mut data = vec![0x09];
        data.extend_from_slice(&[1u8; 33]);
        assert_eq!(
            PubKey::from_tagged_bytes(&data),
            Err(TypesError::UnknownKeyAlgorithm(0x09))
        );
    }

    #[test]
    fn bincode_uses_tagged_bytes() {
        let key = secp_key(4);
        let encoded = bincode::serialize(&key).unwrap();
        let decoded: PubKey = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded, key);
    }
}
