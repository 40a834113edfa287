//! Account and node network addresses.

use crate::bech32::{self, ADDRESS_HRP};
use crate::error::TypesError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 20-byte address identifying either an owner account or a node.
///
/// Node network addresses are derived from the node public key (see
/// `strato_crypto::address_from_pubkey`). An address may be empty when it
/// arrives unset in a command; structural validation rejects that case.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(Vec<u8>);

impl Address {
    /// Length of a well-formed address in bytes.
    pub const LEN: usize = 20;

    pub fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes.to_vec())
    }

    /// Build an address from raw bytes, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypesError> {
        if bytes.len() != Self::LEN {
            return Err(TypesError::InvalidAddressLength(bytes.len()));
        }
        Ok(Self(bytes.to_vec()))
    }

    /// The empty (unset) address.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Text form, `st_…`. The empty address renders as an empty string.
    pub fn to_bech32(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        bech32::encode(ADDRESS_HRP, &self.0)
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::empty());
        }
        let bytes = bech32::decode(ADDRESS_HRP, s)?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_bech32())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_bech32())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            if !bytes.is_empty() && bytes.len() != Self::LEN {
                return Err(serde::de::Error::invalid_length(
                    bytes.len(),
                    &"20 bytes",
                ));
            }
            Ok(Self(bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_form_roundtrips() {
        let addr = Address::new([7u8; 20]);
        let s = addr.to_string();
        assert!(s.starts_with("st_"));
        assert_eq!(s.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn empty_address_is_empty_string() {
        assert_eq!(Address::empty().to_string(), "");
        assert!("".parse::<Address>().unwrap().is_empty());
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(Address::from_slice(&[1u8; 19]).is_err());
        let s = bech32::encode(ADDRESS_HRP, &[1u8; 32]);
        assert!(matches!(
            s.parse::<Address>(),
            Err(TypesError::InvalidAddressLength(32))
        ));
    }

    #[test]
    fn json_uses_text_form() {
        let addr = Address::new([3u8; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
