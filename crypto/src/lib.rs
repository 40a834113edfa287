//! Hashing and node key handling for the Strato node registry.
//!
//! - **Blake2b** for hashing (network address derivation)
//! - Node public key acceptance rules (secp256k1 only)
//! - Network address derivation: first 20 bytes of Blake2b-256(pubkey)

pub mod address;
pub mod error;
pub mod hash;

pub use address::{address_from_pubkey, validate_node_pubkey};
pub use error::CryptoError;
pub use hash::blake2b_256;
