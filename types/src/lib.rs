//! Fundamental types for the Strato node registry.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account/network addresses, node public keys, coins, timestamps, node metadata
//! and lifecycle enums, plus the prefixed base32 text encoding used on the wire.

pub mod address;
pub mod bech32;
pub mod coin;
pub mod description;
pub mod error;
pub mod keys;
pub mod node;
pub mod time;

pub use address::Address;
pub use coin::Coin;
pub use description::Description;
pub use error::TypesError;
pub use keys::{KeyAlgorithm, PubKey};
pub use node::{NodeKind, NodeStatus, NodeType};
pub use time::Timestamp;
