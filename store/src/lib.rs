//! Abstract key-value storage for the Strato node registry.
//!
//! Every storage backend (LMDB, in-memory for testing) implements [`KvStore`].
//! The registry depends only on the trait, and runs each command against a
//! [`CacheStore`] branch so that a failed command leaves no partial writes.

pub mod cache;
pub mod codec;
pub mod error;
pub mod kv;
pub mod prefix;

pub use cache::CacheStore;
pub use codec::{decode, encode};
pub use error::StoreError;
pub use kv::{KvStore, WriteOp};
pub use prefix::{prefix_end, PrefixStore};
