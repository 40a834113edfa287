//! LMDB storage backend for the Strato node registry.
//!
//! Implements [`strato_store::KvStore`] using the `heed` LMDB bindings. All
//! registry state lives in one ordered `kv` database; a second `meta`
//! database tracks the schema version.

pub mod environment;
pub mod error;
pub mod kv;
pub mod schema;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use kv::LmdbKvStore;
