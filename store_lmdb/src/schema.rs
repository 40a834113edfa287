//! Schema version tracking.
//!
//! A fresh database has no version stored. Opening a database written by a
//! newer build is refused.

use heed::types::Bytes;
use heed::{Database, RwTxn};

use crate::LmdbError;

/// The schema version that the current code expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

pub(crate) fn read_version(
    txn: &RwTxn<'_>,
    meta_db: Database<Bytes, Bytes>,
) -> Result<u32, LmdbError> {
    match meta_db.get(txn, SCHEMA_VERSION_KEY)? {
        Some(bytes) => {
            let arr: [u8; 4] = bytes.try_into().map_err(|_| {
                LmdbError::Serialization("schema_version has unexpected byte length".to_string())
            })?;
            Ok(u32::from_le_bytes(arr))
        }
        None => Ok(0),
    }
}

pub(crate) fn check_and_upgrade(
    txn: &mut RwTxn<'_>,
    meta_db: Database<Bytes, Bytes>,
) -> Result<(), LmdbError> {
    let current = read_version(txn, meta_db)?;

    if current == CURRENT_SCHEMA_VERSION {
        tracing::debug!(version = current, "database schema is up to date");
        return Ok(());
    }

    if current > CURRENT_SCHEMA_VERSION {
        return Err(LmdbError::UnsupportedSchema {
            found: current,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    // Version 0 is a blank database; there is nothing older to migrate from.
    meta_db.put(txn, SCHEMA_VERSION_KEY, &CURRENT_SCHEMA_VERSION.to_le_bytes())?;
    tracing::info!(version = CURRENT_SCHEMA_VERSION, "initialised database schema");
    Ok(())
}
