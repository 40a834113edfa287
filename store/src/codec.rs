//! Value encoding for stored records (bincode).

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::StoreError;

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    Ok(bincode::serialize(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Corruption(e.to_string()))
}
