//! The key-value storage trait.

use std::sync::Arc;

use crate::StoreError;

/// One mutation in a [`KvStore::write_batch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// Ordered byte-keyed storage.
///
/// Keys sort lexicographically; [`KvStore::iter_prefix`] returns entries in
/// ascending key order. Methods take `&self` so that stores can be shared
/// between the keeper, the bank and the query surface.
pub trait KvStore {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Insert or overwrite a value.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Remove a key. Deleting an absent key is not an error.
    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn iter_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;

    /// Apply several mutations. Backends with transactions override this to
    /// apply the whole batch atomically.
    fn write_batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        for op in ops {
            match op {
                WriteOp::Put(k, v) => self.put(&k, &v)?,
                WriteOp::Delete(k) => self.delete(&k)?,
            }
        }
        Ok(())
    }

    fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn iter_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        (**self).iter_prefix(prefix)
    }

    fn write_batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        (**self).write_batch(ops)
    }
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn iter_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        (**self).iter_prefix(prefix)
    }

    fn write_batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        (**self).write_batch(ops)
    }
}
