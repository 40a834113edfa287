//! Nullable store: thread-safe in-memory storage for testing.

use std::collections::BTreeMap;
use std::sync::Mutex;

use strato_store::{KvStore, StoreError, WriteOp};

/// An ordered in-memory key-value store.
pub struct NullStore {
    entries: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
    fail_writes: Mutex<bool>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            fail_writes: Mutex::new(false),
        }
    }

    /// Make every subsequent write fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// Total number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every entry, for whole-state comparisons in tests.
    pub fn snapshot(&self) -> BTreeMap<Vec<u8>, Vec<u8>> {
        self.entries.lock().unwrap().clone()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(StoreError::Backend("null store configured to fail".into()));
        }
        Ok(())
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for NullStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn iter_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn write_batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut entries = self.entries.lock().unwrap();
        for op in ops {
            match op {
                WriteOp::Put(k, v) => {
                    entries.insert(k, v);
                }
                WriteOp::Delete(k) => {
                    entries.remove(&k);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strato_store::CacheStore;

    #[test]
    fn prefix_scan_stops_at_prefix_end() {
        let store = NullStore::new();
        store.put(&[1, 1], b"a").unwrap();
        store.put(&[1, 2], b"b").unwrap();
        store.put(&[2, 0], b"c").unwrap();
        assert_eq!(store.iter_prefix(&[1]).unwrap().len(), 2);
        assert_eq!(store.iter_prefix(&[]).unwrap().len(), 3);
    }

    #[test]
    fn failing_writes_surface_as_backend_errors() {
        let store = NullStore::new();
        store.fail_writes(true);
        assert!(matches!(
            store.put(b"k", b"v"),
            Err(StoreError::Backend(_))
        ));
        let cache = CacheStore::new(&store);
        cache.put(b"k", b"v").unwrap();
        assert!(cache.commit().is_err());
        assert!(store.is_empty());
    }
}
