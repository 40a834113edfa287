//! Write-buffering overlay over another store.
//!
//! A `CacheStore` records puts and deletes in memory and serves reads from
//! that overlay first. Nothing reaches the parent until [`CacheStore::commit`];
//! dropping the cache discards every buffered write.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::kv::{KvStore, WriteOp};
use crate::StoreError;

type Overlay = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

pub struct CacheStore<S: KvStore> {
    parent: S,
    overlay: Mutex<Overlay>,
}

impl<S: KvStore> CacheStore<S> {
    pub fn new(parent: S) -> Self {
        Self {
            parent,
            overlay: Mutex::new(BTreeMap::new()),
        }
    }

    fn overlay(&self) -> Result<MutexGuard<'_, Overlay>, StoreError> {
        self.overlay
            .lock()
            .map_err(|_| StoreError::Backend("cache overlay lock poisoned".into()))
    }

    /// Number of keys written or deleted since the branch was opened.
    pub fn pending_writes(&self) -> Result<usize, StoreError> {
        Ok(self.overlay()?.len())
    }

    /// Flush every buffered write to the parent as one batch.
    pub fn commit(self) -> Result<(), StoreError> {
        let overlay = self
            .overlay
            .into_inner()
            .map_err(|_| StoreError::Backend("cache overlay lock poisoned".into()))?;
        if overlay.is_empty() {
            return Ok(());
        }
        let ops = overlay
            .into_iter()
            .map(|(k, v)| match v {
                Some(v) => WriteOp::Put(k, v),
                None => WriteOp::Delete(k),
            })
            .collect();
        self.parent.write_batch(ops)
    }

    /// Drop every buffered write.
    pub fn discard(self) {}
}

impl<S: KvStore> KvStore for CacheStore<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(entry) = self.overlay()?.get(key) {
            return Ok(entry.clone());
        }
        self.parent.get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.overlay()?.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.overlay()?.insert(key.to_vec(), None);
        Ok(())
    }

    fn iter_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.iter_prefix(prefix)?.into_iter().collect();
        let overlay = self.overlay()?;
        for (k, v) in overlay.range(prefix.to_vec()..) {
            if !k.starts_with(prefix) {
                break;
            }
            match v {
                Some(v) => {
                    merged.insert(k.clone(), v.clone());
                }
                None => {
                    merged.remove(k);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MapStore(Mutex<BTreeMap<Vec<u8>, Vec<u8>>>);

    impl KvStore for MapStore {
        fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }
        fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
            self.0.lock().unwrap().insert(key.to_vec(), value.to_vec());
            Ok(())
        }
        fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
        fn iter_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .iter()
                .filter(|(k, _)| k.starts_with(prefix))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect())
        }
    }

    #[test]
    fn reads_see_buffered_writes() {
        let base = MapStore::default();
        base.put(b"a", b"1").unwrap();
        let cache = CacheStore::new(&base);
        cache.put(b"a", b"2").unwrap();
        assert_eq!(cache.get(b"a").unwrap(), Some(b"2".to_vec()));
        assert_eq!(base.get(b"a").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn discard_leaves_parent_untouched() {
        let base = MapStore::default();
        let cache = CacheStore::new(&base);
        cache.put(b"k", b"v").unwrap();
        cache.discard();
        assert_eq!(base.get(b"k").unwrap(), None);
    }

    #[test]
    fn commit_applies_puts_and_deletes() {
        let base = MapStore::default();
        base.put(b"gone", b"x").unwrap();
        let cache = CacheStore::new(&base);
        cache.put(b"new", b"y").unwrap();
        cache.delete(b"gone").unwrap();
        assert_eq!(cache.pending_writes().unwrap(), 2);
        cache.commit().unwrap();
        assert_eq!(base.get(b"new").unwrap(), Some(b"y".to_vec()));
        assert_eq!(base.get(b"gone").unwrap(), None);
    }

    #[test]
    fn poisoned_overlay_is_a_backend_error() {
        let cache = CacheStore::new(MapStore::default());
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = cache.overlay.lock().unwrap();
            panic!("writer died holding the overlay");
        }));
        assert!(matches!(cache.pending_writes(), Err(StoreError::Backend(_))));
        assert!(matches!(cache.put(b"k", b"v"), Err(StoreError::Backend(_))));
    }

    #[test]
    fn prefix_iteration_merges_overlay() {
        let base = MapStore::default();
        base.put(b"p/1", b"a").unwrap();
        base.put(b"p/2", b"b").unwrap();
        base.put(b"q/1", b"c").unwrap();
        let cache = CacheStore::new(&base);
        cache.delete(b"p/1").unwrap();
        cache.put(b"p/3", b"d").unwrap();
        cache.put(b"q/2", b"e").unwrap();
        let keys: Vec<Vec<u8>> = cache
            .iter_prefix(b"p/")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![b"p/2".to_vec(), b"p/3".to_vec()]);
    }

    #[test]
    fn nested_branches_commit_upwards() {
        let base = MapStore::default();
        let outer = CacheStore::new(&base);
        {
            let inner = CacheStore::new(&outer);
            inner.put(b"x", b"1").unwrap();
            inner.commit().unwrap();
        }
        assert_eq!(outer.get(b"x").unwrap(), Some(b"1".to_vec()));
        assert_eq!(base.get(b"x").unwrap(), None);
        outer.commit().unwrap();
        assert_eq!(base.get(b"x").unwrap(), Some(b"1".to_vec()));
    }
}
