//! LMDB implementation of KvStore.

use std::ops::Bound;

use heed::types::Bytes;
use heed::{Database, Env};

use strato_store::{prefix_end, KvStore, StoreError, WriteOp};

use crate::LmdbError;

/// Ordered key-value access to the `kv` database. Cheap to clone.
#[derive(Clone)]
pub struct LmdbKvStore {
    env: Env,
    db: Database<Bytes, Bytes>,
}

impl LmdbKvStore {
    pub(crate) fn new(env: Env, db: Database<Bytes, Bytes>) -> Self {
        Self { env, db }
    }
}

impl KvStore for LmdbKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self.db.get(&rtxn, key).map_err(LmdbError::from)?;
        Ok(val.map(|v| v.to_vec()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.db.put(&mut wtxn, key, value).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.db.delete(&mut wtxn, key).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let upper = prefix_end(prefix);
        let bounds: (Bound<&[u8]>, Bound<&[u8]>) = (
            Bound::Included(prefix),
            match upper.as_deref() {
                Some(u) => Bound::Excluded(u),
                None => Bound::Unbounded,
            },
        );
        let iter = self.db.range(&rtxn, &bounds).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (k, v) = entry.map_err(LmdbError::from)?;
            results.push((k.to_vec(), v.to_vec()));
        }
        Ok(results)
    }

    /// All operations land in one write transaction; if any fails the
    /// transaction is dropped and nothing is persisted.
    fn write_batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for op in &ops {
            match op {
                WriteOp::Put(k, v) => {
                    self.db.put(&mut wtxn, k, v).map_err(LmdbError::from)?;
                }
                WriteOp::Delete(k) => {
                    self.db.delete(&mut wtxn, k).map_err(LmdbError::from)?;
                }
            }
        }
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(ops = ops.len(), "committed write batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).expect("failed to open env");
        (dir, env)
    }

    #[test]
    fn put_get_delete() {
        let (_dir, env) = temp_env();
        let kv = env.kv_store();
        kv.put(b"key", b"value").unwrap();
        assert_eq!(kv.get(b"key").unwrap(), Some(b"value".to_vec()));
        kv.delete(b"key").unwrap();
        assert_eq!(kv.get(b"key").unwrap(), None);
        // Deleting again is fine.
        kv.delete(b"key").unwrap();
    }

    #[test]
    fn prefix_scan_is_ordered_and_bounded() {
        let (_dir, env) = temp_env();
        let kv = env.kv_store();
        kv.put(&[0x11, 3], b"c").unwrap();
        kv.put(&[0x11, 1], b"a").unwrap();
        kv.put(&[0x12, 0], b"x").unwrap();
        kv.put(&[0x10, 9], b"y").unwrap();
        let got = kv.iter_prefix(&[0x11]).unwrap();
        assert_eq!(
            got,
            vec![(vec![0x11, 1], b"a".to_vec()), (vec![0x11, 3], b"c".to_vec())]
        );
    }

    #[test]
    fn prefix_scan_with_ff_prefix() {
        let (_dir, env) = temp_env();
        let kv = env.kv_store();
        kv.put(&[0xFF, 0xFF, 1], b"z").unwrap();
        assert_eq!(kv.iter_prefix(&[0xFF, 0xFF]).unwrap().len(), 1);
    }

    #[test]
    fn batch_is_applied_together() {
        let (_dir, env) = temp_env();
        let kv = env.kv_store();
        kv.put(b"old", b"1").unwrap();
        kv.write_batch(vec![
            WriteOp::Put(b"a".to_vec(), b"1".to_vec()),
            WriteOp::Put(b"b".to_vec(), b"2".to_vec()),
            WriteOp::Delete(b"old".to_vec()),
        ])
        .unwrap();
        assert_eq!(env.entry_count().unwrap(), 2);
        assert_eq!(kv.get(b"old").unwrap(), None);
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        {
            let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
            env.kv_store().put(b"persist", b"yes").unwrap();
        }
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        assert_eq!(env.kv_store().get(b"persist").unwrap(), Some(b"yes".to_vec()));
    }
}
