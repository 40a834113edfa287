//! Namespacing wrapper: every key is stored under a fixed prefix.

use crate::kv::{KvStore, WriteOp};
use crate::StoreError;

/// Smallest key strictly greater than every key starting with `prefix`.
/// `None` when no such key exists (empty or all-0xFF prefix).
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < 0xFF {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

pub struct PrefixStore<S: KvStore> {
    inner: S,
    prefix: Vec<u8>,
}

impl<S: KvStore> PrefixStore<S> {
    pub fn new(inner: S, prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    fn full_key(&self, key: &[u8]) -> Vec<u8> {
        let mut k = Vec::with_capacity(self.prefix.len() + key.len());
        k.extend_from_slice(&self.prefix);
        k.extend_from_slice(key);
        k
    }
}

impl<S: KvStore> KvStore for PrefixStore<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get(&self.full_key(key))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.inner.put(&self.full_key(key), value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.inner.delete(&self.full_key(key))
    }

    fn iter_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let strip = self.prefix.len();
        Ok(self
            .inner
            .iter_prefix(&self.full_key(prefix))?
            .into_iter()
            .map(|(k, v)| (k[strip..].to_vec(), v))
            .collect())
    }

    fn write_batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let ops = ops
            .into_iter()
            .map(|op| match op {
                WriteOp::Put(k, v) => WriteOp::Put(self.full_key(&k), v),
                WriteOp::Delete(k) => WriteOp::Delete(self.full_key(&k)),
            })
            .collect();
        self.inner.write_batch(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_end_increments_last_byte() {
        assert_eq!(prefix_end(&[0x11]), Some(vec![0x12]));
        assert_eq!(prefix_end(&[0x11, 0xFF]), Some(vec![0x12]));
        assert_eq!(prefix_end(&[0xFF, 0xFF]), None);
        assert_eq!(prefix_end(&[]), None);
    }
}
