//! LMDB environment setup.

use std::path::{Path, PathBuf};

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::kv::LmdbKvStore;
use crate::schema;
use crate::LmdbError;

const KV_DB: &str = "kv";
const META_DB: &str = "meta";
const MAX_DBS: u32 = 4;

/// Wraps the LMDB environment and its database handles.
pub struct LmdbEnvironment {
    env: Env,
    kv_db: Database<Bytes, Bytes>,
    path: PathBuf,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at `path`, creating the directory
    /// if needed, and check the stored schema version.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process per directory;
        // heed's requirement is that the same path is not opened twice.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let kv_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(KV_DB))?;
        let meta_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(META_DB))?;
        schema::check_and_upgrade(&mut wtxn, meta_db)?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(Self {
            env,
            kv_db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A handle onto the registry key-value database.
    pub fn kv_store(&self) -> LmdbKvStore {
        LmdbKvStore::new(self.env.clone(), self.kv_db)
    }

    /// Number of entries in the key-value database.
    pub fn entry_count(&self) -> Result<u64, LmdbError> {
        let rtxn = self.env.read_txn()?;
        Ok(self.kv_db.len(&rtxn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_directory_and_reopens() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("data");
        {
            let env = LmdbEnvironment::open(&path, 10 * 1024 * 1024).expect("open");
            assert_eq!(env.entry_count().unwrap(), 0);
        }
        assert!(path.exists());
        let env = LmdbEnvironment::open(&path, 10 * 1024 * 1024).expect("reopen");
        assert_eq!(env.path(), path.as_path());
    }
}
