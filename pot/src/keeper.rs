//! Volume report storage.

use serde::{Deserialize, Serialize};
use strato_bank::BalanceMover;
use strato_register::Keeper;
use strato_store::{decode, encode, KvStore, PrefixStore};
use strato_types::Address;

use crate::error::PotError;
use crate::keys;
use crate::msgs::SingleNodeVolume;

/// One accepted report per epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub reporter: Address,
    pub reference_hash: String,
    pub nodes_volume: Vec<SingleNodeVolume>,
}

/// Whether an address may submit volume reports.
pub trait SpNodeChecker {
    fn is_sp_node(&self, addr: &Address) -> Result<bool, PotError>;
}

impl<S: KvStore, B: BalanceMover> SpNodeChecker for Keeper<S, B> {
    fn is_sp_node(&self, addr: &Address) -> Result<bool, PotError> {
        Ok(Keeper::is_sp_node(self, addr)?)
    }
}

impl<T: SpNodeChecker + ?Sized> SpNodeChecker for &T {
    fn is_sp_node(&self, addr: &Address) -> Result<bool, PotError> {
        (**self).is_sp_node(addr)
    }
}

pub struct PotKeeper<S: KvStore, R: SpNodeChecker> {
    store: PrefixStore<S>,
    registry: R,
}

impl<S: KvStore, R: SpNodeChecker> PotKeeper<S, R> {
    /// `store` is the shared store; pot keys are namespaced inside it.
    pub fn new(store: S, registry: R) -> Self {
        Self {
            store: PrefixStore::new(store, keys::POT_PREFIX),
            registry,
        }
    }

    pub fn is_sp_node(&self, addr: &Address) -> Result<bool, PotError> {
        self.registry.is_sp_node(addr)
    }

    pub fn get_volume_report(&self, epoch: u64) -> Result<ReportRecord, PotError> {
        match self.store.get(&keys::volume_report_key(epoch))? {
            Some(bytes) => Ok(decode(&bytes)?),
            None => Err(PotError::ReportNotFound(epoch)),
        }
    }

    pub fn has_volume_report(&self, epoch: u64) -> Result<bool, PotError> {
        Ok(self.store.contains(&keys::volume_report_key(epoch))?)
    }

    /// Store `record` for `epoch`, replacing any earlier report.
    pub fn set_volume_report(&self, epoch: u64, record: &ReportRecord) -> Result<(), PotError> {
        self.store
            .put(&keys::volume_report_key(epoch), &encode(record)?)?;
        Ok(())
    }

    pub fn delete_volume_report(&self, epoch: u64) -> Result<(), PotError> {
        self.store.delete(&keys::volume_report_key(epoch))?;
        Ok(())
    }

    /// Every stored epoch, ascending.
    pub fn reported_epochs(&self) -> Result<Vec<u64>, PotError> {
        self.store
            .iter_prefix(&[keys::VOLUME_REPORT_PREFIX])?
            .into_iter()
            .map(|(key, _)| {
                key.get(1..9)
                    .and_then(|b| <[u8; 8]>::try_from(b).ok())
                    .map(u64::from_be_bytes)
                    .ok_or_else(|| PotError::Decode(format!("bad report key {key:?}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strato_nullables::NullStore;

    struct Allow(bool);

    impl SpNodeChecker for Allow {
        fn is_sp_node(&self, _addr: &Address) -> Result<bool, PotError> {
            Ok(self.0)
        }
    }

    fn record() -> ReportRecord {
        ReportRecord {
            reporter: Address::new([1; 20]),
            reference_hash: "ref".into(),
            nodes_volume: vec![SingleNodeVolume {
                node_address: Address::new([2; 20]),
                volume: 10,
            }],
        }
    }

    #[test]
    fn set_get_delete() {
        let store = NullStore::new();
        let keeper = PotKeeper::new(&store, Allow(true));

        assert!(matches!(
            keeper.get_volume_report(3),
            Err(PotError::ReportNotFound(3))
        ));
        keeper.set_volume_report(3, &record()).unwrap();
        assert_eq!(keeper.get_volume_report(3).unwrap(), record());
        assert!(keeper.has_volume_report(3).unwrap());
        assert_eq!(keeper.reported_epochs().unwrap(), vec![3]);

        keeper.delete_volume_report(3).unwrap();
        assert!(!keeper.has_volume_report(3).unwrap());
    }

    #[test]
    fn reports_are_namespaced() {
        let store = NullStore::new();
        let keeper = PotKeeper::new(&store, Allow(true));
        keeper.set_volume_report(1, &record()).unwrap();
        let keys: Vec<Vec<u8>> = store.snapshot().into_keys().collect();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with(b"pot/"));
    }
}
