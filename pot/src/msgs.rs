//! The volume report command.

use serde::{Deserialize, Serialize};
use strato_types::Address;

use crate::error::PotError;

/// Traffic one resource node served during the epoch. Volumes arrive signed
/// so that a negative report can be rejected rather than misread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleNodeVolume {
    #[serde(default)]
    pub node_address: Address,
    pub volume: i128,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeReport {
    #[serde(default)]
    pub nodes_volume: Vec<SingleNodeVolume>,
    #[serde(rename = "volume_reporter", default)]
    pub reporter: Address,
    #[serde(rename = "volume_report_epoch")]
    pub epoch: i64,
    #[serde(rename = "volume_report_hash", default)]
    pub reference_hash: String,
}

impl VolumeReport {
    pub const TYPE_NAME: &'static str = "pot/MsgVolumeReport";

    pub fn signer(&self) -> &Address {
        &self.reporter
    }

    pub fn validate_basic(&self) -> Result<(), PotError> {
        if self.reporter.is_empty() {
            return Err(PotError::EmptyReporter);
        }
        if self.nodes_volume.is_empty() {
            return Err(PotError::NoNodeVolumes);
        }
        if self.epoch <= 0 {
            return Err(PotError::InvalidEpoch(self.epoch));
        }
        if self.reference_hash.is_empty() {
            return Err(PotError::EmptyReferenceHash);
        }
        for item in &self.nodes_volume {
            if item.volume < 0 {
                return Err(PotError::NegativeVolume(item.node_address.clone()));
            }
            if item.node_address.is_empty() {
                return Err(PotError::EmptyNodeAddress);
            }
        }
        Ok(())
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, PotError> {
        serde_json::from_slice(bytes).map_err(|e| PotError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> VolumeReport {
        VolumeReport {
            nodes_volume: vec![SingleNodeVolume {
                node_address: Address::new([1; 20]),
                volume: 4096,
            }],
            reporter: Address::new([2; 20]),
            epoch: 7,
            reference_hash: "a1b2".into(),
        }
    }

    #[test]
    fn well_formed_report_passes() {
        assert!(report().validate_basic().is_ok());
    }

    #[test]
    fn each_field_is_checked() {
        let mut r = report();
        r.reporter = Address::empty();
        assert!(matches!(r.validate_basic(), Err(PotError::EmptyReporter)));

        let mut r = report();
        r.nodes_volume.clear();
        assert!(matches!(r.validate_basic(), Err(PotError::NoNodeVolumes)));

        let mut r = report();
        r.epoch = 0;
        assert!(matches!(r.validate_basic(), Err(PotError::InvalidEpoch(0))));

        let mut r = report();
        r.reference_hash.clear();
        assert!(matches!(
            r.validate_basic(),
            Err(PotError::EmptyReferenceHash)
        ));

        let mut r = report();
        r.nodes_volume[0].volume = -1;
        assert!(matches!(r.validate_basic(), Err(PotError::NegativeVolume(_))));

        let mut r = report();
        r.nodes_volume[0].node_address = Address::empty();
        assert!(matches!(r.validate_basic(), Err(PotError::EmptyNodeAddress)));
    }

    #[test]
    fn json_field_names() {
        let json = serde_json::to_string(&report()).unwrap();
        assert!(json.contains("\"volume_reporter\""));
        assert!(json.contains("\"volume_report_epoch\":7"));
        assert_eq!(VolumeReport::from_json(json.as_bytes()).unwrap(), report());
    }
}
