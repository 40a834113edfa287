//! Volume report handling.

use strato_store::KvStore;
use strato_types::Address;

use crate::error::PotError;
use crate::keeper::{PotKeeper, ReportRecord, SpNodeChecker};
use crate::msgs::VolumeReport;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PotEvent {
    VolumeReported {
        reporter: Address,
        epoch: u64,
        reference_hash: String,
    },
}

impl PotEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::VolumeReported { .. } => "volume_report",
        }
    }

    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::VolumeReported {
                reporter,
                epoch,
                reference_hash,
            } => vec![
                ("sender", reporter.to_string()),
                ("report_epoch", epoch.to_string()),
                ("report_reference", reference_hash.clone()),
            ],
        }
    }
}

/// Validate `report`, check that its reporter is a registered indexing node
/// and record it for its epoch.
pub fn handle_volume_report<S: KvStore, R: SpNodeChecker>(
    keeper: &PotKeeper<S, R>,
    report: &VolumeReport,
) -> Result<PotEvent, PotError> {
    report.validate_basic()?;
    if !keeper.is_sp_node(&report.reporter)? {
        tracing::warn!(reporter = %report.reporter, epoch = report.epoch, "volume report from unknown node");
        return Err(PotError::NotSpNode(report.reporter.clone()));
    }

    let epoch = u64::try_from(report.epoch).map_err(|_| PotError::InvalidEpoch(report.epoch))?;
    let record = ReportRecord {
        reporter: report.reporter.clone(),
        reference_hash: report.reference_hash.clone(),
        nodes_volume: report.nodes_volume.clone(),
    };
    keeper.set_volume_report(epoch, &record)?;

    tracing::info!(
        reporter = %report.reporter,
        epoch,
        nodes = report.nodes_volume.len(),
        "volume report recorded"
    );
    Ok(PotEvent::VolumeReported {
        reporter: record.reporter,
        epoch,
        reference_hash: record.reference_hash,
    })
}
