//! Proof-of-traffic volume reports.
//!
//! Indexing nodes report, once per epoch, how much traffic each resource
//! node served. This crate validates those reports and keeps one
//! [`ReportRecord`] per epoch. Reward distribution is not handled here.

pub mod error;
pub mod handler;
pub mod keeper;
pub mod keys;
pub mod msgs;

pub use error::PotError;
pub use handler::{handle_volume_report, PotEvent};
pub use keeper::{PotKeeper, ReportRecord, SpNodeChecker};
pub use msgs::{SingleNodeVolume, VolumeReport};
