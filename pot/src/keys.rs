//! Pot keys live under [`POT_PREFIX`] in the shared store; within it, a
//! report is keyed by `0x51` and its big-endian epoch.

pub const POT_PREFIX: &[u8] = b"pot/";
pub const VOLUME_REPORT_PREFIX: u8 = 0x51;

pub fn volume_report_key(epoch: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.push(VOLUME_REPORT_PREFIX);
    key.extend_from_slice(&epoch.to_be_bytes());
    key
}
