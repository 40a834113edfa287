//! Per-block execution context supplied by the host.

use strato_types::Timestamp;

/// Block header facts a command executes against. The registry never reads
/// the wall clock; every time-dependent decision uses `block_time`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Context {
    pub block_height: u64,
    pub block_time: Timestamp,
}

impl Context {
    pub fn new(block_height: u64, block_time: Timestamp) -> Self {
        Self {
            block_height,
            block_time,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.block_time
    }
}
