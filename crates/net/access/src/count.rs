//! Per-peer channel history.

use serde::{Deserialize, Serialize};

/// Channel relationship with a peer, as last known to this process.
///
/// Seeded from the channel database at startup and updated in memory as
/// funding events arrive. Persistence is the owner's job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChanCount {
    /// At least one channel with this peer has confirmed (open or since closed).
    pub has_open_or_closed_chan: bool,
    /// Number of channels still waiting for their funding transaction.
    pub pending_open_count: u64,
}

impl ChanCount {
    pub fn settled() -> Self {
        Self {
            has_open_or_closed_chan: true,
            pending_open_count: 0,
        }
    }

    pub fn pending(count: u64) -> Self {
        Self {
            has_open_or_closed_chan: false,
            pending_open_count: count,
        }
    }

    /// No channel relationship at all.
    pub fn is_empty(&self) -> bool {
        !self.has_open_or_closed_chan && self.pending_open_count == 0
    }
}
