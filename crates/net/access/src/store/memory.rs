//! In-memory channel count snapshot (does not persist across restarts).

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::count::ChanCount;
use crate::error::StoreError;
use crate::identity::PeerIdentity;
use crate::traits::ChanCountLoader;

/// Channel counts held in memory, handed out as a snapshot on load.
#[derive(Debug, Default)]
pub struct MemoryChanCountStore {
    counts: RwLock<HashMap<PeerIdentity, ChanCount>>,
}

impl MemoryChanCountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, peer: PeerIdentity, count: ChanCount) {
        self.counts.write().insert(peer, count);
    }

    pub fn remove(&self, peer: &PeerIdentity) -> Option<ChanCount> {
        self.counts.write().remove(peer)
    }

    pub fn len(&self) -> usize {
        self.counts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(PeerIdentity, ChanCount)> for MemoryChanCountStore {
    fn from_iter<I: IntoIterator<Item = (PeerIdentity, ChanCount)>>(iter: I) -> Self {
        Self {
            counts: RwLock::new(iter.into_iter().collect()),
        }
    }
}

impl ChanCountLoader for MemoryChanCountStore {
    fn load_chan_counts(&self) -> Result<HashMap<PeerIdentity, ChanCount>, StoreError> {
        Ok(self.counts.read().clone())
    }
}
