//! Explicit ban list usable as a [`BanChecker`].

use std::collections::HashSet;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::BanCheckError;
use crate::identity::PeerIdentity;
use crate::traits::BanChecker;

/// Ban checker backed by a set of banned identities.
#[derive(Debug, Default)]
pub struct BanList {
    banned: RwLock<HashSet<PeerIdentity>>,
}

impl BanList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the peer was already banned.
    pub fn ban(&self, peer: PeerIdentity) -> bool {
        let inserted = self.banned.write().insert(peer);
        if inserted {
            debug!(%peer, "peer added to ban list");
        }
        inserted
    }

    pub fn unban(&self, peer: &PeerIdentity) -> bool {
        self.banned.write().remove(peer)
    }

    pub fn is_banned(&self, peer: &PeerIdentity) -> bool {
        self.banned.read().contains(peer)
    }

    pub fn len(&self) -> usize {
        self.banned.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BanChecker for BanList {
    fn should_disconnect(&self, peer: &PeerIdentity) -> Result<bool, BanCheckError> {
        Ok(self.is_banned(peer))
    }
}
