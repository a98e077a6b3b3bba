//! Access bookkeeping without locking. The manager wraps this in a single `RwLock`.
//!
//! Invariant: `num_restricted` equals the number of slot entries whose tier is
//! [`AccessTier::Restricted`]. Every method keeps it, including the error paths.

use std::collections::HashMap;

use tracing::debug;

use crate::count::ChanCount;
use crate::error::AccessError;
use crate::identity::PeerIdentity;
use crate::tier::{AccessTier, FundingEvent, SlotStatus};

/// Tier change produced by a funding hook. `from == to` means no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transition {
    pub(crate) from: AccessTier,
    pub(crate) to: AccessTier,
}

impl Transition {
    fn unchanged(tier: AccessTier) -> Self {
        Self { from: tier, to: tier }
    }

    pub(crate) fn is_change(&self) -> bool {
        self.from != self.to
    }
}

/// Point-in-time counters for the access manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessStats {
    /// Peers with a channel count entry, connected or not.
    pub known_peers: usize,
    pub protected: usize,
    pub temporary: usize,
    pub restricted: usize,
    pub max_restricted: u64,
}

impl AccessStats {
    pub fn connected(&self) -> usize {
        self.protected + self.temporary + self.restricted
    }

    pub fn free_restricted_slots(&self) -> u64 {
        self.max_restricted.saturating_sub(self.restricted as u64)
    }
}

#[derive(Debug)]
pub(crate) struct AccessState {
    /// Channel history per peer. Outlives disconnects.
    peer_counts: HashMap<PeerIdentity, ChanCount>,
    /// Access tier per connected peer.
    peer_scores: HashMap<PeerIdentity, SlotStatus>,
    num_restricted: u64,
    max_restricted: u64,
}

impl AccessState {
    pub(crate) fn new(peer_counts: HashMap<PeerIdentity, ChanCount>, max_restricted: u64) -> Self {
        Self {
            peer_counts,
            peer_scores: HashMap::new(),
            num_restricted: 0,
            max_restricted,
        }
    }

    pub(crate) fn num_restricted(&self) -> u64 {
        self.num_restricted
    }

    pub(crate) fn max_restricted(&self) -> u64 {
        self.max_restricted
    }

    pub(crate) fn chan_count(&self, peer: &PeerIdentity) -> Option<ChanCount> {
        self.peer_counts.get(peer).copied()
    }

    pub(crate) fn chan_counts(&self) -> HashMap<PeerIdentity, ChanCount> {
        self.peer_counts.clone()
    }

    pub(crate) fn tier(&self, peer: &PeerIdentity) -> Option<AccessTier> {
        self.peer_scores.get(peer).map(|status| status.tier)
    }

    pub(crate) fn is_known(&self, peer: &PeerIdentity) -> bool {
        self.peer_counts.contains_key(peer)
    }

    /// Tier the peer's channel history entitles it to, ignoring capacity.
    pub(crate) fn entitled_tier(&self, peer: &PeerIdentity) -> AccessTier {
        AccessTier::from_chan_count(self.peer_counts.get(peer))
    }

    fn ensure_restricted_slot(&self) -> Result<(), AccessError> {
        if self.num_restricted >= self.max_restricted {
            return Err(AccessError::NoMoreRestrictedSlots {
                num_restricted: self.num_restricted,
                max_restricted: self.max_restricted,
            });
        }
        Ok(())
    }

    /// Decide the tier for a new connection without reserving anything.
    pub(crate) fn assign(&self, peer: &PeerIdentity) -> Result<AccessTier, AccessError> {
        let tier = self.entitled_tier(peer);
        if tier.is_restricted() {
            self.ensure_restricted_slot()?;
        }
        Ok(tier)
    }

    /// Pre-handshake filter. Known peers always pass.
    pub(crate) fn check_incoming(&self, peer: &PeerIdentity) -> Result<(), AccessError> {
        if self.is_known(peer) {
            return Ok(());
        }
        self.ensure_restricted_slot()
    }

    /// Record a connected peer's tier. Returns the tier it replaced, if any.
    pub(crate) fn add(&mut self, peer: PeerIdentity, tier: AccessTier) -> Option<AccessTier> {
        let previous = self.peer_scores.insert(peer, SlotStatus::new(tier)).map(|s| s.tier);
        if previous.is_some_and(|t| t.is_restricted()) {
            self.release_restricted();
        }
        if tier.is_restricted() {
            self.num_restricted += 1;
        }
        previous
    }

    /// Drop a disconnected peer's slot. Returns its tier if it had one.
    pub(crate) fn remove(&mut self, peer: &PeerIdentity) -> Option<AccessTier> {
        let tier = self.peer_scores.remove(peer)?.tier;
        if tier.is_restricted() {
            self.release_restricted();
        }
        Some(tier)
    }

    /// Decide and reserve in one step.
    pub(crate) fn admit(&mut self, peer: PeerIdentity) -> Result<AccessTier, AccessError> {
        let tier = match self.tier(&peer) {
            // Reconnect of a peer we still track: its slot is reused.
            Some(existing) if existing.is_restricted() => self.entitled_tier(&peer),
            _ => self.assign(&peer)?,
        };
        self.add(peer, tier);
        Ok(tier)
    }

    fn release_restricted(&mut self) {
        debug_assert!(self.num_restricted > 0, "restricted counter underflow");
        self.num_restricted = self.num_restricted.saturating_sub(1);
    }

    fn connected_tier(&self, peer: &PeerIdentity) -> Result<AccessTier, AccessError> {
        self.tier(peer).ok_or(AccessError::NoPeerScore { peer: *peer })
    }

    fn pending_count_mut(&mut self, peer: &PeerIdentity) -> Result<&mut ChanCount, AccessError> {
        self.peer_counts
            .get_mut(peer)
            .ok_or(AccessError::NoPendingPeerInfo { peer: *peer })
    }

    /// A pending-open channel was committed.
    pub(crate) fn pending_open(&mut self, peer: &PeerIdentity) -> Result<Transition, AccessError> {
        match self.connected_tier(peer)? {
            AccessTier::Protected => Ok(Transition::unchanged(AccessTier::Protected)),
            AccessTier::Temporary => {
                let count = self.pending_count_mut(peer)?;
                count.pending_open_count += 1;
                debug!(%peer, pending_count = count.pending_open_count, "incremented pending count");
                Ok(Transition::unchanged(AccessTier::Temporary))
            }
            AccessTier::Restricted => {
                self.peer_counts.insert(*peer, ChanCount::pending(1));
                self.peer_scores
                    .insert(*peer, SlotStatus::new(AccessTier::Temporary));
                self.release_restricted();
                Ok(Transition {
                    from: AccessTier::Restricted,
                    to: AccessTier::Temporary,
                })
            }
        }
    }

    /// A pending-open channel closed before confirming.
    ///
    /// When the last pending channel goes away the peer falls back to a
    /// restricted slot. If none is free the channel count is still dropped,
    /// the peer keeps its temporary slot and the caller must disconnect it.
    pub(crate) fn pending_close(&mut self, peer: &PeerIdentity) -> Result<Transition, AccessError> {
        match self.connected_tier(peer)? {
            AccessTier::Protected => Ok(Transition::unchanged(AccessTier::Protected)),
            AccessTier::Temporary => {
                let count = self.pending_count_mut(peer)?;
                if count.pending_open_count == 0 {
                    return Err(AccessError::InvalidTransition {
                        peer: *peer,
                        tier: AccessTier::Temporary,
                        event: FundingEvent::PendingClose,
                    });
                }
                let remaining = count.pending_open_count - 1;
                debug!(%peer, pending_count = remaining, "decremented pending count");

                if remaining > 0 {
                    count.pending_open_count = remaining;
                    return Ok(Transition::unchanged(AccessTier::Temporary));
                }

                self.peer_counts.remove(peer);
                self.ensure_restricted_slot()?;

                self.peer_scores
                    .insert(*peer, SlotStatus::new(AccessTier::Restricted));
                self.num_restricted += 1;
                Ok(Transition {
                    from: AccessTier::Temporary,
                    to: AccessTier::Restricted,
                })
            }
            AccessTier::Restricted => Err(AccessError::InvalidTransition {
                peer: *peer,
                tier: AccessTier::Restricted,
                event: FundingEvent::PendingClose,
            }),
        }
    }

    /// A pending-open channel's funding transaction confirmed.
    pub(crate) fn open(&mut self, peer: &PeerIdentity) -> Result<Transition, AccessError> {
        match self.connected_tier(peer)? {
            AccessTier::Protected => Ok(Transition::unchanged(AccessTier::Protected)),
            AccessTier::Temporary => {
                self.pending_count_mut(peer)?.has_open_or_closed_chan = true;
                self.peer_scores
                    .insert(*peer, SlotStatus::new(AccessTier::Protected));
                Ok(Transition {
                    from: AccessTier::Temporary,
                    to: AccessTier::Protected,
                })
            }
            AccessTier::Restricted => Err(AccessError::InvalidTransition {
                peer: *peer,
                tier: AccessTier::Restricted,
                event: FundingEvent::Open,
            }),
        }
    }

    pub(crate) fn stats(&self) -> AccessStats {
        let mut stats = AccessStats {
            known_peers: self.peer_counts.len(),
            max_restricted: self.max_restricted,
            ..Default::default()
        };
        for status in self.peer_scores.values() {
            match status.tier {
                AccessTier::Protected => stats.protected += 1,
                AccessTier::Temporary => stats.temporary += 1,
                AccessTier::Restricted => stats.restricted += 1,
            }
        }
        stats
    }

    /// Recount restricted slots from scratch. Test-only consistency check.
    #[cfg(test)]
    pub(crate) fn check_invariant(&self) {
        let restricted = self
            .peer_scores
            .values()
            .filter(|s| s.tier.is_restricted())
            .count() as u64;
        assert_eq!(self.num_restricted, restricted, "restricted counter drifted");
    }
}
