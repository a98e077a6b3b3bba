//! Access manager: admission decisions and tier bookkeeping behind one lock.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, error, info, trace, warn};

use crate::config::AccessConfig;
use crate::count::ChanCount;
use crate::error::AccessError;
use crate::identity::PeerIdentity;
use crate::metrics::{AccessMetrics, RejectReason};
use crate::state::{AccessState, AccessStats, Transition};
use crate::tier::{AccessTier, FundingEvent};
use crate::traits::{BanChecker, ChanCountLoader};

/// Decides how much access each remote peer gets and caps the number of
/// peers without a channel.
///
/// Both maps and the restricted counter sit behind a single `RwLock`, so the
/// counter can never disagree with the slot map. Queries take the read lock,
/// every mutation takes the write lock. The ban checker is always called
/// before the lock is taken.
///
/// If the embedding node also holds a node-wide lock, acquire that one first.
pub struct AccessManager<B: BanChecker> {
    config: AccessConfig,
    ban_checker: B,
    state: RwLock<AccessState>,
    metrics: AccessMetrics,
}

impl<B: BanChecker> AccessManager<B> {
    /// Build the manager from the channel-count snapshot.
    ///
    /// A loader failure is returned as is and nothing is built. No peer is
    /// considered connected afterwards.
    pub fn new<L>(config: AccessConfig, loader: L, ban_checker: B) -> Result<Self, AccessError>
    where
        L: ChanCountLoader,
    {
        let counts = loader.load_chan_counts()?;
        let known_peers = counts.len();

        let manager = Self {
            metrics: AccessMetrics::new(config.max_restricted_slots),
            state: RwLock::new(AccessState::new(counts, config.max_restricted_slots)),
            ban_checker,
            config,
        };

        info!(
            known_peers,
            max_restricted = manager.config.max_restricted_slots,
            "access manager initialized"
        );
        Ok(manager)
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Compute the tier for a peer that wants to connect. Reserves nothing.
    ///
    /// On error the returned connection must be refused. The tier is only
    /// meaningful on success; pass it unchanged to [`Self::add_peer_access`]
    /// once the connection is established.
    pub fn assign_peer_perms(&self, peer: &PeerIdentity) -> Result<AccessTier, AccessError> {
        debug!(%peer, "assigning permissions");

        self.check_ban(peer)?;

        let state = self.state.read();
        let tier = state.assign(peer).inspect_err(|err| {
            self.reject_for_capacity(peer, err, &state);
        })?;

        debug!(%peer, %tier, "assigned access tier");
        Ok(tier)
    }

    /// Decide and reserve a slot in one step.
    ///
    /// Same rules as [`Self::assign_peer_perms`] followed by
    /// [`Self::add_peer_access`], but the capacity check and the reservation
    /// happen under a single write lock so concurrent admissions cannot
    /// overshoot the restricted pool.
    pub fn admit(&self, peer: &PeerIdentity) -> Result<AccessTier, AccessError> {
        debug!(%peer, "admitting peer");

        self.check_ban(peer)?;

        let mut state = self.state.write();
        let tier = state.admit(*peer).inspect_err(|err| {
            self.reject_for_capacity(peer, err, &state);
        })?;
        self.metrics.set_restricted(state.num_restricted());

        debug!(
            %peer,
            %tier,
            num_restricted = state.num_restricted(),
            "peer admitted"
        );
        Ok(tier)
    }

    /// Cheap filter for inbound connections before any handshake work.
    ///
    /// Peers with a channel count entry always pass. Unknown peers pass only
    /// while a restricted slot is free; otherwise the rejection comes back as
    /// [`AccessError::NoMoreRestrictedSlots`].
    pub fn check_incoming_conn_ban_score(&self, peer: &PeerIdentity) -> Result<(), AccessError> {
        trace!(%peer, "checking incoming connection");

        let state = self.state.read();
        if state.is_known(peer) {
            debug!(%peer, "known peer, accepting");
            return Ok(());
        }

        state.check_incoming(peer).inspect_err(|err| {
            self.reject_for_capacity(peer, err, &state);
        })?;

        debug!(
            %peer,
            num_restricted = state.num_restricted(),
            max_restricted = state.max_restricted(),
            "restricted slot available, accepting"
        );
        Ok(())
    }

    /// Track a fully connected peer with the tier it was assigned.
    ///
    /// Call once per established connection. A peer that already holds a slot
    /// has it replaced.
    pub fn add_peer_access(&self, peer: &PeerIdentity, tier: AccessTier) {
        let mut state = self.state.write();
        let previous = state.add(*peer, tier);
        let num_restricted = state.num_restricted();
        self.metrics.set_restricted(num_restricted);

        if let Some(previous) = previous {
            debug!(%peer, %previous, %tier, "replaced existing peer access");
        }
        if num_restricted > state.max_restricted() {
            warn!(
                %peer,
                num_restricted,
                max_restricted = state.max_restricted(),
                "restricted slots over capacity"
            );
        }
        debug!(%peer, %tier, num_restricted, "added peer access");
    }

    /// Release a disconnected peer's slot. Unknown peers are ignored.
    pub fn remove_peer_access(&self, peer: &PeerIdentity) {
        let mut state = self.state.write();
        let Some(tier) = state.remove(peer) else {
            info!(%peer, "peer access not found during removal");
            return;
        };
        self.metrics.set_restricted(state.num_restricted());

        debug!(
            %peer,
            %tier,
            num_restricted = state.num_restricted(),
            "removed peer access"
        );
    }

    /// A pending-open channel with the peer was committed to the database.
    ///
    /// Moves a restricted peer to temporary, freeing its restricted slot.
    pub fn new_pending_open_chan(&self, peer: &PeerIdentity) -> Result<(), AccessError> {
        self.apply(peer, FundingEvent::PendingOpen, AccessState::pending_open)
    }

    /// A pending-open channel closed before its funding confirmed.
    ///
    /// Closing the last pending channel demotes the peer to restricted. If the
    /// restricted pool is full, [`AccessError::NoMoreRestrictedSlots`] is
    /// returned and the caller must disconnect the peer.
    pub fn new_pending_close_chan(&self, peer: &PeerIdentity) -> Result<(), AccessError> {
        self.apply(peer, FundingEvent::PendingClose, AccessState::pending_close)
    }

    /// A pending-open channel's funding transaction confirmed.
    ///
    /// Promotes a temporary peer to protected.
    pub fn new_open_chan(&self, peer: &PeerIdentity) -> Result<(), AccessError> {
        self.apply(peer, FundingEvent::Open, AccessState::open)
    }

    fn apply<F>(&self, peer: &PeerIdentity, event: FundingEvent, f: F) -> Result<(), AccessError>
    where
        F: FnOnce(&mut AccessState, &PeerIdentity) -> Result<Transition, AccessError>,
    {
        let mut state = self.state.write();
        debug!(%peer, %event, "processing funding event");

        let transition = match f(&mut *state, peer) {
            Ok(transition) => transition,
            Err(err) => {
                if err.is_capacity() {
                    self.metrics.rejected(RejectReason::Capacity);
                    warn!(
                        %peer,
                        %event,
                        num_restricted = state.num_restricted(),
                        max_restricted = state.max_restricted(),
                        "no restricted slot for demoted peer, disconnect required"
                    );
                } else {
                    error!(%peer, %event, %err, "funding event rejected");
                }
                return Err(err);
            }
        };

        if transition.is_change() {
            self.metrics.transitioned(transition.from, transition.to);
            self.metrics.set_restricted(state.num_restricted());
            info!(
                %peer,
                %event,
                from = %transition.from,
                to = %transition.to,
                num_restricted = state.num_restricted(),
                "peer access tier changed"
            );
        } else {
            debug!(%peer, %event, tier = %transition.to, "peer access tier unchanged");
        }
        Ok(())
    }

    /// Current tier of a connected peer.
    pub fn tier(&self, peer: &PeerIdentity) -> Option<AccessTier> {
        self.state.read().tier(peer)
    }

    pub fn is_connected(&self, peer: &PeerIdentity) -> bool {
        self.tier(peer).is_some()
    }

    pub fn chan_count(&self, peer: &PeerIdentity) -> Option<ChanCount> {
        self.state.read().chan_count(peer)
    }

    /// Copy of every known channel count, for the owner to persist.
    pub fn chan_counts(&self) -> HashMap<PeerIdentity, ChanCount> {
        self.state.read().chan_counts()
    }

    pub fn num_restricted(&self) -> u64 {
        self.state.read().num_restricted()
    }

    pub fn stats(&self) -> AccessStats {
        self.state.read().stats()
    }

    fn check_ban(&self, peer: &PeerIdentity) -> Result<(), AccessError> {
        let banned = self.ban_checker.should_disconnect(peer).inspect_err(|err| {
            error!(%peer, %err, "error checking disconnect status");
        })?;

        if banned {
            self.metrics.rejected(RejectReason::Banned);
            warn!(%peer, "peer is banned, refusing access");
            return Err(AccessError::Banned { peer: *peer });
        }
        Ok(())
    }

    fn reject_for_capacity(&self, peer: &PeerIdentity, err: &AccessError, state: &AccessState) {
        if err.is_capacity() {
            self.metrics.rejected(RejectReason::Capacity);
            warn!(
                %peer,
                num_restricted = state.num_restricted(),
                max_restricted = state.max_restricted(),
                "no more restricted slots available, denying peer"
            );
        }
    }
}

impl<B: BanChecker> std::fmt::Debug for AccessManager<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessManager")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
