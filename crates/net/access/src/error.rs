//! Error types for admission and tier transitions.

use crate::identity::PeerIdentity;
use crate::tier::{AccessTier, FundingEvent};

/// Boxed error from a collaborator backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure loading the initial channel counts.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("backend error: {0}")]
    Backend(#[source] BoxError),
}

/// Failure querying the ban-score oracle.
#[derive(Debug, thiserror::Error)]
pub enum BanCheckError {
    #[error("ban score unavailable: {0}")]
    Unavailable(String),
    #[error("backend error: {0}")]
    Backend(#[source] BoxError),
}

/// Errors returned by the access manager.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Peer is banned; the connection must be refused.
    #[error("gossiper has banned remote's key {peer}")]
    Banned { peer: PeerIdentity },
    /// Restricted pool is full.
    #[error("no more restricted slots ({num_restricted}/{max_restricted} in use)")]
    NoMoreRestrictedSlots {
        num_restricted: u64,
        max_restricted: u64,
    },
    /// A funding hook fired for a peer that is not connected.
    #[error("peer score not found for {peer}")]
    NoPeerScore { peer: PeerIdentity },
    /// A temporary peer has no channel count entry.
    #[error("no pending peer info for {peer}")]
    NoPendingPeerInfo { peer: PeerIdentity },
    /// A funding hook fired against a tier that cannot receive it.
    #[error("invalid peer access transition: {event} for {tier} peer {peer}")]
    InvalidTransition {
        peer: PeerIdentity,
        tier: AccessTier,
        event: FundingEvent,
    },
    #[error("ban check failed: {0}")]
    BanCheck(#[from] BanCheckError),
    #[error("loading access permissions failed: {0}")]
    Load(#[from] StoreError),
}

impl AccessError {
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::NoMoreRestrictedSlots { .. })
    }

    pub fn is_ban(&self) -> bool {
        matches!(self, Self::Banned { .. })
    }

    /// The caller invoked the manager out of order; worth a bug report.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::NoPeerScore { .. } | Self::NoPendingPeerInfo { .. } | Self::InvalidTransition { .. }
        )
    }
}
