//! Access tiers and the funding events that move peers between them.

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::count::ChanCount;

/// Trust level granted to a connected peer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccessTier {
    /// Has at least one open or closed channel. Never loses its slot.
    Protected,
    /// Has pending-open channels but nothing confirmed yet.
    Temporary,
    /// No channel relationship; occupies one of the bounded restricted slots.
    Restricted,
}

impl AccessTier {
    /// Tier implied by a peer's channel history, before any capacity check.
    pub fn from_chan_count(count: Option<&ChanCount>) -> Self {
        match count {
            Some(count) if count.has_open_or_closed_chan => Self::Protected,
            Some(count) if count.pending_open_count != 0 => Self::Temporary,
            _ => Self::Restricted,
        }
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Restricted)
    }
}

/// Access state of a currently connected peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotStatus {
    pub tier: AccessTier,
}

impl SlotStatus {
    pub fn new(tier: AccessTier) -> Self {
        Self { tier }
    }
}

/// Funding workflow hook that drives a tier transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FundingEvent {
    /// A pending-open channel was committed to the database.
    PendingOpen,
    /// A pending-open channel closed before its funding confirmed.
    PendingClose,
    /// A pending-open channel's funding transaction confirmed.
    Open,
}
