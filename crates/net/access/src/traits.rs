//! Collaborator seams: the startup snapshot loader and the ban-score oracle.

use std::collections::HashMap;

use auto_impl::auto_impl;

use crate::count::ChanCount;
use crate::error::{BanCheckError, StoreError};
use crate::identity::PeerIdentity;

/// One-shot source of every known peer's channel history.
///
/// Called exactly once while the manager is built, outside any lock.
#[auto_impl(&, Box, Arc)]
pub trait ChanCountLoader: Send + Sync {
    fn load_chan_counts(&self) -> Result<HashMap<PeerIdentity, ChanCount>, StoreError>;
}

/// Decides whether a peer should be refused for misbehaviour.
///
/// May be slow; the manager never holds its lock across this call.
#[auto_impl(&, Box, Arc)]
pub trait BanChecker: Send + Sync {
    fn should_disconnect(&self, peer: &PeerIdentity) -> Result<bool, BanCheckError>;
}
