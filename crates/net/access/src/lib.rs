//! Connection admission control for a channel-aware peer-to-peer node.
//!
//! Every remote peer gets an [`AccessTier`]:
//! - [`AccessTier::Protected`] peers have an open or closed channel with us,
//! - [`AccessTier::Temporary`] peers have pending-open channels only,
//! - [`AccessTier::Restricted`] peers have nothing and compete for a bounded
//!   pool of restricted slots.
//!
//! The [`AccessManager`] is seeded once from a [`ChanCountLoader`] snapshot,
//! consults a [`BanChecker`] per connection attempt and moves peers between
//! tiers as the funding workflow reports channel events.
//!
//! ```
//! use lnode_net_access::{
//!     AccessConfig, AccessManager, AccessTier, BanList, MemoryChanCountStore, PeerIdentity,
//! };
//!
//! let store = MemoryChanCountStore::new();
//! let config = AccessConfig::default().with_max_restricted_slots(1);
//! let manager = AccessManager::new(config, &store, BanList::new()).unwrap();
//!
//! let peer: PeerIdentity = "02".repeat(33).parse().unwrap();
//! manager.check_incoming_conn_ban_score(&peer).unwrap();
//!
//! let tier = manager.assign_peer_perms(&peer).unwrap();
//! manager.add_peer_access(&peer, tier);
//! assert_eq!(manager.tier(&peer), Some(AccessTier::Restricted));
//!
//! manager.new_pending_open_chan(&peer).unwrap();
//! assert_eq!(manager.tier(&peer), Some(AccessTier::Temporary));
//! ```

pub mod config;
pub mod count;
pub mod error;
pub mod identity;
pub mod manager;
mod metrics;
mod state;
pub mod store;
pub mod tier;
pub mod traits;

pub use config::{AccessConfig, DEFAULT_MAX_RESTRICTED_SLOTS};
pub use count::ChanCount;
pub use error::{AccessError, BanCheckError, BoxError, StoreError};
pub use identity::{PEER_IDENTITY_LEN, PeerIdentity, PeerIdentityError};
pub use manager::AccessManager;
pub use state::AccessStats;
pub use store::{BanList, MemoryChanCountStore};
pub use tier::{AccessTier, FundingEvent, SlotStatus};
pub use traits::{BanChecker, ChanCountLoader};
