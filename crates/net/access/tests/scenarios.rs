use assert_matches::assert_matches;
use lnode_net_access::{
    AccessConfig, AccessError, AccessManager, AccessTier, BanList, ChanCount, MemoryChanCountStore,
    PeerIdentity,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

fn peer(n: u8) -> PeerIdentity {
    let mut bytes = [n; 33];
    bytes[0] = 0x03;
    PeerIdentity::from_bytes(bytes).unwrap()
}

fn manager_with(counts: &[(u8, ChanCount)], max: u64) -> AccessManager<BanList> {
    init_tracing();
    let store: MemoryChanCountStore = counts.iter().map(|(n, c)| (peer(*n), *c)).collect();
    let config = AccessConfig::default().with_max_restricted_slots(max);
    AccessManager::new(config, store, BanList::new()).unwrap()
}

fn connect(manager: &AccessManager<BanList>, p: &PeerIdentity) -> AccessTier {
    let tier = manager.assign_peer_perms(p).unwrap();
    manager.add_peer_access(p, tier);
    tier
}

#[test]
fn unknown_peer_fills_last_slot() {
    let manager = manager_with(&[], 1);
    let (x, y) = (peer(1), peer(2));

    manager.check_incoming_conn_ban_score(&x).unwrap();
    manager.add_peer_access(&x, AccessTier::Restricted);

    let err = manager.check_incoming_conn_ban_score(&y).unwrap_err();
    assert_matches!(
        err,
        AccessError::NoMoreRestrictedSlots {
            num_restricted: 1,
            max_restricted: 1
        }
    );
}

#[test]
fn pending_open_frees_restricted_slot() {
    let manager = manager_with(&[(1, ChanCount::default())], 2);
    let p = peer(1);
    assert_eq!(connect(&manager, &p), AccessTier::Restricted);
    assert_eq!(manager.num_restricted(), 1);

    manager.new_pending_open_chan(&p).unwrap();

    assert_eq!(manager.tier(&p), Some(AccessTier::Temporary));
    assert_eq!(manager.chan_count(&p), Some(ChanCount::pending(1)));
    assert_eq!(manager.num_restricted(), 0);
}

#[test]
fn last_pending_close_with_full_pool_keeps_temporary() {
    let manager = manager_with(&[(1, ChanCount::pending(1))], 1);
    let p = peer(1);
    assert_eq!(connect(&manager, &p), AccessTier::Temporary);
    assert_eq!(connect(&manager, &peer(2)), AccessTier::Restricted);
    assert_eq!(manager.num_restricted(), 1);

    let err = manager.new_pending_close_chan(&p).unwrap_err();
    assert!(err.is_capacity());
    assert_eq!(manager.tier(&p), Some(AccessTier::Temporary));
    assert_eq!(manager.num_restricted(), 1);

    // The caller disconnects the peer; its temporary slot never counted.
    manager.remove_peer_access(&p);
    assert_eq!(manager.num_restricted(), 1);
    assert!(manager.assign_peer_perms(&p).unwrap_err().is_capacity());
}

#[test]
fn open_chan_promotes_and_sticks() {
    let manager = manager_with(&[(1, ChanCount::pending(2))], 1);
    let p = peer(1);
    assert_eq!(connect(&manager, &p), AccessTier::Temporary);

    manager.new_open_chan(&p).unwrap();
    assert_eq!(manager.tier(&p), Some(AccessTier::Protected));
    assert!(manager.chan_count(&p).unwrap().has_open_or_closed_chan);

    let before = manager.chan_count(&p);
    manager.new_pending_close_chan(&p).unwrap();
    manager.new_pending_open_chan(&p).unwrap();
    manager.new_open_chan(&p).unwrap();
    assert_eq!(manager.tier(&p), Some(AccessTier::Protected));
    assert_eq!(manager.chan_count(&p), before);
}

#[test]
fn double_disconnect_is_harmless() {
    let manager = manager_with(&[], 3);
    let p = peer(1);
    connect(&manager, &p);
    assert_eq!(manager.num_restricted(), 1);

    manager.remove_peer_access(&p);
    manager.remove_peer_access(&p);
    assert_eq!(manager.num_restricted(), 0);
    assert!(!manager.is_connected(&p));
}

#[test]
fn capacity_boundary() {
    const MAX: u8 = 4;
    let manager = manager_with(&[], MAX as u64);

    for n in 1..=MAX {
        manager.check_incoming_conn_ban_score(&peer(n)).unwrap();
        assert_eq!(connect(&manager, &peer(n)), AccessTier::Restricted);
    }

    let next = peer(MAX + 1);
    assert!(manager.check_incoming_conn_ban_score(&next).unwrap_err().is_capacity());
    assert!(manager.assign_peer_perms(&next).unwrap_err().is_capacity());
    assert_eq!(manager.stats().free_restricted_slots(), 0);
}

#[test]
fn restricted_round_trip_restores_counter() {
    let manager = manager_with(&[], 3);
    connect(&manager, &peer(9));
    let p = peer(1);
    connect(&manager, &p);
    let before = manager.num_restricted();

    manager.new_pending_open_chan(&p).unwrap();
    assert_eq!(manager.num_restricted(), before - 1);

    manager.new_pending_close_chan(&p).unwrap();
    assert_eq!(manager.tier(&p), Some(AccessTier::Restricted));
    assert_eq!(manager.chan_count(&p), None);
    assert_eq!(manager.num_restricted(), before);
}

#[test]
fn settled_peer_always_protected() {
    let manager = manager_with(&[(1, ChanCount::settled()), (2, ChanCount::settled())], 0);

    assert_eq!(connect(&manager, &peer(1)), AccessTier::Protected);
    assert_eq!(manager.admit(&peer(2)).unwrap(), AccessTier::Protected);
    manager.check_incoming_conn_ban_score(&peer(1)).unwrap();
    assert!(manager.assign_peer_perms(&peer(3)).unwrap_err().is_capacity());
}

#[test]
fn invalid_transitions_are_reported() {
    let manager = manager_with(&[], 2);
    let p = peer(1);
    connect(&manager, &p);

    let err = manager.new_pending_close_chan(&p).unwrap_err();
    assert!(err.is_contract_violation());
    let err = manager.new_open_chan(&p).unwrap_err();
    assert_matches!(err, AccessError::InvalidTransition { tier: AccessTier::Restricted, .. });

    // Nothing moved.
    assert_eq!(manager.tier(&p), Some(AccessTier::Restricted));
    assert_eq!(manager.num_restricted(), 1);
}

#[test]
fn chan_counts_snapshot_tracks_funding() {
    let manager = manager_with(&[(1, ChanCount::settled())], 2);
    let p = peer(2);
    connect(&manager, &p);
    manager.new_pending_open_chan(&p).unwrap();

    let counts = manager.chan_counts();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts.get(&p), Some(&ChanCount::pending(1)));

    manager.new_pending_close_chan(&p).unwrap();
    assert_eq!(manager.chan_counts().len(), 1);
}

#[test]
fn temporary_close_without_pending_channels_is_rejected() {
    let manager = manager_with(&[(1, ChanCount::default())], 2);
    let p = peer(1);
    manager.add_peer_access(&p, AccessTier::Temporary);

    let err = manager.new_pending_close_chan(&p).unwrap_err();
    assert_matches!(err, AccessError::InvalidTransition { tier: AccessTier::Temporary, .. });
    assert!(err.is_contract_violation());

    assert_eq!(manager.tier(&p), Some(AccessTier::Temporary));
    assert_eq!(manager.chan_count(&p), Some(ChanCount::default()));
    assert_eq!(manager.num_restricted(), 0);
}
