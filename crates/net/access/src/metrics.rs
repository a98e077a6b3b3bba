//! Access manager metrics.

use metrics::Gauge;

use crate::tier::AccessTier;

/// Reason a connection was refused, used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum RejectReason {
    Banned,
    Capacity,
}

#[derive(Clone, Debug)]
pub(crate) struct AccessMetrics {
    /// Restricted slots currently in use
    restricted_slots: Gauge,
    /// Restricted slot capacity
    max_restricted_slots: Gauge,
}

impl AccessMetrics {
    pub(crate) fn new(max_restricted_slots: u64) -> Self {
        let metrics = Self {
            restricted_slots: metrics::gauge!("access.restricted_slots"),
            max_restricted_slots: metrics::gauge!("access.max_restricted_slots"),
        };
        metrics.max_restricted_slots.set(max_restricted_slots as f64);
        metrics.restricted_slots.set(0.0);
        metrics
    }

    pub(crate) fn set_restricted(&self, num_restricted: u64) {
        self.restricted_slots.set(num_restricted as f64);
    }

    pub(crate) fn rejected(&self, reason: RejectReason) {
        let reason: &'static str = reason.into();
        metrics::counter!("access.rejections_total", "reason" => reason).increment(1);
    }

    pub(crate) fn transitioned(&self, from: AccessTier, to: AccessTier) {
        let from: &'static str = from.into();
        let to: &'static str = to.into();
        metrics::counter!("access.transitions_total", "from" => from, "to" => to).increment(1);
    }
}
