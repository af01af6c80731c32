use crate::config::Interval;
use flashmatch_common::ChargeCluster;

/// Emulates the finite TPC readout window by dropping charge recorded outside it.
pub(crate) struct Truncator {
    window: Option<Interval>,
}

impl Truncator {
    /// The x window is the TPC period converted to distance with the drift velocity.
    pub(crate) fn new(enabled: bool, period_tpc: &Interval, drift_velocity: f64) -> Self {
        Self {
            window: enabled.then(|| period_tpc.scaled(drift_velocity)),
        }
    }

    pub(crate) fn apply(&self, cluster: &mut ChargeCluster) {
        if let Some(window) = &self.window {
            cluster.drop_outside(window.min, window.max);
        }
    }
}
