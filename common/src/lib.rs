mod cluster;
mod flash;
mod geometry;
mod matching;
pub mod tracer;

pub use cluster::{ChargeCluster, QPoint};
pub use flash::Flash;
pub use geometry::{ActiveVolume, Point3, Trajectory, TrajectoryError};
pub use matching::{MatchResult, MatchingEngine};

/// Index given to clusters and flashes once they have been assembled into a sample.
pub type SampleId = usize;
pub type Charge = f64;
pub type PhotoElectrons = f64;

/// Supplies the detector description: active volume and drift velocity.
pub trait GeometryProvider {
    /// Drift velocity, converting time (us) to a shift along x (cm).
    fn drift_velocity(&self) -> f64;

    fn active_volume(&self) -> &ActiveVolume;

    /// Number of photon sensors, i.e. the length of every per-channel vector.
    fn num_channels(&self) -> usize;
}

/// Converts a trajectory into an ordered sequence of charge depositions.
pub trait ChargeModel {
    fn make_cluster(&self, trajectory: &Trajectory) -> ChargeCluster;
}

/// Converts a charge cluster into the expected light on each photon sensor.
pub trait FlashModel {
    fn estimate(&self, cluster: &ChargeCluster) -> Vec<PhotoElectrons>;
}
