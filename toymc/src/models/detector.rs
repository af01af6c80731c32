use flashmatch_common::{ActiveVolume, GeometryProvider, Point3};
use serde::Deserialize;

/// Detector description read from the `DetectorSpecs` section of the config file.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DetectorSpecs {
    active_volume: ActiveVolume,
    drift_velocity: f64,
    #[serde(rename = "PMTPositions")]
    pmt_positions: Vec<Point3>,
}

impl DetectorSpecs {
    pub(crate) fn pmt_positions(&self) -> &[Point3] {
        &self.pmt_positions
    }
}

impl GeometryProvider for DetectorSpecs {
    fn drift_velocity(&self) -> f64 {
        self.drift_velocity
    }

    fn active_volume(&self) -> &ActiveVolume {
        &self.active_volume
    }

    fn num_channels(&self) -> usize {
        self.pmt_positions.len()
    }
}
