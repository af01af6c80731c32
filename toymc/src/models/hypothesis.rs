use flashmatch_common::{ChargeCluster, FlashModel, PhotoElectrons, Point3};
use serde::Deserialize;
use std::f64::consts::PI;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct InverseSquareConfig {
    #[serde(rename = "GlobalQE")]
    global_qe: f64,
    // Photocathode area (cm^2)
    sensor_area: f64,
}

/// Expected light from the solid angle each sensor subtends at every charge point.
#[derive(Clone, Debug)]
pub(crate) struct InverseSquareHypothesis {
    global_qe: f64,
    sensor_area: f64,
    sensors: Vec<Point3>,
}

impl InverseSquareHypothesis {
    pub(crate) fn new(config: &InverseSquareConfig, sensors: &[Point3]) -> Self {
        Self {
            global_qe: config.global_qe,
            sensor_area: config.sensor_area,
            sensors: sensors.to_vec(),
        }
    }

    fn acceptance(&self, sensor: &Point3, point: &Point3) -> f64 {
        let sq_dist = sensor.sq_dist(point);
        if sq_dist > 0.0 {
            (self.sensor_area / (4.0 * PI * sq_dist)).min(1.0)
        } else {
            1.0
        }
    }
}

impl FlashModel for InverseSquareHypothesis {
    fn estimate(&self, cluster: &ChargeCluster) -> Vec<PhotoElectrons> {
        self.sensors
            .iter()
            .map(|sensor| {
                cluster
                    .points()
                    .iter()
                    .map(|p| p.q * self.global_qe * self.acceptance(sensor, &p.position()))
                    .fold(0.0, |sum, pe| sum + pe)
            })
            .collect()
    }
}
