use crate::error::ConfigError;
use flashmatch_common::{ChargeCluster, ChargeModel, QPoint, Trajectory};
use serde::Deserialize;

/// Minimum ionising charge along a trajectory, deposited in equal steps.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LightPath {
    // Maximum step length (cm)
    segment_size: f64,
    // Photons per MeV
    light_yield: f64,
    // MeV per cm
    #[serde(rename = "MIPdEdx")]
    mip_dedx: f64,
}

impl LightPath {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.segment_size > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NonPositive("SegmentSize", self.segment_size))
        }
    }
}

impl ChargeModel for LightPath {
    fn make_cluster(&self, trajectory: &Trajectory) -> ChargeCluster {
        let mut cluster = ChargeCluster::default();
        for (start, end) in trajectory.segments() {
            let length = start.dist(end);
            if length <= 0.0 {
                continue;
            }
            let num_steps = (length / self.segment_size).ceil().max(1.0) as usize;
            let step = length / num_steps as f64;
            let q = step * self.mip_dedx * self.light_yield;
            for i in 0..num_steps {
                let f = (i as f64 + 0.5) / num_steps as f64;
                cluster.push(QPoint::new(
                    start.x + f * (end.x - start.x),
                    start.y + f * (end.y - start.y),
                    start.z + f * (end.z - start.z),
                    q,
                ));
            }
        }
        cluster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use flashmatch_common::Point3;

    fn light_path() -> LightPath {
        LightPath {
            segment_size: 0.5,
            light_yield: 100.0,
            mip_dedx: 2.0,
        }
    }

    #[test]
    fn test_charge_is_proportional_to_length() {
        let trajectory = Trajectory::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 10.0),
            Point3::new(0.0, 0.0, 10.0),
            Point3::new(0.0, 3.0, 10.0),
        ])
        .unwrap();
        let cluster = light_path().make_cluster(&trajectory);
        assert_eq!(cluster.len(), 26);
        assert_approx_eq!(cluster.sum(), 13.0 * 2.0 * 100.0);
        assert_approx_eq!(cluster.front().unwrap().z, 0.25);
        assert_approx_eq!(cluster.back().unwrap().y, 2.75);
    }

    #[test]
    fn test_uneven_steps() {
        let trajectory =
            Trajectory::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.2, 0.0, 0.0)])
                .unwrap();
        let cluster = light_path().make_cluster(&trajectory);
        assert_eq!(cluster.len(), 3);
        assert_approx_eq!(cluster.points()[0].x, 0.2);
        assert_approx_eq!(cluster.points()[1].x, 0.6);
        assert_approx_eq!(cluster.points()[0].q, 0.4 * 200.0);
    }

    #[test]
    fn test_validate() {
        assert!(light_path().validate().is_ok());
        let invalid = LightPath {
            segment_size: 0.0,
            ..light_path()
        };
        assert!(matches!(
            invalid.validate(),
            Err(ConfigError::NonPositive("SegmentSize", _))
        ));
    }
}
