use crate::error::{ConfigError, ToyMcResult};
use flashmatch_common::{ActiveVolume, Point3, Trajectory};
use rand::Rng;
use serde::Deserialize;
use std::ops::RangeInclusive;
use strum::{Display, EnumString};

/// How track endpoints are placed in the active volume.
#[derive(Clone, Copy, Debug, PartialEq, EnumString, Display, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(try_from = "String")]
pub(crate) enum TrackAlgo {
    /// Both endpoints uniform in the volume.
    Random,
    /// Crossing tracks entering at the top of the volume and leaving at the bottom.
    TopBottom,
}

impl TryFrom<String> for TrackAlgo {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse().map_err(|_| ConfigError::UnknownTrackAlgo(value))
    }
}

fn uniform(rng: &mut impl Rng, range: RangeInclusive<f64>) -> f64 {
    rng.random::<f64>() * (range.end() - range.start()) + range.start()
}

pub(crate) struct TrajectoryGenerator {
    algo: TrackAlgo,
    volume: ActiveVolume,
}

impl TrajectoryGenerator {
    pub(crate) fn new(algo: TrackAlgo, volume: ActiveVolume) -> Self {
        Self { algo, volume }
    }

    fn random_point(&self, rng: &mut impl Rng) -> Point3 {
        let x = uniform(rng, self.volume.x_range());
        let y = uniform(rng, self.volume.y_range());
        let z = uniform(rng, self.volume.z_range());
        Point3::new(x, y, z)
    }

    fn point_at_height(&self, rng: &mut impl Rng, y: f64) -> Point3 {
        let x = uniform(rng, self.volume.x_range());
        let z = uniform(rng, self.volume.z_range());
        Point3::new(x, y, z)
    }

    /// Generates `num_tracks` straight, two point trajectories.
    pub(crate) fn generate(
        &self,
        rng: &mut impl Rng,
        num_tracks: usize,
    ) -> ToyMcResult<Vec<Trajectory>> {
        (0..num_tracks)
            .map(|_| {
                let endpoints = match self.algo {
                    TrackAlgo::Random => vec![self.random_point(rng), self.random_point(rng)],
                    TrackAlgo::TopBottom => vec![
                        self.point_at_height(rng, self.volume.max.y),
                        self.point_at_height(rng, self.volume.min.y),
                    ],
                };
                Ok(Trajectory::new(endpoints)?)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn volume() -> ActiveVolume {
        ActiveVolume {
            min: Point3::new(-200.0, -200.0, 0.0),
            max: Point3::new(200.0, 200.0, 500.0),
        }
    }

    #[test]
    fn test_random_tracks_inside_volume() {
        let generator = TrajectoryGenerator::new(TrackAlgo::Random, volume());
        let tracks = generator
            .generate(&mut StdRng::seed_from_u64(1), 50)
            .unwrap();
        assert_eq!(tracks.len(), 50);
        for track in tracks {
            assert_eq!(track.points().len(), 2);
            assert!(track.points().iter().all(|p| volume().contains(p)));
        }
    }

    #[test]
    fn test_top_bottom_tracks_cross_volume() {
        let generator = TrajectoryGenerator::new(TrackAlgo::TopBottom, volume());
        let tracks = generator
            .generate(&mut StdRng::seed_from_u64(2), 20)
            .unwrap();
        assert_eq!(tracks.len(), 20);
        for track in tracks {
            let [top, bottom] = track.points() else {
                unreachable!("two point trajectory expected");
            };
            assert_eq!(top.y, 200.0);
            assert_eq!(bottom.y, -200.0);
            assert!(volume().contains(top));
            assert!(volume().contains(bottom));
            assert!(track.length() >= 400.0);
        }
    }

    #[test]
    fn test_no_tracks() {
        let generator = TrajectoryGenerator::new(TrackAlgo::Random, volume());
        assert!(
            generator
                .generate(&mut StdRng::seed_from_u64(3), 0)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_parse_track_algo() {
        assert_eq!(
            TrackAlgo::try_from("top-bottom".to_owned()).unwrap(),
            TrackAlgo::TopBottom
        );
        assert!(matches!(
            TrackAlgo::try_from("diagonal".to_owned()),
            Err(ConfigError::UnknownTrackAlgo(_))
        ));
    }
}
