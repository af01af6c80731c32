use crate::{config::Interval, error::ConfigError};
use rand::Rng;
use serde::Deserialize;
use strum::{Display, EnumString};

/// How flash times are spread over the PMT period.
#[derive(Clone, Copy, Debug, PartialEq, EnumString, Display, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(try_from = "String")]
pub(crate) enum TimeAlgo {
    /// Uniform over the period.
    Random,
    /// Midpoints of `n` equal bins spanning the period.
    Periodic,
    /// Every flash at time zero, so no shift is applied.
    Same,
}

impl TryFrom<String> for TimeAlgo {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse().map_err(|_| ConfigError::UnknownTimeAlgo(value))
    }
}

/// A flash time and the x shift it induces on the charge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct TimeShift {
    pub(crate) time: f64,
    pub(crate) dx: f64,
}

pub(crate) struct TimingModel {
    algo: TimeAlgo,
    period: Interval,
    drift_velocity: f64,
}

impl TimingModel {
    pub(crate) fn new(algo: TimeAlgo, period: Interval, drift_velocity: f64) -> Self {
        Self {
            algo,
            period,
            drift_velocity,
        }
    }

    /// Generates `n` flash times and the corresponding shifts to apply to the charge.
    pub(crate) fn generate(&self, rng: &mut impl Rng, n: usize) -> Vec<TimeShift> {
        let duration = self.period.duration();
        (0..n)
            .map(|idx| {
                let time = match self.algo {
                    TimeAlgo::Random => rng.random::<f64>() * duration + self.period.min,
                    TimeAlgo::Periodic => {
                        (idx as f64 + 0.5) * duration / n as f64 + self.period.min
                    }
                    TimeAlgo::Same => 0.0,
                };
                TimeShift {
                    time,
                    dx: time * self.drift_velocity,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_periodic() {
        let model = TimingModel::new(TimeAlgo::Periodic, Interval::new(0.0, 100.0), 0.5);
        let shifts = model.generate(&mut StdRng::seed_from_u64(0), 4);
        let times = shifts.iter().map(|s| s.time).collect::<Vec<_>>();
        assert_eq!(times, vec![12.5, 37.5, 62.5, 87.5]);
        for shift in shifts {
            assert_approx_eq!(shift.dx, shift.time * 0.5);
        }
    }

    #[test]
    fn test_same() {
        let model = TimingModel::new(TimeAlgo::Same, Interval::new(-1000.0, 1000.0), 0.156);
        let shifts = model.generate(&mut StdRng::seed_from_u64(0), 6);
        assert_eq!(shifts, vec![TimeShift::default(); 6]);
    }

    #[test]
    fn test_random_within_period() {
        let model = TimingModel::new(TimeAlgo::Random, Interval::new(-10.0, 30.0), 2.0);
        let shifts = model.generate(&mut StdRng::seed_from_u64(42), 100);
        assert_eq!(shifts.len(), 100);
        for shift in shifts {
            assert!((-10.0..30.0).contains(&shift.time));
            assert_approx_eq!(shift.dx, shift.time * 2.0);
        }
    }

    #[test]
    fn test_parse_time_algo() {
        assert_eq!(
            TimeAlgo::try_from("random".to_owned()).unwrap(),
            TimeAlgo::Random
        );
        assert_eq!(TimeAlgo::try_from("same".to_owned()).unwrap(), TimeAlgo::Same);
        assert!(matches!(
            TimeAlgo::try_from("Periodic".to_owned()),
            Err(ConfigError::UnknownTimeAlgo(algo)) if algo == "Periodic"
        ));
    }
}
