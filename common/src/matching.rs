use crate::{ChargeCluster, Flash, PhotoElectrons, Point3, SampleId};

/// A correspondence hypothesis between one cluster and one flash.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchResult {
    pub tpc_id: SampleId,
    pub flash_id: SampleId,
    pub score: f64,
    /// Predicted light per channel for the matched cluster.
    pub hypothesis: Vec<PhotoElectrons>,
    /// Estimated position of the cluster.
    pub tpc_point: Point3,
    /// Time spent on this match, in seconds.
    pub duration: f64,
    pub num_steps: u32,
}

impl MatchResult {
    pub fn hypothesis_sum(&self) -> PhotoElectrons {
        self.hypothesis.iter().fold(0.0, |sum, pe| sum + pe)
    }
}

/// Stateful flash matcher.
///
/// `reset` must be called before each event's clusters and flashes are added,
/// otherwise the inputs of the previous event are matched again.
pub trait MatchingEngine {
    fn reset(&mut self);

    fn add_cluster(&mut self, cluster: &ChargeCluster);

    fn add_flash(&mut self, flash: &Flash);

    fn run_match(&mut self) -> Vec<MatchResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hypothesis_sum() {
        let result = MatchResult::default();
        assert!(result.hypothesis_sum().is_sign_positive());
        assert_eq!(result.hypothesis_sum().to_string(), "0");
    }
}
