use super::hypothesis::InverseSquareHypothesis;
use crate::error::ConfigError;
use flashmatch_common::{
    ActiveVolume, ChargeCluster, Flash, FlashModel, MatchResult, MatchingEngine, Point3, SampleId,
};
use serde::Deserialize;
use std::{collections::HashSet, time::Instant};
use tracing::{debug, trace};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ScanMatchConfig {
    // Distance between tested x positions (cm)
    step_size: f64,
}

impl ScanMatchConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.step_size > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NonPositive("StepSize", self.step_size))
        }
    }
}

/// Positions tried over a scan range of `span`, both ends included.
fn num_steps(span: f64, step_size: f64) -> u32 {
    ((span / step_size).floor() as u32).saturating_add(1)
}

/// Brute force matcher: every cluster is slid along x through the active volume
/// and compared to every flash, then pairs are taken greedily by score.
pub(crate) struct ScanMatch {
    step_size: f64,
    volume: ActiveVolume,
    hypothesis: InverseSquareHypothesis,
    clusters: Vec<(SampleId, ChargeCluster)>,
    flashes: Vec<(SampleId, Flash)>,
}

impl ScanMatch {
    pub(crate) fn new(
        config: &ScanMatchConfig,
        volume: ActiveVolume,
        hypothesis: InverseSquareHypothesis,
    ) -> Self {
        Self {
            step_size: config.step_size,
            volume,
            hypothesis,
            clusters: Vec::new(),
            flashes: Vec::new(),
        }
    }

    fn chi2(hypothesis: &[f64], observed: &[f64]) -> f64 {
        hypothesis
            .iter()
            .zip(observed)
            .map(|(h, o)| (h - o).powi(2) / (o + 1.0))
            .sum()
    }

    /// Finds the x shift of `cluster` that best reproduces `flash`.
    fn fit(
        &self,
        tpc_id: SampleId,
        cluster: &ChargeCluster,
        flash_id: SampleId,
        flash: &Flash,
    ) -> Option<MatchResult> {
        let start = Instant::now();
        let lowest = self.volume.min.x - cluster.min_x()?;
        let highest = self.volume.max.x - cluster.max_x()?;
        let (lowest, num_steps) = if highest >= lowest {
            (lowest, num_steps(highest - lowest, self.step_size))
        } else {
            // cluster is wider than the volume, only try it centred
            ((lowest + highest) / 2.0, 1)
        };

        let ndf = flash.num_channels().max(1) as f64;
        let (dx, chi2, hypothesis) = (0..num_steps)
            .map(|step| {
                let dx = lowest + step as f64 * self.step_size;
                let hypothesis = self.hypothesis.estimate(&cluster.shifted(dx));
                (dx, Self::chi2(&hypothesis, &flash.pe), hypothesis)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        trace!("Cluster {tpc_id} flash {flash_id}: best shift {dx}, chi2 {chi2}");

        let shifted = cluster.shifted(dx);
        let total_q = shifted.sum();
        let (y, z) = if total_q > 0.0 {
            shifted.points().iter().fold((0.0, 0.0), |(y, z), p| {
                (y + p.y * p.q / total_q, z + p.z * p.q / total_q)
            })
        } else {
            (0.0, 0.0)
        };
        Some(MatchResult {
            tpc_id,
            flash_id,
            score: 1.0 / (1.0 + chi2 / ndf),
            hypothesis,
            tpc_point: Point3::new(shifted.min_x()?, y, z),
            duration: start.elapsed().as_secs_f64(),
            num_steps,
        })
    }
}

impl MatchingEngine for ScanMatch {
    fn reset(&mut self) {
        self.clusters.clear();
        self.flashes.clear();
    }

    fn add_cluster(&mut self, cluster: &ChargeCluster) {
        let id = cluster.id.unwrap_or(self.clusters.len());
        self.clusters.push((id, cluster.clone()));
    }

    fn add_flash(&mut self, flash: &Flash) {
        let id = flash.id.unwrap_or(self.flashes.len());
        self.flashes.push((id, flash.clone()));
    }

    fn run_match(&mut self) -> Vec<MatchResult> {
        let mut candidates = self
            .clusters
            .iter()
            .flat_map(|(tpc_id, cluster)| {
                self.flashes
                    .iter()
                    .filter_map(|(flash_id, flash)| self.fit(*tpc_id, cluster, *flash_id, flash))
            })
            .collect::<Vec<_>>();
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut used_clusters = HashSet::new();
        let mut used_flashes = HashSet::new();
        let mut matches = Vec::new();
        for result in candidates {
            if used_clusters.contains(&result.tpc_id) || used_flashes.contains(&result.flash_id) {
                continue;
            }
            used_clusters.insert(result.tpc_id);
            used_flashes.insert(result.flash_id);
            matches.push(result);
        }
        debug!(
            "Matched {} of {} clusters and {} flashes",
            matches.len(),
            self.clusters.len(),
            self.flashes.len()
        );
        matches
    }
}
