use crate::error::ToyMcResult;
use flashmatch_common::{ChargeCluster, ChargeModel, Flash, FlashModel, Trajectory};
use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};

/// Draws an integer photoelectron count with the given mean.
/// Negative or NaN means are rejected by the distribution and returned as errors.
fn poisson_count(rng: &mut impl Rng, mean: f64) -> ToyMcResult<f64> {
    if mean == 0.0 {
        return Ok(0.0);
    }
    Ok(Poisson::new(mean)?.sample(rng).floor())
}

/// Applies detector response fluctuations on top of the charge and flash models.
pub(crate) struct NoiseInjector {
    light_yield_variation: f64,
    pe_variation: f64,
}

impl NoiseInjector {
    pub(crate) fn new(light_yield_variation: f64, pe_variation: f64) -> Self {
        Self {
            light_yield_variation,
            pe_variation,
        }
    }

    /// Creates the charge cluster of `trajectory`, scaling each point's charge by
    /// `|N(1, light_yield_variation)|` when the variation is enabled.
    pub(crate) fn make_cluster(
        &self,
        rng: &mut impl Rng,
        model: &dyn ChargeModel,
        trajectory: &Trajectory,
    ) -> ToyMcResult<ChargeCluster> {
        let mut cluster = model.make_cluster(trajectory);
        if self.light_yield_variation > 0.0 {
            let variation = Normal::new(1.0, self.light_yield_variation)?;
            for point in cluster.points_mut() {
                point.q *= variation.sample(rng).abs();
            }
        }
        Ok(cluster)
    }

    /// Creates the flash seen for `cluster`. Each channel's expectation is scaled by
    /// `|N(1, pe_variation)|` and replaced by a Poisson draw; the error is its square root,
    /// which is only a fair estimate at high counts.
    pub(crate) fn make_flash(
        &self,
        rng: &mut impl Rng,
        model: &dyn FlashModel,
        cluster: &ChargeCluster,
    ) -> ToyMcResult<Flash> {
        let estimate = model.estimate(cluster);
        let variation: Vec<f64> = if self.pe_variation > 0.0 {
            Normal::new(1.0, self.pe_variation)?
                .sample_iter(&mut *rng)
                .take(estimate.len())
                .map(f64::abs)
                .collect()
        } else {
            vec![1.0; estimate.len()]
        };
        let pe = estimate
            .iter()
            .zip(variation)
            .map(|(pe, var)| poisson_count(rng, pe * var))
            .collect::<ToyMcResult<Vec<_>>>()?;
        let pe_err = pe.iter().map(|pe| pe.sqrt()).collect();
        Ok(Flash {
            pe,
            pe_err,
            ..Default::default()
        })
    }
}
