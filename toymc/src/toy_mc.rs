use crate::{
    assembly::{AssemblyMode, Candidate, ChargeSample, SampleAssembler, SampleSet},
    config::{Config, ToyMcConfig},
    error::ToyMcResult,
    generator::{NoiseInjector, TimingModel, TrajectoryGenerator, Truncator},
    models::{ChargeModelKind, hypothesis::InverseSquareHypothesis},
    replay::ReplayEvent,
};
use flashmatch_common::{
    ChargeModel, FlashModel, GeometryProvider, MatchResult, MatchingEngine, Trajectory,
};
use rand::rngs::StdRng;
use tracing::instrument;

/// Produces the clusters and flashes of one event at a time, either generated
/// from random tracks or built from recorded ones.
///
/// Every random draw of the run comes from the one generator owned here, in the
/// order tracks, timings, then charge and light noise track by track.
pub(crate) struct ToyMc {
    rng: StdRng,
    charge_model: Box<dyn ChargeModel>,
    flash_model: Box<dyn FlashModel>,
    num_channels: usize,
    num_tracks: usize,
    trajectories: TrajectoryGenerator,
    timing: TimingModel,
    noise: NoiseInjector,
    truncator: Truncator,
    synthetic: SampleAssembler,
    replay: SampleAssembler,
}

impl ToyMc {
    pub(crate) fn new(config: &Config) -> Self {
        let charge_model: Box<dyn ChargeModel> = match config.toy_mc.qcluster_algo {
            ChargeModelKind::LightPath => Box::new(config.light_path.clone()),
        };
        let flash_model = Box::new(InverseSquareHypothesis::new(
            &config.inverse_square_hypothesis,
            config.detector_specs.pmt_positions(),
        ));
        Self::with_models(
            &config.toy_mc,
            &config.detector_specs,
            charge_model,
            flash_model,
            config.toy_mc.make_rng(),
        )
    }

    pub(crate) fn with_models(
        config: &ToyMcConfig,
        geometry: &dyn GeometryProvider,
        charge_model: Box<dyn ChargeModel>,
        flash_model: Box<dyn FlashModel>,
        rng: StdRng,
    ) -> Self {
        let drift_velocity = geometry.drift_velocity();
        let assembler = |mode| {
            SampleAssembler::new(config.min_track_length, config.min_flash_pe, mode)
        };
        Self {
            rng,
            charge_model,
            flash_model,
            num_channels: geometry.num_channels(),
            num_tracks: config.num_tracks,
            trajectories: TrajectoryGenerator::new(
                config.track_algo,
                geometry.active_volume().clone(),
            ),
            timing: TimingModel::new(config.time_algo, config.period_pmt, drift_velocity),
            noise: NoiseInjector::new(config.light_yield_variation, config.pe_variation),
            truncator: Truncator::new(config.truncate_tpc(), &config.period_tpc, drift_velocity),
            synthetic: assembler(AssemblyMode::Synthetic(config.synthetic_joint_test)),
            replay: assembler(AssemblyMode::Replay),
        }
    }

    pub(crate) fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Generates one synthetic event of `num_tracks` tracks, or the configured
    /// number when none is given.
    #[instrument(skip(self), err(level = "warn"))]
    pub(crate) fn gen_input(&mut self, num_tracks: Option<usize>) -> ToyMcResult<SampleSet> {
        let num_tracks = num_tracks.unwrap_or(self.num_tracks);
        let trajectories = self.trajectories.generate(&mut self.rng, num_tracks)?;
        let shifts = self.timing.generate(&mut self.rng, trajectories.len());

        let mut candidates = Vec::with_capacity(trajectories.len());
        for (trajectory, shift) in trajectories.into_iter().zip(shifts) {
            let raw =
                self.noise
                    .make_cluster(&mut self.rng, self.charge_model.as_ref(), &trajectory)?;
            let mut flash =
                self.noise
                    .make_flash(&mut self.rng, self.flash_model.as_ref(), &raw)?;
            flash.time = shift.time;

            let mut cluster = raw.shifted(shift.dx);
            self.truncator.apply(&mut cluster);
            candidates.push(Candidate {
                flash: Some(flash),
                charge: Some(ChargeSample {
                    trajectory,
                    cluster,
                    raw,
                }),
            });
        }
        Ok(self.synthetic.assemble(candidates))
    }

    /// Builds the samples of one recorded event. Flashes are used as recorded,
    /// the charge is modelled from the recorded tracks without any time shift.
    #[instrument(skip_all, err(level = "warn"))]
    pub(crate) fn read_input(&mut self, event: &ReplayEvent) -> ToyMcResult<SampleSet> {
        let mut candidates = Vec::with_capacity(event.num_candidates());
        for idx in 0..event.num_candidates() {
            let flash = event.flashes.get(idx).cloned();
            let charge = match event.tracks.get(idx).cloned().flatten() {
                Some(trajectory) => Some(self.make_charge(trajectory)?),
                None => None,
            };
            candidates.push(Candidate { flash, charge });
        }
        Ok(self.replay.assemble(candidates))
    }

    fn make_charge(&mut self, trajectory: Trajectory) -> ToyMcResult<ChargeSample> {
        let raw = self
            .noise
            .make_cluster(&mut self.rng, self.charge_model.as_ref(), &trajectory)?;
        let mut cluster = raw.clone();
        self.truncator.apply(&mut cluster);
        Ok(ChargeSample {
            trajectory,
            cluster,
            raw,
        })
    }
}

/// Submits one event's samples to `engine`, clearing whatever it held from the previous event.
pub(crate) fn run_match(engine: &mut dyn MatchingEngine, samples: &SampleSet) -> Vec<MatchResult> {
    engine.reset();
    for cluster in &samples.clusters {
        engine.add_cluster(cluster);
    }
    for flash in &samples.flashes {
        engine.add_flash(flash);
    }
    engine.run_match()
}
