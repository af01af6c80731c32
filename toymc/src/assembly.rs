use crate::error::ConfigError;
use flashmatch_common::{ChargeCluster, Flash, Trajectory};
use serde::Deserialize;
use strum::{Display, EnumString};
use tracing::debug;

/// Which outcome of the joint test puts a candidate into the matched range.
///
/// Synthetic generation has always admitted the candidates that *fail* the joint
/// test, while replay admits those that pass it. Both are kept selectable.
#[derive(Clone, Copy, Debug, Default, PartialEq, EnumString, Display, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(try_from = "String")]
pub(crate) enum JointTestPolarity {
    #[default]
    Inverted,
    Direct,
}

impl TryFrom<String> for JointTestPolarity {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map_err(|_| ConfigError::UnknownJointTest(value))
    }
}

impl JointTestPolarity {
    fn admits(&self, passes_joint_test: bool) -> bool {
        match self {
            Self::Direct => passes_joint_test,
            Self::Inverted => !passes_joint_test,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum AssemblyMode {
    Synthetic(JointTestPolarity),
    Replay,
}

impl AssemblyMode {
    pub(crate) fn polarity(&self) -> JointTestPolarity {
        match self {
            Self::Synthetic(polarity) => *polarity,
            Self::Replay => JointTestPolarity::Direct,
        }
    }
}

/// The charge side of a candidate: its source trajectory, the cluster after
/// shift and truncation, and the untouched cluster.
#[derive(Clone, Debug)]
pub(crate) struct ChargeSample {
    pub(crate) trajectory: Trajectory,
    pub(crate) cluster: ChargeCluster,
    pub(crate) raw: ChargeCluster,
}

/// One generated or recorded index, with either side possibly absent.
#[derive(Clone, Debug, Default)]
pub(crate) struct Candidate {
    pub(crate) flash: Option<Flash>,
    pub(crate) charge: Option<ChargeSample>,
}

/// Clusters and flashes ready for matching.
///
/// The first `match_count()` entries of each array pair up index for index and carry
/// that index as their id. Orphans follow, numbered on within their own array.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SampleSet {
    pub(crate) trajectories: Vec<Trajectory>,
    pub(crate) clusters: Vec<ChargeCluster>,
    pub(crate) raw_clusters: Vec<ChargeCluster>,
    pub(crate) flashes: Vec<Flash>,
}

impl SampleSet {
    pub(crate) fn match_count(&self) -> usize {
        self.trajectories.len()
    }
}

pub(crate) struct SampleAssembler {
    min_track_length: f64,
    min_flash_pe: f64,
    mode: AssemblyMode,
}

impl SampleAssembler {
    pub(crate) fn new(min_track_length: f64, min_flash_pe: f64, mode: AssemblyMode) -> Self {
        Self {
            min_track_length,
            min_flash_pe,
            mode,
        }
    }

    fn flash_qualifies(&self, flash: &Flash) -> bool {
        flash.total_pe() > self.min_flash_pe
    }

    fn charge_qualifies(&self, charge: &ChargeSample) -> bool {
        !charge.cluster.is_empty() && charge.trajectory.length() > self.min_track_length
    }

    fn passes_joint_test(&self, candidate: &Candidate) -> bool {
        match (&candidate.flash, &candidate.charge) {
            (Some(flash), Some(charge)) => {
                self.charge_qualifies(charge) && self.flash_qualifies(flash)
            }
            _ => false,
        }
    }

    /// Sorts candidates into matched pairs and orphans, keeping arrival order.
    pub(crate) fn assemble(&self, candidates: impl IntoIterator<Item = Candidate>) -> SampleSet {
        let polarity = self.mode.polarity();
        let mut samples = SampleSet::default();
        let mut orphan_flashes = Vec::<Flash>::new();
        let mut orphan_charges = Vec::<ChargeSample>::new();

        for candidate in candidates {
            let admitted = polarity.admits(self.passes_joint_test(&candidate));
            match (admitted, candidate.flash, candidate.charge) {
                (true, Some(mut flash), Some(mut charge)) => {
                    let id = samples.match_count();
                    charge.cluster.id = Some(id);
                    charge.raw.id = Some(id);
                    flash.id = Some(id);
                    samples.flashes.push(flash);
                    samples.clusters.push(charge.cluster);
                    samples.raw_clusters.push(charge.raw);
                    samples.trajectories.push(charge.trajectory);
                }
                (_, flash, charge) => {
                    if let Some(flash) = flash.filter(|flash| self.flash_qualifies(flash)) {
                        orphan_flashes.push(flash);
                    }
                    if let Some(charge) = charge.filter(|charge| self.charge_qualifies(charge)) {
                        orphan_charges.push(charge);
                    }
                }
            }
        }
        debug!(
            "Matched {}, orphans {} flashes, {} clusters",
            samples.match_count(),
            orphan_flashes.len(),
            orphan_charges.len()
        );

        for mut flash in orphan_flashes {
            flash.id = Some(samples.flashes.len());
            samples.flashes.push(flash);
        }
        for ChargeSample {
            mut cluster,
            mut raw,
            ..
        } in orphan_charges
        {
            cluster.id = Some(samples.clusters.len());
            samples.clusters.push(cluster);
            raw.id = Some(samples.raw_clusters.len());
            samples.raw_clusters.push(raw);
        }
        samples
    }
}
