use crate::error::{ToyMcError, ToyMcResult};
use flashmatch_common::{Flash, Point3, Trajectory};
use itertools::izip;
use serde::{Deserialize, de::DeserializeOwned};
use std::{collections::BTreeSet, fs::File, io::BufReader, path::Path};
use tracing::{debug, info};

/// Particle code of the tracks that are replayed.
const MUON_PDG_CODE: i32 = 13;

pub(crate) type EventId = u32;

/// Recorded particle track, one entry of the particle file.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ParticleRecord {
    pub(crate) event: EventId,
    pub(crate) pdg_code: i32,
    pub(crate) x_v: Vec<f64>,
    pub(crate) y_v: Vec<f64>,
    pub(crate) z_v: Vec<f64>,
}

impl ParticleRecord {
    /// Tracks with fewer than two points carry no length and are treated as missing.
    fn trajectory(&self) -> Option<Trajectory> {
        let points = izip!(&self.x_v, &self.y_v, &self.z_v)
            .map(|(&x, &y, &z)| Point3::new(x, y, z))
            .collect();
        Trajectory::new(points).ok()
    }
}

/// Reconstructed flash, one entry of the flash file.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct FlashRecord {
    pub(crate) event: EventId,
    pub(crate) pe_v: Vec<f64>,
    #[serde(default)]
    pub(crate) pe_true_v: Vec<f64>,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) z: f64,
    pub(crate) time: f64,
}

impl FlashRecord {
    fn to_flash(&self, num_channels: usize) -> Flash {
        let pe: Vec<f64> = self.pe_v.iter().take(num_channels).copied().collect();
        Flash {
            pe_err: vec![0.0; pe.len()],
            pe,
            pe_true: self.pe_true_v.iter().take(num_channels).copied().collect(),
            position: Point3::new(self.x, self.y, self.z),
            position_err: Point3::default(),
            time: self.time,
            id: None,
        }
    }
}

/// The tracks and flashes recorded for one event, index `i` of each side
/// forming candidate `i`.
#[derive(Clone, Debug, Default)]
pub(crate) struct ReplayEvent {
    pub(crate) tracks: Vec<Option<Trajectory>>,
    pub(crate) flashes: Vec<Flash>,
}

impl ReplayEvent {
    pub(crate) fn num_candidates(&self) -> usize {
        self.tracks.len().max(self.flashes.len())
    }
}

/// Recorded events, loaded whole from a particle file and a flash file.
#[derive(Clone, Debug)]
pub(crate) struct ReplayData {
    particles: Vec<ParticleRecord>,
    flashes: Vec<FlashRecord>,
}

fn read_records<T: DeserializeOwned>(path: &Path) -> ToyMcResult<Vec<T>> {
    let file = File::open(path).map_err(|source| ToyMcError::ReplayIo {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ToyMcError::ReplayJson {
        path: path.to_owned(),
        source,
    })
}

impl ReplayData {
    pub(crate) fn new(particles: Vec<ParticleRecord>, flashes: Vec<FlashRecord>) -> Self {
        Self { particles, flashes }
    }

    pub(crate) fn load(particle_path: &Path, flash_path: &Path) -> ToyMcResult<Self> {
        let data = Self::new(read_records(particle_path)?, read_records(flash_path)?);
        info!(
            "Loaded {} particles and {} flashes",
            data.particles.len(),
            data.flashes.len()
        );
        Ok(data)
    }

    /// Event numbers present in the particle file, in ascending order.
    pub(crate) fn events(&self) -> Vec<EventId> {
        self.particles
            .iter()
            .map(|particle| particle.event)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub(crate) fn event(&self, event: EventId, num_channels: usize) -> ReplayEvent {
        let tracks: Vec<_> = self
            .particles
            .iter()
            .filter(|particle| particle.event == event && particle.pdg_code == MUON_PDG_CODE)
            .map(ParticleRecord::trajectory)
            .collect();
        let flashes: Vec<_> = self
            .flashes
            .iter()
            .filter(|flash| flash.event == event)
            .map(|flash| flash.to_flash(num_channels))
            .collect();
        debug!(
            "Event {event}: {} muons, {} flashes",
            tracks.len(),
            flashes.len()
        );
        for flash in &flashes {
            debug!(
                "Flash PE sum {}, true PE sum {}",
                flash.total_pe(),
                flash.total_true_pe()
            );
        }
        ReplayEvent { tracks, flashes }
    }
}
