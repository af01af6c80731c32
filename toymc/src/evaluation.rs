use crate::{
    assembly::SampleSet,
    error::{ToyMcError, ToyMcResult},
    replay::EventId,
};
use flashmatch_common::{MatchResult, Point3, SampleId};
use std::{
    fmt,
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};
use tracing::info;

/// Column names of the exported file, in row order.
pub(crate) const FIELD_NAMES: [&str; 29] = [
    "event",
    "score",
    "true_min_x",
    "tpc_point_x",
    "tpc_point_y",
    "tpc_point_z",
    "start_point_x",
    "start_point_y",
    "start_point_z",
    "end_point_x",
    "end_point_y",
    "end_point_z",
    "raw_start_point_x",
    "raw_start_point_y",
    "raw_start_point_z",
    "raw_end_point_x",
    "raw_end_point_y",
    "raw_end_point_z",
    "truncation",
    "truncation_fraction",
    "qcluster_num_points",
    "matched",
    "qcluster_sum",
    "hypothesis_sum",
    "flash_sum",
    "flash_true_sum",
    "flash_time",
    "duration",
    "num_steps",
];

/// Everything recorded about one match result, compared with the truth of the sample it refers to.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MatchRecord {
    pub(crate) tpc_id: SampleId,
    pub(crate) flash_id: SampleId,
    pub(crate) event: EventId,
    pub(crate) score: f64,
    pub(crate) true_min_x: f64,
    pub(crate) tpc_point: Point3,
    pub(crate) start_point: Point3,
    pub(crate) end_point: Point3,
    pub(crate) raw_start_point: Point3,
    pub(crate) raw_end_point: Point3,
    /// Track length lost to the readout window.
    pub(crate) truncation: f64,
    /// `truncation` relative to the untruncated length, or -1 if that length is zero.
    pub(crate) truncation_fraction: f64,
    pub(crate) qcluster_num_points: usize,
    /// The match pairs a cluster with its own flash, and both were generated together.
    pub(crate) matched: bool,
    pub(crate) qcluster_sum: f64,
    pub(crate) hypothesis_sum: f64,
    pub(crate) flash_sum: f64,
    pub(crate) flash_true_sum: f64,
    pub(crate) flash_time: f64,
    pub(crate) duration: f64,
    pub(crate) num_steps: u32,
}

impl MatchRecord {
    pub(crate) fn new(
        event: EventId,
        result: &MatchResult,
        samples: &SampleSet,
    ) -> ToyMcResult<Self> {
        let tpc_id = result.tpc_id;
        let cluster = samples
            .clusters
            .get(tpc_id)
            .ok_or(ToyMcError::UnknownClusterId(tpc_id))?;
        let raw = samples
            .raw_clusters
            .get(tpc_id)
            .ok_or(ToyMcError::UnknownClusterId(tpc_id))?;
        let flash = samples
            .flashes
            .get(result.flash_id)
            .ok_or(ToyMcError::UnknownFlashId(result.flash_id))?;

        let empty = || ToyMcError::EmptyCluster(tpc_id);
        let (start, end) = cluster.front().zip(cluster.back()).ok_or_else(empty)?;
        let (raw_start, raw_end) = raw.front().zip(raw.back()).ok_or_else(empty)?;
        let true_min_x = cluster.min_x().ok_or_else(empty)?;

        let raw_length = raw.end_to_end();
        let truncation = raw_length - cluster.end_to_end();
        let truncation_fraction = if raw_length > 0.0 {
            truncation / raw_length
        } else {
            -1.0
        };
        let matched = cluster.id == flash.id
            && cluster
                .id
                .is_some_and(|id| id < samples.match_count());

        Ok(Self {
            tpc_id,
            flash_id: result.flash_id,
            event,
            score: result.score,
            true_min_x,
            tpc_point: result.tpc_point,
            start_point: start.position(),
            end_point: end.position(),
            raw_start_point: raw_start.position(),
            raw_end_point: raw_end.position(),
            truncation,
            truncation_fraction,
            qcluster_num_points: cluster.len(),
            matched,
            qcluster_sum: cluster.sum(),
            hypothesis_sum: result.hypothesis_sum(),
            flash_sum: flash.total_pe(),
            flash_true_sum: flash.total_true_pe(),
            flash_time: flash.time,
            duration: result.duration,
            num_steps: result.num_steps,
        })
    }

    /// One line, human readable.
    pub(crate) fn summary(&self) -> String {
        format!(
            "  TPC/PMT IDs {}/{} Score {:.6} Min-X {:.6} PE sum {:.6} ... true Min-X {:.6} true PE sum {:.6} truncation {:.6} ({:.6}%) correct {}",
            self.tpc_id,
            self.flash_id,
            self.score,
            self.tpc_point.x,
            self.hypothesis_sum,
            self.true_min_x,
            self.flash_sum,
            self.truncation,
            self.truncation_fraction * 100.0,
            self.matched
        )
    }
}

/// Comma separated, in the order of `FIELD_NAMES`.
impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.event, self.score, self.true_min_x)?;
        for point in [
            &self.tpc_point,
            &self.start_point,
            &self.end_point,
            &self.raw_start_point,
            &self.raw_end_point,
        ] {
            write!(f, ",{},{},{}", point.x, point.y, point.z)?;
        }
        write!(
            f,
            ",{},{},{},{},{},{},{},{},{},{},{}",
            self.truncation,
            self.truncation_fraction,
            self.qcluster_num_points,
            u8::from(self.matched),
            self.qcluster_sum,
            self.hypothesis_sum,
            self.flash_sum,
            self.flash_true_sum,
            self.flash_time,
            self.duration,
            self.num_steps
        )
    }
}

/// Writes the header comment followed by one line per record.
pub(crate) fn write_rows<W: Write>(writer: &mut W, rows: &[MatchRecord]) -> std::io::Result<()> {
    writeln!(writer, "# {}", FIELD_NAMES.join(","))?;
    for row in rows {
        writeln!(writer, "{row}")?;
    }
    Ok(())
}

pub(crate) enum ExportMode {
    /// Print a summary of every match as it is made.
    Console,
    /// Collect every match and write them all to the file at the end of the run.
    File(PathBuf),
}

pub(crate) struct EvaluationExporter {
    mode: ExportMode,
    rows: Vec<MatchRecord>,
}

impl EvaluationExporter {
    pub(crate) fn new(mode: ExportMode) -> Self {
        Self {
            mode,
            rows: Vec::new(),
        }
    }

    pub(crate) fn record_event<W: Write>(
        &mut self,
        out: &mut W,
        event: EventId,
        results: &[MatchResult],
        samples: &SampleSet,
    ) -> ToyMcResult<()> {
        if let ExportMode::Console = self.mode {
            writeln!(out, "Number of match result {}", results.len())?;
        }
        for (idx, result) in results.iter().enumerate() {
            let record = MatchRecord::new(event, result, samples)?;
            match self.mode {
                ExportMode::Console => {
                    writeln!(out, "Match ID {idx}")?;
                    writeln!(out, "{}", record.summary())?;
                }
                ExportMode::File(_) => self.rows.push(record),
            }
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> ToyMcResult<()> {
        if let ExportMode::File(path) = self.mode {
            let file = File::create(&path)?;
            let mut writer = BufWriter::new(file);
            write_rows(&mut writer, &self.rows)?;
            writer.flush()?;
            info!("Wrote {} match records to {}", self.rows.len(), path.display());
        }
        Ok(())
    }
}
