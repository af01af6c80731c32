mod assembly;
mod config;
mod error;
mod evaluation;
mod generator;
mod models;
mod replay;
mod toy_mc;

use anyhow::Context;
use assembly::JointTestPolarity;
use clap::Parser;
use config::Config;
use evaluation::{EvaluationExporter, ExportMode};
use flashmatch_common::{GeometryProvider, init_tracer, tracer::TracerOptions};
use models::{hypothesis::InverseSquareHypothesis, scan_match::ScanMatch};
use replay::{EventId, ReplayData};
use std::{io::Write, path::PathBuf};
use toy_mc::{ToyMc, run_match};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Either `<num_tracks>` to generate synthetic events, or
    /// `<particle_file> <flash_file> [<output_file>]` to replay recorded events
    #[clap(num_args = 0..=3)]
    inputs: Vec<String>,

    /// Config file, defaults to `dat/flashmatch.json` in the base directory
    #[clap(long)]
    config: Option<PathBuf>,

    /// Base directory of the installation
    #[clap(long, env = "FMATCH_BASEDIR")]
    base_dir: Option<PathBuf>,

    /// Number of synthetic events to generate
    #[clap(long, default_value = "17")]
    repeat: EventId,

    /// If set, match records are written to this file instead of the console
    #[clap(long)]
    output_file: Option<PathBuf>,

    /// Log filter directive, e.g. `toymc=debug`. Defaults to `RUST_LOG`
    #[clap(long)]
    log_filter: Option<String>,
}

enum RunMode {
    Synthetic {
        num_tracks: Option<usize>,
    },
    Replay {
        particle_file: PathBuf,
        flash_file: PathBuf,
    },
}

impl Cli {
    fn run_mode(&self) -> anyhow::Result<(RunMode, ExportMode)> {
        let (mode, output_file) = match self.inputs.as_slice() {
            [] => (RunMode::Synthetic { num_tracks: None }, None),
            [num_tracks] => {
                let num_tracks = num_tracks
                    .parse()
                    .with_context(|| format!("Invalid number of tracks '{num_tracks}'"))?;
                let mode = RunMode::Synthetic {
                    num_tracks: Some(num_tracks),
                };
                (mode, None)
            }
            [particle_file, flash_file, rest @ ..] => {
                let mode = RunMode::Replay {
                    particle_file: particle_file.into(),
                    flash_file: flash_file.into(),
                };
                (mode, rest.first().map(PathBuf::from))
            }
        };
        let export = match output_file.or_else(|| self.output_file.clone()) {
            Some(path) => ExportMode::File(path),
            None => ExportMode::Console,
        };
        Ok((mode, export))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let _tracer = init_tracer!(TracerOptions {
        filter_directive: args.log_filter.as_deref(),
    });

    let (mode, export) = args.run_mode()?;
    let config_path = config::resolve_path(args.config.clone(), args.base_dir.clone())?;
    let config = Config::load(&config_path)?;
    info!("Loaded config from {}", config_path.display());
    info!("{config:?}");

    let mut toy_mc = ToyMc::new(&config);
    let mut engine = ScanMatch::new(
        &config.scan_match,
        config.detector_specs.active_volume().clone(),
        InverseSquareHypothesis::new(
            &config.inverse_square_hypothesis,
            config.detector_specs.pmt_positions(),
        ),
    );
    let mut exporter = EvaluationExporter::new(export);
    let mut stdout = std::io::stdout();

    match mode {
        RunMode::Synthetic { num_tracks } => {
            if config.toy_mc.synthetic_joint_test == JointTestPolarity::Inverted {
                warn!(
                    "Synthetic samples use the inverted joint test: candidates failing the \
                    track length or flash PE cuts are matched, passing ones become orphans"
                );
            }
            for event in 0..args.repeat {
                info!("Event {event}/{}", args.repeat);
                let samples = toy_mc.gen_input(num_tracks)?;
                let results = run_match(&mut engine, &samples);
                exporter.record_event(&mut stdout, event, &results, &samples)?;
            }
        }
        RunMode::Replay {
            particle_file,
            flash_file,
        } => {
            let data = ReplayData::load(&particle_file, &flash_file)?;
            let events = data.events();
            info!("Found {} events", events.len());
            for event in events {
                info!("Event {event}");
                let samples = toy_mc.read_input(&data.event(event, toy_mc.num_channels()))?;
                let results = run_match(&mut engine, &samples);
                exporter.record_event(&mut stdout, event, &results, &samples)?;
            }
        }
    }
    stdout.flush()?;
    exporter.finish()?;
    Ok(())
}
