use flashmatch_common::{SampleId, TrajectoryError};
use std::path::PathBuf;
use thiserror::Error;

pub(crate) type ToyMcResult<T> = Result<T, ToyMcError>;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("Time algo not recognized, must be one of [random, periodic, same], got '{0}'")]
    UnknownTimeAlgo(String),
    #[error("Track algo not recognized, must be one of [random, top-bottom], got '{0}'")]
    UnknownTrackAlgo(String),
    #[error("QCluster algo not recognized, must be one of [LightPath], got '{0}'")]
    UnknownChargeModel(String),
    #[error("Joint test polarity not recognized, must be one of [inverted, direct], got '{0}'")]
    UnknownJointTest(String),
    #[error("{0} must be positive, got {1}")]
    NonPositive(&'static str, f64),
    #[error("Malformed interval, expected pattern '[*,*]', got '{0}'")]
    MalformedInterval(String),
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("No config file given and FMATCH_BASEDIR is not set")]
    MissingBaseDir,
}

#[derive(Debug, Error)]
pub(crate) enum ToyMcError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("Invalid Normal Distribution: {0}")]
    NormalDistribution(#[from] rand_distr::NormalError),
    #[error("Invalid Poisson Distribution: {0}")]
    PoissonDistribution(#[from] rand_distr::PoissonError),
    #[error("{0}")]
    Trajectory(#[from] TrajectoryError),
    #[error("Cannot read replay file {path}: {source}")]
    ReplayIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid replay file {path}: {source}")]
    ReplayJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Match refers to unknown cluster {0}")]
    UnknownClusterId(SampleId),
    #[error("Match refers to unknown flash {0}")]
    UnknownFlashId(SampleId),
    #[error("Match refers to cluster {0} which has no charge points")]
    EmptyCluster(SampleId),
}
