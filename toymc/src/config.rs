use crate::{
    assembly::JointTestPolarity,
    error::ConfigError,
    generator::{timing::TimeAlgo, trajectory::TrackAlgo},
    models::{
        ChargeModelKind, detector::DetectorSpecs, hypothesis::InverseSquareConfig,
        light_path::LightPath, scan_match::ScanMatchConfig,
    },
};
use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use serde::Deserialize;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::info;

/// Default location of the config file, relative to the base directory.
const DEFAULT_CONFIG_FILE: [&str; 2] = ["dat", "flashmatch.json"];

/// Closed interval given in the config file as a string, e.g. `"[-1000,1000]"`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub(crate) struct Interval {
    pub(crate) min: f64,
    pub(crate) max: f64,
}

impl Interval {
    pub(crate) fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub(crate) fn duration(&self) -> f64 {
        self.max - self.min
    }

    pub(crate) fn scaled(&self, factor: f64) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }
}

impl FromStr for Interval {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigError::MalformedInterval(s.to_owned());
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(malformed)?;
        let vals: Vec<_> = inner.split(',').map(str::trim).collect();
        match vals.as_slice() {
            [min, max] => Ok(Interval::new(
                f64::from_str(min).map_err(|_| malformed())?,
                f64::from_str(max).map_err(|_| malformed())?,
            )),
            _ => Err(malformed()),
        }
    }
}

impl TryFrom<String> for Interval {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

///
/// Parameters of the event generator, the `ToyMC` section of the config file.
///
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ToyMcConfig {
    #[serde(rename = "QClusterAlgo")]
    pub(crate) qcluster_algo: ChargeModelKind,
    // PE variation on the (fake) reconstructed flash
    #[serde(rename = "PEVariation")]
    pub(crate) pe_variation: f64,
    // Photon estimation variation
    pub(crate) light_yield_variation: f64,
    pub(crate) time_algo: TimeAlgo,
    pub(crate) track_algo: TrackAlgo,
    // Number of tracks to generate at once
    pub(crate) num_tracks: usize,
    // Periods in micro-seconds
    #[serde(rename = "PeriodTPC")]
    pub(crate) period_tpc: Interval,
    #[serde(rename = "PeriodPMT")]
    pub(crate) period_pmt: Interval,
    pub(crate) min_track_length: f64,
    #[serde(rename = "MinFlashPE")]
    pub(crate) min_flash_pe: f64,
    // Non-zero enables truncation of TPC tracks (readout effect)
    #[serde(rename = "TruncateTPC")]
    pub(crate) truncate_tpc: f64,
    #[serde(default)]
    pub(crate) numpy_seed: Option<f64>,
    #[serde(default)]
    pub(crate) synthetic_joint_test: JointTestPolarity,
}

impl ToyMcConfig {
    pub(crate) fn truncate_tpc(&self) -> bool {
        self.truncate_tpc != 0.0
    }

    /// Seed of the run. A negative seed is replaced by the current time,
    /// and `None` means the stream is seeded from OS entropy.
    pub(crate) fn resolve_seed(&self) -> Option<u64> {
        self.numpy_seed.map(|seed| {
            if seed < 0.0 {
                let seed = Utc::now().timestamp().unsigned_abs();
                info!("Seeding from current time: {seed}");
                seed
            } else {
                seed as u64
            }
        })
    }

    /// Creates the random stream shared by every stochastic draw of the run.
    pub(crate) fn make_rng(&self) -> StdRng {
        match self.resolve_seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

///
/// This struct is created from the configuration JSON file.
///
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Config {
    #[serde(rename = "ToyMC")]
    pub(crate) toy_mc: ToyMcConfig,
    pub(crate) detector_specs: DetectorSpecs,
    pub(crate) light_path: LightPath,
    pub(crate) inverse_square_hypothesis: InverseSquareConfig,
    pub(crate) scan_match: ScanMatchConfig,
}

impl Config {
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config: Config =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Json {
                path: path.to_owned(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the parameters that would otherwise stall or break the models.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.light_path.validate()?;
        self.scan_match.validate()?;
        Ok(())
    }
}

/// Picks the explicitly given config file, or the default one under `base_dir`.
pub(crate) fn resolve_path(
    config: Option<PathBuf>,
    base_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    match (config, base_dir) {
        (Some(config), _) => Ok(config),
        (None, Some(base_dir)) => Ok(DEFAULT_CONFIG_FILE
            .iter()
            .fold(base_dir, |path, part| path.join(part))),
        (None, None) => Err(ConfigError::MissingBaseDir),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::Rng;

    pub(crate) const CONFIG: &str = r#"{
        "ToyMC": {
            "QClusterAlgo": "LightPath",
            "PEVariation": 0.0,
            "LightYieldVariation": 0.0,
            "TimeAlgo": "periodic",
            "TrackAlgo": "top-bottom",
            "NumTracks": 4,
            "PeriodTPC": "[-1000, 1000]",
            "PeriodPMT": "[0,100]",
            "MinTrackLength": 5.0,
            "MinFlashPE": 1.0,
            "TruncateTPC": 1,
            "NumpySeed": 7
        },
        "DetectorSpecs": {
            "ActiveVolume": { "Min": [-200, -200, 0], "Max": [200, 200, 500] },
            "DriftVelocity": 0.156,
            "PMTPositions": [[-213, 0, 125], [-213, 0, 375], [213, 0, 125], [213, 0, 375]]
        },
        "LightPath": { "SegmentSize": 0.5, "LightYield": 24000, "MIPdEdx": 2.07 },
        "InverseSquareHypothesis": { "GlobalQE": 0.0093, "SensorArea": 324 },
        "ScanMatch": { "StepSize": 1.0 }
    }"#;

    pub(crate) fn config() -> Config {
        serde_json::from_str(CONFIG).unwrap()
    }

    #[test]
    fn test_parse_config() {
        let config = config();
        assert!(config.validate().is_ok());
        let toy_mc = config.toy_mc;
        assert_eq!(toy_mc.qcluster_algo, ChargeModelKind::LightPath);
        assert_eq!(toy_mc.time_algo, TimeAlgo::Periodic);
        assert_eq!(toy_mc.track_algo, TrackAlgo::TopBottom);
        assert_eq!(toy_mc.num_tracks, 4);
        assert_eq!(toy_mc.period_tpc, Interval::new(-1000.0, 1000.0));
        assert_eq!(toy_mc.period_pmt, Interval::new(0.0, 100.0));
        assert!(toy_mc.truncate_tpc());
        assert_eq!(toy_mc.numpy_seed, Some(7.0));
        assert_eq!(toy_mc.synthetic_joint_test, JointTestPolarity::Inverted);
    }

    #[test]
    fn test_unknown_time_algo() {
        let text = CONFIG.replace(r#""periodic""#, r#""sometimes""#);
        let error = serde_json::from_str::<Config>(&text).unwrap_err();
        assert!(error.to_string().contains("Time algo not recognized"));
    }

    #[test]
    fn test_unknown_track_algo() {
        let text = CONFIG.replace(r#""top-bottom""#, r#""left-right""#);
        let error = serde_json::from_str::<Config>(&text).unwrap_err();
        assert!(error.to_string().contains("Track algo not recognized"));
    }

    #[test]
    fn test_missing_key() {
        let text = CONFIG.replace(r#""MinFlashPE": 1.0,"#, "");
        let error = serde_json::from_str::<Config>(&text).unwrap_err();
        assert!(error.to_string().contains("MinFlashPE"));
    }

    #[test]
    fn test_interval_parse() {
        assert_eq!(
            "[-1000,1000]".parse::<Interval>().unwrap(),
            Interval::new(-1000.0, 1000.0)
        );
        assert_eq!(
            " [ 1.5 , 2e3 ] ".parse::<Interval>().unwrap(),
            Interval::new(1.5, 2000.0)
        );
        for malformed in ["-1000,1000", "[1,2,3]", "[1]", "[a,b]", ""] {
            assert!(matches!(
                malformed.parse::<Interval>(),
                Err(ConfigError::MalformedInterval(_))
            ));
        }
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let toy_mc = config().toy_mc;
        let mut rng = toy_mc.make_rng();
        let a: Vec<f64> = (0..5).map(|_| rng.random()).collect();
        let mut rng = toy_mc.make_rng();
        let b: Vec<f64> = (0..5).map(|_| rng.random()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_policy() {
        let mut toy_mc = config().toy_mc;
        assert_eq!(toy_mc.resolve_seed(), Some(7));

        toy_mc.numpy_seed = Some(7.9);
        assert_eq!(toy_mc.resolve_seed(), Some(7));

        toy_mc.numpy_seed = None;
        assert_eq!(toy_mc.resolve_seed(), None);

        toy_mc.numpy_seed = Some(-1.0);
        let before = Utc::now().timestamp().unsigned_abs();
        let seed = toy_mc.resolve_seed().unwrap();
        let after = Utc::now().timestamp().unsigned_abs();
        assert!((before..=after).contains(&seed));
    }

    #[test]
    fn test_shipped_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../dat/flashmatch.json");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.detector_specs.pmt_positions().len(), 24);
        assert_eq!(config.toy_mc.num_tracks, 10);
        assert_eq!(config.toy_mc.numpy_seed, Some(1.0));
        assert_eq!(
            config.toy_mc.synthetic_joint_test,
            JointTestPolarity::Direct
        );
    }

    #[test]
    fn test_invalid_step_size() {
        let text = CONFIG.replace(r#""StepSize": 1.0"#, r#""StepSize": 0.0"#);
        let config: Config = serde_json::from_str(&text).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive("StepSize", _))
        ));
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            resolve_path(Some("a.json".into()), Some("/base".into())).unwrap(),
            PathBuf::from("a.json")
        );
        assert_eq!(
            resolve_path(None, Some("/base".into())).unwrap(),
            PathBuf::from("/base/dat/flashmatch.json")
        );
        assert!(matches!(
            resolve_path(None, None),
            Err(ConfigError::MissingBaseDir)
        ));
    }
}
