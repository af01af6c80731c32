//! Stochastic building blocks of a synthetic event: tracks, flash timing,
//! detector noise and readout truncation.
pub(crate) mod noise;
pub(crate) mod timing;
pub(crate) mod trajectory;
pub(crate) mod truncate;

pub(crate) use noise::NoiseInjector;
pub(crate) use timing::TimingModel;
pub(crate) use trajectory::TrajectoryGenerator;
pub(crate) use truncate::Truncator;
