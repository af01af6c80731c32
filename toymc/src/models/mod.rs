//! Simple stand-ins for the detector description, the charge and light models
//! and the flash matcher, so that the generator can run end to end.
pub(crate) mod detector;
pub(crate) mod hypothesis;
pub(crate) mod light_path;
pub(crate) mod scan_match;

use crate::error::ConfigError;
use serde::Deserialize;
use strum::{Display, EnumString};

/// Charge models selectable with `QClusterAlgo`.
#[derive(Clone, Copy, Debug, PartialEq, EnumString, Display, Deserialize)]
#[serde(try_from = "String")]
pub(crate) enum ChargeModelKind {
    LightPath,
}

impl TryFrom<String> for ChargeModelKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map_err(|_| ConfigError::UnknownChargeModel(value))
    }
}
