//! TOML configuration layer: lets a `--config` file override the
//! outlier-detection thresholds the core crate defaults to.

use std::path::Path;

use serde::Deserialize;
use tmplminer_core::constants::{OutlierThresholds, SINGLE_PARAM_THRESHOLD, SPURIOUS_PARAM_THRESHOLD};

use crate::error::CliError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    pub single_param_threshold: f64,
    pub spurious_param_threshold: f64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            single_param_threshold: SINGLE_PARAM_THRESHOLD,
            spurious_param_threshold: SPURIOUS_PARAM_THRESHOLD,
        }
    }
}

impl MinerConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn thresholds(&self) -> OutlierThresholds {
        OutlierThresholds {
            single_param: self.single_param_threshold,
            spurious_param: self.spurious_param_threshold,
        }
    }
}
