//! Operator settings stored in `<jungle>/jungle.toml`.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{JungleError, Result};

/// Jungle configuration (TOML).
///
/// Every field is optional in the file; missing fields take the defaults.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct JungleConfig {
    /// Announce skipped and deleted versions. Same as `-v`.
    pub verbose: bool,

    pub prune: PruneConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PruneConfig {
    /// Smallest version count `prune --iterations` may shrink the jungle to.
    pub min_keep: usize,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self { min_keep: 1 }
    }
}

impl Default for JungleConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            prune: PruneConfig::default(),
        }
    }
}

impl JungleConfig {
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.prune.min_keep == 0 {
            return Err("prune.min_keep must be > 0".to_string());
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `JungleConfig::default()`.
pub fn load_config(path: &Path) -> Result<JungleConfig> {
    let invalid = |message: String| JungleError::Config {
        path: path.to_path_buf(),
        message,
    };
    if !path.exists() {
        return Ok(JungleConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(JungleError::io("read config", path))?;
    let cfg: JungleConfig = toml::from_str(&contents).map_err(|err| invalid(err.to_string()))?;
    cfg.validate().map_err(invalid)?;
    debug!(path = %path.display(), ?cfg, "loaded config");
    Ok(cfg)
}
