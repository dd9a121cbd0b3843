use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ccs::RenderStyle;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Pn2CcsConfig {
    /// Seed for the synchroniser's pairing order; OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub render: RenderStyle,
    /// Rewrite group-choice nets before encoding them.
    #[serde(default = "default_synchronize")]
    pub synchronize: bool,
    #[serde(default)]
    pub dot_output: Option<PathBuf>,
}

impl Default for Pn2CcsConfig {
    fn default() -> Self {
        Self {
            seed: None,
            render: RenderStyle::default(),
            synchronize: default_synchronize(),
            dot_output: None,
        }
    }
}

impl Pn2CcsConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn default_synchronize() -> bool {
    true
}
