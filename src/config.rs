//! Configuration file support
//!
//! Everything has a default, so a missing file or an empty one is valid.
//!
//! ```toml
//! [timing]
//! boot_delay_ms = 3000
//! response_delay_min_ms = 500
//! response_delay_max_ms = 1500
//!
//! [ui]
//! default_lab = "injection"
//!
//! [log]
//! file = "cyberlab.log"
//! level = "info"
//! ```

use crate::LabError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub timing: TimingConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

/// Simulated latencies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub boot_delay_ms: u64,
    pub response_delay_min_ms: u64,
    pub response_delay_max_ms: u64,
    /// Fixed RNG seed for reproducible delays
    pub seed: Option<u64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            boot_delay_ms: 3000,
            response_delay_min_ms: 500,
            response_delay_max_ms: 1500,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Lab opened directly on start, skipping the picker
    pub default_lab: Option<String>,
    pub prompt: String,
    /// Number of commands kept for Up/Down recall
    pub history_limit: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_lab: None,
            prompt: crate::lab::DEFAULT_PROMPT.to_string(),
            history_limit: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub file: PathBuf,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("cyberlab.log"),
            level: "info".to_string(),
        }
    }
}

impl LabConfig {
    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: LabConfig =
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), LabError> {
        let timing = &self.timing;
        if timing.response_delay_min_ms > timing.response_delay_max_ms {
            return Err(LabError::Config(format!(
                "response_delay_min_ms ({}) is greater than response_delay_max_ms ({})",
                timing.response_delay_min_ms, timing.response_delay_max_ms
            )));
        }
        if self.ui.prompt.trim().is_empty() {
            return Err(LabError::Config("ui.prompt must not be empty".to_string()));
        }
        Ok(())
    }
}
