//! Configuration management for the collaboration plugin
//!
//! This crate handles loading and validating `.collab/config.toml`

use collab_common::{CollabError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Location of the config file relative to the project root
pub const CONFIG_FILE: &str = ".collab/config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Project root path (set programmatically, not in TOML)
    #[serde(skip)]
    pub root: PathBuf,

    /// Fuzzy matching settings
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Shared session settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Fuzzy matching configuration ([matching])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// How far (in characters) from the expected location a match may be
    #[serde(default = "default_match_distance")]
    pub match_distance: usize,

    /// Match threshold for applying patches (0.0 = exact, 1.0 = anything)
    #[serde(default = "default_patch_threshold")]
    pub patch_threshold: f64,

    /// Match threshold for relocating the cursor after a text change
    #[serde(default = "default_restore_threshold")]
    pub restore_threshold: f64,

    /// Longest pattern the matcher handles in one piece
    #[serde(default = "default_max_bits")]
    pub max_bits: usize,

    /// Context kept around each patch, also the null padding length
    #[serde(default = "default_patch_margin")]
    pub patch_margin: usize,
}

fn default_match_distance() -> usize {
    1000
}
fn default_patch_threshold() -> f64 {
    0.6
}
fn default_restore_threshold() -> f64 {
    0.9
}
fn default_max_bits() -> usize {
    32
}
fn default_patch_margin() -> usize {
    4
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            match_distance: default_match_distance(),
            patch_threshold: default_patch_threshold(),
            restore_threshold: default_restore_threshold(),
            max_bits: default_max_bits(),
            patch_margin: default_patch_margin(),
        }
    }
}

/// Session configuration ([session])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Handle of the local user; shown first in the collaborator list
    #[serde(default)]
    pub user: String,

    /// Delay before the transport polls again after outbound delivery
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl SessionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    /// Load configuration from the project root
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self {
                root: root.to_path_buf(),
                ..Default::default()
            });
        }

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| CollabError::ConfigError(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_toml_str(&content)?;
        config.root = root.to_path_buf();
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config
            .validate()
            .map_err(|e| CollabError::ConfigError(e.to_string()))?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.matching.validate()
    }
}

impl MatchingConfig {
    /// Validate the matching knobs
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("patch_threshold", self.patch_threshold),
            ("restore_threshold", self.restore_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} must be between 0.0 and 1.0, got {}", name, value);
            }
        }
        if self.max_bits == 0 || self.max_bits > 64 {
            anyhow::bail!("max_bits must be between 1 and 64, got {}", self.max_bits);
        }
        if self.patch_margin * 2 >= self.max_bits {
            anyhow::bail!(
                "patch_margin ({}) must be less than half of max_bits ({})",
                self.patch_margin,
                self.max_bits
            );
        }
        Ok(())
    }
}
