//! Tuning knobs for the reconciliation engine

use crate::matcher::Matcher;
use collab_config::MatchingConfig;

/// Matching constants used while applying patches and relocating the cursor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    /// Maximum distance to search from the expected location
    pub match_distance: usize,

    /// Match threshold when applying patches
    pub patch_threshold: f64,

    /// Match threshold when restoring the cursor; looser than for patches
    pub restore_threshold: f64,

    /// Longest pattern the matcher handles in one piece
    pub max_bits: usize,

    /// Context around each patch, and the null padding length
    pub patch_margin: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        let defaults = MatchingConfig::default();
        Self {
            match_distance: defaults.match_distance,
            patch_threshold: defaults.patch_threshold,
            restore_threshold: defaults.restore_threshold,
            max_bits: defaults.max_bits,
            patch_margin: defaults.patch_margin,
        }
    }
}

impl TryFrom<&MatchingConfig> for MatchConfig {
    type Error = crate::SyncError;

    fn try_from(config: &MatchingConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            match_distance: config.match_distance,
            patch_threshold: config.patch_threshold,
            restore_threshold: config.restore_threshold,
            max_bits: config.max_bits,
            patch_margin: config.patch_margin,
        })
    }
}

impl MatchConfig {
    /// Matcher used to locate each patch
    pub fn patch_matcher(&self) -> Matcher {
        Matcher::new(self.match_distance, self.patch_threshold, self.max_bits)
    }

    /// Matcher used to find the cursor again after the text changed
    pub fn restore_matcher(&self) -> Matcher {
        Matcher::new(self.match_distance, self.restore_threshold, self.max_bits)
    }

    /// Width of the prefix/suffix windows captured around the cursor
    pub fn cursor_window(&self) -> usize {
        self.max_bits / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_config_file_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.match_distance, 1000);
        assert_eq!(config.patch_threshold, 0.6);
        assert_eq!(config.restore_threshold, 0.9);
        assert_eq!(config.cursor_window(), 16);
    }

    #[test]
    fn test_invalid_file_config_is_rejected() {
        let file = MatchingConfig {
            restore_threshold: -0.1,
            ..Default::default()
        };
        let err = MatchConfig::try_from(&file).unwrap_err();
        assert!(matches!(err, crate::SyncError::ConfigError(_)));
    }
}
