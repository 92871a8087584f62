//! # Lootrun Configuration
//!
//! Loaded once from TOML. Every field has a default, so an empty file is a
//! valid config.
//!
//! ```toml
//! directory = "lootruns"
//!
//! [recording]
//! min_step = 2.0
//!
//! [path]
//! sample_rate = 10
//! break_distance = 32.0
//! segment_break_distance = 32.0
//!
//! [colors]
//! rainbow = true
//! cycle_distance = 20
//! active = 0xFF55FFFF
//! recording = 0xFFFF5555
//! ```

use std::path::{Path, PathBuf};

use lootrun_compiler::{ColorPolicy, CompileSettings};
use lootrun_shared::Argb;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootrunConfig {
    /// Directory holding saved recordings.
    pub directory: PathBuf,
    /// Recording tuning.
    pub recording: RecordingConfig,
    /// Resampling and segmenting tuning.
    pub path: PathConfig,
    /// Line colors.
    pub colors: ColorConfig,
}

impl Default for LootrunConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("lootruns"),
            recording: RecordingConfig::default(),
            path: PathConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

/// Recording tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Minimum distance moved before a new point is recorded.
    pub min_step: f64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self { min_step: 2.0 }
    }
}

/// Resampling and segmenting tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Resampled points per block.
    pub sample_rate: u32,
    /// Raw jump that splits the path into independent runs.
    pub break_distance: f64,
    /// Sample jump that starts a new render segment.
    pub segment_break_distance: f64,
}

impl Default for PathConfig {
    fn default() -> Self {
        let settings = CompileSettings::default();
        Self {
            sample_rate: settings.sample_rate,
            break_distance: settings.break_distance,
            segment_break_distance: settings.segment_break_distance,
        }
    }
}

/// Line colors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Rainbow coloring for active lootruns.
    pub rainbow: bool,
    /// Rainbow cycle length, in units of 10 samples.
    pub cycle_distance: u32,
    /// Static color of active lootruns.
    pub active: Argb,
    /// Color of the recording preview.
    pub recording: Argb,
}

impl Default for ColorConfig {
    fn default() -> Self {
        let settings = CompileSettings::default();
        Self {
            rainbow: false,
            cycle_distance: 20,
            active: settings.active_color,
            recording: settings.preview_color,
        }
    }
}

impl LootrunConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or a value is out of range.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("Loaded lootrun config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Checks every value is in range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first bad value.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.path.sample_rate == 0 {
            return Err(ConfigError::Invalid("path.sample_rate must be at least 1".to_string()));
        }
        if !(self.path.break_distance > 0.0) {
            return Err(ConfigError::Invalid("path.break_distance must be positive".to_string()));
        }
        if !(self.path.segment_break_distance > 0.0) {
            return Err(ConfigError::Invalid(
                "path.segment_break_distance must be positive".to_string(),
            ));
        }
        if !(self.recording.min_step >= 0.0) {
            return Err(ConfigError::Invalid(
                "recording.min_step must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Compiler settings derived from this config.
    #[must_use]
    pub fn compile_settings(&self) -> CompileSettings {
        CompileSettings {
            sample_rate: self.path.sample_rate,
            break_distance: self.path.break_distance,
            segment_break_distance: self.path.segment_break_distance,
            color_policy: if self.colors.rainbow {
                ColorPolicy::Rainbow {
                    cycle_distance: self.colors.cycle_distance,
                }
            } else {
                ColorPolicy::Static
            },
            active_color: self.colors.active,
            preview_color: self.colors.recording,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LootrunConfig::from_toml_str("").unwrap();
        assert_eq!(config, LootrunConfig::default());
        assert_eq!(config.compile_settings(), CompileSettings::default());
    }

    #[test]
    fn test_partial_config() {
        let config = LootrunConfig::from_toml_str(
            r#"
directory = "/tmp/runs"

[colors]
rainbow = true
cycle_distance = 5
active = 0xFF00FF00
"#,
        )
        .unwrap();

        assert_eq!(config.directory, PathBuf::from("/tmp/runs"));
        assert_eq!(config.recording.min_step, 2.0);
        let settings = config.compile_settings();
        assert_eq!(settings.color_policy, ColorPolicy::Rainbow { cycle_distance: 5 });
        assert_eq!(settings.active_color, Argb(0xFF00_FF00));
        assert_eq!(settings.sample_rate, 10);
    }

    #[test]
    fn test_rejects_zero_sample_rate() {
        let result = LootrunConfig::from_toml_str("[path]\nsample_rate = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = LootrunConfig::from_toml_str("[path\nsample_rate = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
