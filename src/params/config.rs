//! Top-level simulation configuration, named presets and TOML loading.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{BreathingSettings, WaveMatrixSettings};
use crate::error::{Result, WaveError};
use crate::validation::ValidationContext;

/// Position update loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Cache capacity (bubble slots)
    pub max_elements: usize,

    /// Full position refresh rate (Hz), independent of host frame rate
    pub update_rate_hz: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            max_elements: 100,
            update_rate_hz: 15.0,
        }
    }
}

/// Named configuration presets shipped with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    Default,
    Calm,
    Dynamic,
}

/// Everything a host needs to stand the core up
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub wave: WaveMatrixSettings,
    pub breathing: BreathingSettings,
    pub provider: ProviderConfig,
    pub validation: ValidationContext,
}

impl SimulationConfig {
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Default => Self::default(),
            Preset::Calm => Self {
                wave: WaveMatrixSettings::calm(),
                breathing: BreathingSettings::calm(),
                ..Self::default()
            },
            Preset::Dynamic => Self {
                wave: WaveMatrixSettings::dynamic(),
                breathing: BreathingSettings::energetic(),
                ..Self::default()
            },
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// Missing sections and fields fall back to defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| WaveError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents).map_err(|source| WaveError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = self.to_toml_string()?;
        fs::write(path, contents).map_err(|source| WaveError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved simulation config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [wave]
            grid_width = 8
            grid_height = 8

            [wave.primary]
            amplitude = 0.7
            frequency = 0.9
            speed = 1.1
            "#,
        )
        .unwrap();

        assert_eq!(config.wave.grid_width, 8);
        assert_eq!(config.wave.primary.amplitude, 0.7);
        assert_eq!(config.wave.cell_spacing, 1.5);
        assert_eq!(config.breathing, BreathingSettings::default());
        assert_eq!(config.provider.max_elements, 100);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = SimulationConfig::from_preset(Preset::Dynamic);
        let toml_str = config.to_toml_string().unwrap();
        let parsed = SimulationConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SimulationConfig::load_from_path("/nonexistent/bubblewave.toml");
        assert!(matches!(result, Err(WaveError::ConfigIo { .. })));
    }

    #[test]
    fn test_invalid_toml_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[wave\ngrid_width = ").unwrap();

        let result = SimulationConfig::load_from_path(&path);
        assert!(matches!(result, Err(WaveError::ConfigParse { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bubblewave.toml");
        let config = SimulationConfig::from_preset(Preset::Calm);
        config.save(&path).unwrap();
        assert_eq!(SimulationConfig::load_from_path(&path).unwrap(), config);
    }
}
