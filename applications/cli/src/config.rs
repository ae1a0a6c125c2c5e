/// CLI configuration
use crate::error::{CliError, Result};
use lumen_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file used when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "lumen.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub simulation: SimulationSettings,
}

/// Knobs for the simulated engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// Buffering notifications sent before an engine reports ready
    #[serde(default = "default_buffering_ticks")]
    pub buffering_ticks: u32,

    /// First engine falls behind the live window once it is ready
    #[serde(default)]
    pub inject_live_window_drift: bool,

    /// An engine fails to initialize its video decoder once it is ready
    #[serde(default)]
    pub inject_decoder_failure: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            buffering_ticks: default_buffering_ticks(),
            inject_live_window_drift: false,
            inject_decoder_failure: false,
        }
    }
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist. Without one, `lumen.toml` in the
    /// working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (LUMEN_PLAYBACK__INITIAL_RATE=1.5)
        settings = settings.add_source(
            config::Environment::with_prefix("LUMEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.playback.validate()?;
        Ok(())
    }
}

fn default_buffering_ticks() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_playback::LifecycleMode;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_sections() {
        let file = write_config("");
        let config = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.simulation.buffering_ticks, 2);
    }

    #[test]
    fn reads_playback_and_simulation_sections() {
        let file = write_config(
            r#"
            [playback]
            initial_rate = 1.5
            lifecycle = "foreground"
            picture_in_picture = false

            [simulation]
            buffering_ticks = 0
            inject_live_window_drift = true
            "#,
        );

        let config = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.playback.initial_rate, 1.5);
        assert_eq!(config.playback.lifecycle, LifecycleMode::Foreground);
        assert!(!config.playback.picture_in_picture);
        assert!(config.playback.default_auto_play);
        assert_eq!(config.simulation.buffering_ticks, 0);
        assert!(config.simulation.inject_live_window_drift);
        assert!(!config.simulation.inject_decoder_failure);
    }

    #[test]
    fn rejects_out_of_range_rate() {
        let file = write_config("[playback]\ninitial_rate = 4.0\n");
        assert!(matches!(
            CliConfig::load(Some(file.path())),
            Err(CliError::Playback(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            CliConfig::load(Some(&path)),
            Err(CliError::Config(_))
        ));
    }
}
