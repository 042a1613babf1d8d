//! Application configuration
//!
//! Loaded from `~/.config/rondo/config.toml`; every field has a default so a
//! missing file or a partial file both work. Credentials are deliberately not
//! part of the file, they come from the environment (see
//! [`crate::messenger::Credentials`]).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::encode::EncoderSpec;
use crate::error::{Result, RondoError};
use crate::session::CaptureLoopConfig;

/// Rondo configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RondoConfig {
    /// Edge length of the square video note in pixels
    pub note_size: u32,
    /// Target capture frame rate
    pub fps: u32,
    /// Hard wall-clock cap on a recording, in seconds
    pub max_duration_secs: u64,
    /// Bounded wait for the encoder to exit after input closes, in seconds
    pub finish_timeout_secs: u64,
    /// Settling delay before delivery re-validates the artifact, in ms
    pub settle_delay_ms: u64,
    /// x264 CRF quality
    pub crf: u8,
    /// x264 preset
    pub preset: String,
    /// Transient artifact path (relative to the working directory)
    pub output_path: PathBuf,
    /// Maximum destinations fetched from the messaging client
    pub destination_limit: usize,
    /// Hotkey bindings
    pub hotkeys: HotkeyConfig,
}

/// Hotkey bindings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Show overlay / start recording / stop recording
    pub toggle: String,
    /// Hide everything, cancel in-flight recording
    pub cancel: String,
}

impl Default for RondoConfig {
    fn default() -> Self {
        Self {
            note_size: 400,
            fps: 25,
            max_duration_secs: 60,
            finish_timeout_secs: 5,
            settle_delay_ms: 500,
            crf: 26,
            preset: "ultrafast".to_string(),
            output_path: PathBuf::from("video_note.mp4"),
            destination_limit: 60,
            hotkeys: HotkeyConfig::default(),
        }
    }
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            toggle: "f10".to_string(),
            cancel: "esc".to_string(),
        }
    }
}

impl RondoConfig {
    /// Path of the user config file, if a config directory exists
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rondo").join("config.toml"))
    }

    /// Load the user config, falling back to defaults when the file is absent
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a config file
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RondoError::config(format!("cannot read {:?}: {}", path, e)))?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Write the config to the user config path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| RondoError::config("no config directory available"))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)
            .map_err(|e| RondoError::config(format!("cannot serialize config: {}", e)))?;
        std::fs::write(&path, text)?;
        info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Check the config for values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.note_size == 0 || self.note_size % 2 != 0 {
            return Err(RondoError::config(format!(
                "note_size must be even and non-zero, got {}",
                self.note_size
            )));
        }
        if self.fps == 0 || self.fps > 60 {
            return Err(RondoError::config(format!(
                "fps must be in 1..=60, got {}",
                self.fps
            )));
        }
        if self.max_duration_secs == 0 {
            return Err(RondoError::config("max_duration_secs must be non-zero"));
        }
        if self.crf > 51 {
            return Err(RondoError::config(format!(
                "crf must be in 0..=51, got {}",
                self.crf
            )));
        }
        Ok(())
    }

    /// Ideal spacing between captured frames
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }

    /// Hard session cap as a duration
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    /// Encoder finalize timeout as a duration
    pub fn finish_timeout(&self) -> Duration {
        Duration::from_secs(self.finish_timeout_secs)
    }

    /// Delivery settling delay as a duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Timing parameters for the capture loop
    pub fn capture_loop(&self) -> CaptureLoopConfig {
        CaptureLoopConfig {
            frame_interval: self.frame_interval(),
            duration_cap: self.max_duration(),
            finish_timeout: self.finish_timeout(),
        }
    }

    /// Fixed encoder invocation for one session
    pub fn encoder_spec(&self) -> EncoderSpec {
        EncoderSpec {
            width: self.note_size,
            height: self.note_size,
            fps: self.fps,
            crf: self.crf,
            preset: self.preset.clone(),
            output: self.output_path.clone(),
        }
    }
}
