//! Calibration and track settings loaded from a TOML file.

use crate::error::ConfigError;
use crate::models::engine::HitWindow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_perfect() -> f64 {
    0.08
}
fn default_great() -> f64 {
    0.18
}
fn default_meh() -> f64 {
    0.3
}
fn default_press() -> f64 {
    0.1
}
fn default_base_offset() -> f64 {
    0.32
}
fn default_music_delay() -> f64 {
    3.0
}
fn default_activate() -> f64 {
    3.0
}
fn default_speed() -> f64 {
    10.0
}
fn default_fixed_tick_rate() -> u32 {
    50
}
fn default_frame_rate() -> u32 {
    144
}

/// Offsets and thresholds, all in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSettings {
    #[serde(default = "default_perfect")]
    pub perfect_threshold: f64,
    #[serde(default = "default_great")]
    pub great_threshold: f64,
    #[serde(default = "default_meh")]
    pub meh_threshold: f64,

    /// How long a press stays latched waiting for a judgeable note.
    #[serde(default = "default_press")]
    pub press_threshold: f64,

    #[serde(default = "default_base_offset")]
    pub base_offset: f64,
    /// Visual calibration.
    #[serde(default)]
    pub custom_offset: f64,
    /// Audio calibration.
    #[serde(default)]
    pub custom_audio_offset: f64,

    #[serde(default = "default_music_delay")]
    pub music_delay: f64,
    #[serde(default)]
    pub start_time: f64,

    /// Lookahead before a note's time at which it becomes visible.
    #[serde(default = "default_activate")]
    pub note_activate_time: f64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            perfect_threshold: default_perfect(),
            great_threshold: default_great(),
            meh_threshold: default_meh(),
            press_threshold: default_press(),
            base_offset: default_base_offset(),
            custom_offset: 0.0,
            custom_audio_offset: 0.0,
            music_delay: default_music_delay(),
            start_time: 0.0,
            note_activate_time: default_activate(),
        }
    }
}

/// Track layout and loop cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSettings {
    #[serde(default)]
    pub origin_x: f64,
    /// Screen units per second.
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Pre-roll countdown in seconds; the music delay when absent.
    #[serde(default)]
    pub pre_roll_time: Option<f64>,
    #[serde(default = "default_fixed_tick_rate")]
    pub fixed_tick_rate: u32,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// 0 builds every note up front; otherwise the size of the note pool.
    #[serde(default)]
    pub pool_size: usize,
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            speed: default_speed(),
            pre_roll_time: None,
            fixed_tick_rate: default_fixed_tick_rate(),
            frame_rate: default_frame_rate(),
            pool_size: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub calibration: CalibrationSettings,
    #[serde(default)]
    pub track: TrackSettings,
}

impl Settings {
    /// Loads settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::warn!("SETTINGS: {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&content)?;
        log::info!("SETTINGS: Loaded {:?}", path);
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.calibration;
        if !(c.perfect_threshold > 0.0
            && c.perfect_threshold < c.great_threshold
            && c.great_threshold < c.meh_threshold)
        {
            return Err(ConfigError::ThresholdOrder {
                perfect: c.perfect_threshold,
                great: c.great_threshold,
                meh: c.meh_threshold,
            });
        }

        let positive = [
            ("press_threshold", c.press_threshold),
            ("note_activate_time", c.note_activate_time),
            ("speed", self.track.speed),
            ("fixed_tick_rate", self.track.fixed_tick_rate as f64),
            ("frame_rate", self.track.frame_rate as f64),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    pub fn hit_window(&self) -> HitWindow {
        let c = &self.calibration;
        HitWindow::from_custom(c.perfect_threshold, c.great_threshold, c.meh_threshold)
    }

    pub fn pre_roll_time(&self) -> f64 {
        self.track
            .pre_roll_time
            .unwrap_or(self.calibration.music_delay)
            .max(0.0)
    }
}
