//! Configuration for the core: sensor geometry, gesture thresholds, run loop
//! cadence and input device selection.
//!
//! Every section has defaults, so an empty JSON object is a valid config.
//! Players disagree on comfortable timings (a 0.5s or 0.6s double-tap window,
//! a 1s or 2s long press), so the thresholds are configurable.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    geom::SensorSpace,
};

/// Top-level core configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Touch sensor resolution.
    pub sensor: SensorConfig,
    /// Gesture classification thresholds.
    pub gesture: GestureConfig,
    /// Application loop cadence.
    pub runloop: LoopConfig,
    /// Touch device discovery.
    pub input: InputConfig,
}

impl Config {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check values that would make the core misbehave.
    pub fn validate(&self) -> Result<()> {
        self.sensor.space()?;
        if self.runloop.frame_interval_ms == 0 {
            return Err(Error::Config("runloop.frame_interval_ms must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.gesture.swipe_fraction) {
            return Err(Error::Config(
                "gesture.swipe_fraction must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Touch sensor resolution in device units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Sensor width.
    pub width: u32,
    /// Sensor height.
    pub height: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        let s = SensorSpace::default();
        Self {
            width: s.width,
            height: s.height,
        }
    }
}

impl SensorConfig {
    /// The sensor space described by this section.
    pub fn space(&self) -> Result<SensorSpace> {
        Ok(SensorSpace::new(self.width, self.height)?)
    }
}

/// Gesture thresholds. Distances are sensor units, times are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Maximum per-axis travel for a tap.
    pub tap_distance: i32,
    /// A contact shorter than this may be a tap.
    pub tap_time_ms: u64,
    /// Two taps closer together than this form a double tap.
    pub double_tap_window_ms: u64,
    /// A stationary contact longer than this is a long press.
    pub long_press_time_ms: u64,
    /// Maximum per-axis travel for a long press.
    pub long_press_distance: i32,
    /// Minimum travel, as a fraction of the sensor dimension, for a swipe.
    pub swipe_fraction: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_distance: 30,
            tap_time_ms: 300,
            double_tap_window_ms: 500,
            long_press_time_ms: 2000,
            long_press_distance: 20,
            swipe_fraction: 0.1,
        }
    }
}

impl GestureConfig {
    /// Tap time as a duration.
    pub fn tap_time(&self) -> Duration {
        Duration::from_millis(self.tap_time_ms)
    }

    /// Double-tap window as a duration.
    pub fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.double_tap_window_ms)
    }

    /// Long-press time as a duration.
    pub fn long_press_time(&self) -> Duration {
        Duration::from_millis(self.long_press_time_ms)
    }
}

/// Application loop cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Minimum time between two renders (33ms caps output at ~30Hz).
    pub frame_interval_ms: u64,
    /// Sleep between loop iterations.
    pub idle_sleep_ms: u64,
    /// The key that quits the application.
    pub quit_key: char,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 33,
            idle_sleep_ms: 10,
            quit_key: 'q',
        }
    }
}

impl LoopConfig {
    /// Frame interval as a duration.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Idle sleep as a duration.
    pub fn idle_sleep(&self) -> Duration {
        Duration::from_millis(self.idle_sleep_ms)
    }
}

/// Touch device discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Case-insensitive name fragments identifying the touch controller.
    pub device_names: Vec<String>,
    /// Read timeout for the input thread, bounding how long a stop request waits.
    pub poll_timeout_ms: u16,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device_names: ["ft5x06", "10-0038", "generic ft5x06", "edt-ft5x06"]
                .into_iter()
                .map(String::from)
                .collect(),
            poll_timeout_ms: 100,
        }
    }
}
