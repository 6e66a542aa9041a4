//! Configuration for a playback run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::bus::BitOrder;
use crate::data::duty::DutyStrategy;
use crate::data::time_format::ElapsedFormatter;
use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Limits
// ─────────────────────────────────────────────────────────────────────────────

/// Highest frame rate with a non-zero whole-millisecond frame interval.
pub const MAX_FPS: u32 = 1000;

/// Slowest playback-speed multiplier accepted by [`crate::playback::Playback::set_speed`].
pub const MIN_SPEED: f64 = 0.05;
/// Fastest playback-speed multiplier accepted by [`crate::playback::Playback::set_speed`].
pub const MAX_SPEED: f64 = 5.0;

// ─────────────────────────────────────────────────────────────────────────────
// PlaybackConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration, static for a run.
///
/// | Field       | Purpose |
/// |-------------|---------|
/// | `signal`    | Hierarchical name of the bus to replay |
/// | `fps`       | Render ticks per second |
/// | `speed`     | Playback-speed multiplier (window length and time step scale with it) |
/// | `source`    | Decoded trace dump to load |
/// | `width`     | Bus width in bits |
/// | `bit_order` | How token characters map onto bit indices |
/// | `strategy`  | Duty-cycle lookup strategy |
/// | `elapsed`   | Elapsed-time label format |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub signal: String,
    pub fps: u32,
    /// `1.0` is roughly realtime.
    pub speed: f64,
    pub source: PathBuf,
    pub width: usize,
    pub bit_order: BitOrder,
    pub strategy: DutyStrategy,
    pub elapsed: ElapsedFormatter,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            signal: "led_controller_tb.LEDS[3:0]".to_string(),
            fps: 25,
            speed: 1.0,
            source: PathBuf::from("wave.json"),
            width: 4,
            bit_order: BitOrder::MsbFirst,
            strategy: DutyStrategy::BinarySearch,
            elapsed: ElapsedFormatter::default(),
        }
    }
}

impl PlaybackConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = match Format::of(path)? {
            Format::Yaml => serde_yaml::from_str(&text)?,
            Format::Json => serde_json::from_str(&text)?,
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "loaded playback config");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the playback clock cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 || self.fps > MAX_FPS {
            return Err(Error::InvalidConfig(format!(
                "fps must be between 1 and {MAX_FPS}, got {}",
                self.fps
            )));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "speed must be a positive number, got {}",
                self.speed
            )));
        }
        Ok(())
    }
}

/// File formats understood by the config and trace loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Yaml,
    Json,
}

impl Format {
    pub(crate) fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Ok(Format::Yaml)
            }
            _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
        }
    }
}
