//! Loading already-decoded traces into a [`Timeline`].
//!
//! Decoding the simulator's waveform format happens upstream; this module reads its
//! output, a dump of `(timestamp, token)` pairs per signal:
//!
//! ```json
//! {
//!   "end_time": 5000,
//!   "signals": {
//!     "led_controller_tb.LEDS[3:0]": [[0, "0000"], [1000, "0001"], [3000, "0000"]]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{Format, PlaybackConfig};
use crate::data::timeline::Timeline;
use crate::error::{Error, Result};

// ---------- Serializable dump ----------

/// A decoded trace: raw value tokens per signal plus the total simulated time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceDump {
    /// Total simulated duration; defaults to the last transition of the signal.
    #[serde(default)]
    pub end_time: Option<u64>,
    pub signals: BTreeMap<String, Vec<(u64, String)>>,
}

impl TraceDump {
    /// Build the timeline for `config.signal` using the configured width and bit order.
    pub fn timeline(&self, config: &PlaybackConfig) -> Result<Timeline> {
        let pairs = self
            .signals
            .get(&config.signal)
            .ok_or_else(|| Error::SignalNotFound(config.signal.clone()))?;
        let timeline = Timeline::from_tokens(
            config.width,
            config.bit_order,
            pairs.iter().map(|(t, token)| (*t, token.as_str())),
        )?;
        Ok(match self.end_time {
            Some(end) => timeline.with_end_time(end),
            None => timeline,
        })
    }

    pub fn signal_names(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }
}

// ---------- Public API ----------

/// Parse a dump from JSON.
pub fn dump_from_json(json: &str) -> Result<TraceDump> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a dump from YAML.
pub fn dump_from_yaml(yaml: &str) -> Result<TraceDump> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load a dump from a `.json` or `.yaml`/`.yml` file.
pub fn load_dump_from_path(path: &Path) -> Result<TraceDump> {
    let txt = std::fs::read_to_string(path)?;
    let dump = match Format::of(path)? {
        Format::Json => dump_from_json(&txt)?,
        Format::Yaml => dump_from_yaml(&txt)?,
    };
    tracing::debug!(path = %path.display(), signals = dump.signals.len(), "loaded trace dump");
    Ok(dump)
}

/// Load `config.source` and build the timeline of `config.signal`.
pub fn load_timeline(config: &PlaybackConfig) -> Result<Timeline> {
    let timeline = load_dump_from_path(&config.source)?.timeline(config)?;
    tracing::info!(
        signal = %config.signal,
        transitions = timeline.len(),
        end_time = timeline.end_time(),
        "loaded timeline"
    );
    Ok(timeline)
}
