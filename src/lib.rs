//! dutyscope crate root: re-exports and module wiring.
//!
//! Replays a decoded digital bus trace and reports, for a sliding window ending at a
//! playback cursor, how much of the window each bit spent high. The result drives a
//! per-bit brightness readout that makes PWM-dimmed LEDs visible at human speed.
//!
//! Modules:
//! - `data`: bus values, the transition timeline, duty-cycle strategies, time labels
//! - `controllers`: single-slot result buffer fed by a background worker
//! - `playback`: frame-driven cursor clock producing renderable frames
//! - `config`: run configuration
//! - `source`: loading decoded trace dumps
//! - `logging`: tracing subscriber setup for the binary

pub mod config;
pub mod controllers;
pub mod data;
pub mod error;
pub mod logging;
pub mod playback;
pub mod source;

// Public re-exports for a compact external API
pub use config::PlaybackConfig;
pub use controllers::BrightnessController;
pub use data::bus::{BitOrder, BusValue};
pub use data::duty::{duty_cycle, DutyEngine, DutySnapshot, DutyStrategy, Window};
pub use data::time_format::{ElapsedFormatter, TimeUnit};
pub use data::timeline::{Timeline, TimelineCursor, Transition};
pub use error::{Error, Result};
pub use playback::{Frame, LedReadout, Playback};
pub use source::{load_timeline, TraceDump};
