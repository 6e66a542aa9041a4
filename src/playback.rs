//! Frame-driven playback clock.
//!
//! Each tick evaluates a window ending at the cursor, produces one [`Frame`] for the
//! renderer and advances the cursor by one frame's worth of simulated time. Both the
//! window length and the step scale with the speed multiplier.

use std::time::Duration;

use crate::config::{PlaybackConfig, MAX_FPS, MAX_SPEED, MIN_SPEED};
use crate::controllers::BrightnessController;
use crate::data::duty::{DutyEngine, DutySnapshot};
use crate::data::time_format::ElapsedFormatter;

/// Picoseconds per millisecond.
const PS_PER_MS: f64 = 1e9;
/// Picoseconds per second.
const PS_PER_S: f64 = 1e12;

/// Brightness of one LED, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct LedReadout {
    /// In `[0, 1]`.
    pub brightness: f64,
    /// Percentage, e.g. `" 66.7%"`.
    pub label: String,
}

impl LedReadout {
    pub fn new(duty: f64) -> Self {
        let brightness = if duty.is_finite() { duty.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            brightness,
            label: format!("{:5.1}%", brightness * 100.0),
        }
    }
}

/// Everything the renderer needs for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Cursor the evaluation was requested for.
    pub cursor: u64,
    /// Window length requested this tick.
    pub window: u64,
    /// Snapshot on display; may lag `cursor` when computed asynchronously.
    pub snapshot: DutySnapshot,
    pub leds: Vec<LedReadout>,
    pub elapsed_label: String,
}

#[derive(Debug, Clone)]
pub struct Playback {
    fps: u32,
    speed: f64,
    end_time: u64,
    cursor: u64,
    playing: bool,
    formatter: ElapsedFormatter,
}

impl Playback {
    /// A paused clock at time 0 that wraps after `end_time`.
    pub fn new(config: &PlaybackConfig, end_time: u64) -> Self {
        Self {
            fps: config.fps.clamp(1, MAX_FPS),
            speed: clamp_speed(config.speed),
            end_time,
            cursor: 0,
            playing: false,
            formatter: config.elapsed.clone(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Toggle between playing and paused; returns the new state.
    pub fn play_pause(&mut self) -> bool {
        self.playing = !self.playing;
        tracing::debug!(playing = self.playing, cursor = self.cursor, "play/pause");
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Rewind the cursor to 0 without changing the play state.
    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn seek(&mut self, t: u64) {
        self.cursor = t;
    }

    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Set the speed multiplier, clamped to `[MIN_SPEED, MAX_SPEED]`. Returns the value applied.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.speed = clamp_speed(speed);
        self.speed
    }

    /// Wall-clock time between ticks.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(u64::from(1000 / self.fps))
    }

    /// Integration window in picoseconds: one frame interval in whole
    /// milliseconds, taken as simulated milliseconds, times the speed.
    pub fn window_length(&self) -> u64 {
        let frame_ms = f64::from(1000 / self.fps);
        (frame_ms * PS_PER_MS * self.speed).round() as u64
    }

    /// Simulated picoseconds the cursor advances per tick.
    pub fn frame_step(&self) -> u64 {
        (PS_PER_S / f64::from(self.fps) * self.speed).round() as u64
    }

    /// Advance one tick, evaluating asynchronously through `controller`.
    ///
    /// Never blocks on the worker: the frame shows whatever snapshot was last
    /// published. Returns `None` while paused.
    pub fn tick(&mut self, controller: &BrightnessController) -> Option<Frame> {
        self.step_with(|cursor, window| {
            let _ = controller.request_evaluation(cursor, window);
            controller.read_latest()
        })
    }

    /// Advance one tick, evaluating on the calling thread.
    pub fn tick_blocking(&mut self, engine: &DutyEngine) -> Option<Frame> {
        self.step_with(|cursor, window| engine.evaluate(cursor, window))
    }

    fn step_with<F>(&mut self, evaluate: F) -> Option<Frame>
    where
        F: FnOnce(u64, u64) -> DutySnapshot,
    {
        if self.cursor > self.end_time {
            tracing::info!(end_time = self.end_time, "reached end of trace, rewinding");
            self.playing = false;
            self.cursor = 0;
        }
        if !self.playing {
            return None;
        }

        let window = self.window_length();
        let snapshot = evaluate(self.cursor, window);
        let frame = Frame {
            cursor: self.cursor,
            window,
            leds: snapshot.duties.iter().copied().map(LedReadout::new).collect(),
            snapshot,
            elapsed_label: self.formatter.label(self.cursor),
        };
        self.cursor = self.cursor.saturating_add(self.frame_step());
        Some(frame)
    }
}

fn clamp_speed(speed: f64) -> f64 {
    if speed.is_finite() {
        speed.clamp(MIN_SPEED, MAX_SPEED)
    } else {
        1.0
    }
}
