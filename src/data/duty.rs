//! Windowed duty-cycle computation over a [`Timeline`].
//!
//! For a window `[max(0, end - length), end]` the duty of bit `b` is the time bit `b`
//! spent high inside the window divided by the clipped window length. High time is
//! accumulated in whole picoseconds so both strategies agree to the last bit.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::bus::BusValue;
use crate::data::timeline::Timeline;
use crate::error::Result;

/// A query window, already clipped at time 0. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    start: u64,
    end: u64,
}

impl Window {
    /// Window of nominal `length` ending at `end`, clipped so it never starts before 0.
    ///
    /// ```
    /// # use dutyscope::data::duty::Window;
    /// let w = Window::ending_at(30, 100);
    /// assert_eq!((w.start(), w.end(), w.len()), (0, 30, 30));
    /// ```
    pub fn ending_at(end: u64, length: u64) -> Self {
        Self {
            start: end.saturating_sub(length),
            end,
        }
    }

    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How the transitions overlapping a window are located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStrategy {
    /// Walk the whole history from the first transition on every query.
    LinearScan,
    /// Binary-search the window bounds, then walk only the transitions inside it.
    #[default]
    BinarySearch,
}

impl DutyStrategy {
    /// Calls `f(state, duration)` for every constant-state segment of `window`.
    ///
    /// Segments are visited in time order and their durations sum to `window.len()`.
    /// The two strategies may differ only in zero-length segments.
    pub fn for_each_segment<F>(&self, timeline: &Timeline, window: Window, mut f: F)
    where
        F: FnMut(BusValue, u64),
    {
        let Window { start, end } = window;
        let start = start.min(end);
        match self {
            DutyStrategy::BinarySearch => {
                // `start` stands in for the real timestamp of the seeding transition,
                // clipping its contribution to the window.
                let mut state = timeline.state_before(start);
                let mut seg_start = start;
                for tr in timeline.transitions_in(start, end) {
                    f(state, tr.timestamp - seg_start);
                    state = tr.value;
                    seg_start = tr.timestamp;
                }
                f(state, end - seg_start);
            }
            DutyStrategy::LinearScan => {
                let mut state = timeline.first().value;
                let mut seg_start = start;
                for tr in timeline.iter() {
                    if tr.timestamp <= start {
                        state = tr.value;
                        continue;
                    }
                    if tr.timestamp > end {
                        break;
                    }
                    f(state, tr.timestamp.min(end) - seg_start);
                    state = tr.value;
                    seg_start = tr.timestamp;
                }
                f(state, end - seg_start);
            }
        }
    }

    /// Picoseconds bit `bit` spent high inside `window`.
    pub fn high_time(&self, timeline: &Timeline, window: Window, bit: usize) -> u64 {
        let mut high = 0;
        self.for_each_segment(timeline, window, |state, len| {
            if state.bit(bit) {
                high += len;
            }
        });
        high
    }
}

/// Fraction of the window ending at `end` during which `bit` was high.
///
/// Returns 0 for an empty clipped window.
pub fn duty_cycle(
    timeline: &Timeline,
    strategy: DutyStrategy,
    end: u64,
    length: u64,
    bit: usize,
) -> Result<f64> {
    timeline.check_bit(bit)?;
    let window = Window::ending_at(end, length);
    if window.is_empty() {
        return Ok(0.0);
    }
    let high = strategy.high_time(timeline, window, bit);
    Ok(high as f64 / window.len() as f64)
}

/// Duty of every bit for one window.
#[derive(Debug, Clone, PartialEq)]
pub struct DutySnapshot {
    pub end_time: u64,
    pub length: u64,
    /// One entry per bit, index 0 = LSB.
    pub duties: Vec<f64>,
}

impl DutySnapshot {
    /// All-dark snapshot used before the first evaluation completes.
    pub fn idle(width: usize) -> Self {
        Self {
            end_time: 0,
            length: 0,
            duties: vec![0.0; width],
        }
    }

    pub fn duty(&self, bit: usize) -> Option<f64> {
        self.duties.get(bit).copied()
    }
}

/// A timeline paired with the strategy used to query it.
#[derive(Debug, Clone)]
pub struct DutyEngine {
    timeline: Arc<Timeline>,
    strategy: DutyStrategy,
}

impl DutyEngine {
    pub fn new(timeline: Arc<Timeline>, strategy: DutyStrategy) -> Self {
        Self { timeline, strategy }
    }

    pub fn timeline(&self) -> &Arc<Timeline> {
        &self.timeline
    }

    pub fn strategy(&self) -> DutyStrategy {
        self.strategy
    }

    pub fn width(&self) -> usize {
        self.timeline.width()
    }

    /// See [`duty_cycle`].
    pub fn duty(&self, end: u64, length: u64, bit: usize) -> Result<f64> {
        duty_cycle(&self.timeline, self.strategy, end, length, bit)
    }

    /// Duties of all bits, accumulated in a single walk over the window.
    pub fn evaluate(&self, end: u64, length: u64) -> DutySnapshot {
        let width = self.timeline.width();
        let window = Window::ending_at(end, length);
        let mut snapshot = DutySnapshot {
            end_time: end,
            length,
            duties: vec![0.0; width],
        };
        if window.is_empty() {
            return snapshot;
        }

        let mut high = vec![0u64; width];
        self.strategy
            .for_each_segment(&self.timeline, window, |state, len| {
                for (bit, acc) in high.iter_mut().enumerate() {
                    if state.bit(bit) {
                        *acc += len;
                    }
                }
            });
        let denom = window.len() as f64;
        for (duty, acc) in snapshot.duties.iter_mut().zip(high) {
            *duty = acc as f64 / denom;
        }
        tracing::trace!(end, length, strategy = ?self.strategy, duties = ?snapshot.duties, "evaluated window");
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bus::BitOrder;

    #[test]
    fn segments_cover_the_window() {
        let tl = Timeline::from_tokens(
            4,
            BitOrder::MsbFirst,
            [(0, "0000"), (10, "0001"), (25, "0010"), (40, "0000")],
        )
        .unwrap();
        for strategy in [DutyStrategy::LinearScan, DutyStrategy::BinarySearch] {
            for (end, length) in [(30, 20), (50, 100), (10, 10), (40, 15), (100, 5)] {
                let window = Window::ending_at(end, length);
                let mut total = 0;
                strategy.for_each_segment(&tl, window, |_, len| total += len);
                assert_eq!(total, window.len(), "{strategy:?} end={end} length={length}");
            }
        }
    }

    #[test]
    fn window_before_first_transition_uses_first_value() {
        // The first state (bit 0 high) extends back to 0; window is [50, 150].
        let tl = Timeline::from_tokens(4, BitOrder::MsbFirst, [(80, "0001"), (100, "0000")])
            .unwrap();
        for strategy in [DutyStrategy::LinearScan, DutyStrategy::BinarySearch] {
            let high = strategy.high_time(&tl, Window::ending_at(150, 100), 0);
            assert_eq!(high, 50, "{strategy:?}");
        }
    }

    #[test]
    fn inverted_window_is_empty() {
        let tl = Timeline::from_tokens(4, BitOrder::MsbFirst, [(0, "1111"), (8, "0000")])
            .unwrap();
        let window = Window { start: 10, end: 5 };
        assert!(window.is_empty());
        for strategy in [DutyStrategy::LinearScan, DutyStrategy::BinarySearch] {
            let mut segments = Vec::new();
            strategy.for_each_segment(&tl, window, |state, len| segments.push((state, len)));
            assert!(segments.iter().all(|&(_, len)| len == 0), "{strategy:?}");
            assert_eq!(strategy.high_time(&tl, window, 0), 0, "{strategy:?}");
        }
    }
}
