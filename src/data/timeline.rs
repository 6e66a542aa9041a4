//! Immutable, time-ordered log of bus-value transitions for one signal.
//!
//! State holds constant between transitions. Before the first transition the bus is
//! taken to be in the first recorded state, all the way back to time 0.

use std::iter::FusedIterator;

use crate::data::bus::{BitOrder, BusValue};
use crate::error::{Error, Result};

/// A change of the bus to `value` at `timestamp` (picoseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    pub timestamp: u64,
    pub value: BusValue,
}

impl Transition {
    #[inline]
    pub fn new(timestamp: u64, value: BusValue) -> Self {
        Self { timestamp, value }
    }
}

/// Ordered transitions of a `width`-bit bus covering `[0, end_time]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    width: usize,
    transitions: Vec<Transition>,
    end_time: u64,
}

impl Timeline {
    /// Build a timeline from transitions in any order.
    ///
    /// Input is stably sorted by timestamp. When several transitions share a
    /// timestamp the one that came last in the input wins.
    pub fn new<I>(width: usize, transitions: I) -> Result<Self>
    where
        I: IntoIterator<Item = Transition>,
    {
        if width > BusValue::MAX_WIDTH {
            return Err(Error::UnsupportedWidth(width));
        }
        let mut sorted: Vec<Transition> = transitions.into_iter().collect();
        if sorted.is_empty() {
            return Err(Error::EmptyTimeline);
        }
        sorted.sort_by_key(|tr| tr.timestamp);

        let mut deduped: Vec<Transition> = Vec::with_capacity(sorted.len());
        let mut collapsed = 0usize;
        for tr in sorted {
            if let Some(prev) = deduped.last_mut() {
                if prev.timestamp == tr.timestamp {
                    tracing::debug!(
                        timestamp = tr.timestamp,
                        replaced = %prev.value,
                        with = %tr.value,
                        "duplicate timestamp, keeping later value"
                    );
                    *prev = tr;
                    collapsed += 1;
                    continue;
                }
            }
            deduped.push(tr);
        }
        if collapsed > 0 {
            tracing::warn!(collapsed, "collapsed transitions sharing a timestamp");
        }

        let end_time = deduped.last().map(|tr| tr.timestamp).unwrap_or(0);
        tracing::debug!(width, transitions = deduped.len(), end_time, "built timeline");
        Ok(Self {
            width,
            transitions: deduped,
            end_time,
        })
    }

    /// Build from raw `(timestamp, token)` pairs, decoding each token leniently.
    pub fn from_tokens<'a, I>(width: usize, order: BitOrder, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u64, &'a str)>,
    {
        Self::new(
            width,
            pairs
                .into_iter()
                .map(|(t, token)| Transition::new(t, BusValue::parse(token, width, order))),
        )
    }

    /// Set the total simulated duration.
    ///
    /// A duration shorter than the last transition is raised to that transition.
    pub fn with_end_time(mut self, end_time: u64) -> Self {
        let last = self.last().timestamp;
        if end_time < last {
            tracing::warn!(end_time, last, "end time precedes last transition, extending");
            self.end_time = last;
        } else {
            self.end_time = end_time;
        }
        self
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Always `false`: construction rejects empty input.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    #[inline]
    pub fn first(&self) -> &Transition {
        &self.transitions[0]
    }

    #[inline]
    pub fn last(&self) -> &Transition {
        &self.transitions[self.transitions.len() - 1]
    }

    pub fn as_slice(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transition> {
        self.transitions.iter()
    }

    /// Fails with [`Error::IndexOutOfRange`] unless `bit < width`.
    pub fn check_bit(&self, bit: usize) -> Result<()> {
        if bit < self.width {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index: bit,
                width: self.width,
            })
        }
    }

    /// Index of the first transition with `timestamp >= t`.
    #[inline]
    pub(crate) fn lower_bound(&self, t: u64) -> usize {
        self.transitions.partition_point(|tr| tr.timestamp < t)
    }

    /// Index of the first transition with `timestamp > t`.
    #[inline]
    pub(crate) fn upper_bound(&self, t: u64) -> usize {
        self.transitions.partition_point(|tr| tr.timestamp <= t)
    }

    /// Value in effect strictly before `t`.
    ///
    /// For `t` at or before the first transition this is the first value.
    pub fn state_before(&self, t: u64) -> BusValue {
        match self.lower_bound(t) {
            0 => self.first().value,
            idx => self.transitions[idx - 1].value,
        }
    }

    /// Value in effect at `t`, counting a transition exactly at `t`.
    pub fn value_at(&self, t: u64) -> BusValue {
        match self.upper_bound(t) {
            0 => self.first().value,
            idx => self.transitions[idx - 1].value,
        }
    }

    /// Transitions with timestamp in `[a, b)`, in order.
    pub fn transitions_in(&self, a: u64, b: u64) -> TransitionsIn<'_> {
        let lo = self.lower_bound(a);
        let hi = self.lower_bound(b).max(lo);
        TransitionsIn {
            inner: self.transitions[lo..hi].iter(),
        }
    }

    /// Sequential reader for monotonically advancing queries.
    pub fn cursor(&self) -> TimelineCursor<'_> {
        TimelineCursor {
            timeline: self,
            idx: 0,
        }
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Transition;
    type IntoIter = std::slice::Iter<'a, Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`Timeline::transitions_in`].
#[derive(Debug, Clone)]
pub struct TransitionsIn<'a> {
    inner: std::slice::Iter<'a, Transition>,
}

impl<'a> Iterator for TransitionsIn<'a> {
    type Item = &'a Transition;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for TransitionsIn<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for TransitionsIn<'_> {}
impl FusedIterator for TransitionsIn<'_> {}

/// Answers [`Timeline::state_before`] in O(1) amortised time when queried with
/// non-decreasing `t`. A query that goes backwards re-seeks by binary search.
#[derive(Debug, Clone)]
pub struct TimelineCursor<'a> {
    timeline: &'a Timeline,
    /// Number of transitions with timestamp strictly before the last query.
    idx: usize,
}

impl TimelineCursor<'_> {
    pub fn state_before(&mut self, t: u64) -> BusValue {
        let ts = self.timeline.as_slice();
        if self.idx > 0 && ts[self.idx - 1].timestamp >= t {
            self.idx = self.timeline.lower_bound(t);
        } else {
            while self.idx < ts.len() && ts[self.idx].timestamp < t {
                self.idx += 1;
            }
        }
        match self.idx {
            0 => self.timeline.first().value,
            idx => ts[idx - 1].value,
        }
    }
}
