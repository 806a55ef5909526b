//! Tempo changes and beat/time conversion.

use super::object::{TimedObject, TimedObjectMut};
use crate::time::{BeatValue, TimeAnchor, TimeUnit, TimeValue};

/// A tempo change: from its anchor on, one beat lasts [`Self::beat_length`] seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoChange {
    anchor: TimeAnchor,
    beat_length: f64,
}

impl TempoChange {
    /// A tempo change of `bpm` beats per minute at `anchor`.
    #[must_use]
    pub fn new(bpm: f64, anchor: TimeAnchor) -> Self {
        Self {
            anchor,
            beat_length: 60.0 / bpm,
        }
    }

    /// A tempo change at `beat` whose time is resolved later by
    /// [`Chart::resolve_times`](super::Chart::resolve_times).
    #[must_use]
    pub fn at_beat(bpm: f64, beat: BeatValue) -> Self {
        Self::new(bpm, TimeAnchor::from_beat(beat))
    }

    /// Where the tempo change is.
    #[must_use]
    pub const fn anchor(&self) -> &TimeAnchor {
        &self.anchor
    }

    /// Seconds per beat.
    #[must_use]
    pub const fn beat_length(&self) -> f64 {
        self.beat_length
    }

    /// Beats per minute.
    #[must_use]
    pub fn bpm(&self) -> f64 {
        60.0 / self.beat_length
    }

    /// Changes the tempo.
    pub fn set_bpm(&mut self, bpm: f64) {
        self.beat_length = 60.0 / bpm;
    }

    /// Whether the BPM is finite and positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let bpm = self.bpm();
        bpm.is_finite() && bpm > 0.0 && self.beat_length.is_finite()
    }

    /// The time `beat` falls on, extrapolating this tempo in both directions.
    #[must_use]
    pub fn time_of_beat(&self, beat: BeatValue) -> TimeValue {
        if beat.is_max() {
            return TimeValue::MAX;
        }
        if beat.is_min() {
            return TimeValue::MIN;
        }
        let beats = beat.delta_since(self.anchor.beat()).value();
        TimeValue::from_seconds(beats * self.beat_length).offset_by(self.anchor.time())
    }

    /// The beat sounding at `time`, extrapolating this tempo in both directions.
    #[must_use]
    pub fn beat_of_time(&self, time: TimeValue) -> BeatValue {
        if time.is_max() {
            return BeatValue::MAX;
        }
        if time.is_min() {
            return BeatValue::MIN;
        }
        let seconds = time.delta_since(self.anchor.time()).seconds();
        BeatValue::from_value(seconds / self.beat_length).offset_by(self.anchor.beat())
    }

    /// Writes the time of `anchor`'s beat under this tempo, keeping its delay.
    pub fn resolve(&self, anchor: &mut TimeAnchor) {
        anchor.set_time_of_beat(self.time_of_beat(anchor.beat()));
    }

    pub(crate) const fn anchor_mut(&mut self) -> &mut TimeAnchor {
        &mut self.anchor
    }
}

impl TimedObject for TempoChange {
    fn start(&self) -> Option<&TimeAnchor> {
        Some(&self.anchor)
    }

    fn end(&self) -> Option<&TimeAnchor> {
        None
    }
}

impl TimedObjectMut for TempoChange {
    fn start_mut(&mut self) -> Option<&mut TimeAnchor> {
        Some(&mut self.anchor)
    }

    fn end_mut(&mut self) -> Option<&mut TimeAnchor> {
        None
    }
}
