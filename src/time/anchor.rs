//! A position on both the beat and the time axes.

use std::fmt;

use super::{BeatValue, TimeUnit, TimeValue};

/// A point pinned to a beat and a time.
///
/// `time = time_of_beat + delay`, where `time_of_beat` is what the tempo map says the
/// beat should sound at and `delay` is an extra offset carried by the object itself.
/// Every mutator keeps that relation; there is no way to set `time` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeAnchor {
    beat: BeatValue,
    time: TimeValue,
    delay: TimeValue,
}

impl TimeAnchor {
    /// The anchor before every other.
    pub const MIN: Self = Self {
        beat: BeatValue::MIN,
        time: TimeValue::MIN,
        delay: TimeValue::ZERO,
    };
    /// The anchor after every other.
    pub const MAX: Self = Self {
        beat: BeatValue::MAX,
        time: TimeValue::MAX,
        delay: TimeValue::ZERO,
    };

    /// An anchor without delay.
    #[must_use]
    pub const fn new(beat: BeatValue, time: TimeValue) -> Self {
        Self {
            beat,
            time,
            delay: TimeValue::ZERO,
        }
    }

    /// An anchor at `beat` whose time is still to be resolved from the tempo map.
    #[must_use]
    pub const fn from_beat(beat: BeatValue) -> Self {
        Self::new(beat, TimeValue::ZERO)
    }

    /// An anchor delayed from the time of its beat.
    #[must_use]
    pub fn with_delay(beat: BeatValue, time_of_beat: TimeValue, delay: TimeValue) -> Self {
        Self {
            beat,
            time: time_of_beat.offset_by(delay),
            delay,
        }
    }

    /// The beat.
    #[must_use]
    pub const fn beat(&self) -> BeatValue {
        self.beat
    }

    /// The time, delay included.
    #[must_use]
    pub const fn time(&self) -> TimeValue {
        self.time
    }

    /// The delay from the time of the beat.
    #[must_use]
    pub const fn delay(&self) -> TimeValue {
        self.delay
    }

    /// The time the beat itself falls on.
    #[must_use]
    pub fn time_of_beat(&self) -> TimeValue {
        self.time.delta_since(self.delay)
    }

    /// Moves the beat, leaving the times untouched.
    pub const fn set_beat(&mut self, beat: BeatValue) {
        self.beat = beat;
    }

    /// Moves the time of the beat, keeping the delay.
    pub fn set_time_of_beat(&mut self, time_of_beat: TimeValue) {
        self.time = time_of_beat.offset_by(self.delay);
    }

    /// Changes the delay, keeping the time of the beat.
    pub fn set_delay(&mut self, delay: TimeValue) {
        let time_of_beat = self.time_of_beat();
        self.delay = delay;
        self.time = time_of_beat.offset_by(delay);
    }

    /// Changes the delay, keeping the time.
    pub const fn set_delay_keep_time(&mut self, delay: TimeValue) {
        self.delay = delay;
    }

    /// Sets the delay and the resulting time together.
    pub const fn set_delay_and_time(&mut self, delay: TimeValue, time: TimeValue) {
        self.delay = delay;
        self.time = time;
    }

    /// Sets the delay and the time of the beat together.
    pub fn set_delay_and_time_of_beat(&mut self, delay: TimeValue, time_of_beat: TimeValue) {
        self.delay = delay;
        self.time = time_of_beat.offset_by(delay);
    }

    /// Compares by beat.
    #[must_use]
    pub fn cmp_beat(&self, other: &Self) -> std::cmp::Ordering {
        self.beat.cmp(&other.beat)
    }

    /// Compares by time.
    #[must_use]
    pub fn cmp_time(&self, other: &Self) -> std::cmp::Ordering {
        self.time.cmp(&other.time)
    }
}

impl fmt::Display for TimeAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.delay == TimeValue::ZERO {
            write!(f, "{} @ {}", self.beat, self.time)
        } else {
            write!(f, "{} @ {} (delay {})", self.beat, self.time, self.delay)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: i32) -> TimeValue {
        TimeValue::from_whole_milliseconds(value)
    }

    #[test]
    fn delay_mutators_keep_the_relation() {
        let mut anchor = TimeAnchor::with_delay(BeatValue::from_count(2), ms(1000), ms(50));
        assert_eq!(anchor.time(), ms(1050));

        anchor.set_time_of_beat(ms(2000));
        assert_eq!(anchor.time(), ms(2050));
        assert_eq!(anchor.time_of_beat(), ms(2000));

        anchor.set_delay(ms(-20));
        assert_eq!(anchor.time(), ms(1980));
        assert_eq!(anchor.time_of_beat(), ms(2000));

        anchor.set_delay_keep_time(ms(80));
        assert_eq!(anchor.time(), ms(1980));
        assert_eq!(anchor.time_of_beat(), ms(1900));

        anchor.set_delay_and_time_of_beat(ms(0), ms(500));
        assert_eq!(anchor.time(), ms(500));
    }

    #[test]
    fn display() {
        let anchor = TimeAnchor::new(BeatValue::from_count(1), ms(500));
        assert_eq!(anchor.to_string(), "1 @ 500.000ms");
    }
}
