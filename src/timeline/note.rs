//! Judgeable units positioned on the timeline.

use super::Timeline;
use crate::{
    chart::TimedObject,
    time::{BeatValue, RollValue, TimeAnchor, TimeValue},
};

/// A position on all three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarrierTiming {
    /// Beat.
    pub beat: BeatValue,
    /// Time, delay included.
    pub time: TimeValue,
    /// Scroll position at that time.
    pub roll: RollValue,
}

impl CarrierTiming {
    /// Before everything.
    pub const NEG_INFINITY: Self = Self {
        beat: BeatValue::MIN,
        time: TimeValue::MIN,
        roll: RollValue::MIN,
    };
    /// After everything.
    pub const POS_INFINITY: Self = Self {
        beat: BeatValue::MAX,
        time: TimeValue::MAX,
        roll: RollValue::MAX,
    };
}

/// A note object ready for judgment: where it starts and ends, and the judge units
/// it drives. The queue only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteCarrier<U> {
    /// Where judgment of the note starts.
    pub start: CarrierTiming,
    /// Where judgment of the note ends; equal to `start` for single notes.
    pub end: CarrierTiming,
    /// Note velocity at the start, tempo adjustment included.
    pub note_scale: f64,
    /// Judge units driven by this note. Notes without units are never judged.
    pub units: Vec<U>,
}

impl<U> NoteCarrier<U> {
    /// A note with explicit timings.
    #[must_use]
    pub const fn new(start: CarrierTiming, end: CarrierTiming, units: Vec<U>) -> Self {
        Self {
            start,
            end,
            note_scale: 1.0,
            units,
        }
    }

    /// Whether the note drives any judge unit.
    #[must_use]
    pub fn is_judgeable(&self) -> bool {
        !self.units.is_empty()
    }
}

impl Timeline {
    /// The beat, time and roll of `anchor`.
    #[must_use]
    pub fn timing_of(&self, anchor: &TimeAnchor) -> CarrierTiming {
        let (beat, time) = (anchor.beat(), anchor.time());
        if beat.is_min() || time.is_min() {
            return CarrierTiming::NEG_INFINITY;
        }
        if beat.is_max() || time.is_max() {
            return CarrierTiming::POS_INFINITY;
        }
        CarrierTiming {
            beat,
            time,
            roll: self.roll_at_time(time).unwrap_or(RollValue::ZERO),
        }
    }

    /// Places one object on the timeline.
    #[must_use]
    pub fn note_carrier<O: TimedObject + ?Sized, U>(&self, object: &O, units: Vec<U>) -> NoteCarrier<U> {
        let start = object.safe_start();
        let note_scale = self
            .find_by_beat(start.beat(), 0)
            .map_or(self.config().defaults.note_speed, |hit| {
                hit.carrier.effective_note_velocity()
            });
        NoteCarrier {
            start: self.timing_of(start),
            end: self.timing_of(object.safe_end()),
            note_scale,
            units,
        }
    }

    /// Places objects on the timeline, asking `units_of` for the judge units of each.
    pub fn note_carriers<O, U, F>(&self, objects: &[O], mut units_of: F) -> Vec<NoteCarrier<U>>
    where
        O: TimedObject,
        F: FnMut(&O) -> Vec<U>,
    {
        objects
            .iter()
            .map(|object| self.note_carrier(object, units_of(object)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chart::{Chart, ChartObject, Effect, EffectKind, EffectValue, ObjectId, TempoChange},
        timeline::TimelineBuilder,
        time::TimeUnit,
    };

    fn at(count: i64) -> TimeAnchor {
        TimeAnchor::from_beat(BeatValue::from_count(count))
    }

    #[test]
    fn places_notes_with_their_note_speed() {
        let mut chart = Chart::new(
            vec![TempoChange::at_beat(120.0, BeatValue::ZERO)],
            vec![Effect::new(
                EffectKind::NoteSpeed,
                EffectValue::Number(1.5),
                Some(at(2)),
                None,
            )],
            vec![
                ChartObject::single(ObjectId::new(1), at(1)),
                ChartObject::ranged(ObjectId::new(2), at(2), at(4)),
            ],
        );
        chart.resolve_times().expect("sorted tempo map");
        let timeline = TimelineBuilder::default()
            .build_chart(&chart)
            .expect("valid chart");

        let notes = timeline.note_carriers(&chart.objects, |object| vec![object.id]);
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].start, notes[0].end);
        assert!((notes[0].note_scale - 1.0).abs() < f64::EPSILON);
        assert!((notes[1].note_scale - 1.5).abs() < f64::EPSILON);
        assert_eq!(notes[1].end.time, TimeValue::from_seconds(2.0));
        assert!((notes[1].end.roll.value() - 2.0).abs() < 1e-6);
        assert_eq!(notes[1].units, vec![ObjectId::new(2)]);
    }

    #[test]
    fn open_ends_become_infinite() {
        let timeline = TimelineBuilder::default()
            .build(&[TempoChange::at_beat(60.0, BeatValue::ZERO)], &[], &[] as &[ChartObject])
            .expect("valid tempo map");
        let effect = Effect::new(EffectKind::Chorus, EffectValue::Bool(true), Some(at(1)), None);
        let note: NoteCarrier<u8> = timeline.note_carrier(&effect, Vec::new());
        assert_eq!(note.end, CarrierTiming::POS_INFINITY);
        assert!(!note.is_judgeable());
    }
}
