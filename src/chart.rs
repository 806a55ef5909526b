//! Chart data: tempo changes, effects and note objects on the beat/time axes.
//!
//! A [`Chart`] is authored in beats. [`Chart::resolve_times`] walks the tempo map
//! once and writes the time of every anchor, after which the chart can be handed
//! to the [`TimelineBuilder`](crate::timeline::TimelineBuilder).

pub mod effect;
pub mod interpolation;
pub mod object;
pub mod tempo;

pub use self::{
    effect::{Effect, EffectKind, EffectValue, ExtensionCode},
    interpolation::Interpolation,
    object::{Axis, ChartObject, ObjectEdge, ObjectId, TimedObject, TimedObjectMut, compare_objects},
    tempo::TempoChange,
};

use std::cmp::Ordering;

use crate::{
    error::TimelineError,
    time::{BeatValue, TimeAnchor, TimeValue},
};

/// A whole chart.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chart {
    /// Tempo changes, sorted by beat, no two on the same beat.
    pub tempos: Vec<TempoChange>,
    /// Effects, in the order that breaks ties between them.
    pub effects: Vec<Effect>,
    /// Note objects.
    pub objects: Vec<ChartObject>,
}

impl Chart {
    /// Bundles chart data.
    #[must_use]
    pub const fn new(
        tempos: Vec<TempoChange>,
        effects: Vec<Effect>,
        objects: Vec<ChartObject>,
    ) -> Self {
        Self {
            tempos,
            effects,
            objects,
        }
    }

    /// Recomputes every time from the tempo map, keeping delays.
    ///
    /// The first tempo change keeps its time, which sets the chart offset. Each
    /// following one is timed by the tempo before it, and every effect and object
    /// anchor by the tempo governing its beat.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError`] if the tempo list is unsorted, has two changes on
    /// one beat, or has a BPM that is not finite and positive.
    pub fn resolve_times(&mut self) -> Result<(), TimelineError> {
        validate_tempos(&self.tempos)?;
        for index in 1..self.tempos.len() {
            let Some(previous) = self.tempos.get(index - 1).copied() else {
                continue;
            };
            if let Some(tempo) = self.tempos.get_mut(index) {
                previous.resolve(tempo.anchor_mut());
            }
        }
        let tempos = &self.tempos;
        for effect in &mut self.effects {
            resolve_object(tempos, effect);
        }
        for object in &mut self.objects {
            resolve_object(tempos, object);
        }
        Ok(())
    }

    /// The time `beat` falls on, or `None` without tempo changes.
    #[must_use]
    pub fn time_of_beat(&self, beat: BeatValue) -> Option<TimeValue> {
        governing_tempo(&self.tempos, beat).map(|tempo| tempo.time_of_beat(beat))
    }

    /// The beat sounding at `time`, or `None` without tempo changes.
    #[must_use]
    pub fn beat_of_time(&self, time: TimeValue) -> Option<BeatValue> {
        let after = self
            .tempos
            .partition_point(|tempo| tempo.anchor().time() <= time);
        self.tempos
            .get(after.saturating_sub(1))
            .map(|tempo| tempo.beat_of_time(time))
    }
}

fn resolve_object(tempos: &[TempoChange], object: &mut impl TimedObjectMut) {
    if let Some(anchor) = object.start_mut() {
        resolve_anchor(tempos, anchor);
    }
    if let Some(anchor) = object.end_mut() {
        resolve_anchor(tempos, anchor);
    }
}

fn resolve_anchor(tempos: &[TempoChange], anchor: &mut TimeAnchor) {
    if let Some(tempo) = governing_tempo(tempos, anchor.beat()) {
        tempo.resolve(anchor);
    }
}

/// The last tempo change at or before `beat`, or the first one if `beat` precedes them all.
pub(crate) fn governing_tempo(tempos: &[TempoChange], beat: BeatValue) -> Option<&TempoChange> {
    let after = tempos.partition_point(|tempo| tempo.anchor().beat() <= beat);
    tempos.get(after.saturating_sub(1))
}

/// Checks that tempo changes are valid and strictly increasing in beat.
pub(crate) fn validate_tempos(tempos: &[TempoChange]) -> Result<(), TimelineError> {
    for (index, tempo) in tempos.iter().enumerate() {
        if !tempo.is_valid() {
            return Err(TimelineError::InvalidTempo {
                index,
                bpm: tempo.bpm(),
            });
        }
        let Some(previous) = index.checked_sub(1).and_then(|i| tempos.get(i)) else {
            continue;
        };
        let beat = tempo.anchor().beat();
        match beat.cmp(&previous.anchor().beat()) {
            Ordering::Greater => {}
            Ordering::Equal => return Err(TimelineError::DuplicateTempo { index, beat }),
            Ordering::Less => {
                return Err(TimelineError::UnsortedTempo {
                    index,
                    beat,
                    previous: previous.anchor().beat(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn beat(count: i64) -> BeatValue {
        BeatValue::from_count(count)
    }

    #[test]
    fn resolves_times_through_the_tempo_map() {
        let mut chart = Chart::new(
            vec![
                TempoChange::at_beat(120.0, beat(0)),
                TempoChange::at_beat(60.0, beat(4)),
            ],
            vec![Effect::new(
                EffectKind::Chorus,
                EffectValue::Bool(true),
                Some(TimeAnchor::from_beat(beat(2))),
                Some(TimeAnchor::from_beat(beat(6))),
            )],
            vec![ChartObject::single(
                ObjectId::new(1),
                TimeAnchor::with_delay(beat(5), TimeValue::ZERO, TimeValue::from_whole_milliseconds(30)),
            )],
        );
        chart.resolve_times().expect("sorted tempo map");

        assert_eq!(chart.tempos[1].anchor().time(), TimeValue::from_seconds(2.0));
        let effect = &chart.effects[0];
        assert_eq!(effect.safe_start().time(), TimeValue::from_seconds(1.0));
        assert_eq!(effect.safe_end().time(), TimeValue::from_seconds(4.0));
        let note = chart.objects[0].safe_start();
        assert_eq!(note.time_of_beat(), TimeValue::from_seconds(3.0));
        assert_eq!(note.time(), TimeValue::from_whole_milliseconds(3030));

        assert_eq!(chart.time_of_beat(beat(-2)), Some(TimeValue::from_seconds(-1.0)));
        assert_eq!(chart.beat_of_time(TimeValue::from_seconds(3.0)), Some(beat(5)));
    }

    #[test]
    fn rejects_malformed_tempo_maps() {
        let mut unsorted = Chart::new(
            vec![
                TempoChange::at_beat(120.0, beat(4)),
                TempoChange::at_beat(120.0, beat(0)),
            ],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(
            unsorted.resolve_times(),
            Err(TimelineError::UnsortedTempo {
                index: 1,
                beat: beat(0),
                previous: beat(4),
            })
        );

        let duplicate = [
            TempoChange::at_beat(120.0, beat(0)),
            TempoChange::at_beat(180.0, beat(0)),
        ];
        assert_eq!(
            validate_tempos(&duplicate),
            Err(TimelineError::DuplicateTempo {
                index: 1,
                beat: beat(0)
            })
        );
        assert!(matches!(
            validate_tempos(&[TempoChange::at_beat(-1.0, beat(0))]),
            Err(TimelineError::InvalidTempo { index: 0, .. })
        ));
    }

    #[test]
    fn no_tempo_means_no_time() {
        let chart = Chart::default();
        assert_eq!(chart.time_of_beat(beat(1)), None);
    }
}
