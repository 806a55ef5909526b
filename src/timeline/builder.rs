//! Merging tempo changes and effect edges into carriers.

use std::collections::HashMap;

use itertools::{Itertools, MinMaxResult};

use super::{
    Timeline, TimelineConfig,
    carrier::{EffectId, TimeCarrier},
    sample::{integrate_roll, velocity_at},
};
use crate::{
    chart::{Chart, Effect, EffectKind, EffectValue, TempoChange, TimedObject, validate_tempos},
    error::TimelineError,
    time::{BeatValue, RollValue, TimeAnchor, TimeUnit, TimeValue},
};

/// Builds [`Timeline`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineBuilder {
    config: TimelineConfig,
}

/// An event of the merged stream. At one beat, tempo changes come first, then
/// effect starts, then effect ends, each group in index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    Tempo(usize),
    Start(EffectId),
    End(EffectId),
}

#[derive(Debug, Clone, Copy)]
struct Event {
    anchor: TimeAnchor,
    kind: EventKind,
}

impl Event {
    fn beat(&self) -> BeatValue {
        self.anchor.beat()
    }
}

impl TimelineBuilder {
    /// A builder with `config`.
    #[must_use]
    pub const fn new(config: TimelineConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Builds the timeline of a chart whose times are resolved.
    ///
    /// # Errors
    ///
    /// See [`Self::build`].
    pub fn build_chart(&self, chart: &Chart) -> Result<Timeline, TimelineError> {
        self.build(&chart.tempos, &chart.effects, &chart.objects)
    }

    /// Builds a timeline with one carrier per tempo change and per effect edge.
    ///
    /// `objects` only weigh the tempo distribution that picks the reference tempo.
    /// Without tempo changes the timeline is empty. Effects whose start comes after
    /// their end are kept in [`Timeline::effects`] but never become active.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError`] if the tempo list is unsorted, has two changes on
    /// one beat, or has a BPM that is not finite and positive. Debug builds also
    /// panic on such a tempo list.
    pub fn build<O: TimedObject>(
        &self,
        tempos: &[TempoChange],
        effects: &[Effect],
        objects: &[O],
    ) -> Result<Timeline, TimelineError> {
        let validation = validate_tempos(tempos);
        debug_assert!(validation.is_ok(), "invalid tempo map: {validation:?}");
        validation?;

        let Some(first_tempo) = tempos.first() else {
            log::warn!("no tempo change in chart, the timeline is empty");
            return Ok(Timeline::new(
                Vec::new(),
                effects.to_vec(),
                self.config.clone(),
                0.0,
            ));
        };
        let reference_beat_length = self.reference_beat_length(tempos, objects);

        let tempo_events = tempos.iter().enumerate().map(|(index, tempo)| Event {
            anchor: *tempo.anchor(),
            kind: EventKind::Tempo(index),
        });
        let mut edge_events = Vec::with_capacity(effects.len() * 2);
        let mut initially_active = Vec::new();
        for (index, effect) in effects.iter().enumerate() {
            if !effect.is_well_formed() {
                log::warn!(
                    "skipping {} effect #{index}: it starts at beat {} after it ends at beat {}",
                    effect.kind,
                    effect.safe_start().beat(),
                    effect.safe_end().beat(),
                );
                continue;
            }
            let id = EffectId::new(index);
            match effect.start() {
                Some(start) => edge_events.push(Event {
                    anchor: *start,
                    kind: EventKind::Start(id),
                }),
                None => initially_active.push(id),
            }
            if let Some(end) = effect.end() {
                edge_events.push(Event {
                    anchor: *end,
                    kind: EventKind::End(id),
                });
            }
        }
        edge_events.sort_by(|a, b| a.beat().cmp(&b.beat()).then(a.kind.cmp(&b.kind)));

        let mut walk = Walk {
            config: &self.config,
            effects,
            reference_beat_length,
            tempo: first_tempo,
            active: initially_active,
            jumps: HashMap::new(),
            carriers: Vec::with_capacity(tempos.len() + edge_events.len()),
        };
        for event in tempo_events.merge_by(edge_events, |a, b| a.beat() <= b.beat()) {
            walk.push(event, tempos);
        }

        log::debug!(
            "built timeline of {} carriers from {} tempo changes and {} effects, reference beat length {reference_beat_length}s",
            walk.carriers.len(),
            tempos.len(),
            effects.len(),
        );
        Ok(Timeline::new(
            walk.carriers,
            effects.to_vec(),
            self.config.clone(),
            reference_beat_length,
        ))
    }

    /// Seconds per beat of the tempo all scroll speeds are relative to.
    ///
    /// Unless configured, this is the tempo at the configured percentile of the
    /// chart's tempo distribution, weighting each tempo by how long it lasts within
    /// the time range covered by `objects`, slowest tempo first.
    #[must_use]
    pub fn reference_beat_length<O: TimedObject>(
        &self,
        tempos: &[TempoChange],
        objects: &[O],
    ) -> f64 {
        if let Some(bpm) = self.config.reference_bpm {
            if bpm.is_finite() && bpm > 0.0 {
                return 60.0 / bpm;
            }
            log::warn!("ignoring reference bpm {bpm}: it is not finite and positive");
        }
        let Some(first) = tempos.first() else {
            return 0.0;
        };
        if tempos.len() < 2 {
            return first.beat_length();
        }
        let finite_seconds = |time: TimeValue| (!time.is_max() && !time.is_min()).then(|| time.seconds());
        let bounds = objects
            .iter()
            .flat_map(|object| [object.safe_start().time(), object.safe_end().time()])
            .filter_map(finite_seconds)
            .minmax_by(f64::total_cmp);
        let MinMaxResult::MinMax(min, max) = bounds else {
            return first.beat_length();
        };
        if max <= min {
            return first.beat_length();
        }

        let clamp = |seconds: f64| seconds.clamp(min, max);
        let spans = tempos
            .iter()
            .enumerate()
            .map(|(index, tempo)| {
                let begin = if index == 0 {
                    min
                } else {
                    clamp(tempo.anchor().time().seconds())
                };
                let end = tempos
                    .get(index + 1)
                    .map_or(max, |next| clamp(next.anchor().time().seconds()));
                (tempo.beat_length(), (end - begin).max(0.0))
            })
            .sorted_by(|a, b| b.0.total_cmp(&a.0));

        let mut remaining = (max - min) * self.config.reference_percentile.clamp(0.0, 1.0);
        let mut chosen = first.beat_length();
        for (beat_length, length) in spans {
            chosen = beat_length;
            remaining -= length;
            if remaining < 0.0 {
                break;
            }
        }
        chosen
    }
}

/// State of the walk over the merged event stream.
struct Walk<'a> {
    config: &'a TimelineConfig,
    effects: &'a [Effect],
    reference_beat_length: f64,
    tempo: &'a TempoChange,
    active: Vec<EffectId>,
    /// Roll offset and seconds of every scroll jump applied and not yet undone.
    jumps: HashMap<EffectId, (f64, f64)>,
    carriers: Vec<TimeCarrier>,
}

impl<'a> Walk<'a> {
    fn push(&mut self, event: Event, tempos: &'a [TempoChange]) {
        let (activated, deactivated) = match event.kind {
            EventKind::Tempo(index) => {
                if let Some(tempo) = tempos.get(index) {
                    self.tempo = tempo;
                }
                (None, None)
            }
            EventKind::Start(id) => {
                if let Err(position) = self.active.binary_search(&id) {
                    self.active.insert(position, id);
                }
                (Some(id), None)
            }
            EventKind::End(id) => {
                if let Ok(position) = self.active.binary_search(&id) {
                    self.active.remove(position);
                }
                (None, Some(id))
            }
        };
        let carrier = self.carrier_at(event.anchor, activated, deactivated);
        log::trace!(
            "carrier #{} at beat {} time {} roll {} speed {}",
            self.carriers.len(),
            carrier.beat(),
            carrier.time(),
            carrier.roll(),
            carrier.speed(),
        );
        self.carriers.push(carrier);
    }

    fn carrier_at(
        &mut self,
        anchor: TimeAnchor,
        activated: Option<EffectId>,
        deactivated: Option<EffectId>,
    ) -> TimeCarrier {
        let config = self.config;
        let defaults = &config.defaults;
        let time = anchor.time();
        let tempo_scale = self.reference_beat_length / self.tempo.beat_length();

        let scroll_velocity = velocity_at(
            self.effects,
            &self.active,
            EffectKind::ScrollSpeed,
            time,
            defaults.scroll_speed,
        );
        let note_velocity = velocity_at(
            self.effects,
            &self.active,
            EffectKind::NoteSpeed,
            time,
            defaults.note_speed,
        );
        let scroll_base = config.scale_y
            * if config.scroll_follows_tempo() {
                tempo_scale
            } else {
                1.0
            };
        let speed = scroll_base
            * if config.applies_scroll_effects() {
                scroll_velocity
            } else {
                1.0
            };
        let note_velocity_scale = if config.note_velocity_follows_tempo() {
            tempo_scale
        } else {
            1.0
        };
        let chorus = latest_value(self.effects, &self.active, EffectKind::Chorus)
            .map_or(defaults.chorus, EffectValue::as_bool);

        let mut roll = self.carriers.last().map_or(RollValue::ZERO, |previous| {
            integrate_roll(previous, self.effects, config, time)
        });
        let mut jump = 0.0;
        if let Some(id) = activated.filter(|&id| self.is_scroll_jump(id)) {
            let seconds = self
                .effects
                .get(id.value())
                .and_then(|effect| effect.value_start.as_number())
                .unwrap_or(0.0);
            let offset = seconds * speed;
            roll = roll.offset_by(RollValue::new(offset));
            jump = seconds;
            self.jumps.insert(id, (offset, seconds));
        }
        if let Some((offset, seconds)) = deactivated.and_then(|id| self.jumps.remove(&id)) {
            roll = roll.delta_since(RollValue::new(offset));
            jump = -seconds;
        }

        TimeCarrier {
            anchor,
            roll,
            tempo: *self.tempo,
            active: self.active.clone(),
            scroll_velocity,
            note_velocity,
            note_velocity_scale,
            tempo_scale,
            scroll_base,
            speed,
            jump,
            chorus,
            activated,
            deactivated,
        }
    }

    fn is_scroll_jump(&self, id: EffectId) -> bool {
        self.effects
            .get(id.value())
            .is_some_and(|effect| effect.kind == EffectKind::ScrollJump)
    }
}

/// The value of the active effect of `kind` with the highest index, if any.
pub(crate) fn latest_value(
    effects: &[Effect],
    active: &[EffectId],
    kind: EffectKind,
) -> Option<EffectValue> {
    active
        .iter()
        .rev()
        .filter_map(|id| effects.get(id.value()))
        .find(|effect| effect.kind == kind)
        .map(|effect| effect.value_start)
}
