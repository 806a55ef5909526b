//! The piecewise timeline of a chart.
//!
//! [`TimelineBuilder`] merges tempo changes and effect edges into an ordered list
//! of [`TimeCarrier`]s. Between two carriers the tempo and the set of active effects
//! are constant, so any query reduces to finding the governing carrier and
//! extrapolating from it:
//!
//! - [`Timeline::find_carrier`] locates the carrier on the time, beat or roll axis,
//! - [`Timeline::roll_at_time`] integrates the scroll speed from it,
//! - [`Timeline::note_carriers`] turns note objects into judgeable units,
//! - [`Timeline::bar_lines`] walks the signatures from beat zero.

pub mod bar;
pub mod builder;
pub mod carrier;
pub mod config;
pub mod index;
pub mod note;
pub mod sample;

pub use self::{
    bar::{BarLine, DEFAULT_MAX_BAR_COUNT},
    builder::TimelineBuilder,
    carrier::{EffectId, TimeCarrier},
    config::{EffectDefaults, TimelineConfig},
    index::{CarrierHit, CarrierIndex, CarrierKey},
    note::{CarrierTiming, NoteCarrier},
};

use self::{
    builder::latest_value,
    sample::{integrate_roll, velocity_at},
};
use crate::{
    chart::{Effect, EffectKind, EffectValue},
    time::{BeatValue, RollValue, TimeValue},
};

/// Carriers of a chart with their lookup index.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    carriers: Vec<TimeCarrier>,
    effects: Vec<Effect>,
    index: CarrierIndex,
    config: TimelineConfig,
    reference_beat_length: f64,
}

impl Timeline {
    pub(crate) fn new(
        carriers: Vec<TimeCarrier>,
        effects: Vec<Effect>,
        config: TimelineConfig,
        reference_beat_length: f64,
    ) -> Self {
        let index = CarrierIndex::new(&carriers, config.find_time_tolerance);
        Self {
            carriers,
            effects,
            index,
            config,
            reference_beat_length,
        }
    }

    /// The carriers in beat order.
    #[must_use]
    pub fn carriers(&self) -> &[TimeCarrier] {
        &self.carriers
    }

    /// The effects the timeline was built from; [`EffectId`]s index into this.
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// One effect.
    #[must_use]
    pub fn effect(&self, id: EffectId) -> Option<&Effect> {
        self.effects.get(id.value())
    }

    /// The configuration used to build the timeline.
    #[must_use]
    pub const fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// The index over the time and roll axes.
    #[must_use]
    pub const fn index(&self) -> &CarrierIndex {
        &self.index
    }

    /// Seconds per beat of the reference tempo, `0` for an empty timeline.
    #[must_use]
    pub const fn reference_beat_length(&self) -> f64 {
        self.reference_beat_length
    }

    /// Whether there is no carrier, which happens without tempo changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }

    /// The last carrier whose key is not after `key`; the first carrier when all are.
    ///
    /// `hint` is the [`CarrierHit::hint`] of the previous lookup on the same axis, or
    /// `0`. Hints from a playhead moving forward make lookups constant time, and any
    /// hint gives the same result as `0`.
    #[must_use]
    pub fn find_carrier(&self, key: impl Into<CarrierKey>, hint: usize) -> Option<CarrierHit<'_>> {
        self.index.find(&self.carriers, key.into(), hint)
    }

    /// [`Self::find_carrier`] by time.
    #[must_use]
    pub fn find_by_time(&self, time: TimeValue, hint: usize) -> Option<CarrierHit<'_>> {
        self.find_carrier(time, hint)
    }

    /// [`Self::find_carrier`] by beat.
    #[must_use]
    pub fn find_by_beat(&self, beat: BeatValue, hint: usize) -> Option<CarrierHit<'_>> {
        self.find_carrier(beat, hint)
    }

    /// [`Self::find_carrier`] by roll.
    #[must_use]
    pub fn find_by_roll(&self, roll: RollValue, hint: usize) -> Option<CarrierHit<'_>> {
        self.find_carrier(roll, hint)
    }

    /// The time `beat` falls on.
    #[must_use]
    pub fn time_of_beat(&self, beat: BeatValue) -> Option<TimeValue> {
        self.find_by_beat(beat, 0)
            .map(|hit| hit.carrier.tempo().time_of_beat(beat))
    }

    /// The beat sounding at `time`.
    #[must_use]
    pub fn beat_of_time(&self, time: TimeValue) -> Option<BeatValue> {
        self.find_by_time(time, 0)
            .map(|hit| hit.carrier.tempo().beat_of_time(time))
    }

    /// The scroll position at `time`.
    ///
    /// The governing carrier is found with [`TimelineConfig::find_time_tolerance`], so
    /// a time that close before a discontinuity, such as the end of a scroll jump,
    /// already reads the roll from after it.
    #[must_use]
    pub fn roll_at_time(&self, time: TimeValue) -> Option<RollValue> {
        self.find_by_time(time, 0)
            .map(|hit| integrate_roll(hit.carrier, &self.effects, &self.config, time))
    }

    /// Product of the scroll speed effects active at `beat`.
    #[must_use]
    pub fn scroll_velocity_at_beat(&self, beat: BeatValue) -> f64 {
        self.velocity_at_beat(EffectKind::ScrollSpeed, beat, self.config.defaults.scroll_speed)
    }

    /// Product of the scroll speed effects active at `time`.
    #[must_use]
    pub fn scroll_velocity_at_time(&self, time: TimeValue) -> f64 {
        let default = self.config.defaults.scroll_speed;
        self.find_by_time(time, 0).map_or(default, |hit| {
            velocity_at(
                &self.effects,
                hit.carrier.active_effects(),
                EffectKind::ScrollSpeed,
                time,
                default,
            )
        })
    }

    /// Product of the note speed effects active at `beat`.
    #[must_use]
    pub fn note_velocity_at_beat(&self, beat: BeatValue) -> f64 {
        self.velocity_at_beat(EffectKind::NoteSpeed, beat, self.config.defaults.note_speed)
    }

    fn velocity_at_beat(&self, kind: EffectKind, beat: BeatValue, default: f64) -> f64 {
        self.find_by_beat(beat, 0).map_or(default, |hit| {
            let time = hit.carrier.tempo().time_of_beat(beat);
            velocity_at(&self.effects, hit.carrier.active_effects(), kind, time, default)
        })
    }

    /// Roll per second at `time`, `0` for an empty timeline.
    #[must_use]
    pub fn speed_at_time(&self, time: TimeValue) -> f64 {
        let Some(hit) = self.find_by_time(time, 0) else {
            return 0.0;
        };
        if self.config.applies_scroll_effects() {
            hit.carrier.scroll_base() * self.scroll_velocity_at_time(time)
        } else {
            hit.carrier.scroll_base()
        }
    }

    /// Whether `beat` is in a chorus section.
    #[must_use]
    pub fn is_chorus_at_beat(&self, beat: BeatValue) -> bool {
        self.find_by_beat(beat, 0)
            .map_or(self.config.defaults.chorus, |hit| hit.carrier.is_chorus())
    }

    /// The effects active at `beat`.
    pub fn active_effects_at_beat(
        &self,
        beat: BeatValue,
    ) -> impl Iterator<Item = (EffectId, &Effect)> + '_ {
        self.find_by_beat(beat, 0)
            .map(|hit| hit.carrier.active_effects())
            .unwrap_or_default()
            .iter()
            .filter_map(|&id| Some((id, self.effect(id)?)))
    }

    /// The start value of the latest active effect of `kind` at `beat`, or its default.
    #[must_use]
    pub fn effect_value_at_beat(&self, kind: EffectKind, beat: BeatValue) -> Option<EffectValue> {
        self.find_by_beat(beat, 0)
            .and_then(|hit| latest_value(&self.effects, hit.carrier.active_effects(), kind))
            .or_else(|| self.config.defaults.value_for(kind))
    }
}
