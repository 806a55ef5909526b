//! Bar lines.

use itertools::Itertools;
use num::{Rational64, Signed};

use super::{Timeline, builder::latest_value, carrier::EffectId};
use crate::{
    chart::{EffectKind, TimedObject},
    time::{BeatValue, Bounds, TimeUnit, TimeValue},
};

/// Bar lines generated at most by [`Timeline::bar_lines`].
pub const DEFAULT_MAX_BAR_COUNT: usize = 99_999;

/// A bar line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarLine {
    /// Beat of the line.
    pub beat: BeatValue,
    /// Time of the line.
    pub time: TimeValue,
    /// Whether a show-bar effect hides the line.
    pub hidden: bool,
}

impl Timeline {
    /// Bar lines from beat zero up to `max_beat`, at most [`DEFAULT_MAX_BAR_COUNT`].
    #[must_use]
    pub fn bar_lines(&self, max_beat: BeatValue) -> Vec<BarLine> {
        self.bar_lines_capped(max_beat, DEFAULT_MAX_BAR_COUNT)
    }

    /// Bar lines from beat zero up to `max_beat`, at most `max_count` of them.
    ///
    /// Lines are spaced by the active signature. Every signature change starts a new
    /// bar at its own beat, cutting the bar in progress short. A line is hidden by
    /// the show-bar effect containing it that starts last, both ends inclusive.
    #[must_use]
    pub fn bar_lines_capped(&self, max_beat: BeatValue, max_count: usize) -> Vec<BarLine> {
        if self.is_empty() {
            log::warn!("no bar lines without a tempo change");
            return Vec::new();
        }
        let initial = self.signature_of(
            &self
                .effects()
                .iter()
                .enumerate()
                .filter(|(_, effect)| effect.start().is_none() && effect.is_well_formed())
                .map(|(index, _)| EffectId::new(index))
                .collect::<Vec<_>>(),
        );
        let changes = self.signature_changes();
        let mut changes = changes.iter().peekable();

        let mut bars = Vec::new();
        let mut bar_length = initial;
        let mut cursor = BeatValue::ZERO;
        let mut hint = 0;
        loop {
            while let Some(&&(beat, length)) = changes.peek() {
                if beat > cursor {
                    break;
                }
                if beat >= BeatValue::ZERO {
                    cursor = beat;
                }
                bar_length = length;
                changes.next();
            }
            if cursor > max_beat || bars.len() >= max_count {
                break;
            }
            let Some(hit) = self.find_by_beat(cursor, hint) else {
                break;
            };
            hint = hit.hint;
            bars.push(BarLine {
                beat: cursor,
                time: hit.carrier.tempo().time_of_beat(cursor),
                hidden: self.is_bar_hidden(cursor),
            });
            if !bar_length.is_positive() {
                log::warn!("stopping bar lines at beat {cursor}: bar length {bar_length} is not positive");
                break;
            }
            cursor = cursor.offset_by(BeatValue::from_ratio(bar_length));
        }
        bars
    }

    /// Where signatures change and the bar length from there on.
    fn signature_changes(&self) -> Vec<(BeatValue, Rational64)> {
        self.carriers()
            .iter()
            .filter(|carrier| {
                [carrier.activated(), carrier.deactivated()]
                    .into_iter()
                    .flatten()
                    .filter_map(|id| self.effect(id))
                    .any(|effect| effect.kind == EffectKind::Signature)
            })
            .map(|carrier| (carrier.beat(), self.signature_of(carrier.active_effects())))
            .coalesce(|previous, next| {
                if previous.0 == next.0 {
                    Ok(next)
                } else {
                    Err((previous, next))
                }
            })
            .collect()
    }

    fn signature_of(&self, active: &[EffectId]) -> Rational64 {
        latest_value(self.effects(), active, EffectKind::Signature)
            .and_then(|value| value.as_fraction())
            .unwrap_or(self.config().defaults.signature)
    }

    fn is_bar_hidden(&self, beat: BeatValue) -> bool {
        self.effects()
            .iter()
            .enumerate()
            .filter(|(_, effect)| effect.kind == EffectKind::ShowBar && effect.is_well_formed())
            .filter(|(_, effect)| effect.beat_span().contains(beat, Bounds::INCLUSIVE.aligned()))
            .max_by(|(a_index, a), (b_index, b)| {
                a.safe_start()
                    .beat()
                    .cmp(&b.safe_start().beat())
                    .then(a_index.cmp(b_index))
            })
            .map_or(!self.config().defaults.show_bar, |(_, effect)| {
                !effect.value_start.as_bool()
            })
    }
}
