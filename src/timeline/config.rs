//! Knobs of timeline construction.

use std::collections::BTreeMap;

use num::Rational64;

use crate::{
    chart::{EffectKind, EffectValue, ExtensionCode},
    time::TimeValue,
};

/// Percentile of the tempo distribution that sets the reference tempo.
pub const DEFAULT_REFERENCE_PERCENTILE: f64 = 0.667;

/// Backward tolerance of time lookups, in milliseconds.
pub const DEFAULT_FIND_TIME_TOLERANCE_MS: i32 = 1;

/// Values that apply while no effect of a kind is active.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDefaults {
    /// Scroll speed factor.
    pub scroll_speed: f64,
    /// Note speed factor.
    pub note_speed: f64,
    /// Bar length in beats.
    pub signature: Rational64,
    /// Whether bar lines are shown.
    pub show_bar: bool,
    /// Whether the chart is in a chorus section.
    pub chorus: bool,
    /// Defaults of extension effects.
    pub extensions: BTreeMap<ExtensionCode, EffectValue>,
}

impl Default for EffectDefaults {
    fn default() -> Self {
        Self {
            scroll_speed: 1.0,
            note_speed: 1.0,
            signature: Rational64::from_integer(4),
            show_bar: true,
            chorus: false,
            extensions: BTreeMap::new(),
        }
    }
}

impl EffectDefaults {
    /// The default of `kind`, if it has one.
    #[must_use]
    pub fn value_for(&self, kind: EffectKind) -> Option<EffectValue> {
        match kind {
            EffectKind::ScrollSpeed => Some(EffectValue::Number(self.scroll_speed)),
            EffectKind::NoteSpeed => Some(EffectValue::Number(self.note_speed)),
            EffectKind::ScrollJump => Some(EffectValue::Number(0.0)),
            EffectKind::Signature => Some(EffectValue::Fraction(self.signature)),
            EffectKind::ShowBar => Some(EffectValue::Bool(self.show_bar)),
            EffectKind::Chorus => Some(EffectValue::Bool(self.chorus)),
            EffectKind::Extension(code) => self.extensions.get(&code).copied(),
        }
    }
}

/// How the timeline turns tempo and effects into scroll speed.
///
/// | `constant_scroll` | `bpm_adjusted_constant_scroll` | scroll speed | note velocity scale |
/// |---|---|---|---|
/// | `false` | any | `scale_y × tempo scale × scroll effects` | `1` |
/// | `true` | `false` | `scale_y` | `1` |
/// | `true` | `true` | `scale_y` | tempo scale |
///
/// Under constant scroll, scroll speed effects still apply when
/// `force_scroll_effects_under_constant_scroll` is set. The tempo scale is the
/// reference beat length divided by the governing tempo's beat length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimelineConfig {
    /// Roll per second at speed `1`.
    pub scale_y: f64,
    /// Keep the scroll speed independent of the tempo.
    pub constant_scroll: bool,
    /// Apply scroll speed effects even under constant scroll.
    pub force_scroll_effects_under_constant_scroll: bool,
    /// Under constant scroll, move the tempo scale onto the note velocity.
    pub bpm_adjusted_constant_scroll: bool,
    /// Fixed reference tempo; the percentile of the chart's tempo distribution when `None`.
    pub reference_bpm: Option<f64>,
    /// Percentile used when `reference_bpm` is `None`.
    pub reference_percentile: f64,
    /// Carriers up to this much later than a time query still match it.
    pub find_time_tolerance: TimeValue,
    /// Values used while no effect of a kind is active.
    pub defaults: EffectDefaults,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            scale_y: 1.0,
            constant_scroll: false,
            force_scroll_effects_under_constant_scroll: false,
            bpm_adjusted_constant_scroll: false,
            reference_bpm: None,
            reference_percentile: DEFAULT_REFERENCE_PERCENTILE,
            find_time_tolerance: TimeValue::from_whole_milliseconds(DEFAULT_FIND_TIME_TOLERANCE_MS),
            defaults: EffectDefaults::default(),
        }
    }
}

impl TimelineConfig {
    /// Whether scroll speed effects take part in the scroll speed.
    #[must_use]
    pub const fn applies_scroll_effects(&self) -> bool {
        !self.constant_scroll || self.force_scroll_effects_under_constant_scroll
    }

    /// Whether the scroll speed follows the tempo.
    #[must_use]
    pub const fn scroll_follows_tempo(&self) -> bool {
        !self.constant_scroll
    }

    /// Whether the note velocity follows the tempo.
    #[must_use]
    pub const fn note_velocity_follows_tempo(&self) -> bool {
        self.constant_scroll && self.bpm_adjusted_constant_scroll
    }
}
