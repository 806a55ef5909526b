//! Timeline breakpoints.

use std::fmt;

use crate::{
    chart::TempoChange,
    time::{BeatValue, RollValue, TimeAnchor, TimeValue},
};

/// Index of an effect in [`Timeline::effects`](super::Timeline::effects).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(usize);

impl EffectId {
    /// Wraps an index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The index.
    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }
}

impl From<usize> for EffectId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A breakpoint of the timeline: the state of tempo and effects from this point
/// until the next breakpoint.
///
/// Speeds are roll per second. Within the span up to the next breakpoint the roll
/// advances by the integral of the speed, which is constant unless an interpolated
/// scroll speed effect is active.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeCarrier {
    pub(crate) anchor: TimeAnchor,
    pub(crate) roll: RollValue,
    pub(crate) tempo: TempoChange,
    pub(crate) active: Vec<EffectId>,
    pub(crate) scroll_velocity: f64,
    pub(crate) note_velocity: f64,
    pub(crate) note_velocity_scale: f64,
    pub(crate) tempo_scale: f64,
    pub(crate) scroll_base: f64,
    pub(crate) speed: f64,
    pub(crate) jump: f64,
    pub(crate) chorus: bool,
    pub(crate) activated: Option<EffectId>,
    pub(crate) deactivated: Option<EffectId>,
}

impl TimeCarrier {
    /// Where the breakpoint is.
    #[must_use]
    pub const fn anchor(&self) -> &TimeAnchor {
        &self.anchor
    }

    /// The beat of the breakpoint.
    #[must_use]
    pub const fn beat(&self) -> BeatValue {
        self.anchor.beat()
    }

    /// The time of the breakpoint.
    #[must_use]
    pub const fn time(&self) -> TimeValue {
        self.anchor.time()
    }

    /// The scroll position at the breakpoint, scroll jumps included.
    #[must_use]
    pub const fn roll(&self) -> RollValue {
        self.roll
    }

    /// The governing tempo change.
    #[must_use]
    pub const fn tempo(&self) -> &TempoChange {
        &self.tempo
    }

    /// Effects active from this breakpoint on, by effect index.
    #[must_use]
    pub fn active_effects(&self) -> &[EffectId] {
        &self.active
    }

    /// Product of the active scroll speed effects at the breakpoint.
    #[must_use]
    pub const fn scroll_velocity(&self) -> f64 {
        self.scroll_velocity
    }

    /// Product of the active note speed effects at the breakpoint.
    #[must_use]
    pub const fn note_velocity(&self) -> f64 {
        self.note_velocity
    }

    /// Extra note velocity factor from the tempo under BPM-adjusted constant scroll.
    #[must_use]
    pub const fn note_velocity_scale(&self) -> f64 {
        self.note_velocity_scale
    }

    /// `note_velocity × note_velocity_scale`.
    #[must_use]
    pub fn effective_note_velocity(&self) -> f64 {
        self.note_velocity * self.note_velocity_scale
    }

    /// Reference beat length over the governing beat length.
    #[must_use]
    pub const fn tempo_scale(&self) -> f64 {
        self.tempo_scale
    }

    /// Speed before scroll speed effects.
    #[must_use]
    pub const fn scroll_base(&self) -> f64 {
        self.scroll_base
    }

    /// Roll per second at the breakpoint.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Seconds of scroll jump applied at this breakpoint, negative where a jump ends.
    #[must_use]
    pub const fn jump(&self) -> f64 {
        self.jump
    }

    /// Whether a chorus section is active.
    #[must_use]
    pub const fn is_chorus(&self) -> bool {
        self.chorus
    }

    /// The effect that starts at this breakpoint.
    #[must_use]
    pub const fn activated(&self) -> Option<EffectId> {
        self.activated
    }

    /// The effect that ends at this breakpoint.
    #[must_use]
    pub const fn deactivated(&self) -> Option<EffectId> {
        self.deactivated
    }

    /// Whether `effect` is active from this breakpoint on.
    #[must_use]
    pub fn is_active(&self, effect: EffectId) -> bool {
        self.active.binary_search(&effect).is_ok()
    }
}
