//! Ranged effects: scroll and note speed, scroll jumps, signatures, bar visibility, chorus.

use std::fmt;

use num::{Rational64, ToPrimitive, Zero};

use super::{
    interpolation::Interpolation,
    object::{TimedObject, TimedObjectMut},
};
use crate::time::{BeatValue, Bounds, TimeAnchor};

/// An opaque effect code the engine carries without interpreting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtensionCode(pub u32);

/// What an effect does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    /// Multiplies the scroll speed of the whole field.
    ScrollSpeed,
    /// Multiplies the approach speed of notes only.
    NoteSpeed,
    /// Shifts the scroll position by `value` seconds of scrolling for its duration.
    ScrollJump,
    /// Sets the bar length in beats.
    Signature,
    /// Shows or hides bar lines.
    ShowBar,
    /// Marks a chorus section.
    Chorus,
    /// Anything else; the timeline only tracks when it is active.
    Extension(ExtensionCode),
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScrollSpeed => write!(f, "scroll speed"),
            Self::NoteSpeed => write!(f, "note speed"),
            Self::ScrollJump => write!(f, "scroll jump"),
            Self::Signature => write!(f, "signature"),
            Self::ShowBar => write!(f, "show bar"),
            Self::Chorus => write!(f, "chorus"),
            Self::Extension(ExtensionCode(code)) => write!(f, "extension {code}"),
        }
    }
}

/// The value an effect carries at one of its ends.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectValue {
    /// A float.
    Number(f64),
    /// A switch.
    Bool(bool),
    /// An exact fraction, as used by signatures.
    Fraction(Rational64),
}

impl EffectValue {
    /// The value as a float; `None` for switches.
    #[must_use]
    pub fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(value),
            Self::Fraction(value) => value.to_f64(),
            Self::Bool(_) => None,
        }
    }

    /// The value as a switch; numbers are on when non-zero.
    #[must_use]
    pub fn as_bool(self) -> bool {
        match self {
            Self::Bool(value) => value,
            Self::Number(value) => value != 0.0,
            Self::Fraction(value) => !value.is_zero(),
        }
    }

    /// The value as a fraction, approximating floats; `None` for switches.
    #[must_use]
    pub fn as_fraction(self) -> Option<Rational64> {
        match self {
            Self::Fraction(value) => Some(value),
            Self::Number(value) if value.is_finite() => {
                Some(BeatValue::from_value(value).fraction())
            }
            Self::Number(_) | Self::Bool(_) => None,
        }
    }
}

/// A ranged effect.
///
/// Each end may be missing: a missing start applies from the chart beginning, a
/// missing end to the chart end. When both are present the start must not come
/// after the end; ill-formed effects are skipped by the timeline builder.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    /// What the effect does.
    pub kind: EffectKind,
    start: Option<TimeAnchor>,
    end: Option<TimeAnchor>,
    /// Value at the start.
    pub value_start: EffectValue,
    /// Value at the end, reached through [`Self::interpolation`].
    pub value_end: EffectValue,
    /// How the value moves from start to end. `None` holds the start value.
    pub interpolation: Option<Interpolation>,
}

impl Effect {
    /// An effect holding one value over its range.
    #[must_use]
    pub const fn new(
        kind: EffectKind,
        value: EffectValue,
        start: Option<TimeAnchor>,
        end: Option<TimeAnchor>,
    ) -> Self {
        Self {
            kind,
            start,
            end,
            value_start: value,
            value_end: value,
            interpolation: None,
        }
    }

    /// An effect moving from `from` to `to` along `interpolation`.
    #[must_use]
    pub const fn interpolated(
        kind: EffectKind,
        from: EffectValue,
        to: EffectValue,
        interpolation: Interpolation,
        start: Option<TimeAnchor>,
        end: Option<TimeAnchor>,
    ) -> Self {
        Self {
            kind,
            start,
            end,
            value_start: from,
            value_end: to,
            interpolation: Some(interpolation),
        }
    }

    /// Whether the start does not come after the end.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => start.beat() <= end.beat(),
            _ => true,
        }
    }

    /// Whether `beat` lies in `[start, end)`.
    #[must_use]
    pub fn is_active_at(&self, beat: BeatValue) -> bool {
        self.beat_span().contains(beat, Bounds::HALF_OPEN)
    }

    /// Whether the value moves over the range.
    #[must_use]
    pub fn is_interpolated(&self) -> bool {
        self.interpolation.is_some() && self.value_start != self.value_end
    }
}

impl TimedObject for Effect {
    fn start(&self) -> Option<&TimeAnchor> {
        self.start.as_ref()
    }

    fn end(&self) -> Option<&TimeAnchor> {
        self.end.as_ref()
    }
}

impl TimedObjectMut for Effect {
    fn start_mut(&mut self) -> Option<&mut TimeAnchor> {
        self.start.as_mut()
    }

    fn end_mut(&mut self) -> Option<&mut TimeAnchor> {
        self.end.as_mut()
    }
}
