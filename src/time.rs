//! Position values on the three axes of a chart.
//!
//! - [`BeatValue`]: musical position, an exact fraction plus a float remainder.
//! - [`TimeValue`]: wall-clock position in integer milliseconds plus a float remainder.
//! - [`RollValue`]: scroll position, unitless, same fixed-point layout as [`TimeValue`].
//!
//! All three saturate at ±1 000 000 000 units, and the saturated values stand for
//! negative and positive infinity.

pub mod anchor;
pub mod beat;
pub mod fixed;
pub mod range;

use std::{cmp::Ordering, fmt::Debug};

pub use self::{
    anchor::TimeAnchor,
    beat::BeatValue,
    fixed::{RollValue, TimeValue},
    range::{Bounds, Span},
};

/// Magnitude at which every value saturates.
pub const MAX_INTEGER: i32 = 1_000_000_000;

/// Arithmetic shared by the position types.
pub trait TimeUnit: Copy + Ord + Debug {
    /// The value as a float in its natural unit: beats, milliseconds or roll.
    /// Saturated values map to the infinities.
    fn value(self) -> f64;

    /// Compares ignoring the float remainder, tolerating interpolation noise.
    fn cmp_aligned(&self, other: &Self) -> Ordering;

    /// Negates the value.
    #[must_use]
    fn negate(self) -> Self;

    /// Multiplies the value by a float factor.
    #[must_use]
    fn scale_by(self, scale: f64) -> Self;

    /// Adds another value, carrying the remainders.
    ///
    /// Infinities are sticky: an infinite `self` is returned as is, even when
    /// `offset` is the opposite infinity, and otherwise an infinite `offset` is.
    #[must_use]
    fn offset_by(self, offset: Self) -> Self;

    /// `self - smaller`.
    #[must_use]
    fn delta_since(self, smaller: Self) -> Self {
        self.offset_by(smaller.negate())
    }

    /// `self / divisor` as a float.
    fn ratio_to(self, divisor: Self) -> f64 {
        self.value() / divisor.value()
    }

    /// Whether both values are equal ignoring the float remainder.
    fn eq_aligned(&self, other: &Self) -> bool {
        self.cmp_aligned(other) == Ordering::Equal
    }
}

/// An axis a [`TimeAnchor`] can be projected onto, used to sample effects by beat or by time.
pub trait AnchorAxis: TimeUnit {
    /// Projects the anchor onto this axis.
    fn of_anchor(anchor: &TimeAnchor) -> Self;
}

impl AnchorAxis for BeatValue {
    fn of_anchor(anchor: &TimeAnchor) -> Self {
        anchor.beat()
    }
}

impl AnchorAxis for TimeValue {
    fn of_anchor(anchor: &TimeAnchor) -> Self {
        anchor.time()
    }
}
