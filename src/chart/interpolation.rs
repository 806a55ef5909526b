//! Easing curves used by interpolated effects.

use std::f64::consts::{FRAC_PI_2, PI};

/// An easing curve over a normalized progress `k` in `[0, 1]`.
///
/// Every curve maps `0` to `0` and `1` to `1`, and comes with its derivative and an
/// antiderivative so that effects can be integrated exactly over a sub-range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum Interpolation {
    /// `k`.
    #[default]
    Linear,
    /// Stays at the start value, jumps to the end value at `k = 1`.
    HoldAndChange,
    /// Jumps to the end value right after `k = 0`.
    ChangeAndHold,
    /// `k²`.
    EaseInQuad,
    /// `1 - (1 - k)²`.
    EaseOutQuad,
    /// Quadratic ease in the first half, out in the second.
    EaseInOutQuad,
    /// `1 - cos(kπ/2)`.
    EaseInSine,
    /// `sin(kπ/2)`.
    EaseOutSine,
    /// `(1 - cos(kπ)) / 2`.
    EaseInOutSine,
}

impl Interpolation {
    /// The curve at `k`.
    #[must_use]
    pub fn map(self, k: f64) -> f64 {
        match self {
            Self::Linear => k,
            Self::HoldAndChange => {
                if k >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::ChangeAndHold => {
                if k > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::EaseInQuad => k * k,
            Self::EaseOutQuad => 1.0 - (1.0 - k) * (1.0 - k),
            Self::EaseInOutQuad => {
                let t = 2.0 * k - 1.0;
                0.5 * (1.0 + t * (2.0 - t.abs()))
            }
            Self::EaseInSine => 1.0 - (k * FRAC_PI_2).cos(),
            Self::EaseOutSine => (k * FRAC_PI_2).sin(),
            Self::EaseInOutSine => 0.5 * (1.0 - (k * PI).cos()),
        }
    }

    /// `d map / dk` at `k`. The step curves report `0` everywhere.
    #[must_use]
    pub fn derivative(self, k: f64) -> f64 {
        match self {
            Self::Linear => 1.0,
            Self::HoldAndChange | Self::ChangeAndHold => 0.0,
            Self::EaseInQuad => 2.0 * k,
            Self::EaseOutQuad => 2.0 * (1.0 - k),
            Self::EaseInOutQuad => 2.0 - 2.0 * (2.0 * k - 1.0).abs(),
            Self::EaseInSine => FRAC_PI_2 * (k * FRAC_PI_2).sin(),
            Self::EaseOutSine => FRAC_PI_2 * (k * FRAC_PI_2).cos(),
            Self::EaseInOutSine => 0.5 * PI * (k * PI).sin(),
        }
    }

    /// An antiderivative of [`Self::map`] at `k`.
    #[must_use]
    pub fn integral(self, k: f64) -> f64 {
        match self {
            Self::Linear => 0.5 * k * k,
            Self::HoldAndChange => (k - 1.0).max(0.0),
            Self::ChangeAndHold => k.max(0.0),
            Self::EaseInQuad => k * k * k / 3.0,
            Self::EaseOutQuad => k * k - k * k * k / 3.0,
            Self::EaseInOutQuad => {
                let t = 2.0 * k - 1.0;
                0.25 * (t * t - t.abs().powi(3) / 3.0 + t)
            }
            Self::EaseInSine => k - (k * FRAC_PI_2).sin() / FRAC_PI_2,
            Self::EaseOutSine => -(k * FRAC_PI_2).cos() / FRAC_PI_2,
            Self::EaseInOutSine => 0.5 * (k - (k * PI).sin() / PI),
        }
    }

    /// The mean of [`Self::map`] over `[k0, k1]`, or `map(k0)` when the range is empty.
    #[must_use]
    pub fn average(self, k0: f64, k1: f64) -> f64 {
        let width = k1 - k0;
        if width.abs() < f64::EPSILON {
            self.map(k0)
        } else {
            (self.integral(k1) - self.integral(k0)) / width
        }
    }
}
