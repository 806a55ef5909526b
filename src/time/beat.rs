//! Musical position: an exact beat fraction with a float remainder.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::{Add, Mul, Neg, Sub},
};

use num::{CheckedAdd, Rational64, ToPrimitive};

use super::{MAX_INTEGER, TimeUnit};

/// Largest denominator chosen when approximating a float beat with a fraction.
pub const MAX_APPROXIMATION_DENOMINATOR: i64 = 1000;

const LIMIT: i64 = MAX_INTEGER as i64;

/// A position in beats.
///
/// The exact part is a reduced [`Rational64`]. The `remainder` is the float offset
/// from the integer part of that fraction, so `value = floor(fraction) + remainder`.
/// For positions written by a charter the remainder is just the fractional part of
/// the fraction; positions computed by interpolation keep their sub-tick residue
/// there.
///
/// Ordering and equality look at both parts. [`TimeUnit::cmp_aligned`] compares
/// only the fractions.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeatValue {
    fraction: Rational64,
    remainder: f32,
}

impl BeatValue {
    /// Beat zero.
    pub const ZERO: Self = Self {
        fraction: Rational64::new_raw(0, 1),
        remainder: 0.0,
    };
    /// Positive infinity.
    pub const MAX: Self = Self {
        fraction: Rational64::new_raw(LIMIT, 1),
        remainder: 0.0,
    };
    /// Negative infinity.
    pub const MIN: Self = Self {
        fraction: Rational64::new_raw(-LIMIT, 1),
        remainder: 0.0,
    };

    /// A whole number of beats.
    #[must_use]
    pub fn from_count(count: i64) -> Self {
        Self::from_ratio(Rational64::from_integer(count))
    }

    /// `numer / denom` beats, or `None` when `denom` is zero.
    #[must_use]
    pub fn from_fraction(numer: i64, denom: i64) -> Option<Self> {
        (denom != 0).then(|| Self::from_ratio(Rational64::new(numer, denom)))
    }

    /// An exact fraction of beats.
    #[must_use]
    pub fn from_ratio(fraction: Rational64) -> Self {
        Self::with_known_value(fraction, None)
    }

    /// Approximates a float beat with a fraction whose denominator is at most
    /// [`MAX_APPROXIMATION_DENOMINATOR`], keeping the residue in the remainder.
    #[must_use]
    pub fn from_value(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        if value >= LIMIT as f64 {
            return Self::MAX;
        }
        if value <= -LIMIT as f64 {
            return Self::MIN;
        }
        Self::with_known_value(
            approximate(value, MAX_APPROXIMATION_DENOMINATOR),
            Some(value),
        )
    }

    /// Rounds a float beat to the nearest multiple of `1 / denominator`.
    #[must_use]
    pub fn from_value_rounded(value: f64, denominator: i64) -> Self {
        if value.is_nan() || denominator <= 0 || value.abs() >= LIMIT as f64 {
            return Self::from_value(value);
        }
        let numer = (value * denominator as f64).round() as i64;
        Self::with_known_value(Rational64::new(numer, denominator), Some(value))
    }

    fn with_known_value(fraction: Rational64, known: Option<f64>) -> Self {
        if fraction >= Self::MAX.fraction {
            return Self::MAX;
        }
        if fraction <= Self::MIN.fraction {
            return Self::MIN;
        }
        let floor = fraction.floor();
        let remainder = match known {
            Some(value) => value - floor.to_f64().unwrap_or_default(),
            None => (fraction - floor).to_f64().unwrap_or_default(),
        };
        Self {
            fraction,
            remainder: normalize(remainder as f32),
        }
    }

    fn saturated(fraction: Rational64, remainder: f32) -> Self {
        if fraction >= Self::MAX.fraction {
            Self::MAX
        } else if fraction <= Self::MIN.fraction {
            Self::MIN
        } else {
            Self {
                fraction,
                remainder: normalize(remainder),
            }
        }
    }

    /// The exact part.
    #[must_use]
    pub const fn fraction(self) -> Rational64 {
        self.fraction
    }

    /// The float offset from [`Self::integer`].
    #[must_use]
    pub const fn remainder(self) -> f32 {
        self.remainder
    }

    /// `floor(fraction)`.
    #[must_use]
    pub fn integer(self) -> i64 {
        self.fraction.floor().to_integer()
    }

    /// Whether this is [`Self::MAX`].
    #[must_use]
    pub fn is_max(self) -> bool {
        self.fraction >= Self::MAX.fraction
    }

    /// Whether this is [`Self::MIN`].
    #[must_use]
    pub fn is_min(self) -> bool {
        self.fraction <= Self::MIN.fraction
    }

    /// Multiplies by an exact fraction, dropping the remainder residue.
    #[must_use]
    pub fn scale_by_ratio(self, scale: Rational64) -> Self {
        if self.is_max() || self.is_min() {
            return self.scale_by(scale.to_f64().unwrap_or_default());
        }
        Self::from_ratio(self.fraction * scale)
    }
}

impl TimeUnit for BeatValue {
    fn value(self) -> f64 {
        if self.is_max() {
            f64::INFINITY
        } else if self.is_min() {
            f64::NEG_INFINITY
        } else {
            self.integer() as f64 + f64::from(self.remainder)
        }
    }

    fn cmp_aligned(&self, other: &Self) -> Ordering {
        self.fraction.cmp(&other.fraction)
    }

    fn negate(self) -> Self {
        let known = -(self.integer() as f64 + f64::from(self.remainder));
        Self::with_known_value(-self.fraction, Some(known))
    }

    fn scale_by(self, scale: f64) -> Self {
        Self::from_value(self.value() * scale)
    }

    fn offset_by(self, offset: Self) -> Self {
        if self.is_max() || self.is_min() {
            return self;
        }
        if offset.is_max() || offset.is_min() {
            return offset;
        }
        let Some(fraction) = self.fraction.checked_add(&offset.fraction) else {
            return Self::from_value(self.value() + offset.value());
        };
        let carried = (self.integer() + offset.integer() - fraction.floor().to_integer()) as f32;
        Self::saturated(fraction, self.remainder + offset.remainder + carried)
    }
}

/// Best rational approximation of `value` with a bounded denominator, from the
/// convergents of its continued fraction.
fn approximate(value: f64, max_denominator: i64) -> Rational64 {
    let whole = value.floor();
    let mut x = value - whole;
    let (mut p0, mut q0, mut p1, mut q1) = (0_i64, 1_i64, 1_i64, 0_i64);
    for _ in 0..64 {
        let a = x.floor();
        let term = a as i64;
        let p2 = term.saturating_mul(p1).saturating_add(p0);
        let q2 = term.saturating_mul(q1).saturating_add(q0);
        if q2 > max_denominator {
            break;
        }
        (p0, q0, p1, q1) = (p1, q1, p2, q2);
        let rest = x - a;
        if rest < 1e-9 {
            break;
        }
        x = rest.recip();
    }
    Rational64::new((whole as i64) * q1 + p1, q1)
}

/// Folds `-0.0` into `0.0` so that equality and hashing agree.
fn normalize(remainder: f32) -> f32 {
    remainder + 0.0
}

impl PartialEq for BeatValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BeatValue {}

impl PartialOrd for BeatValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BeatValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fraction
            .cmp(&other.fraction)
            .then_with(|| self.remainder.total_cmp(&other.remainder))
    }
}

impl Hash for BeatValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fraction.hash(state);
        self.remainder.to_bits().hash(state);
    }
}

impl fmt::Display for BeatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_max() {
            return write!(f, "Max");
        }
        if self.is_min() {
            return write!(f, "Min");
        }
        let exact = (self.fraction - self.fraction.floor())
            .to_f32()
            .unwrap_or_default();
        let residue = self.remainder - exact;
        if residue.abs() < 1e-4 {
            write!(f, "{}", self.fraction)
        } else {
            write!(f, "{}{:+.4}", self.fraction, residue)
        }
    }
}

impl From<i64> for BeatValue {
    fn from(count: i64) -> Self {
        Self::from_count(count)
    }
}

impl From<Rational64> for BeatValue {
    fn from(fraction: Rational64) -> Self {
        Self::from_ratio(fraction)
    }
}

impl Add for BeatValue {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.offset_by(rhs)
    }
}

impl Sub for BeatValue {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.delta_since(rhs)
    }
}

impl Neg for BeatValue {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Mul<f64> for BeatValue {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale_by(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beat(numer: i64, denom: i64) -> BeatValue {
        BeatValue::from_fraction(numer, denom).expect("non-zero denominator")
    }

    #[test]
    fn float_beats_become_small_fractions() {
        assert_eq!(BeatValue::from_value(0.5).fraction(), Rational64::new(1, 2));
        assert_eq!(
            BeatValue::from_value(2.0 + 1.0 / 3.0).fraction(),
            Rational64::new(7, 3)
        );
        assert_eq!(
            BeatValue::from_value(-0.25).fraction(),
            Rational64::new(-1, 4)
        );
        let pi = BeatValue::from_value(std::f64::consts::PI);
        assert!(*pi.fraction().denom() <= MAX_APPROXIMATION_DENOMINATOR);
        assert!((pi.value() - std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn rounding_to_a_denominator() {
        let rounded = BeatValue::from_value_rounded(1.26, 4);
        assert_eq!(rounded.fraction(), Rational64::new(5, 4));
        assert!((rounded.value() - 1.26).abs() < 1e-6);
    }

    #[test]
    fn remainder_breaks_ties_but_not_alignment() {
        let exact = beat(1, 2);
        let noisy = BeatValue::from_value(0.500_01);
        assert_eq!(noisy.fraction(), Rational64::new(1, 2));
        assert!(exact < noisy);
        assert!(exact.eq_aligned(&noisy));
        assert_ne!(exact, noisy);
    }

    #[test]
    fn offset_carries_the_remainder() {
        let sum = BeatValue::from_value(0.75).offset_by(BeatValue::from_value(0.5));
        assert_eq!(sum.fraction(), Rational64::new(5, 4));
        assert_eq!(sum.integer(), 1);
        assert!((sum.value() - 1.25).abs() < 1e-6);

        let negative = beat(1, 4).delta_since(beat(3, 4));
        assert_eq!(negative.fraction(), Rational64::new(-1, 2));
        assert!((negative.value() + 0.5).abs() < 1e-6);
    }

    #[test]
    fn saturates_at_the_limits() {
        assert!(BeatValue::from_value(2e9).is_max());
        assert!(BeatValue::from_value(f64::NEG_INFINITY).is_min());
        assert_eq!(BeatValue::MAX.value(), f64::INFINITY);
        assert_eq!(BeatValue::MAX.negate(), BeatValue::MIN);
        assert_eq!(BeatValue::MAX.offset_by(BeatValue::from_count(5)), BeatValue::MAX);
        assert_eq!(BeatValue::from_value(f64::NAN), BeatValue::ZERO);
    }

    #[test]
    fn infinities_are_sticky() {
        assert_eq!(BeatValue::MAX.offset_by(BeatValue::MIN), BeatValue::MAX);
        assert_eq!(BeatValue::MIN.offset_by(BeatValue::from_count(-5)), BeatValue::MIN);
        assert_eq!(BeatValue::MAX.delta_since(BeatValue::from_count(3)), BeatValue::MAX);
        assert_eq!(BeatValue::from_count(3).offset_by(BeatValue::MIN), BeatValue::MIN);
    }

    #[test]
    fn coprime_denominators_do_not_overflow() {
        let a = beat(1, 4_294_967_291);
        let b = beat(1, 4_294_967_279);
        let sum = a.offset_by(b);
        let expected = 1.0 / 4_294_967_291.0 + 1.0 / 4_294_967_279.0;
        assert!((sum.value() - expected).abs() < 1e-15);
        assert!(*sum.fraction().denom() <= MAX_APPROXIMATION_DENOMINATOR);
    }

    #[test]
    fn negative_zero_equals_zero() {
        let zero = BeatValue::from_count(1).delta_since(BeatValue::from_count(1));
        assert_eq!(zero, BeatValue::ZERO);
        assert_eq!(BeatValue::ZERO.negate(), BeatValue::ZERO);
    }

    #[test]
    fn display() {
        assert_eq!(beat(3, 2).to_string(), "3/2");
        assert_eq!(BeatValue::from_count(4).to_string(), "4");
        assert_eq!(BeatValue::MIN.to_string(), "Min");
        assert_eq!(BeatValue::from_value(0.500_4).to_string(), "1/2+0.0004");
    }
}
