//! Fixed-point positions: an integer part plus a float remainder.
//!
//! Adding many small float deltas to a plain `f64` drifts. These types keep the
//! accumulated float part small by moving every whole unit of it into the integer
//! on each offset.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::{Add, Mul, Neg, Sub},
};

use gametime::TimeSpan;

use super::{MAX_INTEGER, TimeUnit};

macro_rules! fixed_point {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            integer: i32,
            remainder: f32,
        }

        impl $name {
            /// Zero.
            pub const ZERO: Self = Self {
                integer: 0,
                remainder: 0.0,
            };
            /// Positive infinity.
            pub const MAX: Self = Self {
                integer: MAX_INTEGER,
                remainder: 0.0,
            };
            /// Negative infinity.
            pub const MIN: Self = Self {
                integer: -MAX_INTEGER,
                remainder: 0.0,
            };

            /// Builds a value from its integer part and float remainder.
            #[must_use]
            pub fn from_parts(integer: i64, remainder: f32) -> Self {
                let whole = remainder.round();
                let integer = integer.saturating_add(whole as i64);
                if integer >= i64::from(MAX_INTEGER) {
                    Self::MAX
                } else if integer <= -i64::from(MAX_INTEGER) {
                    Self::MIN
                } else {
                    Self {
                        integer: integer as i32,
                        remainder: (remainder - whole) + 0.0,
                    }
                }
            }

            /// Splits a float into the nearest integer and the residue.
            #[must_use]
            pub fn from_value(value: f64) -> Self {
                if value.is_nan() {
                    return Self::ZERO;
                }
                let limit = f64::from(MAX_INTEGER);
                if value >= limit {
                    return Self::MAX;
                }
                if value <= -limit {
                    return Self::MIN;
                }
                let integer = value.round();
                Self::from_parts(integer as i64, (value - integer) as f32)
            }

            /// The integer part.
            #[must_use]
            pub const fn integer(self) -> i32 {
                self.integer
            }

            /// The float part, always within `[-0.5, 0.5]`.
            #[must_use]
            pub const fn remainder(self) -> f32 {
                self.remainder
            }

            /// Whether this is positive infinity.
            #[must_use]
            pub const fn is_max(self) -> bool {
                self.integer >= MAX_INTEGER
            }

            /// Whether this is negative infinity.
            #[must_use]
            pub const fn is_min(self) -> bool {
                self.integer <= -MAX_INTEGER
            }
        }

        impl TimeUnit for $name {
            fn value(self) -> f64 {
                if self.is_max() {
                    f64::INFINITY
                } else if self.is_min() {
                    f64::NEG_INFINITY
                } else {
                    f64::from(self.integer) + f64::from(self.remainder)
                }
            }

            fn cmp_aligned(&self, other: &Self) -> Ordering {
                self.integer.cmp(&other.integer)
            }

            fn negate(self) -> Self {
                Self::from_parts(-i64::from(self.integer), -self.remainder)
            }

            fn scale_by(self, scale: f64) -> Self {
                if self.is_max() || self.is_min() {
                    return Self::from_value(self.value() * scale);
                }
                Self::from_value(f64::from(self.integer) * scale)
                    .offset_by(Self::from_value(f64::from(self.remainder) * scale))
            }

            fn offset_by(self, offset: Self) -> Self {
                if self.is_max() || self.is_min() {
                    return self;
                }
                if offset.is_max() || offset.is_min() {
                    return offset;
                }
                Self::from_parts(
                    i64::from(self.integer) + i64::from(offset.integer),
                    self.remainder + offset.remainder,
                )
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.cmp(other) == Ordering::Equal
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.integer
                    .cmp(&other.integer)
                    .then_with(|| self.remainder.total_cmp(&other.remainder))
            }
        }

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.integer.hash(state);
                self.remainder.to_bits().hash(state);
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self::Output {
                self.offset_by(rhs)
            }
        }

        impl Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self::Output {
                self.delta_since(rhs)
            }
        }

        impl Neg for $name {
            type Output = Self;

            fn neg(self) -> Self::Output {
                self.negate()
            }
        }

        impl Mul<f64> for $name {
            type Output = Self;

            fn mul(self, rhs: f64) -> Self::Output {
                self.scale_by(rhs)
            }
        }
    };
}

fixed_point! {
    /// A wall-clock position in milliseconds.
    ///
    /// [`TimeUnit::value`] is in milliseconds; use [`TimeValue::seconds`] for seconds.
    TimeValue
}

fixed_point! {
    /// A scroll position. One unit is one second of scrolling at speed `1.0`.
    RollValue
}

impl TimeValue {
    /// `milliseconds` ms, keeping the sub-millisecond residue.
    #[must_use]
    pub fn from_milliseconds(milliseconds: f64) -> Self {
        Self::from_value(milliseconds)
    }

    /// A whole number of milliseconds.
    #[must_use]
    pub fn from_whole_milliseconds(milliseconds: i32) -> Self {
        Self::from_parts(i64::from(milliseconds), 0.0)
    }

    /// `seconds` s.
    #[must_use]
    pub fn from_seconds(seconds: f64) -> Self {
        Self::from_value(seconds * 1000.0)
    }

    /// The position in milliseconds.
    #[must_use]
    pub fn milliseconds(self) -> f64 {
        self.value()
    }

    /// The position in seconds.
    #[must_use]
    pub fn seconds(self) -> f64 {
        self.value() / 1000.0
    }

    /// Milliseconds rounded to the nearest integer.
    #[must_use]
    pub fn milliseconds_rounded(self) -> i32 {
        self.integer
    }

    /// Milliseconds rounded down.
    #[must_use]
    pub fn milliseconds_floored(self) -> i32 {
        if self.remainder < 0.0 {
            self.integer.saturating_sub(1)
        } else {
            self.integer
        }
    }

    /// Milliseconds rounded up.
    #[must_use]
    pub fn milliseconds_ceiling(self) -> i32 {
        if self.remainder > 0.0 {
            self.integer.saturating_add(1)
        } else {
            self.integer
        }
    }
}

impl From<TimeSpan> for TimeValue {
    fn from(span: TimeSpan) -> Self {
        Self::from_milliseconds(span.as_nanos() as f64 / 1_000_000.0)
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_max() {
            write!(f, "Max")
        } else if self.is_min() {
            write!(f, "Min")
        } else {
            write!(f, "{:.3}ms", self.value())
        }
    }
}

impl RollValue {
    /// Builds a roll position from a float.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self::from_value(value)
    }
}

impl fmt::Display for RollValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_max() {
            write!(f, "Max")
        } else if self.is_min() {
            write!(f, "Min")
        } else {
            write!(f, "{:.4}", self.value())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn offsets_do_not_drift() {
        let step = TimeValue::from_milliseconds(0.01);
        let mut total = TimeValue::ZERO;
        for _ in 0..10_000 {
            total = total.offset_by(step);
        }
        assert!((total.milliseconds() - 100.0).abs() < 1.0);
        assert_eq!(total.milliseconds_rounded(), 100);
    }

    #[test]
    fn rounding_modes() {
        let time = TimeValue::from_milliseconds(12.4);
        assert_eq!(time.milliseconds_rounded(), 12);
        assert_eq!(time.milliseconds_floored(), 12);
        assert_eq!(time.milliseconds_ceiling(), 13);

        let time = TimeValue::from_milliseconds(-12.4);
        assert_eq!(time.milliseconds_rounded(), -12);
        assert_eq!(time.milliseconds_floored(), -13);
        assert_eq!(time.milliseconds_ceiling(), -12);
    }

    #[test]
    fn seconds_round_trip_through_milliseconds() {
        let time = TimeValue::from_seconds(1.5);
        assert_eq!(time, TimeValue::from_whole_milliseconds(1500));
        assert!((time.seconds() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn converts_from_game_clock() {
        let span = TimeSpan::from_duration(Duration::from_micros(2_500));
        let time = TimeValue::from(span);
        assert!((time.milliseconds() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn saturation_and_negation() {
        assert!(TimeValue::from_seconds(1e7).is_max());
        assert_eq!(TimeValue::MAX.negate(), TimeValue::MIN);
        assert_eq!(TimeValue::MAX.offset_by(TimeValue::from_seconds(1.0)), TimeValue::MAX);
        assert_eq!(
            TimeValue::from_milliseconds(3.25).negate(),
            TimeValue::from_milliseconds(-3.25)
        );
        assert_eq!(TimeValue::MIN.to_string(), "Min");
    }

    #[test]
    fn infinities_are_sticky() {
        let second = TimeValue::from_seconds(1.0);
        assert_eq!(TimeValue::MAX.offset_by(TimeValue::MIN), TimeValue::MAX);
        assert_eq!(TimeValue::MIN.offset_by(TimeValue::MAX), TimeValue::MIN);
        assert_eq!(second.offset_by(TimeValue::MIN), TimeValue::MIN);
        assert_eq!(second.delta_since(TimeValue::MAX), TimeValue::MIN);
        assert_eq!(RollValue::MAX.delta_since(RollValue::new(3.0)), RollValue::MAX);
    }

    #[test]
    fn scaling_keeps_the_remainder() {
        let roll = RollValue::new(10.25).scale_by(2.0);
        assert!((roll.value() - 20.5).abs() < 1e-6);
        assert!((RollValue::new(3.0).ratio_to(RollValue::new(1.5)) - 2.0).abs() < 1e-12);
    }
}
