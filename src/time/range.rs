//! Closed spans over any position type.

use std::cmp::Ordering;

use super::TimeUnit;

/// A `[start, end]` span on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span<T> {
    /// Where the span begins.
    pub start: T,
    /// Where the span ends.
    pub end: T,
}

/// How [`Span::contains`] treats the boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bounds {
    /// `start` itself is outside the span.
    pub exclude_start: bool,
    /// `end` itself is outside the span.
    pub exclude_end: bool,
    /// Compare with [`TimeUnit::cmp_aligned`] instead of the exact order.
    pub aligned: bool,
}

impl Bounds {
    /// `[start, end]`, exact comparison.
    pub const INCLUSIVE: Self = Self {
        exclude_start: false,
        exclude_end: false,
        aligned: false,
    };
    /// `[start, end)`, exact comparison.
    pub const HALF_OPEN: Self = Self {
        exclude_start: false,
        exclude_end: true,
        aligned: false,
    };

    /// The same boundaries compared with [`TimeUnit::cmp_aligned`].
    #[must_use]
    pub const fn aligned(self) -> Self {
        Self {
            aligned: true,
            ..self
        }
    }
}

impl<T: TimeUnit> Span<T> {
    /// Creates a span.
    #[must_use]
    pub const fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    /// `end - start`.
    #[must_use]
    pub fn length(&self) -> T {
        self.end.delta_since(self.start)
    }

    /// The position at progress `k`, where `0` is `start` and `1` is `end`.
    #[must_use]
    pub fn lerp(&self, k: f64) -> T {
        self.start.offset_by(self.length().scale_by(k))
    }

    /// Clamps `value` into the span.
    #[must_use]
    pub fn clamp(&self, value: T) -> T {
        if value < self.start {
            self.start
        } else if value > self.end {
            self.end
        } else {
            value
        }
    }

    /// Progress of `value` through the span, optionally clamped into `[0, 1]`.
    /// Zero-length spans yield `0`.
    #[must_use]
    pub fn ratio_of(&self, value: T, clamped: bool) -> f64 {
        let length = self.length().value();
        if length == 0.0 || !length.is_finite() {
            return 0.0;
        }
        let ratio = value.delta_since(self.start).value() / length;
        if clamped { ratio.clamp(0.0, 1.0) } else { ratio }
    }

    /// Whether `value` lies in the span.
    #[must_use]
    pub fn contains(&self, value: T, bounds: Bounds) -> bool {
        let order = |a: &T, b: &T| {
            if bounds.aligned {
                a.cmp_aligned(b)
            } else {
                a.cmp(b)
            }
        };
        let after_start = match order(&value, &self.start) {
            Ordering::Greater => true,
            Ordering::Equal => !bounds.exclude_start,
            Ordering::Less => false,
        };
        let before_end = match order(&value, &self.end) {
            Ordering::Less => true,
            Ordering::Equal => !bounds.exclude_end,
            Ordering::Greater => false,
        };
        after_start && before_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{BeatValue, TimeValue};

    fn ms(value: f64) -> TimeValue {
        TimeValue::from_milliseconds(value)
    }

    #[test]
    fn lerp_and_ratio() {
        let span = Span::new(ms(100.0), ms(300.0));
        assert_eq!(span.length(), ms(200.0));
        assert_eq!(span.lerp(0.25), ms(150.0));
        assert!((span.ratio_of(ms(400.0), false) - 1.5).abs() < 1e-9);
        assert!((span.ratio_of(ms(400.0), true) - 1.0).abs() < 1e-9);
        assert_eq!(span.clamp(ms(0.0)), ms(100.0));
    }

    #[test]
    fn boundaries() {
        let span = Span::new(BeatValue::from_count(1), BeatValue::from_count(2));
        let end = BeatValue::from_count(2);
        assert!(span.contains(end, Bounds::INCLUSIVE));
        assert!(!span.contains(end, Bounds::HALF_OPEN));

        let noisy_end = BeatValue::from_value(2.000_01);
        assert!(!span.contains(noisy_end, Bounds::INCLUSIVE));
        assert!(span.contains(noisy_end, Bounds::INCLUSIVE.aligned()));
    }

    #[test]
    fn empty_span_has_zero_progress() {
        let span = Span::new(ms(5.0), ms(5.0));
        assert!(span.ratio_of(ms(10.0), false).abs() < f64::EPSILON);
    }
}
