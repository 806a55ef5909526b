//! Sampling effect values along the beat or time axis.
//!
//! An effect moves from `value_start` to `value_end` along its interpolation curve
//! over its span. These functions read that curve at a point or over a range.
//! Every function returns `None` when either end value is not numeric.

use super::{
    TimelineConfig,
    carrier::{EffectId, TimeCarrier},
};
use crate::{
    chart::{Effect, EffectKind, Interpolation, TimedObject},
    time::{AnchorAxis, RollValue, TimeUnit, TimeValue},
};

fn numeric_ends(effect: &Effect) -> Option<(f64, f64)> {
    Some((effect.value_start.as_number()?, effect.value_end.as_number()?))
}

/// The curve and the span width if the effect interpolates over a finite, non-empty span.
fn curve<A: AnchorAxis>(effect: &Effect) -> Option<(Interpolation, A, f64)> {
    let interpolation = effect.interpolation?;
    let start = A::of_anchor(effect.start()?);
    let end = A::of_anchor(effect.end()?);
    let width = end.delta_since(start).value();
    (width.is_finite() && width > 0.0).then_some((interpolation, start, width))
}

fn progress<A: AnchorAxis>(start: A, width: f64, at: A) -> f64 {
    (at.delta_since(start).value() / width).clamp(0.0, 1.0)
}

/// The value at `at`.
#[must_use]
pub fn sample_value<A: AnchorAxis>(effect: &Effect, at: A) -> Option<f64> {
    let (from, to) = numeric_ends(effect)?;
    Some(match curve::<A>(effect) {
        Some((interpolation, start, width)) => {
            from + (to - from) * interpolation.map(progress(start, width, at))
        }
        None => from,
    })
}

/// The rate of change at `at`, per unit of the axis.
#[must_use]
pub fn sample_rate<A: AnchorAxis>(effect: &Effect, at: A) -> Option<f64> {
    let (from, to) = numeric_ends(effect)?;
    Some(match curve::<A>(effect) {
        Some((interpolation, start, width)) => {
            (to - from) * interpolation.derivative(progress(start, width, at)) / width
        }
        None => 0.0,
    })
}

/// `value(to) - value(from)`.
#[must_use]
pub fn sample_delta<A: AnchorAxis>(effect: &Effect, from: A, to: A) -> Option<f64> {
    Some(sample_value(effect, to)? - sample_value(effect, from)?)
}

/// The mean value over `[from, to]`, or the value at `from` when the range is empty.
#[must_use]
pub fn sample_average<A: AnchorAxis>(effect: &Effect, from: A, to: A) -> Option<f64> {
    let (low, high) = numeric_ends(effect)?;
    Some(match curve::<A>(effect) {
        Some((interpolation, start, width)) => {
            let k0 = progress(start, width, from);
            let k1 = progress(start, width, to);
            low + (high - low) * interpolation.average(k0, k1)
        }
        None => low,
    })
}

/// The integral of the value over `[from, to]` along the axis. An empty range
/// integrates to zero.
///
/// Without a finite span to interpolate over, this is the start value times the
/// width of the range.
#[must_use]
pub fn sample_integral<A: AnchorAxis>(effect: &Effect, from: A, to: A) -> Option<f64> {
    sample_integral_with_width(effect, from, to, to.delta_since(from).value())
}

/// Like [`sample_integral`], but an effect with no finite span to interpolate over,
/// either unbounded or zero wide, integrates to its start value times `width`.
#[must_use]
pub fn sample_integral_with_width<A: AnchorAxis>(
    effect: &Effect,
    from: A,
    to: A,
    width: f64,
) -> Option<f64> {
    let (start, _) = numeric_ends(effect)?;
    Some(match curve::<A>(effect) {
        Some(_) => sample_average(effect, from, to)? * to.delta_since(from).value(),
        None => start * width,
    })
}

/// The product of the numeric `kind` effects in `active` at `time`, or `default`
/// when there is none.
pub(crate) fn velocity_at(
    effects: &[Effect],
    active: &[EffectId],
    kind: EffectKind,
    time: TimeValue,
    default: f64,
) -> f64 {
    active
        .iter()
        .filter_map(|id| effects.get(id.value()))
        .filter(|effect| effect.kind == kind)
        .filter_map(|effect| sample_value(effect, time))
        .reduce(|product, value| product * value)
        .unwrap_or(default)
}

/// Speed of scrolling averaged over `[from, to]` inside one carrier span.
pub(crate) fn average_speed(
    carrier: &TimeCarrier,
    effects: &[Effect],
    config: &TimelineConfig,
    from: TimeValue,
    to: TimeValue,
) -> f64 {
    if !config.applies_scroll_effects() {
        return carrier.scroll_base;
    }
    // Several interpolated speeds are averaged one by one; their product is exact
    // only while at most one of them moves.
    let velocity = carrier
        .active
        .iter()
        .filter_map(|id| effects.get(id.value()))
        .filter(|effect| effect.kind == EffectKind::ScrollSpeed)
        .filter_map(|effect| sample_average(effect, from, to))
        .reduce(|product, value| product * value)
        .unwrap_or(config.defaults.scroll_speed);
    carrier.scroll_base * velocity
}

/// The roll at `time`, integrating the speed from `carrier`.
pub(crate) fn integrate_roll(
    carrier: &TimeCarrier,
    effects: &[Effect],
    config: &TimelineConfig,
    time: TimeValue,
) -> RollValue {
    if time.is_max() {
        return RollValue::MAX;
    }
    if time.is_min() {
        return RollValue::MIN;
    }
    if time == carrier.time() {
        return carrier.roll;
    }
    let seconds = time.delta_since(carrier.time()).seconds();
    let speed = average_speed(carrier, effects, config, carrier.time(), time);
    carrier.roll.offset_by(RollValue::new(speed * seconds))
}
