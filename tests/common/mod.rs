//! Helpers shared by the integration tests.
//!
//! Time assertions allow 1 microsecond of error, see [`assert_seconds_close`].

#![allow(dead_code)]

use beatline::prelude::*;

/// Allowed error of time assertions, in seconds.
pub const MICROSECOND_EPSILON: f64 = 1e-6;

/// Allowed error of unitless float assertions.
pub const VALUE_EPSILON: f64 = 1e-9;

pub fn beat(count: i64) -> BeatValue {
    BeatValue::from_count(count)
}

pub fn at(count: i64) -> TimeAnchor {
    TimeAnchor::from_beat(beat(count))
}

pub fn ms(value: i32) -> TimeValue {
    TimeValue::from_whole_milliseconds(value)
}

/// A chart with resolved times.
pub fn chart(tempos: Vec<TempoChange>, effects: Vec<Effect>, objects: Vec<ChartObject>) -> Chart {
    let mut chart = Chart::new(tempos, effects, objects);
    chart.resolve_times().expect("tempo list is valid");
    chart
}

pub fn build(chart: &Chart) -> Timeline {
    TimelineBuilder::default()
        .build_chart(chart)
        .expect("tempo list is valid")
}

#[track_caller]
pub fn assert_seconds_close(expected: f64, actual: TimeValue, msg: &str) {
    let actual = actual.seconds();
    let diff = (expected - actual).abs();
    assert!(
        diff < MICROSECOND_EPSILON,
        "{msg}: expected {expected:.6}s, got {actual:.6}s, diff {diff:.9}s (allowed: {MICROSECOND_EPSILON}s)",
    );
}

#[track_caller]
pub fn assert_value_close(expected: f64, actual: f64, msg: &str) {
    let diff = (expected - actual).abs();
    assert!(
        diff < VALUE_EPSILON,
        "{msg}: expected {expected}, got {actual}, diff {diff:e}",
    );
}
