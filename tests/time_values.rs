mod common;

use beatline::prelude::*;
use proptest::prelude::*;

use common::{beat, ms};

#[test]
fn small_offsets_do_not_drift() {
    let step = TimeValue::from_milliseconds(0.01);
    let mut time = TimeValue::ZERO;
    for _ in 0..10_000 {
        time = time.offset_by(step);
    }
    assert!(
        (time.milliseconds() - 100.0).abs() < 1.0,
        "10 000 steps of 0.01ms ended at {time}"
    );
}

#[test]
fn gametime_spans_convert_to_milliseconds() {
    let span = gametime::TimeSpan::from_duration(std::time::Duration::from_millis(1_250));
    assert_eq!(TimeValue::from(span), ms(1_250));
}

#[test]
fn saturated_values_stay_saturated() {
    assert!(TimeValue::MAX.offset_by(ms(5)).is_max());
    assert!(TimeValue::MIN.offset_by(ms(-5)).is_min());
    assert!(BeatValue::MAX.offset_by(beat(1)).is_max());
    assert_eq!(BeatValue::MAX.to_string(), "Max");
    assert_eq!(TimeValue::MIN.to_string(), "Min");
}

proptest! {
    #[test]
    fn time_offsets_undo(base in -1.0e6f64..1.0e6, offset in -1.0e5f64..1.0e5) {
        let base = TimeValue::from_milliseconds(base);
        let offset = TimeValue::from_milliseconds(offset);
        let back = base.offset_by(offset).offset_by(offset.negate());
        prop_assert!((back.value() - base.value()).abs() < 1e-3, "{} came back as {}", base, back);
    }

    #[test]
    fn beat_offsets_undo(base in -1.0e4f64..1.0e4, offset in -1.0e3f64..1.0e3) {
        let base = BeatValue::from_value(base);
        let offset = BeatValue::from_value(offset);
        let back = base.offset_by(offset).offset_by(offset.negate());
        prop_assert!((back.value() - base.value()).abs() < 1e-4, "{} came back as {}", base, back);
    }
}
