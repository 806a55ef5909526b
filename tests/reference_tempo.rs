mod common;

use beatline::prelude::*;
use pretty_assertions::assert_eq;

use common::{assert_value_close, at, beat, chart};

/// 60 bpm and 120 bpm, four seconds each, with notes covering both.
fn two_tempo_chart() -> Chart {
    chart(
        vec![
            TempoChange::at_beat(60.0, beat(0)),
            TempoChange::at_beat(120.0, beat(4)),
        ],
        Vec::new(),
        vec![
            ChartObject::single(ObjectId::new(1), at(0)),
            ChartObject::single(ObjectId::new(2), at(12)),
        ],
    )
}

fn reference_at(percentile: f64) -> f64 {
    let chart = two_tempo_chart();
    TimelineBuilder::new(TimelineConfig {
        reference_percentile: percentile,
        ..TimelineConfig::default()
    })
    .reference_beat_length(&chart.tempos, &chart.objects)
}

#[test]
fn two_tempo_percentile_boundary() {
    // The slower half of the chart is exhausted exactly at the 50th percentile.
    assert_value_close(1.0, reference_at(0.0), "0th percentile");
    assert_value_close(1.0, reference_at(0.49), "just below half");
    assert_value_close(0.5, reference_at(0.5), "exactly half");
    assert_value_close(0.5, reference_at(0.667), "default percentile");
    assert_value_close(0.5, reference_at(1.0), "100th percentile");
}

#[test]
fn reference_tempo_sets_the_scroll_speed() {
    let chart = two_tempo_chart();
    let timeline = TimelineBuilder::default()
        .build_chart(&chart)
        .expect("valid tempo list");
    assert_value_close(0.5, timeline.reference_beat_length(), "reference");
    assert_value_close(
        0.5,
        timeline.carriers()[0].tempo_scale(),
        "60 bpm against 120 bpm",
    );
    assert_value_close(1.0, timeline.carriers()[1].tempo_scale(), "120 bpm");
}

#[test]
fn unsorted_tempos_are_rejected_by_resolution() {
    let mut chart = Chart::new(
        vec![
            TempoChange::at_beat(120.0, beat(4)),
            TempoChange::at_beat(60.0, beat(0)),
        ],
        Vec::new(),
        Vec::new(),
    );
    assert_eq!(
        chart.resolve_times(),
        Err(TimelineError::UnsortedTempo {
            index: 1,
            beat: beat(0),
            previous: beat(4),
        })
    );
}

#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "invalid tempo map"))]
fn invalid_tempo_fails_the_build() {
    let tempos = [
        TempoChange::at_beat(120.0, beat(0)),
        TempoChange::at_beat(0.0, beat(4)),
    ];
    let result = TimelineBuilder::default().build(&tempos, &[], &[] as &[ChartObject]);
    assert!(matches!(
        result,
        Err(TimelineError::InvalidTempo { index: 1, .. })
    ));
}

#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "invalid tempo map"))]
fn duplicate_tempo_fails_the_build() {
    let tempos = [
        TempoChange::at_beat(120.0, beat(0)),
        TempoChange::at_beat(90.0, beat(0)),
    ];
    let result = TimelineBuilder::default().build(&tempos, &[], &[] as &[ChartObject]);
    assert_eq!(
        result.map(|timeline| timeline.carriers().len()),
        Err(TimelineError::DuplicateTempo {
            index: 1,
            beat: beat(0),
        })
    );
}
