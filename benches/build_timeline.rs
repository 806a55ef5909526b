//! Benchmark for building a `Timeline` from a chart.

use beatline::prelude::*;
use criterion::Criterion;
use std::{collections::BTreeMap, sync::LazyLock};

type GeneratedCharts = BTreeMap<String, Chart>;

/// A chart with a tempo change every 16 beats, overlapping speed effects and a
/// note on every beat.
fn generate_chart(beats: i64) -> Chart {
    let tempos = (0..beats)
        .step_by(16)
        .map(|count| {
            let bpm = 120.0 + (count % 64) as f64;
            TempoChange::at_beat(bpm, BeatValue::from_count(count))
        })
        .collect();
    let effects = (0..beats)
        .step_by(8)
        .map(|count| {
            let kind = if count % 16 == 0 {
                EffectKind::ScrollSpeed
            } else {
                EffectKind::NoteSpeed
            };
            Effect::new(
                kind,
                EffectValue::Number(0.5 + (count % 5) as f64 * 0.25),
                Some(TimeAnchor::from_beat(BeatValue::from_count(count))),
                Some(TimeAnchor::from_beat(BeatValue::from_count(count + 12))),
            )
        })
        .collect();
    let objects = (0..beats)
        .map(|count| {
            ChartObject::single(
                ObjectId::new(count as u32),
                TimeAnchor::from_beat(BeatValue::from_count(count)),
            )
        })
        .collect();
    let mut chart = Chart::new(tempos, effects, objects);
    chart
        .resolve_times()
        .expect("generated tempo list is sorted");
    chart
}

fn generate_charts() -> GeneratedCharts {
    [256, 4_096, 65_536]
        .into_iter()
        .map(|beats| (format!("{beats}_beats"), generate_chart(beats)))
        .collect()
}

static GENERATED_CHARTS: LazyLock<GeneratedCharts> = LazyLock::new(generate_charts);

fn bench_build_timeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_timeline");
    let builder = TimelineBuilder::default();

    for (name, chart) in GENERATED_CHARTS.iter() {
        group.bench_function(name, |b| {
            b.iter(|| builder.build_chart(std::hint::black_box(chart)));
        });
    }

    group.finish();
}

fn main() {
    let mut criterion = Criterion::default();
    bench_build_timeline(&mut criterion);
}
