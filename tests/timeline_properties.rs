mod common;

use beatline::prelude::*;
use proptest::prelude::*;

use common::{at, beat, build, chart, ms};

/// Tempo changes on strictly increasing beats, the first at beat 0.
fn tempos() -> impl Strategy<Value = Vec<TempoChange>> {
    (
        30.0f64..300.0,
        prop::collection::btree_map(1i64..64, 30.0f64..300.0, 0..6),
    )
        .prop_map(|(first, changes)| {
            std::iter::once(TempoChange::at_beat(first, beat(0)))
                .chain(
                    changes
                        .into_iter()
                        .map(|(count, bpm)| TempoChange::at_beat(bpm, beat(count))),
                )
                .collect()
        })
}

fn edge() -> impl Strategy<Value = Option<i64>> {
    prop::option::weighted(0.8, 0i64..64)
}

fn effect() -> impl Strategy<Value = Effect> {
    let kind = prop_oneof![
        Just(EffectKind::ScrollSpeed),
        Just(EffectKind::NoteSpeed),
        Just(EffectKind::Chorus),
        Just(EffectKind::ShowBar),
    ];
    (kind, 0.25f64..4.0, edge(), edge()).prop_map(|(kind, value, start, end)| {
        Effect::new(
            kind,
            EffectValue::Number(value),
            start.map(at),
            end.map(at),
        )
    })
}

fn timeline_input() -> impl Strategy<Value = Chart> {
    (tempos(), prop::collection::vec(effect(), 0..12), 0i64..8, 8i64..64).prop_map(
        |(tempos, effects, first_note, last_note)| {
            chart(
                tempos,
                effects,
                vec![
                    ChartObject::single(ObjectId::new(0), at(first_note)),
                    ChartObject::single(ObjectId::new(1), at(last_note)),
                ],
            )
        },
    )
}

fn expected_active(chart: &Chart, at_beat: BeatValue) -> Vec<EffectId> {
    chart
        .effects
        .iter()
        .enumerate()
        .filter(|(_, effect)| effect.is_well_formed())
        .filter(|(_, effect)| effect.start().is_none_or(|start| start.beat() <= at_beat))
        .filter(|(_, effect)| effect.end().is_none_or(|end| at_beat < end.beat()))
        .map(|(index, _)| EffectId::new(index))
        .collect()
}

proptest! {
    #[test]
    fn carriers_are_in_beat_order(chart in timeline_input()) {
        let timeline = build(&chart);
        let beats = timeline.carriers().iter().map(TimeCarrier::beat).collect::<Vec<_>>();
        prop_assert!(beats.windows(2).all(|pair| pair[0] <= pair[1]));
        let edges = chart.effects.iter().filter(|effect| effect.is_well_formed())
            .map(|effect| usize::from(effect.start().is_some()) + usize::from(effect.end().is_some()))
            .sum::<usize>();
        prop_assert_eq!(timeline.carriers().len(), chart.tempos.len() + edges);
    }

    #[test]
    fn last_carrier_at_a_beat_has_the_half_open_state(chart in timeline_input()) {
        let timeline = build(&chart);
        let carriers = timeline.carriers();
        for (index, carrier) in carriers.iter().enumerate() {
            let is_last = carriers.get(index + 1).is_none_or(|next| next.beat() > carrier.beat());
            if is_last {
                let expected = expected_active(&chart, carrier.beat());
                prop_assert_eq!(
                    carrier.active_effects(),
                    expected.as_slice(),
                    "at beat {}", carrier.beat()
                );
            }
        }
    }

    #[test]
    fn beat_lookup_finds_the_governing_carrier(chart in timeline_input(), queries in prop::collection::vec(-4i64..72, 1..16)) {
        let timeline = build(&chart);
        let carriers = timeline.carriers();
        for count in queries {
            let query = beat(count);
            let hit = timeline.find_by_beat(query, 0).expect("timeline has tempos");
            let expected = carriers.iter().rposition(|carrier| carrier.beat() <= query).unwrap_or(0);
            prop_assert_eq!(hit.index, expected);
            for hint in 0..carriers.len() + 1 {
                let hinted = timeline.find_by_beat(query, hint).expect("timeline has tempos");
                prop_assert_eq!(hinted.index, hit.index);
            }
        }
    }

    #[test]
    fn time_and_roll_hints_do_not_change_results(chart in timeline_input(), mut times in prop::collection::vec(-500i32..40_000, 1..24)) {
        let timeline = build(&chart);
        times.sort_unstable();
        let mut time_hint = 0;
        let mut roll_hint = 0;
        for time in times {
            let time = ms(time);
            let fresh = timeline.find_by_time(time, 0).expect("timeline has tempos");
            let hinted = timeline.find_by_time(time, time_hint).expect("timeline has tempos");
            prop_assert_eq!(fresh.index, hinted.index);
            time_hint = hinted.hint;

            let roll = timeline.roll_at_time(time).expect("timeline has tempos");
            let fresh = timeline.find_by_roll(roll, 0).expect("timeline has tempos");
            let hinted = timeline.find_by_roll(roll, roll_hint).expect("timeline has tempos");
            prop_assert_eq!(fresh.index, hinted.index);
            roll_hint = hinted.hint;
        }
    }

    #[test]
    fn rebuilding_gives_the_same_timeline(chart in timeline_input()) {
        let first = build(&chart);
        let second = build(&chart);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn beat_and_time_conversions_agree(chart in timeline_input(), counts in prop::collection::vec(0i64..64, 1..8)) {
        let timeline = build(&chart);
        for count in counts {
            let time = timeline.time_of_beat(beat(count)).expect("timeline has tempos");
            prop_assert_eq!(Some(time), chart.time_of_beat(beat(count)));
            let back = timeline.beat_of_time(time).expect("timeline has tempos");
            prop_assert!((back.value() - count as f64).abs() < 1e-3, "beat {} came back as {}", count, back);
        }
    }
}

#[test]
fn co_located_edges_are_ordered_start_then_end() {
    let chart = chart(
        vec![TempoChange::at_beat(120.0, beat(0))],
        vec![
            Effect::new(EffectKind::NoteSpeed, EffectValue::Number(2.0), Some(at(0)), Some(at(4))),
            Effect::new(EffectKind::NoteSpeed, EffectValue::Number(3.0), Some(at(4)), Some(at(8))),
        ],
        Vec::new(),
    );
    let timeline = build(&chart);
    let at_four = timeline
        .carriers()
        .iter()
        .filter(|carrier| carrier.beat() == beat(4))
        .collect::<Vec<_>>();
    assert_eq!(at_four.len(), 2);

    let first = EffectId::new(0);
    let second = EffectId::new(1);
    // The start of the second effect comes first and still sees the first one.
    assert_eq!(at_four[0].activated(), Some(second));
    assert!(at_four[0].is_active(first) && at_four[0].is_active(second));
    assert_eq!(at_four[1].deactivated(), Some(first));
    assert!(!at_four[1].is_active(first) && at_four[1].is_active(second));

    let hit = timeline.find_by_beat(beat(4), 0).expect("timeline has tempos");
    assert!(std::ptr::eq(hit.carrier, at_four[1]));
}
