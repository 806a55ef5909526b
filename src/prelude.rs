//! Prelude module for beatline.
//!
//! Re-exports the types needed to build a timeline and judge a chart in one go.

pub use crate::{
    chart::{
        Axis, Chart, ChartObject, Effect, EffectKind, EffectValue, ExtensionCode, Interpolation,
        ObjectEdge, ObjectId, TempoChange, TimedObject, TimedObjectMut, compare_objects,
    },
    error::{JudgeError, TimelineError},
    judge::{
        CarrierState, HitAction, HitResult, InputEvent, InputReceiver, InputSender, JudgeLogic,
        JudgeQueue, JudgeQueueConfig, JudgeTiming, JudgeWindows, QueueCounts, Score, ScoreKey,
        ScoreValue, input_channel, is_failed,
    },
    time::{
        AnchorAxis, BeatValue, Bounds, MAX_INTEGER, RollValue, Span, TimeAnchor, TimeUnit,
        TimeValue,
    },
    timeline::{
        BarLine, CarrierHit, CarrierKey, CarrierTiming, EffectDefaults, EffectId, NoteCarrier,
        TimeCarrier, Timeline, TimelineBuilder, TimelineConfig,
        sample::{
            sample_average, sample_delta, sample_integral, sample_integral_with_width,
            sample_rate, sample_value,
        },
    },
};
