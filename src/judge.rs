//! Windowed judgment of note carriers.
//!
//! [`JudgeQueue`] keeps the carriers the player can currently interact with, and
//! [`JudgeLogic`] runs the frame protocol on top of it, asking the
//! [`JudgeTiming`] rule to grade input and feeding the results to the [`Score`].
//! Both run on the frame thread; input captured elsewhere arrives through
//! [`input_channel`].

pub mod input;
pub mod logic;
pub mod pool;
pub mod queue;
pub mod rule;

pub use self::{
    input::{InputEvent, InputReceiver, InputSender, input_channel},
    logic::JudgeLogic,
    pool::{CarrierSetPool, SlotId},
    queue::{CarrierState, DEFAULT_SAFETY_MARGIN_MS, JudgeQueue, JudgeQueueConfig, QueueCounts},
    rule::{
        HitAction, HitResult, JudgeTiming, JudgeWindows, Score, ScoreKey, ScoreValue, is_failed,
    },
};
