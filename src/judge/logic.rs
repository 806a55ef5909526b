//! The per-frame judge protocol over a queue, a rule and a score.

use std::{fmt::Debug, hash::Hash};

use super::{
    input::InputReceiver,
    queue::{JudgeQueue, JudgeQueueConfig},
    rule::{HitAction, HitResult, JudgeTiming, JudgeWindows, Score, is_failed},
};
use crate::{error::JudgeError, time::TimeValue, timeline::NoteCarrier};

/// Drives a [`JudgeQueue`] frame by frame and routes input to the judge rule.
///
/// A frame runs [`Self::update_before_input`] with the time after the frame's input,
/// then [`Self::handle_input`] for each input event, then
/// [`Self::update_after_input`] with the time before the frame's input.
#[derive(Debug)]
pub struct JudgeLogic<U, T, S> {
    queue: JudgeQueue<U>,
    timing: T,
    score: S,
}

impl<U, T, S> JudgeLogic<U, T, S>
where
    U: Eq + Hash + Clone + Debug,
    T: JudgeTiming<U>,
    S: Score,
{
    /// A logic with an empty queue.
    #[must_use]
    pub const fn new(timing: T, score: S, config: JudgeQueueConfig) -> Self {
        Self {
            queue: JudgeQueue::new(config),
            timing,
            score,
        }
    }

    /// Loads the carriers of a chart using the rule's windows.
    pub fn load(&mut self, carriers: impl IntoIterator<Item = NoteCarrier<U>>) {
        let windows = JudgeWindows::of(&self.timing);
        self.queue.load(carriers, windows);
    }

    /// Activates the carriers the frame's input can reach.
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`].
    pub fn update_before_input(&mut self, time_after_input: TimeValue) -> Result<usize, JudgeError> {
        self.queue.populate_until(time_after_input)
    }

    /// Judges `action` at `time` on every active unit, once each, and feeds the
    /// non-empty results to the score. Returns them in the order the units were
    /// judged.
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`].
    pub fn handle_input(
        &mut self,
        action: HitAction,
        time: TimeValue,
    ) -> Result<Vec<(U, HitResult)>, JudgeError> {
        let mut results = Vec::new();
        for unit in self.queue.active_units()? {
            let result = self.timing.judge_note_hit(unit, action, time);
            if result.is_empty() {
                continue;
            }
            log::debug!("{action:?} on {unit:?} at {time}: {result}");
            self.score.handle_result(result, time);
            results.push((unit.clone(), result));
        }
        Ok(results)
    }

    /// Handles every event `input` holds up to `time`.
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`], and
    /// [`JudgeError::InputDisconnected`] once every sender is gone and nothing is left.
    pub fn handle_inputs_until(
        &mut self,
        input: &mut InputReceiver,
        time: TimeValue,
    ) -> Result<Vec<(U, HitResult)>, JudgeError> {
        let mut results = Vec::new();
        for event in input.drain_until(time)? {
            results.extend(self.handle_input(event.action, event.time)?);
        }
        Ok(results)
    }

    /// Retires the carriers the judge rule can no longer reach.
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`].
    pub fn update_after_input(&mut self, time_before_input: TimeValue) -> Result<usize, JudgeError> {
        self.queue.depopulate_until(time_before_input)
    }

    /// Whether every carrier has retired.
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`].
    pub fn is_finished(&self) -> Result<bool, JudgeError> {
        self.queue.is_finished()
    }

    /// Whether the score considers the play failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        is_failed(&self.score)
    }

    /// Tells the score the play ended.
    pub fn finish(&mut self) {
        let failed = self.is_failed();
        log::debug!("play finished, failed: {failed}");
        self.score.finish(failed);
    }

    /// The queue.
    #[must_use]
    pub const fn queue(&self) -> &JudgeQueue<U> {
        &self.queue
    }

    /// The judge rule.
    #[must_use]
    pub const fn timing(&self) -> &T {
        &self.timing
    }

    /// The score.
    #[must_use]
    pub const fn score(&self) -> &S {
        &self.score
    }

    /// Consumes the logic, returning the rule and the score.
    #[must_use]
    pub fn into_parts(self) -> (T, S) {
        (self.timing, self.score)
    }
}
