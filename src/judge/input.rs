//! Handing input events from capture threads to the frame thread.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use super::rule::HitAction;
use crate::{error::JudgeError, time::TimeValue};

/// An input event stamped with the input clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputEvent {
    /// What the player did.
    pub action: HitAction,
    /// When, on the input clock.
    pub time: TimeValue,
}

impl InputEvent {
    /// An event.
    #[must_use]
    pub const fn new(action: HitAction, time: TimeValue) -> Self {
        Self { action, time }
    }
}

/// Creates a connected sender and receiver of input events.
#[must_use]
pub fn input_channel() -> (InputSender, InputReceiver) {
    let (sender, receiver) = mpsc::channel();
    (
        InputSender { sender },
        InputReceiver {
            receiver,
            held: None,
        },
    )
}

/// The capture side. Clone it for every capture thread.
#[derive(Debug, Clone)]
pub struct InputSender {
    sender: Sender<InputEvent>,
}

impl InputSender {
    /// Sends an event to the frame thread.
    ///
    /// # Errors
    ///
    /// [`JudgeError::InputDisconnected`] if the receiver was dropped.
    pub fn send(&self, event: InputEvent) -> Result<(), JudgeError> {
        self.sender
            .send(event)
            .map_err(|_| JudgeError::InputDisconnected)
    }
}

/// The frame side.
#[derive(Debug)]
pub struct InputReceiver {
    receiver: Receiver<InputEvent>,
    held: Option<InputEvent>,
}

impl InputReceiver {
    /// Takes the events stamped at or before `time`, in the order they were sent.
    ///
    /// Stops at the first event after `time`, which is kept for the next call along
    /// with everything sent after it.
    ///
    /// # Errors
    ///
    /// [`JudgeError::InputDisconnected`] if every sender was dropped and no event is
    /// left.
    pub fn drain_until(&mut self, time: TimeValue) -> Result<Vec<InputEvent>, JudgeError> {
        let mut events = Vec::new();
        loop {
            let event = match self.held.take() {
                Some(event) => event,
                None => match self.receiver.try_recv() {
                    Ok(event) => event,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) if events.is_empty() => {
                        return Err(JudgeError::InputDisconnected);
                    }
                    Err(TryRecvError::Disconnected) => break,
                },
            };
            if event.time > time {
                self.held = Some(event);
                break;
            }
            events.push(event);
        }
        Ok(events)
    }
}
