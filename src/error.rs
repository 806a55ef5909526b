//! Errors raised by timeline construction and judgment scheduling.
//!
//! Malformed chart content (ill-formed effects, missing tempos, degenerate bar
//! lengths) is not an error: it is logged and skipped. The variants here are for
//! inputs the engine cannot interpret at all and for scheduler misuse.

use thiserror::Error;

use crate::time::BeatValue;

/// An invariant violation in the tempo list handed to the timeline builder.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    /// Tempo changes must be sorted by beat.
    #[error("tempo change #{index} at beat {beat} comes before the previous one at beat {previous}")]
    UnsortedTempo {
        /// Position of the offending tempo change.
        index: usize,
        /// Its beat.
        beat: BeatValue,
        /// The beat of the tempo change before it.
        previous: BeatValue,
    },
    /// Two tempo changes share the same beat.
    #[error("tempo change #{index} duplicates the tempo change at beat {beat}")]
    DuplicateTempo {
        /// Position of the offending tempo change.
        index: usize,
        /// The shared beat.
        beat: BeatValue,
    },
    /// A tempo change with a BPM that is not finite and positive.
    #[error("tempo change #{index} has an invalid bpm of {bpm}")]
    InvalidTempo {
        /// Position of the offending tempo change.
        index: usize,
        /// The rejected BPM.
        bpm: f64,
    },
}

/// Misuse of the judgment scheduler.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JudgeError {
    /// The queue was used before any chart was loaded.
    #[error("judge queue used before a chart was loaded")]
    NotLoaded,
    /// The other end of the input channel was dropped.
    #[error("input channel is disconnected")]
    InputDisconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_tempo() {
        let err = TimelineError::UnsortedTempo {
            index: 2,
            beat: BeatValue::from_count(1),
            previous: BeatValue::from_count(4),
        };
        assert_eq!(
            err.to_string(),
            "tempo change #2 at beat 1 comes before the previous one at beat 4"
        );
        assert_eq!(
            JudgeError::NotLoaded.to_string(),
            "judge queue used before a chart was loaded"
        );
    }
}
