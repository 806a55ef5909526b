//! What the scheduler asks of the judge rule and the score keeper.

use std::{
    fmt,
    ops::{BitAnd, BitOr, BitOrAssign},
};

use crate::time::TimeValue;

/// Outcome of judging one unit, as a set of flags.
///
/// The flags only carry meaning for the rule and the score that agree on them;
/// the scheduler only tells empty results from non-empty ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitResult(u32);

macro_rules! hit_flags {
    ($($(#[$meta:meta])* $name:ident = $bit:expr,)*) => {
        impl HitResult {
            $(
                $(#[$meta])*
                pub const $name: Self = Self(1 << $bit);
            )*

            const NAMES: &'static [(Self, &'static str)] = &[$((Self::$name, stringify!($name)),)*];
        }
    };
}

hit_flags! {
    /// The unit was missed.
    MISS = 0,
    /// Lowest score grade.
    SCORE1 = 1,
    /// Second score grade.
    SCORE2 = 2,
    /// Third score grade.
    SCORE3 = 3,
    /// Highest score grade.
    SCORE4 = 4,
    /// Hit after the exact time.
    LATE = 5,
    /// Hit before the exact time.
    EARLY = 6,
    /// Adds to the combo.
    COMBO = 7,
    /// Breaks the combo.
    COMBO_BREAK = 8,
    /// Wiped over.
    WIPE = 10,
    /// Caught without a press.
    CATCH = 11,
    /// Flicked.
    FLICK = 12,
    /// A bomb went off.
    BOMB = 13,
    /// Passed without interaction.
    PASS = 14,
    /// Triggered by another unit.
    LINKED = 15,
    /// A hold started.
    HOLD_START = 16,
    /// A hold ended.
    HOLD_END = 17,
    /// A hold tick.
    HOLD_TICK = 18,
    /// A hold is in progress.
    HOLD_PROGRESS = 19,
    /// A hold was broken.
    HOLD_BREAK = 20,
    /// A broken hold continues.
    HOLD_CONTINUE = 21,
    /// Bonus for a hold.
    HOLD_BONUS = 22,
    /// The unit became active.
    ACTIVATE = 24,
    /// The unit became inactive.
    DEACTIVATE = 25,
    /// The hit makes no sound.
    MUTE = 26,
    /// The result is reported later.
    DELAY = 27,
    /// The unit is done.
    FINISH = 28,
    /// The input is consumed by this unit.
    BLOCK = 29,
    /// The input is ignored.
    IGNORE = 30,
    /// The unit can be hit again.
    REPEAT = 31,
}

impl HitResult {
    /// No flag.
    pub const NONE: Self = Self(0);
    /// Miss and the score grades.
    pub const MASK_BASIC: Self = Self(
        Self::MISS.0 | Self::SCORE1.0 | Self::SCORE2.0 | Self::SCORE3.0 | Self::SCORE4.0,
    );
    /// Early and late.
    pub const MASK_TIMING: Self = Self(Self::LATE.0 | Self::EARLY.0);
    /// Combo and combo break.
    pub const MASK_COMBO: Self = Self(Self::COMBO.0 | Self::COMBO_BREAK.0);

    /// Flags from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every flag of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any flag of `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for HitResult {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for HitResult {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for HitResult {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for HitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "NONE");
        }
        let mut rest = self.0;
        let mut first = true;
        for &(flag, name) in Self::NAMES {
            if self.contains(flag) {
                rest &= !flag.0;
                write!(f, "{}{name}", if first { "" } else { "|" })?;
                first = false;
            }
        }
        if rest != 0 {
            write!(f, "{}{rest:#x}", if first { "" } else { "|" })?;
        }
        Ok(())
    }
}

/// How the player interacted with a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitAction {
    /// No input, such as a unit timing out.
    Auto,
    /// A press.
    Press,
    /// Holding down.
    Hold,
    /// A release.
    Release,
    /// A flick.
    Flick,
    /// Triggered by another unit.
    Linked,
    /// A rule specific action.
    Extension(u32),
}

/// The judge rule: its timing windows and how it grades a hit.
pub trait JudgeTiming<U> {
    /// How long before a unit's start it can be judged.
    fn window_early(&self) -> TimeValue;

    /// How long after a unit's end it can still be judged.
    fn window_late(&self) -> TimeValue;

    /// Grades `action` on `unit` at `time`. An empty result means the action did
    /// not concern the unit.
    fn judge_note_hit(&mut self, unit: &U, action: HitAction, time: TimeValue) -> HitResult;
}

/// The timing windows of a judge rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JudgeWindows {
    /// See [`JudgeTiming::window_early`].
    pub early: TimeValue,
    /// See [`JudgeTiming::window_late`].
    pub late: TimeValue,
}

impl JudgeWindows {
    /// The windows of `timing`.
    #[must_use]
    pub fn of<U>(timing: &(impl JudgeTiming<U> + ?Sized)) -> Self {
        Self {
            early: timing.window_early(),
            late: timing.window_late(),
        }
    }
}

/// A value the score keeper reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScoreKey {
    /// The score.
    Score,
    /// The current combo.
    Combo,
    /// The accuracy.
    Accuracy,
    /// The remaining health.
    Hp,
    /// Whether no combo was broken.
    IsFullCombo,
    /// Whether every hit had the best grade.
    IsAllPerfect,
    /// Whether the play is failed.
    IsFailed,
    /// A rule specific value.
    Extension(u32),
}

/// What the score keeper reports for a [`ScoreKey`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScoreValue {
    /// A number.
    Number(f64),
    /// A switch.
    Bool(bool),
}

/// The score keeper fed with every non-empty [`HitResult`].
pub trait Score {
    /// Records `result` judged at `time`.
    fn handle_result(&mut self, result: HitResult, time: TimeValue);

    /// The value for `key`, or `None` if this score does not keep it.
    fn get(&self, key: ScoreKey) -> Option<ScoreValue>;

    /// Called once when the play ends.
    fn finish(&mut self, _failed: bool) {}
}

/// Whether `score` considers the play failed: its [`ScoreKey::IsFailed`] switch if it
/// keeps one, else whether its [`ScoreKey::Hp`] is depleted. A score keeping neither
/// never fails.
#[must_use]
pub fn is_failed<S: Score + ?Sized>(score: &S) -> bool {
    if let Some(ScoreValue::Bool(failed)) = score.get(ScoreKey::IsFailed) {
        return failed;
    }
    matches!(score.get(ScoreKey::Hp), Some(ScoreValue::Number(hp)) if hp <= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<(ScoreKey, ScoreValue)>);

    impl Score for Fixed {
        fn handle_result(&mut self, _result: HitResult, _time: TimeValue) {}

        fn get(&self, key: ScoreKey) -> Option<ScoreValue> {
            self.0.iter().find(|(k, _)| *k == key).map(|&(_, value)| value)
        }
    }

    #[test]
    fn flag_layout() {
        assert_eq!(HitResult::MISS.bits(), 1);
        assert_eq!(HitResult::COMBO_BREAK.bits(), 1 << 8);
        assert_eq!(HitResult::REPEAT.bits(), 1 << 31);
        assert_eq!(HitResult::MASK_BASIC.bits(), 0b1_1111);
        let hit = HitResult::SCORE4 | HitResult::EARLY | HitResult::COMBO;
        assert!(hit.contains(HitResult::SCORE4 | HitResult::COMBO));
        assert!(hit.intersects(HitResult::MASK_TIMING));
        assert!(!hit.intersects(HitResult::MISS));
        assert_eq!(hit & HitResult::MASK_BASIC, HitResult::SCORE4);
    }

    #[test]
    fn displays_flag_names() {
        assert_eq!(HitResult::NONE.to_string(), "NONE");
        assert_eq!(
            (HitResult::MISS | HitResult::COMBO_BREAK).to_string(),
            "MISS|COMBO_BREAK"
        );
        assert_eq!(HitResult::from_bits(1 << 9 | 1).to_string(), "MISS|0x200");
    }

    #[test]
    fn failure_prefers_the_explicit_switch() {
        assert!(!is_failed(&Fixed(Vec::new())));
        assert!(is_failed(&Fixed(vec![(ScoreKey::Hp, ScoreValue::Number(0.0))])));
        assert!(!is_failed(&Fixed(vec![(ScoreKey::Hp, ScoreValue::Number(0.5))])));
        assert!(!is_failed(&Fixed(vec![
            (ScoreKey::IsFailed, ScoreValue::Bool(false)),
            (ScoreKey::Hp, ScoreValue::Number(-1.0)),
        ])));
        assert!(is_failed(&Fixed(vec![(ScoreKey::IsFailed, ScoreValue::Bool(true))])));
    }
}
