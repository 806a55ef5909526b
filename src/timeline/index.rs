//! Lookup of carriers by time, beat or roll.

use itertools::Itertools;

use super::carrier::TimeCarrier;
use crate::time::{BeatValue, RollValue, TimeUnit, TimeValue};

/// A lookup key on one of the three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarrierKey {
    /// By time, with the configured backward tolerance.
    Time(TimeValue),
    /// By beat.
    Beat(BeatValue),
    /// By roll.
    Roll(RollValue),
}

impl From<TimeValue> for CarrierKey {
    fn from(time: TimeValue) -> Self {
        Self::Time(time)
    }
}

impl From<BeatValue> for CarrierKey {
    fn from(beat: BeatValue) -> Self {
        Self::Beat(beat)
    }
}

impl From<RollValue> for CarrierKey {
    fn from(roll: RollValue) -> Self {
        Self::Roll(roll)
    }
}

/// The result of a carrier lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarrierHit<'a> {
    /// Position in the order of the searched axis. Pass it back as the hint of the next
    /// lookup on the same axis.
    pub hint: usize,
    /// Index into [`Timeline::carriers`](super::Timeline::carriers).
    pub index: usize,
    /// The carrier.
    pub carrier: &'a TimeCarrier,
}

/// Orders of the carriers on the time and roll axes. The beat order is the carrier
/// order itself.
///
/// Delays can make carrier times step back and scroll jumps and negative speeds can
/// make rolls step back, so both are kept as stable permutations sorted by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarrierIndex {
    by_time: Vec<usize>,
    by_roll: Vec<usize>,
    time_tolerance: TimeValue,
}

impl CarrierIndex {
    pub(crate) fn new(carriers: &[TimeCarrier], time_tolerance: TimeValue) -> Self {
        let by_time = (0..carriers.len())
            .sorted_by_key(|&index| carriers.get(index).map(TimeCarrier::time))
            .collect();
        let by_roll = (0..carriers.len())
            .sorted_by_key(|&index| carriers.get(index).map(TimeCarrier::roll))
            .collect();
        Self {
            by_time,
            by_roll,
            time_tolerance,
        }
    }

    /// Carrier indices in time order.
    #[must_use]
    pub fn time_order(&self) -> &[usize] {
        &self.by_time
    }

    /// Carrier indices in roll order.
    #[must_use]
    pub fn roll_order(&self) -> &[usize] {
        &self.by_roll
    }

    pub(crate) fn find<'a>(
        &self,
        carriers: &'a [TimeCarrier],
        key: CarrierKey,
        hint: usize,
    ) -> Option<CarrierHit<'a>> {
        let (order, position) = match key {
            CarrierKey::Beat(beat) => (
                None,
                search(carriers.len(), hint, |position| {
                    carriers.get(position).is_some_and(|c| c.beat() > beat)
                })?,
            ),
            CarrierKey::Time(time) => {
                let bound = time.offset_by(self.time_tolerance);
                let order = &self.by_time;
                let position = search(order.len(), hint, |position| {
                    order
                        .get(position)
                        .and_then(|&index| carriers.get(index))
                        .is_some_and(|c| c.time() > bound)
                })?;
                (Some(order), position)
            }
            CarrierKey::Roll(roll) => {
                let order = &self.by_roll;
                let position = search(order.len(), hint, |position| {
                    order
                        .get(position)
                        .and_then(|&index| carriers.get(index))
                        .is_some_and(|c| c.roll() > roll)
                })?;
                (Some(order), position)
            }
        };
        let index = order.map_or(Some(position), |order| order.get(position).copied())?;
        Some(CarrierHit {
            hint: position,
            index,
            carrier: carriers.get(index)?,
        })
    }
}

/// The last position whose key is not after the query, or `0` when every key is.
///
/// `is_after` must be monotone over `0..len`. The hint is tried first: if the
/// entry after it is already after the query, the hint is the answer. A hint past
/// the query is dropped and the search restarts from the front.
fn search(len: usize, hint: usize, is_after: impl Fn(usize) -> bool) -> Option<usize> {
    let last = len.checked_sub(1)?;
    let mut low = hint.min(last);
    if low > 0 && is_after(low) {
        low = 0;
    }
    if low == last || is_after(low + 1) {
        return Some(low);
    }
    let mut high = len;
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if is_after(mid) {
            high = mid;
        } else {
            low = mid;
        }
    }
    Some(low)
}
