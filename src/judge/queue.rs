//! The sliding window of judgeable note carriers.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
    hash::Hash,
};

use itertools::Itertools;

use super::{
    pool::{CarrierSetPool, SlotId},
    rule::JudgeWindows,
};
use crate::{
    error::JudgeError,
    time::{TimeUnit, TimeValue},
    timeline::NoteCarrier,
};

/// Extra margin added to both windows of the judge rule, in milliseconds.
pub const DEFAULT_SAFETY_MARGIN_MS: i32 = 100;

/// Configuration of a [`JudgeQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JudgeQueueConfig {
    /// Added to the rule's windows so carriers stay active a little longer than the
    /// rule can judge them.
    pub safety_margin: TimeValue,
}

impl Default for JudgeQueueConfig {
    fn default() -> Self {
        Self {
            safety_margin: TimeValue::from_whole_milliseconds(DEFAULT_SAFETY_MARGIN_MS),
        }
    }
}

/// Where a loaded carrier is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarrierState {
    /// Not reached by the early window yet.
    Pending,
    /// Within the windows; its units are active.
    Active,
    /// Left behind by the late window. Final.
    Retired,
}

/// Number of loaded carriers in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct QueueCounts {
    /// Pending carriers.
    pub pending: usize,
    /// Active carriers.
    pub active: usize,
    /// Retired carriers.
    pub retired: usize,
}

/// Moves note carriers from pending to active to retired as the input clock advances,
/// and keeps the set of judge units backed by active carriers.
///
/// A pending carrier is promoted once `t + early > start`, where `early` is the
/// rule's early window plus the safety margin. An active carrier retires once
/// `t - late > end`, with `late` built the same way. Callers populate before judging
/// a frame and depopulate after it.
#[derive(Debug, Clone)]
pub struct JudgeQueue<U> {
    config: JudgeQueueConfig,
    loaded: Option<Loaded<U>>,
}

#[derive(Debug, Clone)]
struct Loaded<U> {
    early: TimeValue,
    late: TimeValue,
    /// Judgeable carriers, stably sorted by start time.
    carriers: Vec<NoteCarrier<U>>,
    states: Vec<CarrierState>,
    /// Every carrier before this one has left the pending state.
    next_pending: usize,
    /// Active carriers by end time, then load order.
    active: BinaryHeap<Reverse<(TimeValue, usize)>>,
    units: HashMap<U, SlotId>,
    pool: CarrierSetPool,
    retired: usize,
}

impl<U> Default for JudgeQueue<U> {
    fn default() -> Self {
        Self::new(JudgeQueueConfig::default())
    }
}

impl<U> JudgeQueue<U> {
    /// An empty queue; it must be loaded before use.
    #[must_use]
    pub const fn new(config: JudgeQueueConfig) -> Self {
        Self {
            config,
            loaded: None,
        }
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &JudgeQueueConfig {
        &self.config
    }

    /// Whether a chart is loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn loaded(&self) -> Result<&Loaded<U>, JudgeError> {
        self.loaded.as_ref().ok_or(JudgeError::NotLoaded)
    }

    /// The effective early and late windows, safety margin included.
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`].
    pub fn windows(&self) -> Result<JudgeWindows, JudgeError> {
        let loaded = self.loaded()?;
        Ok(JudgeWindows {
            early: loaded.early,
            late: loaded.late,
        })
    }

    /// The loaded carriers in queue order. Carrier indices used by the queue point
    /// into this slice.
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`].
    pub fn carriers(&self) -> Result<&[NoteCarrier<U>], JudgeError> {
        Ok(self.loaded()?.carriers.as_slice())
    }

    /// The state of the carrier at `index` of [`Self::carriers`].
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`].
    pub fn state_of(&self, index: usize) -> Result<Option<CarrierState>, JudgeError> {
        Ok(self.loaded()?.states.get(index).copied())
    }

    /// How many carriers are in each state.
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`].
    pub fn counts(&self) -> Result<QueueCounts, JudgeError> {
        let loaded = self.loaded()?;
        Ok(QueueCounts {
            pending: loaded.carriers.len() - loaded.next_pending,
            active: loaded.active.len(),
            retired: loaded.retired,
        })
    }

    /// Whether every carrier has retired.
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`].
    pub fn is_finished(&self) -> Result<bool, JudgeError> {
        let loaded = self.loaded()?;
        Ok(loaded.next_pending >= loaded.carriers.len() && loaded.active.is_empty())
    }
}

impl<U: Eq + Hash + Clone> JudgeQueue<U> {
    /// Replaces the queue content with `carriers`. Carriers without judge units are
    /// dropped, the rest are sorted by start time keeping their relative order on
    /// ties, all pending.
    pub fn load(&mut self, carriers: impl IntoIterator<Item = NoteCarrier<U>>, windows: JudgeWindows) {
        let carriers = carriers
            .into_iter()
            .filter(NoteCarrier::is_judgeable)
            .sorted_by_key(|carrier| carrier.start.time)
            .collect_vec();
        let early = windows.early.offset_by(self.config.safety_margin);
        let late = windows.late.offset_by(self.config.safety_margin);
        log::debug!(
            "loaded {} judgeable carriers, early window {early}, late window {late}",
            carriers.len()
        );

        let mut pool = self.loaded.take().map(|loaded| loaded.pool).unwrap_or_default();
        pool.release_all();
        self.loaded = Some(Loaded {
            early,
            late,
            states: vec![CarrierState::Pending; carriers.len()],
            carriers,
            next_pending: 0,
            active: BinaryHeap::new(),
            units: HashMap::new(),
            pool,
            retired: 0,
        });
    }

    /// Promotes the pending carriers reached by the early window at `time`. Returns
    /// how many were promoted.
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`].
    pub fn populate_until(&mut self, time: TimeValue) -> Result<usize, JudgeError> {
        let loaded = self.loaded.as_mut().ok_or(JudgeError::NotLoaded)?;
        Ok(loaded.populate(time.offset_by(loaded.early)))
    }

    /// Retires the active carriers left behind by the late window at `time`. Returns
    /// how many retired.
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`].
    pub fn depopulate_until(&mut self, time: TimeValue) -> Result<usize, JudgeError> {
        let loaded = self.loaded.as_mut().ok_or(JudgeError::NotLoaded)?;
        Ok(loaded.depopulate(time.offset_by(loaded.late.negate())))
    }

    /// The units backed by at least one active carrier. Units are ordered by their
    /// first carrier in queue order, and units sharing it by their order in it.
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`].
    pub fn active_units(&self) -> Result<Vec<&U>, JudgeError> {
        let loaded = self.loaded()?;
        Ok(loaded
            .units
            .iter()
            .filter_map(|(unit, &slot)| {
                let first = loaded.pool.get(slot).first().copied()?;
                let position = loaded
                    .carriers
                    .get(first)?
                    .units
                    .iter()
                    .position(|other| other == unit)?;
                Some(((first, position), unit))
            })
            .sorted_by_key(|&(key, _)| key)
            .map(|(_, unit)| unit)
            .collect())
    }

    /// The active carriers backing `unit`, in queue order.
    ///
    /// # Errors
    ///
    /// [`JudgeError::NotLoaded`] before [`Self::load`].
    pub fn active_carriers_of(&self, unit: &U) -> Result<Vec<&NoteCarrier<U>>, JudgeError> {
        let loaded = self.loaded()?;
        Ok(loaded
            .units
            .get(unit)
            .map(|&slot| loaded.pool.get(slot))
            .unwrap_or_default()
            .iter()
            .filter_map(|&index| loaded.carriers.get(index))
            .collect())
    }
}

impl<U: Eq + Hash + Clone> Loaded<U> {
    fn populate(&mut self, window: TimeValue) -> usize {
        let mut promoted = 0;
        while let Some(carrier) = self.carriers.get(self.next_pending) {
            if carrier.start.time >= window {
                break;
            }
            let index = self.next_pending;
            self.next_pending += 1;
            self.active.push(Reverse((carrier.end.time, index)));
            for unit in &carrier.units {
                let slot = *self
                    .units
                    .entry(unit.clone())
                    .or_insert_with(|| self.pool.acquire());
                self.pool.insert(slot, index);
            }
            if let Some(state) = self.states.get_mut(index) {
                *state = CarrierState::Active;
            }
            promoted += 1;
        }
        if promoted > 0 {
            log::trace!("promoted {promoted} carriers before {window}");
        }
        promoted
    }

    fn depopulate(&mut self, window: TimeValue) -> usize {
        let mut retired = 0;
        while let Some(&Reverse((end, index))) = self.active.peek() {
            if end >= window {
                break;
            }
            self.active.pop();
            if let Some(carrier) = self.carriers.get(index) {
                for unit in &carrier.units {
                    let Some(&slot) = self.units.get(unit) else {
                        continue;
                    };
                    self.pool.remove(slot, index);
                    if self.pool.get(slot).is_empty() {
                        self.units.remove(unit);
                        self.pool.release(slot);
                    }
                }
            }
            if let Some(state) = self.states.get_mut(index) {
                *state = CarrierState::Retired;
            }
            retired += 1;
        }
        self.retired += retired;
        if retired > 0 {
            log::trace!("retired {retired} carriers before {window}");
        }
        retired
    }
}
