//! Recycled carrier sets of the active units.

/// A slot of a [`CarrierSetPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

/// An arena of carrier index sets. Released slots keep their allocation and are
/// handed out again before the arena grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarrierSetPool {
    slots: Vec<Vec<usize>>,
    free: Vec<SlotId>,
}

impl CarrierSetPool {
    /// An empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// An empty set, reusing a released slot if any.
    pub fn acquire(&mut self) -> SlotId {
        if let Some(slot) = self.free.pop() {
            return slot;
        }
        self.slots.push(Vec::new());
        SlotId(self.slots.len() - 1)
    }

    /// Empties the set and makes the slot available again.
    pub fn release(&mut self, slot: SlotId) {
        if let Some(set) = self.slots.get_mut(slot.0) {
            set.clear();
            self.free.push(slot);
        }
    }

    /// Releases every slot.
    pub fn release_all(&mut self) {
        self.slots.iter_mut().for_each(Vec::clear);
        self.free = (0..self.slots.len()).rev().map(SlotId).collect();
    }

    /// The carrier indices in the set, ascending.
    #[must_use]
    pub fn get(&self, slot: SlotId) -> &[usize] {
        self.slots.get(slot.0).map_or(&[], Vec::as_slice)
    }

    /// Adds `carrier` to the set; `false` if it was there.
    pub fn insert(&mut self, slot: SlotId, carrier: usize) -> bool {
        let Some(set) = self.slots.get_mut(slot.0) else {
            return false;
        };
        match set.binary_search(&carrier) {
            Ok(_) => false,
            Err(position) => {
                set.insert(position, carrier);
                true
            }
        }
    }

    /// Removes `carrier` from the set; `false` if it was not there.
    pub fn remove(&mut self, slot: SlotId, carrier: usize) -> bool {
        let Some(set) = self.slots.get_mut(slot.0) else {
            return false;
        };
        match set.binary_search(&carrier) {
            Ok(position) => {
                set.remove(position);
                true
            }
            Err(_) => false,
        }
    }

    /// Slots ever allocated.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots currently handed out.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_slots_are_reused() {
        let mut pool = CarrierSetPool::new();
        let a = pool.acquire();
        let b = pool.acquire();
        assert!(pool.insert(a, 3));
        assert!(pool.insert(a, 1));
        assert!(!pool.insert(a, 3));
        assert_eq!(pool.get(a), &[1, 3]);

        pool.release(a);
        assert_eq!(pool.in_use(), 1);
        let c = pool.acquire();
        assert_eq!(c, a);
        assert!(pool.get(c).is_empty());
        assert_eq!(pool.capacity(), 2);

        assert!(pool.insert(b, 7));
        assert!(pool.remove(b, 7));
        assert!(!pool.remove(b, 7));
        pool.release_all();
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.acquire(), a);
    }
}
