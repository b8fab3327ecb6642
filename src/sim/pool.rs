//! Index-based entity pool
//!
//! A pool owns a backing array of fixed-shape records plus a stack of free
//! slot indices. Consumers hold [`Handle`]s instead of references; a handle
//! carries the slot generation so a stale handle never aliases a slot that
//! has since been recycled.
//!
//! Releasing does not clear the record. Whoever acquires a slot must
//! overwrite every field before use.

/// Stable reference to a pooled record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    generation: u32,
    live: bool,
    /// Slot was released while the free list was full; never handed out again
    retired: bool,
}

/// Capacity-bounded free-list pool
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    /// Maximum length of the free list
    capacity: usize,
    live_count: usize,
}

impl<T: Default> Pool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::with_capacity(capacity),
            capacity,
            live_count: 0,
        }
    }

    /// Hand out a slot: a recycled one if available, else a fresh blank one.
    ///
    /// The record behind a recycled slot still holds its previous contents.
    pub fn acquire(&mut self) -> Handle {
        self.live_count += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.live = true;
            return Handle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            value: T::default(),
            generation: 0,
            live: true,
            retired: false,
        });
        Handle {
            index,
            generation: 0,
        }
    }

    /// Acquire a slot and overwrite it with `value`
    pub fn insert(&mut self, value: T) -> Handle {
        let handle = self.acquire();
        self.slots[handle.index()].value = value;
        handle
    }

    /// Return a slot to the free list.
    ///
    /// Releasing a stale or already released handle is a no-op. When the
    /// free list is at capacity the slot is retired instead of recycled.
    /// Returns true if the handle was live.
    pub fn release(&mut self, handle: Handle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index()) else {
            return false;
        };
        if !slot.live || slot.generation != handle.generation {
            return false;
        }

        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.live_count -= 1;

        if self.free.len() < self.capacity {
            self.free.push(handle.index);
        } else {
            slot.retired = true;
            slot.value = T::default();
        }
        true
    }
}

impl<T> Pool<T> {
    pub fn is_live(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.index())
            .is_some_and(|s| s.live && s.generation == handle.generation)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|s| s.live && s.generation == handle.generation)
            .map(|s| &s.value)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index())
            .filter(|s| s.live && s.generation == handle.generation)
            .map(|s| &mut s.value)
    }

    /// Mutable access to two distinct live records at once
    pub fn get2_mut(&mut self, a: Handle, b: Handle) -> Option<(&mut T, &mut T)> {
        if a.index == b.index || !self.is_live(a) || !self.is_live(b) {
            return None;
        }
        let (lo, hi, swapped) = if a.index < b.index {
            (a.index(), b.index(), false)
        } else {
            (b.index(), a.index(), true)
        };
        let (left, right) = self.slots.split_at_mut(hi);
        let first = &mut left[lo].value;
        let second = &mut right[0].value;
        if swapped {
            Some((second, first))
        } else {
            Some((first, second))
        }
    }

    /// Records currently handed out
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    /// Slots waiting to be recycled
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Slots ever allocated, including retired ones
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    pub fn retired_count(&self) -> usize {
        self.slots.iter().filter(|s| s.retired).count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Release every live record (start of a fresh run)
    pub fn release_all(&mut self)
    where
        T: Default,
    {
        let live: Vec<Handle> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.live)
            .map(|(i, s)| Handle {
                index: i as u32,
                generation: s.generation,
            })
            .collect();
        for handle in live {
            self.release(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Record {
        tag: u32,
    }

    #[test]
    fn test_acquire_fresh_when_empty() {
        let mut pool: Pool<Record> = Pool::new(4);
        let a = pool.acquire();
        let b = pool.acquire();
        assert_ne!(a, b);
        assert_eq!(pool.live_count(), 2);
        assert_eq!(pool.allocated(), 2);
        assert_eq!(pool.get(a), Some(&Record::default()));
    }

    #[test]
    fn test_release_recycles_without_clearing() {
        let mut pool: Pool<Record> = Pool::new(4);
        let a = pool.insert(Record { tag: 7 });
        assert!(pool.release(a));
        assert_eq!(pool.free_count(), 1);

        let b = pool.acquire();
        assert_eq!(b.index(), a.index());
        // stale contents survive until the acquirer overwrites them
        assert_eq!(pool.get(b), Some(&Record { tag: 7 }));
        assert_eq!(pool.allocated(), 1);
    }

    #[test]
    fn test_stale_handle_is_dead() {
        let mut pool: Pool<Record> = Pool::new(4);
        let a = pool.insert(Record { tag: 1 });
        pool.release(a);
        let b = pool.insert(Record { tag: 2 });
        assert!(!pool.is_live(a));
        assert!(pool.get(a).is_none());
        assert!(!pool.release(a));
        assert_eq!(pool.get(b), Some(&Record { tag: 2 }));
    }

    #[test]
    fn test_double_release_is_idempotent() {
        let mut pool: Pool<Record> = Pool::new(1);
        let a = pool.acquire();
        assert!(pool.release(a));
        assert!(!pool.release(a));
        assert_eq!(pool.free_count(), 1);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_release_beyond_capacity_retires_slot() {
        let mut pool: Pool<Record> = Pool::new(1);
        let a = pool.insert(Record { tag: 1 });
        let b = pool.insert(Record { tag: 2 });
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.free_count(), 1);
        assert_eq!(pool.retired_count(), 1);

        // The retired slot is never handed out again
        let c = pool.acquire();
        assert_eq!(c.index(), a.index());
        let d = pool.acquire();
        assert_eq!(d.index(), 2);
    }

    #[test]
    fn test_get2_mut_distinct() {
        let mut pool: Pool<Record> = Pool::new(4);
        let a = pool.insert(Record { tag: 1 });
        let b = pool.insert(Record { tag: 2 });
        {
            let (ra, rb) = pool.get2_mut(b, a).unwrap();
            assert_eq!(ra.tag, 2);
            assert_eq!(rb.tag, 1);
            ra.tag = 20;
            rb.tag = 10;
        }
        assert_eq!(pool.get(a).unwrap().tag, 10);
        assert_eq!(pool.get(b).unwrap().tag, 20);
        assert!(pool.get2_mut(a, a).is_none());
    }

    #[test]
    fn test_release_all() {
        let mut pool: Pool<Record> = Pool::new(8);
        let handles: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
        pool.release_all();
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.free_count(), 5);
        assert!(handles.iter().all(|h| !pool.is_live(*h)));
    }

    proptest! {
        #[test]
        fn prop_free_list_never_exceeds_capacity(
            capacity in 0usize..8,
            ops in proptest::collection::vec((any::<bool>(), 0usize..16), 0..64)
        ) {
            let mut pool: Pool<Record> = Pool::new(capacity);
            let mut handles: Vec<Handle> = Vec::new();
            for (acquire, pick) in ops {
                if acquire || handles.is_empty() {
                    handles.push(pool.acquire());
                } else {
                    // release a possibly already-released handle
                    let h = handles[pick % handles.len()];
                    pool.release(h);
                }
                prop_assert!(pool.free_count() <= capacity);
                let live = handles.iter().filter(|h| pool.is_live(**h)).count();
                prop_assert_eq!(pool.live_count(), live);
            }
        }
    }
}
