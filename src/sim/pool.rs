//! Bounded recycling pool for transient visual props
//!
//! Props are allocated once and held for the whole session: releasing a slot
//! only marks it inactive and hides it. When every slot is live and another
//! spawn arrives, the structurally oldest slot (front of the queue) is evicted
//! and handed back for reinitialization, so the pool's footprint is bounded by
//! `capacity` and `acquire_with` never fails.

use std::collections::VecDeque;

/// Implemented by entities that live inside a [`Pool`].
pub trait PoolSlot {
    /// Active slots are visible, simulated, and pickable.
    fn is_active(&self) -> bool;
    /// Mark inactive and hide. The slot stays in the pool for reuse.
    fn deactivate(&mut self);
}

/// Fixed-capacity FIFO recycling pool.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: VecDeque<T>,
    capacity: usize,
}

impl<T: PoolSlot> Pool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots ever created (bounded by capacity, never shrinks).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_active()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut()
    }

    /// First active slot, if any (fallback pick when a tap hits nothing).
    pub fn first_active_mut(&mut self) -> Option<&mut T> {
        self.slots.iter_mut().find(|s| s.is_active())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    /// Hand out a slot for (re)initialization.
    ///
    /// Order of preference: an inactive slot in place, a fresh slot while
    /// under capacity, else the front slot is evicted and rotated to the back
    /// (FIFO recycling). The caller must overwrite the slot's spawn state;
    /// the returned slot is deactivated but may hold stale parameters.
    pub fn acquire_with<F: FnOnce() -> T>(&mut self, spawn: F) -> &mut T {
        if let Some(i) = self.slots.iter().position(|s| !s.is_active()) {
            return &mut self.slots[i];
        }
        if self.slots.len() < self.capacity {
            self.slots.push_back(spawn());
            let last = self.slots.len() - 1;
            return &mut self.slots[last];
        }
        // Every slot is live: recycle the structurally oldest.
        self.slots.rotate_left(1);
        let last = self.slots.len() - 1;
        let slot = &mut self.slots[last];
        slot.deactivate();
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Slot {
        id: u32,
        active: bool,
        payload: f32,
    }

    impl PoolSlot for Slot {
        fn is_active(&self) -> bool {
            self.active
        }
        fn deactivate(&mut self) {
            self.active = false;
        }
    }

    fn spawn_into(pool: &mut Pool<Slot>, id: u32, payload: f32) -> u32 {
        let mut next = id;
        let slot = pool.acquire_with(|| Slot {
            id: next,
            active: false,
            payload: 0.0,
        });
        if slot.active {
            unreachable!("acquire_with must hand back an inactive slot");
        }
        // Fresh slots keep the requested id; recycled slots keep their own.
        next = slot.id;
        slot.active = true;
        slot.payload = payload;
        next
    }

    #[test]
    fn distinct_slots_up_to_capacity() {
        let mut pool = Pool::new(3);
        let a = spawn_into(&mut pool, 1, 0.1);
        let b = spawn_into(&mut pool, 2, 0.2);
        let c = spawn_into(&mut pool, 3, 0.3);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.active_count(), 3);
        assert_eq!(vec![a, b, c], vec![1, 2, 3]);
    }

    #[test]
    fn over_capacity_recycles_oldest_and_overwrites_state() {
        let mut pool = Pool::new(2);
        spawn_into(&mut pool, 1, 0.1);
        spawn_into(&mut pool, 2, 0.2);

        // Third spawn into a pool of two: slot 1 is the oldest and gets reused.
        let recycled = spawn_into(&mut pool, 3, 0.9);
        assert_eq!(recycled, 1);
        assert_eq!(pool.len(), 2);

        let reborn = pool.iter().find(|s| s.id == 1).unwrap();
        assert!(reborn.active);
        assert_eq!(reborn.payload, 0.9);
    }

    #[test]
    fn sustained_eviction_is_fifo() {
        let mut pool = Pool::new(3);
        for id in 1..=3 {
            spawn_into(&mut pool, id, 0.0);
        }
        // Everything active; each further spawn must evict 1, 2, 3, 1, ...
        let evicted: Vec<u32> = (0..5).map(|_| spawn_into(&mut pool, 99, 0.0)).collect();
        assert_eq!(evicted, vec![1, 2, 3, 1, 2]);
    }

    #[test]
    fn inactive_slot_is_reused_in_place() {
        let mut pool = Pool::new(4);
        for id in 1..=3 {
            spawn_into(&mut pool, id, 0.0);
        }
        pool.iter_mut().find(|s| s.id == 2).unwrap().deactivate();

        let reused = spawn_into(&mut pool, 77, 0.5);
        assert_eq!(reused, 2);
        assert_eq!(pool.len(), 3);
    }

    proptest! {
        #[test]
        fn size_never_exceeds_capacity(
            capacity in 1usize..16,
            ops in proptest::collection::vec(0u8..3, 0..200),
        ) {
            let mut pool = Pool::new(capacity);
            let mut id = 0u32;
            for op in ops {
                match op {
                    // Spawn
                    0 | 1 => {
                        id += 1;
                        spawn_into(&mut pool, id, 0.0);
                    }
                    // Release the first active slot
                    _ => {
                        if let Some(slot) = pool.first_active_mut() {
                            slot.deactivate();
                        }
                    }
                }
                prop_assert!(pool.len() <= capacity);
            }
        }
    }
}
