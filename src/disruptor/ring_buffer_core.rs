//! Shared core behind the writer and reader handles
//!
//! Holds the slot array, the writer cursor and the reader gate. All
//! cross-thread coordination goes through these atomics:
//!
//! - The writer stores a value, then publishes it with a release store of
//!   `writer_cursor`. Readers load `writer_cursor` with acquire ordering
//!   before touching the slot.
//! - The reader that drops a slot's pending count to zero advances
//!   `reader_gate` with release ordering. The writer loads the gate with
//!   acquire ordering before reusing the slot.
//!
//! Sequences start at 1. Sequence `s` lives in slot `s & mask`.

use std::sync::atomic::{ AtomicU64, Ordering };

use crossbeam::utils::CachePadded;
use once_cell::sync::OnceCell;

use crate::disruptor::slot::Slot;
use crate::disruptor::wait_strategy::WaitStrategy;
use crate::disruptor::Sequence;

/// First sequence handed out to the writer and to every reader
pub(crate) const INITIAL_SEQUENCE: Sequence = 1;

/// Slot array plus the reader population, fixed when the ring is sealed
pub(crate) struct SealedRing<V> {
    slots: Box<[Slot<V>]>,
    readers: u32,
}

impl<V> SealedRing<V> {
    #[inline(always)]
    pub(crate) fn readers(&self) -> u32 {
        self.readers
    }
}

pub(crate) struct RingBufferCore<V, W> {
    ring: OnceCell<SealedRing<V>>,
    capacity: u64,
    mask: usize,
    writer_cursor: CachePadded<AtomicU64>,
    reader_gate: CachePadded<AtomicU64>,
    wait_strategy: W,
}

impl<V, W: WaitStrategy> RingBufferCore<V, W> {
    /// `capacity` must be a non-zero power of two.
    pub(crate) fn new(capacity: usize, wait_strategy: W) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            ring: OnceCell::new(),
            capacity: capacity as u64,
            mask: capacity - 1,
            writer_cursor: CachePadded::new(AtomicU64::new(INITIAL_SEQUENCE)),
            reader_gate: CachePadded::new(AtomicU64::new(INITIAL_SEQUENCE)),
            wait_strategy,
        }
    }

    /// Allocate the slot array for a fixed reader population.
    ///
    /// Called once by whichever thread won the seal transition.
    pub(crate) fn install(&self, readers: u32) {
        let slots = (0..self.capacity)
            .map(|_| Slot::new())
            .collect::<Vec<_>>()
            .into_boxed_slice();

        let installed = self.ring.set(SealedRing { slots, readers }).is_ok();
        debug_assert!(installed, "slot array installed twice");

        // Handles used before sealing may be parked waiting for the slots
        self.wait_strategy.signal_all_when_blocking();
    }

    #[inline(always)]
    pub(crate) fn try_sealed_ring(&self) -> Option<&SealedRing<V>> {
        self.ring.get()
    }

    /// The slot array, blocking until the ring has been sealed
    #[inline(always)]
    pub(crate) fn sealed_ring(&self) -> &SealedRing<V> {
        loop {
            if let Some(ring) = self.ring.get() {
                return ring;
            }
            self.wait_strategy.wait_until(|| self.ring.get().is_some());
        }
    }

    #[inline(always)]
    pub(crate) fn wait_strategy(&self) -> &W {
        &self.wait_strategy
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity as usize
    }

    /// True when `sequence` can be written without overwriting a slot some
    /// reader still needs.
    #[inline(always)]
    pub(crate) fn has_space(&self, sequence: Sequence) -> bool {
        let gate = self.reader_gate.load(Ordering::Acquire);
        sequence - gate < self.capacity
    }

    /// Store `value` at `sequence`.
    ///
    /// # Safety
    /// - Only the single writer may call this, with consecutive sequences
    /// - `has_space(sequence)` must have returned true
    #[inline(always)]
    pub(crate) unsafe fn write_slot(&self, ring: &SealedRing<V>, sequence: Sequence, value: V) {
        let slot = &ring.slots[(sequence as usize) & self.mask];
        debug_assert!(slot.is_consumed(), "overwriting slot {} before release", sequence);
        // The slot held sequence - capacity, if that was ever written
        let occupied = sequence >= INITIAL_SEQUENCE + self.capacity;
        slot.store(value, ring.readers(), occupied);
    }

    /// Make every sequence below `next` visible to readers.
    #[inline(always)]
    pub(crate) fn publish(&self, ring: &SealedRing<V>, next: Sequence) {
        if ring.readers() == 0 {
            // Nobody will ever release the slot, so it is consumed on publish
            self.reader_gate.store(next, Ordering::Release);
        }
        self.writer_cursor.store(next, Ordering::Release);
        self.wait_strategy.signal_all_when_blocking();
    }

    /// Sequence the writer will publish next; everything below is readable
    #[inline(always)]
    pub(crate) fn published(&self) -> Sequence {
        self.writer_cursor.load(Ordering::Acquire)
    }

    /// Clone the value at `sequence`.
    ///
    /// # Safety
    /// The caller must be a registered reader that observed
    /// `published() > sequence` and has not released `sequence` yet.
    #[inline(always)]
    pub(crate) unsafe fn read_slot(&self, ring: &SealedRing<V>, sequence: Sequence) -> V
        where V: Clone
    {
        ring.slots[(sequence as usize) & self.mask].load()
    }

    /// Drop one reader's claim on `sequence`. The last reader to let go
    /// moves the gate past it.
    #[inline(always)]
    pub(crate) fn release_slot(&self, ring: &SealedRing<V>, sequence: Sequence) {
        if ring.slots[(sequence as usize) & self.mask].release() {
            self.reader_gate.fetch_max(sequence + 1, Ordering::AcqRel);
            self.wait_strategy.signal_all_when_blocking();
        }
    }

    pub(crate) fn reader_gate(&self) -> Sequence {
        self.reader_gate.load(Ordering::Acquire)
    }
}

impl<V, W> Drop for RingBufferCore<V, W> {
    fn drop(&mut self) {
        let mask = self.mask;
        let capacity = self.capacity;
        let next = *self.writer_cursor.get_mut();
        if let Some(ring) = self.ring.get_mut() {
            // Only the newest `capacity` values are still stored
            let written = next - INITIAL_SEQUENCE;
            let start = next - written.min(capacity);
            for sequence in start..next {
                unsafe { ring.slots[(sequence as usize) & mask].drop_value() };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disruptor::BusySpinWaitStrategy;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn sealed_core(capacity: usize, readers: u32) -> RingBufferCore<u64, BusySpinWaitStrategy> {
        let core = RingBufferCore::new(capacity, BusySpinWaitStrategy);
        core.install(readers);
        core
    }

    #[test]
    fn test_core_starts_at_initial_sequence() {
        let core = sealed_core(8, 1);
        assert_eq!(core.published(), INITIAL_SEQUENCE);
        assert_eq!(core.reader_gate(), INITIAL_SEQUENCE);
        assert_eq!(core.capacity(), 8);
        assert_eq!(core.sealed_ring().readers(), 1);
    }

    #[test]
    fn test_write_publish_read_release() {
        let core = sealed_core(4, 1);
        let ring = core.sealed_ring();

        assert!(core.has_space(1));
        unsafe { core.write_slot(ring, 1, 42) };
        core.publish(ring, 2);
        assert_eq!(core.published(), 2);

        assert_eq!(unsafe { core.read_slot(ring, 1) }, 42);
        assert_eq!(core.reader_gate(), 1);
        core.release_slot(ring, 1);
        assert_eq!(core.reader_gate(), 2);
    }

    #[test]
    fn test_has_space_tracks_gate() {
        let core = sealed_core(4, 1);
        let ring = core.sealed_ring();

        for sequence in 1..=4 {
            assert!(core.has_space(sequence));
            unsafe { core.write_slot(ring, sequence, sequence) };
            core.publish(ring, sequence + 1);
        }
        assert!(!core.has_space(5), "ring of 4 is full after 4 unread writes");

        core.release_slot(ring, 1);
        assert!(core.has_space(5));
        assert!(!core.has_space(6));
    }

    #[test]
    fn test_gate_waits_for_every_reader() {
        let core = sealed_core(4, 2);
        let ring = core.sealed_ring();

        unsafe { core.write_slot(ring, 1, 1) };
        core.publish(ring, 2);

        core.release_slot(ring, 1);
        assert_eq!(core.reader_gate(), 1);
        core.release_slot(ring, 1);
        assert_eq!(core.reader_gate(), 2);
    }

    #[test]
    fn test_no_readers_consumes_on_publish() {
        let core = sealed_core(2, 0);
        let ring = core.sealed_ring();

        for sequence in 1..=10 {
            assert!(core.has_space(sequence));
            unsafe { core.write_slot(ring, sequence, sequence) };
            core.publish(ring, sequence + 1);
        }
        assert_eq!(core.reader_gate(), 11);
    }

    #[derive(Clone)]
    struct Counted(Arc<AtomicUsize>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_drop_releases_stored_values() {
        let drops = Arc::new(AtomicUsize::new(0));
        {
            let core = RingBufferCore::new(4, BusySpinWaitStrategy);
            core.install(0);
            let ring = core.sealed_ring();
            for sequence in 1..=6 {
                unsafe { core.write_slot(ring, sequence, Counted(drops.clone())) };
                core.publish(ring, sequence + 1);
            }
            // Sequences 1 and 2 were overwritten by 5 and 6
            assert_eq!(drops.load(Ordering::Relaxed), 2);
        }
        assert_eq!(drops.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn test_unsealed_core_drops_cleanly() {
        let core = RingBufferCore::<String, _>::new(16, BusySpinWaitStrategy);
        assert!(core.try_sealed_ring().is_none());
    }
}
