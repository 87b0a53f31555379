//! Slot - one reusable storage cell of the ring
//!
//! A slot carries the published value and the number of readers that have
//! not consumed it yet. The writer sets the pending count when it stores a
//! value; every reader decrements it once. The slot may only be overwritten
//! after the count reaches zero.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{ AtomicU32, Ordering };

pub(crate) struct Slot<V> {
    value: UnsafeCell<MaybeUninit<V>>,
    pending: AtomicU32,
}

// Readers clone the value through a shared reference from several threads
// at once, and the writer moves values in from its own thread.
unsafe impl<V: Send + Sync> Sync for Slot<V> {}

impl<V> Slot<V> {
    pub(crate) fn new() -> Self {
        Self {
            value: UnsafeCell::new(MaybeUninit::uninit()),
            pending: AtomicU32::new(0),
        }
    }

    /// Store a value that `readers` readers must consume.
    ///
    /// The pending count is written with `Relaxed` ordering; the writer's
    /// release store of its cursor is what publishes both.
    ///
    /// # Safety
    /// - Only the single writer may call this
    /// - The slot must be fully consumed (`is_consumed()`)
    /// - `occupied` must be true iff an earlier value is still stored
    #[inline(always)]
    pub(crate) unsafe fn store(&self, value: V, readers: u32, occupied: bool) {
        let cell = &mut *self.value.get();
        if occupied {
            cell.assume_init_drop();
        }
        cell.write(value);
        self.pending.store(readers, Ordering::Relaxed);
    }

    /// Clone the stored value.
    ///
    /// # Safety
    /// The caller must have observed (with acquire ordering) the publish of
    /// this slot's current value and must not have released it yet.
    #[inline(always)]
    pub(crate) unsafe fn load(&self) -> V where V: Clone {
        (*self.value.get()).assume_init_ref().clone()
    }

    /// Mark the value as consumed by one reader.
    ///
    /// Returns `true` when this call released the last pending reader.
    #[inline(always)]
    pub(crate) fn release(&self) -> bool {
        let previous = self.pending.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "slot released more times than it has readers");
        previous == 1
    }

    /// Drop the stored value in place.
    ///
    /// # Safety
    /// The slot must hold an initialized value and no other thread may touch it.
    pub(crate) unsafe fn drop_value(&mut self) {
        self.value.get_mut().assume_init_drop();
    }

    #[inline(always)]
    pub(crate) fn pending(&self) -> u32 {
        self.pending.load(Ordering::Acquire)
    }

    /// True once every reader has consumed the current value
    #[inline(always)]
    pub(crate) fn is_consumed(&self) -> bool {
        self.pending() == 0
    }
}
