//! Reader handle - one independent consumer of a ring buffer

use std::sync::Arc;

use crate::disruptor::ring_buffer_core::{ RingBufferCore, INITIAL_SEQUENCE };
use crate::disruptor::wait_strategy::{ BusySpinWaitStrategy, WaitStrategy };
use crate::disruptor::{ EventReader, Sequence };

/// Consumes every value the writer publishes, in publish order.
///
/// Each reader owns its cursor and moves at its own pace. Only the writer
/// is held back by the slowest reader. A reader that stops reading stalls
/// the writer once the ring fills up.
pub struct Reader<V, W = BusySpinWaitStrategy> {
    core: Arc<RingBufferCore<V, W>>,
    cursor: Sequence,
}

impl<V, W> Reader<V, W> {
    pub(crate) fn new(core: Arc<RingBufferCore<V, W>>) -> Self {
        Self {
            core,
            cursor: INITIAL_SEQUENCE,
        }
    }

    /// Next sequence this reader will consume
    pub fn cursor(&self) -> Sequence {
        self.cursor
    }
}

impl<V: Clone, W: WaitStrategy> Reader<V, W> {
    /// Read the next value, blocking until the writer has published it.
    #[inline]
    pub fn read_next(&mut self) -> V {
        let ring = self.core.sealed_ring();
        let sequence = self.cursor;

        if sequence >= self.core.published() {
            let core = &self.core;
            core.wait_strategy().wait_until(|| sequence < core.published());
        }

        let value = unsafe { self.core.read_slot(ring, sequence) };
        self.core.release_slot(ring, sequence);
        self.cursor = sequence + 1;
        value
    }

    /// Read the next value if one is already published.
    #[inline]
    pub fn try_read_next(&mut self) -> Option<V> {
        let ring = self.core.try_sealed_ring()?;
        let sequence = self.cursor;
        if sequence >= self.core.published() {
            return None;
        }

        let value = unsafe { self.core.read_slot(ring, sequence) };
        self.core.release_slot(ring, sequence);
        self.cursor = sequence + 1;
        Some(value)
    }

    /// Drain everything published so far into `sink`, in order.
    ///
    /// Blocks until at least one value is available, then takes every value
    /// below the writer cursor as observed at that point. Returns how many
    /// values were appended.
    pub fn read_all<E: Extend<V>>(&mut self, sink: &mut E) -> usize {
        let ring = self.core.sealed_ring();
        let start = self.cursor;

        let mut end = self.core.published();
        if start >= end {
            let core = &self.core;
            core.wait_strategy().wait_until(|| {
                end = core.published();
                start < end
            });
        }

        for sequence in start..end {
            let value = unsafe { self.core.read_slot(ring, sequence) };
            self.core.release_slot(ring, sequence);
            self.cursor = sequence + 1;
            sink.extend(Some(value));
        }

        (end - start) as usize
    }

    /// Values published but not yet read by this reader
    pub fn available(&self) -> u64 {
        self.core.published().saturating_sub(self.cursor)
    }
}

impl<V: Clone, W: WaitStrategy> EventReader<V> for Reader<V, W> {
    #[inline]
    fn read_next(&mut self) -> V {
        Reader::read_next(self)
    }

    fn read_all<E: Extend<V>>(&mut self, sink: &mut E) -> usize {
        Reader::read_all(self, sink)
    }
}

impl<V, W> std::fmt::Debug for Reader<V, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader").field("cursor", &self.cursor).finish()
    }
}
