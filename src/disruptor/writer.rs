//! Writer handle - the single producer of a ring buffer

use std::sync::Arc;

use tracing::trace;

use crate::disruptor::ring_buffer_core::{ RingBufferCore, INITIAL_SEQUENCE };
use crate::disruptor::wait_strategy::{ BusySpinWaitStrategy, WaitStrategy };
use crate::disruptor::{ EventWriter, Sequence };

/// Publishes values into a ring buffer.
///
/// Exactly one exists per ring. It keeps its own copy of the writer cursor,
/// so publishing needs no synchronization beyond the back-pressure check
/// against the reader gate.
pub struct Writer<V, W = BusySpinWaitStrategy> {
    core: Arc<RingBufferCore<V, W>>,
    cursor: Sequence,
}

impl<V, W: WaitStrategy> Writer<V, W> {
    pub(crate) fn new(core: Arc<RingBufferCore<V, W>>) -> Self {
        Self {
            core,
            cursor: INITIAL_SEQUENCE,
        }
    }

    /// Publish `value` to every reader.
    ///
    /// Blocks while the ring is full, i.e. while the slowest reader is a
    /// whole ring behind, and until the ring has been sealed.
    #[inline]
    pub fn write(&mut self, value: V) {
        let ring = self.core.sealed_ring();
        let sequence = self.cursor;

        if !self.core.has_space(sequence) {
            trace!(sequence, "writer waiting on slowest reader");
            let core = &self.core;
            core.wait_strategy().wait_until(|| core.has_space(sequence));
        }

        unsafe { self.core.write_slot(ring, sequence, value) };
        self.core.publish(ring, sequence + 1);
        self.cursor = sequence + 1;
    }

    /// Publish `value` without blocking.
    ///
    /// Hands the value back if the ring is full or not sealed yet.
    #[inline]
    pub fn try_write(&mut self, value: V) -> std::result::Result<(), V> {
        let Some(ring) = self.core.try_sealed_ring() else {
            return Err(value);
        };
        let sequence = self.cursor;
        if !self.core.has_space(sequence) {
            return Err(value);
        }

        unsafe { self.core.write_slot(ring, sequence, value) };
        self.core.publish(ring, sequence + 1);
        self.cursor = sequence + 1;
        Ok(())
    }

    /// Next sequence this writer will publish
    pub fn cursor(&self) -> Sequence {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }
}

impl<V, W: WaitStrategy> EventWriter<V> for Writer<V, W> {
    #[inline]
    fn write(&mut self, value: V) {
        Writer::write(self, value);
    }
}

impl<V, W> std::fmt::Debug for Writer<V, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Writer").field("cursor", &self.cursor).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::disruptor::RingBuffer;

    #[test]
    fn test_writer_advances_cursor() {
        let ring = RingBuffer::<u64>::with_capacity(4).unwrap();
        let mut writer = ring.register_writer().unwrap();
        ring.seal().unwrap();

        assert_eq!(writer.cursor(), 1);
        writer.write(10);
        writer.write(11);
        assert_eq!(writer.cursor(), 3);
        assert_eq!(ring.writer_cursor(), 3);
    }

    #[test]
    fn test_try_write_before_seal_returns_value() {
        let ring = RingBuffer::<String>::with_capacity(4).unwrap();
        let mut writer = ring.register_writer().unwrap();

        assert_eq!(writer.try_write("early".to_string()), Err("early".to_string()));
        ring.seal().unwrap();
        assert!(writer.try_write("on time".to_string()).is_ok());
    }

    #[test]
    fn test_try_write_full_ring() {
        let ring = RingBuffer::<u64>::with_capacity(2).unwrap();
        let mut reader = ring.register_reader().unwrap();
        let mut writer = ring.register_writer().unwrap();
        ring.seal().unwrap();

        assert!(writer.try_write(1).is_ok());
        assert!(writer.try_write(2).is_ok());
        assert_eq!(writer.try_write(3), Err(3));

        assert_eq!(reader.read_next(), 1);
        assert!(writer.try_write(3).is_ok());
        assert_eq!(ring.writer_cursor() - ring.reader_gate(), 2);
    }

    #[test]
    fn test_writer_without_readers_never_blocks() {
        let ring = RingBuffer::<u64>::with_capacity(2).unwrap();
        let mut writer = ring.register_writer().unwrap();
        ring.seal().unwrap();

        for i in 0..100 {
            writer.write(i);
        }
        assert_eq!(ring.writer_cursor(), 101);
        assert_eq!(ring.reader_gate(), 101);
    }
}
