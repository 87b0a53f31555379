//! RingBuffer - single writer, multiple independent readers
//!
//! The ring goes through two phases. While unsealed, setup code registers
//! any number of readers and exactly one writer. `seal()` then fixes that
//! population, allocates the slots and lets the handles run. There is no
//! way back: registering or sealing again fails with `AlreadyStarted`.
//!
//! Registration and sealing may race across threads. All of them go
//! through one atomic state word so that every call sees a consistent
//! outcome (exactly one writer, exactly one successful seal, and a reader
//! count that matches the handles actually issued).

use std::sync::atomic::{ AtomicU64, Ordering };
use std::sync::Arc;

use tracing::{ debug, warn };

use crate::constants::{ DEFAULT_REQUESTED_CAPACITY, MAX_READERS };
use crate::disruptor::reader::Reader;
use crate::disruptor::ring_buffer_core::RingBufferCore;
use crate::disruptor::wait_strategy::{ BusySpinWaitStrategy, WaitStrategy };
use crate::disruptor::writer::Writer;
use crate::disruptor::{ RingBufferConfig, Sequence };
use crate::error::{ DisruptorError, Result };

const SEALED: u64 = 1 << 63;
const WRITER_ASSIGNED: u64 = 1 << 62;
const READER_COUNT_MASK: u64 = MAX_READERS;

/// Largest power of two that is `<= requested`, or 0 for 0.
///
/// ```
/// use fx_plumbing::capacity_for;
///
/// assert_eq!(capacity_for(1533), 1024);
/// assert_eq!(capacity_for(3), 2);
/// assert_eq!(capacity_for(2048), 2048);
/// assert_eq!(capacity_for(0), 0);
/// ```
pub const fn capacity_for(requested: usize) -> usize {
    if requested == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - requested.leading_zeros())
    }
}

/// Create a ring buffer with the default busy-spin strategy.
///
/// `None` requests the default capacity of 1024 slots.
pub fn new_ring_buffer<V>(requested_capacity: Option<usize>) -> Result<RingBuffer<V>> {
    RingBuffer::with_capacity(requested_capacity.unwrap_or(DEFAULT_REQUESTED_CAPACITY))
}

/// Lock-free ring buffer handing values from one writer to every registered reader
pub struct RingBuffer<V, W = BusySpinWaitStrategy> {
    core: Arc<RingBufferCore<V, W>>,
    state: AtomicU64,
}

impl<V> RingBuffer<V, BusySpinWaitStrategy> {
    /// Create a ring of 1024 slots
    pub fn new() -> Self {
        Self::from_capacity(capacity_for(DEFAULT_REQUESTED_CAPACITY), BusySpinWaitStrategy)
    }

    /// Create a ring holding the largest power of two `<= requested` slots
    pub fn with_capacity(requested: usize) -> Result<Self> {
        Self::with_config(RingBufferConfig::new(requested)?, BusySpinWaitStrategy)
    }
}

impl<V> Default for RingBuffer<V, BusySpinWaitStrategy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, W: WaitStrategy> RingBuffer<V, W> {
    /// Create a ring from a configuration and a wait strategy
    pub fn with_config(config: RingBufferConfig, wait_strategy: W) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_capacity(config.capacity(), wait_strategy))
    }

    fn from_capacity(capacity: usize, wait_strategy: W) -> Self {
        debug!(capacity, "created ring buffer");
        Self {
            core: Arc::new(RingBufferCore::new(capacity, wait_strategy)),
            state: AtomicU64::new(0),
        }
    }

    /// Register a new reader. Its cursor starts at the first sequence, so it
    /// will see every value the writer ever publishes.
    pub fn register_reader(&self) -> Result<Reader<V, W>> {
        let mut state = self.state.load(Ordering::Acquire);
        loop {
            if state & SEALED != 0 {
                warn!("reader registration rejected: ring buffer already started");
                return Err(DisruptorError::AlreadyStarted);
            }
            if state & READER_COUNT_MASK == MAX_READERS {
                return Err(crate::config_error!("cannot register more than {} readers", MAX_READERS));
            }

            match
                self.state.compare_exchange_weak(
                    state,
                    state + 1,
                    Ordering::AcqRel,
                    Ordering::Acquire
                )
            {
                Ok(_) => {
                    break;
                }
                Err(actual) => {
                    state = actual;
                }
            }
        }

        debug!(readers = (state & READER_COUNT_MASK) + 1, "registered reader");
        Ok(Reader::new(self.core.clone()))
    }

    /// Register the single writer. The first caller wins.
    pub fn register_writer(&self) -> Result<Writer<V, W>> {
        let mut state = self.state.load(Ordering::Acquire);
        loop {
            if state & SEALED != 0 {
                warn!("writer registration rejected: ring buffer already started");
                return Err(DisruptorError::AlreadyStarted);
            }
            if state & WRITER_ASSIGNED != 0 {
                warn!("writer registration rejected: writer already assigned");
                return Err(DisruptorError::WriterAlreadyAssigned);
            }

            match
                self.state.compare_exchange_weak(
                    state,
                    state | WRITER_ASSIGNED,
                    Ordering::AcqRel,
                    Ordering::Acquire
                )
            {
                Ok(_) => {
                    break;
                }
                Err(actual) => {
                    state = actual;
                }
            }
        }

        debug!("registered writer");
        Ok(Writer::new(self.core.clone()))
    }

    /// Close registration and start the ring.
    ///
    /// Allocates the slot array and snapshots the reader count that every
    /// published slot will wait on.
    pub fn seal(&self) -> Result<()> {
        let mut state = self.state.load(Ordering::Acquire);
        loop {
            if state & SEALED != 0 {
                warn!("seal rejected: ring buffer already started");
                return Err(DisruptorError::AlreadyStarted);
            }
            if state & WRITER_ASSIGNED == 0 {
                warn!("seal rejected: no writer assigned");
                return Err(DisruptorError::NoWriterAssigned);
            }

            match
                self.state.compare_exchange_weak(
                    state,
                    state | SEALED,
                    Ordering::AcqRel,
                    Ordering::Acquire
                )
            {
                Ok(_) => {
                    break;
                }
                Err(actual) => {
                    state = actual;
                }
            }
        }

        // Bounded by READER_COUNT_MASK
        let readers = (state & READER_COUNT_MASK) as u32;
        self.core.install(readers);
        debug!(readers, capacity = self.capacity(), "sealed ring buffer");
        Ok(())
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Number of readers registered so far
    pub fn reader_count(&self) -> u32 {
        (self.state.load(Ordering::Acquire) & READER_COUNT_MASK) as u32
    }

    pub fn has_writer(&self) -> bool {
        self.state.load(Ordering::Acquire) & WRITER_ASSIGNED != 0
    }

    pub fn is_sealed(&self) -> bool {
        self.state.load(Ordering::Acquire) & SEALED != 0
    }

    /// Next sequence the writer will publish
    pub fn writer_cursor(&self) -> Sequence {
        self.core.published()
    }

    /// Lowest sequence not yet consumed by every reader
    pub fn reader_gate(&self) -> Sequence {
        self.core.reader_gate()
    }
}

impl<V, W> std::fmt::Debug for RingBuffer<V, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.load(Ordering::Acquire);
        f.debug_struct("RingBuffer")
            .field("readers", &(state & READER_COUNT_MASK))
            .field("writer_assigned", &(state & WRITER_ASSIGNED != 0))
            .field("sealed", &(state & SEALED != 0))
            .finish()
    }
}
