//! Lock-free single-writer/multi-reader ring buffer (LMAX Disruptor pattern).
//!
//! ## Components
//!
//! | Type | Role |
//! |------|------|
//! | `RingBuffer<V>` | Owns the slots, cursors and the setup lifecycle |
//! | `Writer<V>` | The single producer; blocks while the ring is full |
//! | `Reader<V>` | One per consumer; blocks until data is published |
//! | `WaitStrategy` | How blocked handles wait (spin, yield, sleep, park) |
//!
//! ## Module Organization
//!
//! - `slot` - storage cell with its pending-reader count
//! - `ring_buffer_core` - shared atomics and slot access
//! - `ring_buffer` - registration, sealing and capacity rules
//! - `writer` / `reader` - the two handle types
//! - `wait_strategy` - pluggable blocking behaviour
//!
//! ## Safety
//!
//! Slot contents are accessed through raw cells. The handle types enforce
//! the protocol: `&mut self` keeps each handle on one thread at a time, the
//! writer only reuses slots the gate has released, and readers only touch
//! slots the writer has published.

mod slot;
mod ring_buffer_core;
pub mod ring_buffer;
pub mod reader;
pub mod writer;
pub mod wait_strategy;

pub use ring_buffer::{ capacity_for, new_ring_buffer, RingBuffer };
pub use reader::Reader;
pub use writer::Writer;
pub use wait_strategy::{
    WaitStrategy,
    BusySpinWaitStrategy,
    YieldingWaitStrategy,
    SleepingWaitStrategy,
    BlockingWaitStrategy,
};

use crate::constants::{ DEFAULT_REQUESTED_CAPACITY, MIN_RING_CAPACITY };
use crate::error::Result;

/// Sequence number type for ring buffer positions
pub type Sequence = u64;

/// Producing side of a ring buffer
pub trait EventWriter<V> {
    /// Publish a value, blocking while there is no room for it
    fn write(&mut self, value: V);
}

/// Consuming side of a ring buffer
pub trait EventReader<V> {
    /// Next value in publish order, blocking until it exists
    fn read_next(&mut self) -> V;

    /// Append every available value to `sink`, blocking until there is at
    /// least one. Returns the number appended.
    fn read_all<E: Extend<V>>(&mut self, sink: &mut E) -> usize;
}

/// Configuration for ring buffer construction
#[derive(Debug, Clone)]
pub struct RingBufferConfig {
    /// Requested number of slots; rounded down to a power of two
    pub requested_capacity: usize,
}

impl Default for RingBufferConfig {
    fn default() -> Self {
        Self {
            requested_capacity: DEFAULT_REQUESTED_CAPACITY,
        }
    }
}

impl RingBufferConfig {
    /// Create a new configuration with the requested size
    pub fn new(requested_capacity: usize) -> Result<Self> {
        let config = Self { requested_capacity };
        config.validate()?;
        Ok(config)
    }

    /// Reject sizes that round down below the minimum ring capacity
    pub fn validate(&self) -> Result<()> {
        if self.capacity() < MIN_RING_CAPACITY {
            return Err(
                crate::config_error!(
                    "requested capacity {} gives fewer than {} slot(s)",
                    self.requested_capacity,
                    MIN_RING_CAPACITY
                )
            );
        }
        Ok(())
    }

    /// Capacity the ring will actually have
    pub fn capacity(&self) -> usize {
        capacity_for(self.requested_capacity)
    }
}
