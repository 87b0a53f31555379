//! # fx-plumbing
//!
//! Low-latency, lock-free ring buffer that hands a stream of values from one
//! writer thread to any number of reader threads. Every reader sees every
//! value, in publish order, at its own pace. The writer is bounded by the
//! slowest reader and never overwrites a value someone still has to read.
//!
//! ## Quick start
//!
//! ```
//! use std::thread;
//! use fx_plumbing::RingBuffer;
//!
//! let ring = RingBuffer::<u64>::with_capacity(64).unwrap();
//! let mut reader = ring.register_reader().unwrap();
//! let mut writer = ring.register_writer().unwrap();
//! ring.seal().unwrap();
//!
//! let producer = thread::spawn(move || {
//!     for i in 0..1000 {
//!         writer.write(i);
//!     }
//! });
//!
//! for i in 0..1000 {
//!     assert_eq!(reader.read_next(), i);
//! }
//! producer.join().unwrap();
//! ```
//!
//! ## Lifecycle
//!
//! Readers and the writer are registered while the ring is unsealed.
//! `seal()` fixes the population; after that no handle can be added.
//! Misuse is reported through [`DisruptorError`]. Reading and writing never
//! fail, they block (see [`WaitStrategy`]).

pub mod constants;
pub mod disruptor;
pub mod error;

pub use disruptor::{
    capacity_for,
    new_ring_buffer,
    RingBuffer,
    RingBufferConfig,
    Reader,
    Writer,
    EventReader,
    EventWriter,
    Sequence,
    WaitStrategy,
    BusySpinWaitStrategy,
    YieldingWaitStrategy,
    SleepingWaitStrategy,
    BlockingWaitStrategy,
};
pub use error::{ DisruptorError, Result };
