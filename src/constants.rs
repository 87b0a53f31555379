//! Core constants used by the ring buffer implementation.

/// Requested capacity used when none is given
pub const DEFAULT_REQUESTED_CAPACITY: usize = 1024;

/// Smallest capacity a ring buffer may be built with
pub const MIN_RING_CAPACITY: usize = 1;

/// Upper bound on registered readers (pending counts are `u32`)
pub const MAX_READERS: u64 = u32::MAX as u64;

/// Spins before `YieldingWaitStrategy` starts yielding
pub const DEFAULT_SPIN_TRIES: u32 = 100;

/// Yields before `SleepingWaitStrategy` starts sleeping
pub const DEFAULT_YIELD_TRIES: u32 = 10;
