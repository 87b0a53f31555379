//! Wait strategies for the writer and the readers
//!
//! The ring buffer blocks in two places: the writer waits for the slowest
//! reader to release a slot, and a reader waits for the writer to publish.
//! Both loops re-check a condition until it holds. A `WaitStrategy` only
//! decides what happens between two checks, so swapping strategies never
//! changes what is delivered or in which order. None of them time out.

use std::thread;
use std::time::Duration;

use parking_lot::{ Condvar, Mutex };

use crate::constants::{ DEFAULT_SPIN_TRIES, DEFAULT_YIELD_TRIES };

/// Trait for wait strategies that determine how blocked handles wait
pub trait WaitStrategy: Send + Sync {
    /// Block until `ready` returns `true`.
    ///
    /// `ready` is re-evaluated after every idle step and must be cheap.
    fn wait_until<F: FnMut() -> bool>(&self, ready: F);

    /// Signal that a cursor moved and parked waiters should re-check
    fn signal_all_when_blocking(&self);
}

/// Busy spin wait strategy - lowest latency, highest CPU usage.
/// Re-checks the condition in a tight loop and burns a full core while
/// waiting. This is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusySpinWaitStrategy;

impl BusySpinWaitStrategy {
    /// Create a new busy spin wait strategy
    pub fn new() -> Self {
        Self
    }
}

impl WaitStrategy for BusySpinWaitStrategy {
    #[inline(always)]
    fn wait_until<F: FnMut() -> bool>(&self, mut ready: F) {
        while !ready() {
            std::hint::spin_loop();
        }
    }

    #[inline(always)]
    fn signal_all_when_blocking(&self) {
        // No-op for busy spin - no blocking threads to signal
    }
}

/// Yielding wait strategy - spins for a while, then yields the CPU to
/// other threads between checks.
#[derive(Debug, Clone, Copy)]
pub struct YieldingWaitStrategy {
    spin_tries: u32,
}

impl YieldingWaitStrategy {
    /// Create a new yielding wait strategy
    pub fn new() -> Self {
        Self::with_spin_tries(DEFAULT_SPIN_TRIES)
    }

    /// Create a yielding wait strategy that spins `spin_tries` times first
    pub fn with_spin_tries(spin_tries: u32) -> Self {
        Self { spin_tries }
    }
}

impl Default for YieldingWaitStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitStrategy for YieldingWaitStrategy {
    fn wait_until<F: FnMut() -> bool>(&self, mut ready: F) {
        let mut counter = 0u32;
        while !ready() {
            if counter < self.spin_tries {
                std::hint::spin_loop();
                counter += 1;
            } else {
                thread::yield_now();
            }
        }
    }

    fn signal_all_when_blocking(&self) {
        // No-op for yielding - threads will wake up naturally
    }
}

/// Sleeping wait strategy - lowest CPU usage, higher latency.
/// Spins, then yields, then sleeps with exponential backoff capped at
/// `max_sleep`.
#[derive(Debug, Clone, Copy)]
pub struct SleepingWaitStrategy {
    spin_tries: u32,
    yield_tries: u32,
    min_sleep: Duration,
    max_sleep: Duration,
}

impl SleepingWaitStrategy {
    /// Create a sleeping wait strategy backing off from `min_sleep` to `max_sleep`
    pub fn new(min_sleep: Duration, max_sleep: Duration) -> Self {
        Self {
            spin_tries: DEFAULT_SPIN_TRIES,
            yield_tries: DEFAULT_YIELD_TRIES,
            min_sleep,
            max_sleep: max_sleep.max(min_sleep),
        }
    }
}

impl Default for SleepingWaitStrategy {
    fn default() -> Self {
        Self::new(Duration::from_micros(1), Duration::from_millis(1))
    }
}

impl WaitStrategy for SleepingWaitStrategy {
    fn wait_until<F: FnMut() -> bool>(&self, mut ready: F) {
        let mut counter = 0u32;
        let mut sleep = self.min_sleep;
        while !ready() {
            if counter < self.spin_tries {
                std::hint::spin_loop();
            } else if counter < self.spin_tries + self.yield_tries {
                thread::yield_now();
            } else {
                thread::sleep(sleep);
                sleep = (sleep * 2).min(self.max_sleep);
            }
            counter = counter.saturating_add(1);
        }
    }

    fn signal_all_when_blocking(&self) {
        // No-op for sleeping - threads will wake up naturally
    }
}

/// Blocking wait strategy - balanced latency and CPU usage.
/// Spins briefly, then parks on a condition variable. Parked threads are
/// woken by `signal_all_when_blocking` and also re-check after a short
/// timed wait, since signals are sent without holding the lock.
pub struct BlockingWaitStrategy {
    mutex: Mutex<()>,
    condition: Condvar,
    spin_tries: u32,
    park_timeout: Duration,
}

impl BlockingWaitStrategy {
    /// Create a new blocking wait strategy
    pub fn new() -> Self {
        Self {
            mutex: Mutex::new(()),
            condition: Condvar::new(),
            spin_tries: DEFAULT_SPIN_TRIES,
            park_timeout: Duration::from_micros(100),
        }
    }
}

impl Default for BlockingWaitStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitStrategy for BlockingWaitStrategy {
    fn wait_until<F: FnMut() -> bool>(&self, mut ready: F) {
        let mut spin_count = 0u32;
        while !ready() {
            // Try spinning first for low latency
            if spin_count < self.spin_tries {
                std::hint::spin_loop();
                spin_count += 1;
                continue;
            }

            let mut guard = self.mutex.lock();
            if ready() {
                return;
            }
            self.condition.wait_for(&mut guard, self.park_timeout);
        }
    }

    fn signal_all_when_blocking(&self) {
        self.condition.notify_all();
    }
}
