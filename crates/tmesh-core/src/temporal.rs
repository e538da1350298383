//! # Temporal Types — Injectable Clocks
//!
//! Nonce lifetimes are measured in whole Unix seconds. Every component that
//! compares timestamps reads them from a [`Clock`] instead of calling the
//! system time directly, so expiry can be exercised in tests by advancing a
//! [`ManualClock`].

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// A source of the current time in Unix epoch seconds.
pub trait Clock: Send + Sync {
    /// Current time, in seconds since the Unix epoch (UTC).
    fn now_epoch_secs(&self) -> i64;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `epoch_secs`.
    pub fn new(epoch_secs: i64) -> Self {
        Self {
            now: AtomicI64::new(epoch_secs),
        }
    }

    /// Set the absolute time.
    pub fn set(&self, epoch_secs: i64) {
        self.now.store(epoch_secs, Ordering::SeqCst);
    }

    /// Move the clock forward by `secs` (backwards if negative).
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_secs(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_epoch_secs(&self) -> i64 {
        (**self).now_epoch_secs()
    }
}
