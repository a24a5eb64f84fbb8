//! Single-shot value passing between threads.
//!
//! Unlike the spin locks in this crate, [`OneShot`] is built on a real
//! wake/wait mechanism: waiters park on a condition variable and are woken
//! when the value arrives, so an arbitrarily late producer costs no CPU.

use log::trace;
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Error returned when a bounded wait elapses before a value is set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no value was set within {0:?}")]
pub struct WaitTimeout(
    /// The elapsed timeout
    pub Duration,
);

/// A write-once, explicitly resettable value slot.
///
/// A producer calls [`set`](OneShot::set) exactly once per cycle; any
/// number of consumers block in [`wait`](OneShot::wait) until the value
/// exists, then read it. [`reset`](OneShot::reset) returns the slot to the
/// unset state so the cycle can repeat.
pub struct OneShot<T> {
    /// The slot, `None` while unset
    value: Mutex<Option<T>>,

    /// Signalled whenever the slot transitions to set
    cond: Condvar,
}

impl<T> OneShot<T> {
    /// Create an empty (unset) slot.
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            cond: Condvar::new(),
        }
    }

    /// Set the value and wake every waiter.
    ///
    /// Setting an already-set slot replaces the previous value; waiters
    /// admitted between the two calls may have read either one.
    pub fn set(&self, value: T) {
        let mut slot = self.value.lock();
        *slot = Some(value);
        self.cond.notify_all();
        trace!("one-shot value set");
    }

    /// Return whether a value is currently set.
    pub fn is_set(&self) -> bool {
        self.value.lock().is_some()
    }

    /// Clear the slot back to the unset state.
    ///
    /// Subsequent [`wait`](OneShot::wait) calls block until the next
    /// [`set`](OneShot::set).
    pub fn reset(&self) {
        let mut slot = self.value.lock();
        *slot = None;
        trace!("one-shot value reset");
    }
}

impl<T: Clone> OneShot<T> {
    /// Block until a value is set, then return a copy of it.
    ///
    /// Uninterruptible and unbounded; use [`wait_for`](OneShot::wait_for)
    /// when a deadline is needed.
    pub fn wait(&self) -> T {
        let mut slot = self.value.lock();
        loop {
            if let Some(value) = slot.as_ref() {
                return value.clone();
            }
            self.cond.wait(&mut slot);
        }
    }

    /// Block until a value is set or the timeout elapses.
    pub fn wait_for(&self, timeout: Duration) -> Result<T, WaitTimeout> {
        // One deadline for the whole call: a wakeup that finds the slot
        // empty (the value was reset again, or the wake was spurious) must
        // not restart the clock.
        let deadline = Instant::now() + timeout;

        let mut slot = self.value.lock();
        loop {
            if let Some(value) = slot.as_ref() {
                return Ok(value.clone());
            }
            if self.cond.wait_until(&mut slot, deadline).timed_out() {
                return match slot.as_ref() {
                    Some(value) => Ok(value.clone()),
                    None => Err(WaitTimeout(timeout)),
                };
            }
        }
    }

    /// Return a copy of the value if one is set, without blocking.
    pub fn try_get(&self) -> Option<T> {
        self.value.lock().clone()
    }
}

impl<T> Default for OneShot<T> {
    fn default() -> Self {
        Self::new()
    }
}
