//! Raw lock implementations with a uniform exclusive/shared surface.
//!
//! All locks here are spin-based: blocking acquisition retries the fast
//! path with a cooperative yield between attempts and never parks the
//! thread in the OS. The memory orderings used by each operation are part
//! of the algorithm, not a tuning detail.

use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// The capability surface a lock must offer to drive a
/// [`Synchronized`](crate::sync::synchronized::Synchronized) wrapper.
///
/// All operations take `&self`: a lock mutates its own state through
/// atomics so that a shared reader can acquire through a shared reference
/// to the wrapper.
///
/// The `try_*` operations report failure through their `bool` result and
/// never panic; the blocking operations retry until they succeed, with no
/// timeout and no cancellation.
///
/// # Safety
///
/// The wrapper hands out `&T` and `&mut T` on the strength of this trait,
/// so implementations must uphold the exclusion contract: between a
/// successful `try_lock`/`lock` and the matching `unlock`, no other
/// exclusive or shared acquisition may succeed; between a successful
/// `try_lock_shared`/`lock_shared` and the matching `unlock_shared`, no
/// exclusive acquisition may succeed. [`NoLock`] performs no exclusion at
/// all; it is `!Sync` so that a wrapper using it can never be shared
/// between threads in the first place.
pub unsafe trait RawSyncLock {
    /// Attempt to acquire the lock exclusively without blocking.
    fn try_lock(&self) -> bool;

    /// Acquire the lock exclusively, spinning until granted.
    fn lock(&self);

    /// Release an exclusive acquisition.
    fn unlock(&self);

    /// Attempt to acquire the lock in shared mode without blocking.
    fn try_lock_shared(&self) -> bool;

    /// Acquire the lock in shared mode, spinning until granted.
    fn lock_shared(&self);

    /// Release one shared acquisition.
    fn unlock_shared(&self);
}

/// A lock that never locks.
///
/// Every operation is a no-op reporting success. Use it as the policy
/// parameter when the wrapper must compile but no synchronization is
/// needed: single-threaded programs, or values reached only through a
/// `&mut` borrow that is itself guarded externally. The type is `!Sync`,
/// so a [`Synchronized`](crate::sync::synchronized::Synchronized) wrapper
/// using it cannot be shared between threads at all; the compiler confines
/// the no-op policy to the uses where skipping exclusion is sound. The
/// wrapper stays `Send` and can still be moved between threads.
///
/// ```compile_fail
/// use usync::{NoLock, Synchronized};
///
/// fn shareable<T: Sync>(_: &T) {}
///
/// let counter: Synchronized<i32, NoLock> = Synchronized::new(0);
/// shareable(&counter);
/// ```
#[derive(Debug, Default)]
pub struct NoLock {
    /// Opts out of `Sync`: a no-op lock must never back a shared wrapper
    _not_sync: PhantomData<Cell<()>>,
}

impl NoLock {
    /// Create a new no-op lock.
    pub const fn new() -> Self {
        Self {
            _not_sync: PhantomData,
        }
    }
}

unsafe impl RawSyncLock for NoLock {
    fn try_lock(&self) -> bool {
        true
    }

    fn lock(&self) {}

    fn unlock(&self) {}

    fn try_lock_shared(&self) -> bool {
        true
    }

    fn lock_shared(&self) {}

    fn unlock_shared(&self) {}
}

/// A test-and-set spinlock over a single atomic flag.
///
/// The shared-mode operations delegate to the exclusive ones: this lock
/// has no concurrent-read mode and satisfies the full [`RawSyncLock`]
/// surface only so that it is interchangeable with [`SharedSpinLock`] as
/// a wrapper policy.
///
/// The instance occupies its own cache line so that independent locks do
/// not false-share.
#[derive(Debug, Default)]
#[repr(align(64))]
pub struct SpinLock {
    /// True while an exclusive holder exists
    flag: AtomicBool,
}

impl SpinLock {
    /// Create a new, unlocked spinlock.
    pub const fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
        }
    }
}

unsafe impl RawSyncLock for SpinLock {
    fn try_lock(&self) -> bool {
        // Fail fast on a relaxed read: a visibly held lock is not worth
        // the cache-coherence traffic of a read-modify-write.
        if self.flag.load(Ordering::Relaxed) {
            return false;
        }

        // Acquire ordering makes the previous holder's writes visible.
        !self.flag.swap(true, Ordering::Acquire)
    }

    fn lock(&self) {
        // Yield between attempts so a preempted holder can run when there
        // are more spinners than cores.
        while !self.try_lock() {
            std::thread::yield_now();
        }
    }

    fn unlock(&self) {
        self.flag.store(false, Ordering::Release);
    }

    fn try_lock_shared(&self) -> bool {
        self.try_lock()
    }

    fn lock_shared(&self) {
        self.lock();
    }

    fn unlock_shared(&self) {
        self.unlock();
    }
}

/// A writer-preferring shared/exclusive spinlock.
///
/// State is a writer flag and a reader count, kept on one cache line. An
/// exclusive acquirer publishes its intent by claiming the writer flag
/// first and only then waits for the reader count to drain, so it cannot
/// starve behind a stream of newly arriving readers. Readers use a
/// register-then-verify protocol: optimistically bump the reader count,
/// then confirm no writer claimed the flag in between, backing out if one
/// did.
///
/// Neither side gets starvation protection: whichever thread wins the race
/// on the writer flag wins. That is an accepted trade-off for raw
/// throughput at low contention, not an oversight.
#[derive(Debug, Default)]
#[repr(align(64))]
pub struct SharedSpinLock {
    /// True while an exclusive holder exists or is draining readers
    writer: AtomicBool,

    /// Number of admitted shared holders
    readers: AtomicUsize,
}

impl SharedSpinLock {
    /// Create a new, unlocked shared spinlock.
    pub const fn new() -> Self {
        Self {
            writer: AtomicBool::new(false),
            readers: AtomicUsize::new(0),
        }
    }
}

unsafe impl RawSyncLock for SharedSpinLock {
    fn try_lock(&self) -> bool {
        if self.writer.load(Ordering::Relaxed) {
            return false;
        }

        if self.writer.swap(true, Ordering::Acquire) {
            return false;
        }

        // Writer flag is ours; no new readers can register. Wait for the
        // admitted ones to drain.
        while self.readers.load(Ordering::Relaxed) > 0 {
            std::hint::spin_loop();
        }

        true
    }

    fn lock(&self) {
        while !self.try_lock() {
            std::thread::yield_now();
        }
    }

    fn unlock(&self) {
        self.writer.store(false, Ordering::Release);
    }

    fn try_lock_shared(&self) -> bool {
        if self.writer.load(Ordering::Relaxed) {
            return false;
        }

        // Register first, then verify: the increment closes the window in
        // which a writer could miss us, and the confirming exchange
        // detects a writer that claimed the flag after the fast check.
        self.readers.fetch_add(1, Ordering::Relaxed);

        if self
            .writer
            .compare_exchange_weak(true, true, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            // A writer raced in; back out the registration.
            self.readers.fetch_sub(1, Ordering::Relaxed);
            return false;
        }

        true
    }

    fn lock_shared(&self) {
        while !self.try_lock_shared() {
            std::thread::yield_now();
        }
    }

    fn unlock_shared(&self) {
        // Shared holders never touch the writer flag.
        self.readers.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_no_lock_always_succeeds() {
        let lock = NoLock::new();

        assert!(lock.try_lock());
        assert!(lock.try_lock());
        assert!(lock.try_lock_shared());
        lock.unlock();
        lock.unlock_shared();
    }

    #[test]
    fn test_spinlock_fast_path() {
        let lock = SpinLock::new();

        // Free lock: first attempt succeeds, second fails while held
        assert!(lock.try_lock());
        assert!(!lock.try_lock());

        lock.unlock();
        assert!(lock.try_lock());
        lock.unlock();
    }

    #[test]
    fn test_spinlock_shared_delegates_to_exclusive() {
        let lock = SpinLock::new();

        assert!(lock.try_lock_shared());
        // No real shared mode: a second shared attempt fails
        assert!(!lock.try_lock_shared());
        assert!(!lock.try_lock());

        lock.unlock_shared();
        assert!(lock.try_lock());
        lock.unlock();
    }

    #[test]
    fn test_spinlock_blocking_lock_waits_for_release() {
        let lock = Arc::new(SpinLock::new());
        assert!(lock.try_lock());

        let (tx, rx) = mpsc::channel();
        let lock_clone = Arc::clone(&lock);
        let handle = thread::spawn(move || {
            lock_clone.lock();
            tx.send(()).unwrap();
            lock_clone.unlock();
        });

        // The waiter must not get through while we hold the lock
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

        lock.unlock();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_shared_spinlock_fast_path() {
        let lock = SharedSpinLock::new();

        assert!(lock.try_lock());
        assert!(!lock.try_lock());

        lock.unlock();
        assert!(lock.try_lock());
        lock.unlock();
    }

    #[test]
    fn test_shared_spinlock_writer_blocks_readers() {
        let lock = SharedSpinLock::new();

        assert!(lock.try_lock());
        assert!(!lock.try_lock_shared());

        lock.unlock();
        assert!(lock.try_lock_shared());
        lock.unlock_shared();
    }

    #[test]
    fn test_shared_spinlock_readers_coexist() {
        let lock = SharedSpinLock::new();

        assert!(lock.try_lock_shared());
        assert!(lock.try_lock_shared());
        assert!(lock.try_lock_shared());

        lock.unlock_shared();
        lock.unlock_shared();
        lock.unlock_shared();

        // Fully drained: an exclusive attempt succeeds without spinning
        assert!(lock.try_lock());
        lock.unlock();
    }

    #[test]
    fn test_shared_spinlock_writer_waits_for_readers() {
        let lock = Arc::new(SharedSpinLock::new());
        assert!(lock.try_lock_shared());

        let (tx, rx) = mpsc::channel();
        let lock_clone = Arc::clone(&lock);
        let handle = thread::spawn(move || {
            lock_clone.lock();
            tx.send(()).unwrap();
            lock_clone.unlock();
        });

        // The writer drains readers before completing acquisition
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

        lock.unlock_shared();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_shared_spinlock_reader_waits_for_writer() {
        let lock = Arc::new(SharedSpinLock::new());
        assert!(lock.try_lock());

        let (tx, rx) = mpsc::channel();
        let lock_clone = Arc::clone(&lock);
        let handle = thread::spawn(move || {
            lock_clone.lock_shared();
            tx.send(()).unwrap();
            lock_clone.unlock_shared();
        });

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

        lock.unlock();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();
    }
}
