//! A resource wrapper generic over a lock policy.
//!
//! [`Synchronized`] pairs an owned value with a lock implementing
//! [`RawSyncLock`] and exposes the value exclusively through scoped access
//! guards. A guard acquires the lock on construction and releases it on
//! drop, on every exit path including unwinding, so holding a guard is the
//! proof of holding the lock.

use crate::sync::raw::{RawSyncLock, SpinLock};
use log::trace;
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// A value guarded by a pluggable lock policy.
///
/// The value is reachable only through [`UniqueAccess`] and
/// [`SharedAccess`] guards, so no code path can touch it without first
/// acquiring the lock. The default policy is the plain exclusive
/// [`SpinLock`]; any [`RawSyncLock`] implementation can be substituted
/// without changing call sites.
///
/// The wrapper owns exactly one lock and one value, is movable, and is
/// deliberately not `Clone`: a copy would duplicate the protected value
/// without a coherent lock state.
pub struct Synchronized<T, L: RawSyncLock = SpinLock> {
    /// The lock guarding the resource
    lock: L,

    /// The protected value; aliasing is governed by `lock`
    resource: UnsafeCell<T>,
}

// The wrapper hands out &T to concurrent shared holders and &mut T to the
// single exclusive holder, so it needs the same bounds as a reader-writer
// lock.
unsafe impl<T: Send, L: RawSyncLock + Send> Send for Synchronized<T, L> {}
unsafe impl<T: Send + Sync, L: RawSyncLock + Sync> Sync for Synchronized<T, L> {}

impl<T, L: RawSyncLock + Default> Synchronized<T, L> {
    /// Wrap a value with a default-constructed (unlocked) lock.
    pub fn new(value: T) -> Self {
        Self {
            lock: L::default(),
            resource: UnsafeCell::new(value),
        }
    }
}

impl<T, L: RawSyncLock> Synchronized<T, L> {
    /// Wrap a value with an explicitly supplied lock instance.
    ///
    /// The lock must be in its unlocked state.
    pub fn with_lock(value: T, lock: L) -> Self {
        Self {
            lock,
            resource: UnsafeCell::new(value),
        }
    }

    /// Acquire exclusive access, spinning until granted.
    pub fn write(&self) -> UniqueAccess<'_, T, L> {
        self.lock.lock();
        trace!("exclusive access acquired");

        UniqueAccess { owner: self }
    }

    /// Attempt to acquire exclusive access without blocking.
    pub fn try_write(&self) -> Option<UniqueAccess<'_, T, L>> {
        if self.lock.try_lock() {
            trace!("exclusive access acquired (try)");
            Some(UniqueAccess { owner: self })
        } else {
            None
        }
    }

    /// Acquire shared access, spinning until granted.
    ///
    /// Any number of shared guards may coexist, but never alongside an
    /// outstanding [`UniqueAccess`].
    pub fn read(&self) -> SharedAccess<'_, T, L> {
        self.lock.lock_shared();
        trace!("shared access acquired");

        SharedAccess { owner: self }
    }

    /// Attempt to acquire shared access without blocking.
    pub fn try_read(&self) -> Option<SharedAccess<'_, T, L>> {
        if self.lock.try_lock_shared() {
            trace!("shared access acquired (try)");
            Some(SharedAccess { owner: self })
        } else {
            None
        }
    }

    /// Get a mutable reference to the value without locking.
    ///
    /// The exclusive borrow of the wrapper already proves no guard exists.
    pub fn get_mut(&mut self) -> &mut T {
        self.resource.get_mut()
    }

    /// Consume the wrapper, returning the value.
    pub fn into_inner(self) -> T {
        self.resource.into_inner()
    }
}

impl<T: Default, L: RawSyncLock + Default> Default for Synchronized<T, L> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug, L: RawSyncLock> fmt::Debug for Synchronized<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_read() {
            Some(guard) => f.debug_struct("Synchronized").field("value", &*guard).finish(),
            None => f.debug_struct("Synchronized").field("value", &"<locked>").finish(),
        }
    }
}

/// Scoped exclusive access to a [`Synchronized`] value.
///
/// Constructed only by [`Synchronized::write`] / [`Synchronized::try_write`]
/// with the lock already held in exclusive mode. Not `Clone` and not
/// constructible otherwise; releases the lock exactly once, when dropped.
pub struct UniqueAccess<'a, T, L: RawSyncLock> {
    /// The wrapper whose lock this guard holds
    owner: &'a Synchronized<T, L>,
}

impl<T, L: RawSyncLock> Deref for UniqueAccess<'_, T, L> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // The lock is held in exclusive mode for the guard's lifetime
        unsafe { &*self.owner.resource.get() }
    }
}

impl<T, L: RawSyncLock> DerefMut for UniqueAccess<'_, T, L> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.owner.resource.get() }
    }
}

impl<T, L: RawSyncLock> Drop for UniqueAccess<'_, T, L> {
    fn drop(&mut self) {
        self.owner.lock.unlock();
        trace!("exclusive access released");
    }
}

impl<T: fmt::Debug, L: RawSyncLock> fmt::Debug for UniqueAccess<'_, T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// Scoped shared (read-only) access to a [`Synchronized`] value.
///
/// Constructed only by [`Synchronized::read`] / [`Synchronized::try_read`]
/// with the lock already held in shared mode. Not `Clone` and not
/// constructible otherwise; releases its shared acquisition when dropped.
pub struct SharedAccess<'a, T, L: RawSyncLock> {
    /// The wrapper whose lock this guard holds
    owner: &'a Synchronized<T, L>,
}

impl<T, L: RawSyncLock> Deref for SharedAccess<'_, T, L> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // The lock excludes writers for the guard's lifetime
        unsafe { &*self.owner.resource.get() }
    }
}

impl<T, L: RawSyncLock> Drop for SharedAccess<'_, T, L> {
    fn drop(&mut self) {
        self.owner.lock.unlock_shared();
        trace!("shared access released");
    }
}

impl<T: fmt::Debug, L: RawSyncLock> fmt::Debug for SharedAccess<'_, T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
