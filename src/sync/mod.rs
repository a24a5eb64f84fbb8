//! Spin-based synchronization primitives.
//!
//! This module contains the core lock algorithms and the wrapper that ties
//! them to a protected value:
//!
//! - Raw locks with a uniform six-operation capability surface
//! - A generic synchronized resource wrapper producing exclusive and shared
//!   access guards
//! - A one-shot value signal built on a real wake/wait mechanism rather
//!   than spinning

pub mod once;
pub mod raw;
pub mod synchronized;

// Re-export key types from raw
pub use raw::{NoLock, RawSyncLock, SharedSpinLock, SpinLock};

// Re-export key types from synchronized
pub use synchronized::{SharedAccess, Synchronized, UniqueAccess};

// Re-export key types from once
pub use once::{OneShot, WaitTimeout};
