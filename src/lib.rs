#![deny(warnings)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # usync
//!
//! Cheap mutual-exclusion primitives for latency-sensitive, multi-threaded
//! code where lock hold times are microseconds and the wake/sleep overhead
//! of an OS mutex would dominate.
//!
//! This crate provides:
//!
//! - Spin-based locks with a uniform exclusive/shared capability surface
//! - A policy-generic [`Synchronized`] resource wrapper with scoped access
//!   guards that acquire on construction and release on drop
//! - A single-shot value-passing primitive ([`OneShot`]) for handing one
//!   value from a producer to blocked waiters
//! - A recycling object pool ([`RecyclePool`]) meant to be wrapped in
//!   [`Synchronized`] when shared between threads
//!
//! ## Trade-offs
//!
//! The lock family spins (with a cooperative yield between retries) and
//! never blocks via the OS. None of the locks are reentrant, none provide
//! fairness or FIFO ordering between waiters, and lock acquisition has no
//! timeout. Hold locks for short critical sections only.

/// Recycling pools for reusable object instances
pub mod pool;

/// Spin-based locks, the synchronized resource wrapper, and one-shot signalling
pub mod sync;

// Re-export key types for easier access
pub use pool::recycle::{Recycle, RecyclePool, RecyclePoolConfig, RecycleStats};
pub use sync::once::{OneShot, WaitTimeout};
pub use sync::raw::{NoLock, RawSyncLock, SharedSpinLock, SpinLock};
pub use sync::synchronized::{SharedAccess, Synchronized, UniqueAccess};
