//! Recycling pools for reusable object instances.
//!
//! The pool here is deliberately unsynchronized; multi-threaded users wrap
//! it in [`Synchronized`](crate::sync::synchronized::Synchronized) and call
//! through an exclusive guard.

pub mod recycle;

// Re-export key types from recycle
pub use recycle::{Recycle, RecyclePool, RecyclePoolConfig, RecycleStats};
