//! Recycling of object instances to avoid repeated construction cost.
//!
//! [`RecyclePool`] hands out fresh-or-recycled instances and takes them
//! back for reuse. Its methods require `&mut self`: the pool carries no
//! lock of its own, and callers that share one between threads must wrap
//! it in [`Synchronized`](crate::sync::synchronized::Synchronized) and go
//! through an exclusive guard for both operations.

use log::{debug, trace};
use std::collections::VecDeque;

/// Trait for instances that a [`RecyclePool`] can manage.
pub trait Recycle {
    /// Create a new instance.
    fn create() -> Self;

    /// Reset the instance state before it is handed out again.
    fn reset(&mut self);
}

/// Configuration for a recycle pool
#[derive(Debug, Clone)]
pub struct RecyclePoolConfig {
    /// Number of instances to pre-create
    pub initial_size: usize,

    /// Maximum number of idle instances to retain; surplus returns are dropped
    pub max_retained: usize,
}

impl Default for RecyclePoolConfig {
    fn default() -> Self {
        Self {
            initial_size: 0,
            max_retained: 16,
        }
    }
}

/// Counters describing a pool's activity so far.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecycleStats {
    /// Instances built by [`Recycle::create`]
    pub created: usize,

    /// Instances handed out from the retained set
    pub reused: usize,

    /// Instances dropped because the retained set was full
    pub discarded: usize,
}

/// A pool that retains returned instances for reuse.
pub struct RecyclePool<T: Recycle> {
    /// Idle instances awaiting reuse
    retained: VecDeque<T>,

    /// Configuration for this pool
    config: RecyclePoolConfig,

    /// Activity counters
    stats: RecycleStats,
}

impl<T: Recycle> RecyclePool<T> {
    /// Create a pool with the specified configuration, pre-creating
    /// `initial_size` instances.
    pub fn new(config: RecyclePoolConfig) -> Self {
        let mut retained = VecDeque::with_capacity(config.max_retained);
        let mut stats = RecycleStats::default();

        for _ in 0..config.initial_size.min(config.max_retained) {
            retained.push_back(T::create());
            stats.created += 1;
        }

        debug!("recycle pool initialized with {} instances", retained.len());

        Self {
            retained,
            config,
            stats,
        }
    }

    /// Hand out an instance, recycling a retained one when available.
    ///
    /// A recycled instance is [`reset`](Recycle::reset) before it is
    /// returned.
    pub fn obtain(&mut self) -> T {
        match self.retained.pop_front() {
            Some(mut instance) => {
                instance.reset();
                self.stats.reused += 1;
                trace!("recycled instance handed out");
                instance
            }
            None => {
                self.stats.created += 1;
                trace!("fresh instance created");
                T::create()
            }
        }
    }

    /// Take an instance back for later reuse.
    ///
    /// When the retained set is already at `max_retained`, the instance is
    /// dropped instead.
    pub fn recycle(&mut self, instance: T) {
        if self.retained.len() >= self.config.max_retained {
            self.stats.discarded += 1;
            trace!("retained set full, instance dropped");
            return;
        }

        self.retained.push_back(instance);
    }

    /// Number of idle instances currently retained.
    pub fn retained_count(&self) -> usize {
        self.retained.len()
    }

    /// Activity counters for this pool.
    pub fn stats(&self) -> RecycleStats {
        self.stats.clone()
    }
}

impl<T: Recycle> Default for RecyclePool<T> {
    fn default() -> Self {
        Self::new(RecyclePoolConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::synchronized::Synchronized;
    use std::sync::Arc;
    use std::thread;

    struct Scratch {
        data: Vec<u8>,
        resets: usize,
    }

    impl Recycle for Scratch {
        fn create() -> Self {
            Self {
                data: Vec::with_capacity(64),
                resets: 0,
            }
        }

        fn reset(&mut self) {
            self.data.clear();
            self.resets += 1;
        }
    }

    #[test]
    fn test_obtain_creates_when_empty() {
        let mut pool: RecyclePool<Scratch> = RecyclePool::default();

        let instance = pool.obtain();
        assert_eq!(instance.resets, 0);
        assert_eq!(pool.stats().created, 1);
        assert_eq!(pool.stats().reused, 0);
    }

    #[test]
    fn test_recycle_then_obtain_reuses_and_resets() {
        let mut pool: RecyclePool<Scratch> = RecyclePool::default();

        let mut instance = pool.obtain();
        instance.data.extend_from_slice(b"dirty");
        pool.recycle(instance);
        assert_eq!(pool.retained_count(), 1);

        let reused = pool.obtain();
        assert!(reused.data.is_empty());
        assert_eq!(reused.resets, 1);
        assert_eq!(pool.stats(), RecycleStats {
            created: 1,
            reused: 1,
            discarded: 0,
        });
    }

    #[test]
    fn test_initial_size_pre_creates() {
        let pool: RecyclePool<Scratch> = RecyclePool::new(RecyclePoolConfig {
            initial_size: 3,
            max_retained: 8,
        });

        assert_eq!(pool.retained_count(), 3);
        assert_eq!(pool.stats().created, 3);
    }

    #[test]
    fn test_retention_cap_discards() {
        let mut pool: RecyclePool<Scratch> = RecyclePool::new(RecyclePoolConfig {
            initial_size: 0,
            max_retained: 2,
        });

        let a = pool.obtain();
        let b = pool.obtain();
        let c = pool.obtain();

        pool.recycle(a);
        pool.recycle(b);
        pool.recycle(c);

        assert_eq!(pool.retained_count(), 2);
        assert_eq!(pool.stats().discarded, 1);
    }

    #[test]
    fn test_pool_shared_through_synchronized() {
        let pool: Arc<Synchronized<RecyclePool<Scratch>>> =
            Arc::new(Synchronized::new(RecyclePool::default()));

        let mut handles = vec![];
        for _ in 0..4 {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    let instance = pool.write().obtain();
                    pool.write().recycle(instance);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = pool.read().stats();
        assert_eq!(stats.created + stats.reused, 400);
    }
}
