use crate::error::ConfigError;
use ahash::AHashMap as HashMap;
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Idle buffers kept per size class before surplus ones are freed.
pub const DEFAULT_MAX_IDLE_PER_CLASS: usize = 8;

static GLOBAL: OnceLock<Arc<BufferPool>> = OnceLock::new();

/// Size class of a request: ceil(log2(len)), so every buffer filed under
/// class `c` has room for at least `2^c` slots.
#[inline]
fn request_class(len: usize) -> u32 {
    usize::BITS - (len.max(1) - 1).leading_zeros()
}

/// Class a returned buffer is filed under: floor(log2(capacity)).
#[inline]
fn capacity_class(capacity: usize) -> u32 {
    usize::BITS - 1 - capacity.leading_zeros()
}

#[derive(Debug, Default)]
struct PoolState {
    idle: HashMap<u32, Vec<Vec<usize>>>,
    lent: usize,
    allocations: u64,
    reuses: u64,
}

/// Snapshot of pool bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers currently borrowed by callers
    pub lent: usize,
    /// Buffers parked in the pool, across all size classes
    pub idle: usize,
    /// Fresh heap allocations made on a pool miss
    pub allocations: u64,
    /// Requests served from an idle buffer
    pub reuses: u64,
}

/// Thread-safe pool of integer scratch buffers, bucketed by power-of-two
/// size class.
///
/// A buffer is moved out of the pool while lent, so no two callers can ever
/// hold the same storage. Borrowing goes through [`PooledBuffer`], which hands
/// the storage back when dropped.
#[derive(Debug)]
pub struct BufferPool {
    state: Mutex<PoolState>,
    max_idle_per_class: usize,
}

impl BufferPool {
    /// Creates an empty pool with the default retention limit.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PoolState::default()),
            max_idle_per_class: DEFAULT_MAX_IDLE_PER_CLASS,
        }
    }

    /// Creates an empty pool retaining at most `max_idle` buffers per class.
    pub fn with_max_idle(max_idle: usize) -> Result<Self, ConfigError> {
        if max_idle == 0 {
            return Err(ConfigError::ZeroRetention);
        }
        Ok(Self {
            state: Mutex::new(PoolState::default()),
            max_idle_per_class: max_idle,
        })
    }

    /// Process-wide pool, created on first use and never torn down.
    pub fn global() -> Arc<BufferPool> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(BufferPool::new())))
    }

    /// Borrows a zeroed buffer of exactly `len` slots.
    pub fn acquire(&self, len: usize) -> PooledBuffer<'_> {
        let class = request_class(len);

        let mut state = self.state.lock();
        let reused = state.idle.get_mut(&class).and_then(Vec::pop);
        let mut storage = match reused {
            Some(buf) => {
                state.reuses += 1;
                buf
            }
            None => {
                state.allocations += 1;
                let capacity = 1usize.checked_shl(class).unwrap_or(len);
                debug!(len, class, capacity, "Allocating pooled scratch buffer");
                Vec::with_capacity(capacity)
            }
        };
        state.lent += 1;
        drop(state);

        // Previous contents are stale
        storage.clear();
        storage.resize(len, 0);

        PooledBuffer {
            pool: self,
            storage,
        }
    }

    fn release(&self, mut storage: Vec<usize>) {
        let mut state = self.state.lock();
        state.lent -= 1;

        if storage.capacity() == 0 {
            return;
        }

        let class = capacity_class(storage.capacity());
        let max_idle = self.max_idle_per_class;
        let bucket = state.idle.entry(class).or_default();
        if bucket.len() < max_idle {
            storage.clear();
            bucket.push(storage);
        } else {
            debug!(class, "Pool class full, freeing scratch buffer");
        }
    }

    /// Returns current bookkeeping counters.
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        PoolStats {
            lent: state.lent,
            idle: state.idle.values().map(Vec::len).sum(),
            allocations: state.allocations,
            reuses: state.reuses,
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// A buffer borrowed from a [`BufferPool`], returned to it on drop.
///
/// Dropping happens on every exit path of the borrowing scope, unwinding
/// included.
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    storage: Vec<usize>,
}

impl Deref for PooledBuffer<'_> {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.storage
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [usize] {
        &mut self.storage
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.storage));
    }
}
