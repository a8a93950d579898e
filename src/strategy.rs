use crate::error::ConfigError;
use crate::pool::BufferPool;
use std::mem::size_of;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default byte ceiling for stack scratch space.
pub const DEFAULT_CEILING_BYTES: usize = 128 * 1024;

/// Largest stack scratch region a [`BoundedBuffers`] will ever use.
pub const MAX_STACK_BYTES: usize = 128 * 1024;

const SLOT_BYTES: usize = size_of::<usize>();
const STACK_SLOTS: usize = MAX_STACK_BYTES / SLOT_BYTES;
const SMALL_STACK_SLOTS: usize = 256;

/// Supplies the scratch space the border array is written into.
///
/// The slice handed to `f` is zeroed, exactly `len` slots long, and only
/// valid inside `f`. Implementations reclaim it when `f` returns or unwinds,
/// so callers never release anything by hand.
pub trait BufferStrategy {
    fn with_scratch<R, F>(&self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [usize]) -> R;
}

impl<S: BufferStrategy> BufferStrategy for &S {
    fn with_scratch<R, F>(&self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [usize]) -> R,
    {
        (**self).with_scratch(len, f)
    }
}

/// Fresh heap allocation per call, no reuse.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnedBuffers;

impl BufferStrategy for OwnedBuffers {
    fn with_scratch<R, F>(&self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [usize]) -> R,
    {
        let mut scratch = vec![0; len];
        f(&mut scratch)
    }
}

/// Scratch borrowed from a shared [`BufferPool`].
#[derive(Debug, Clone)]
pub struct PooledBuffers {
    pool: Arc<BufferPool>,
}

impl PooledBuffers {
    /// Uses the process-wide pool.
    pub fn global() -> Self {
        Self {
            pool: BufferPool::global(),
        }
    }

    /// Uses a caller-provided pool.
    pub fn with_pool(pool: Arc<BufferPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }
}

impl Default for PooledBuffers {
    fn default() -> Self {
        Self::global()
    }
}

impl BufferStrategy for PooledBuffers {
    fn with_scratch<R, F>(&self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [usize]) -> R,
    {
        let mut scratch = self.pool.acquire(len);
        f(&mut scratch)
    }
}

/// Configuration for [`BoundedBuffers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedConfig {
    /// Largest scratch size, in bytes, served from the stack
    pub ceiling_bytes: usize,
}

impl Default for BoundedConfig {
    fn default() -> Self {
        Self {
            ceiling_bytes: DEFAULT_CEILING_BYTES,
        }
    }
}

/// Stack scratch for inputs under a byte ceiling, pooled scratch above it.
#[derive(Debug, Clone)]
pub struct BoundedBuffers {
    ceiling_bytes: usize,
    fallback: PooledBuffers,
}

impl BoundedBuffers {
    /// Builds the strategy over the process-wide pool.
    ///
    /// Fails with [`ConfigError::ZeroCeiling`] on a zero ceiling. Ceilings
    /// above [`MAX_STACK_BYTES`] are clamped.
    pub fn new(config: BoundedConfig) -> Result<Self, ConfigError> {
        Self::with_fallback(config, PooledBuffers::global())
    }

    /// Builds the strategy with an explicit fallback pool.
    pub fn with_fallback(
        config: BoundedConfig,
        fallback: PooledBuffers,
    ) -> Result<Self, ConfigError> {
        if config.ceiling_bytes == 0 {
            return Err(ConfigError::ZeroCeiling);
        }

        let ceiling_bytes = if config.ceiling_bytes > MAX_STACK_BYTES {
            warn!(
                requested = config.ceiling_bytes,
                clamped = MAX_STACK_BYTES,
                "Stack ceiling exceeds stack region, clamping"
            );
            MAX_STACK_BYTES
        } else {
            config.ceiling_bytes
        };

        Ok(Self {
            ceiling_bytes,
            fallback,
        })
    }

    /// Effective ceiling after clamping.
    pub fn ceiling_bytes(&self) -> usize {
        self.ceiling_bytes
    }

    /// Whether a request for `len` slots is served from the stack.
    pub fn fits_on_stack(&self, len: usize) -> bool {
        len.saturating_mul(SLOT_BYTES) <= self.ceiling_bytes
    }
}

impl Default for BoundedBuffers {
    fn default() -> Self {
        Self {
            ceiling_bytes: DEFAULT_CEILING_BYTES,
            fallback: PooledBuffers::global(),
        }
    }
}

impl BufferStrategy for BoundedBuffers {
    fn with_scratch<R, F>(&self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [usize]) -> R,
    {
        if !self.fits_on_stack(len) {
            debug!(
                len,
                ceiling_bytes = self.ceiling_bytes,
                "Scratch exceeds stack ceiling, falling back to pool"
            );
            return self.fallback.with_scratch(len, f);
        }

        // ceiling_bytes <= MAX_STACK_BYTES, so len <= STACK_SLOTS here
        if len <= SMALL_STACK_SLOTS {
            let mut scratch = [0usize; SMALL_STACK_SLOTS];
            f(&mut scratch[..len])
        } else {
            let mut scratch = [0usize; STACK_SLOTS];
            f(&mut scratch[..len])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_and_sum<S: BufferStrategy>(strategy: &S, len: usize) -> usize {
        strategy.with_scratch(len, |scratch| {
            assert_eq!(scratch.len(), len);
            assert!(scratch.iter().all(|&v| v == 0));
            for (i, slot) in scratch.iter_mut().enumerate() {
                *slot = i;
            }
            scratch.iter().sum()
        })
    }

    #[test]
    fn test_owned() {
        assert_eq!(fill_and_sum(&OwnedBuffers, 4), 6);
        assert_eq!(fill_and_sum(&OwnedBuffers, 0), 0);
    }

    #[test]
    fn test_pooled_returns_buffer() {
        let pool = Arc::new(BufferPool::new());
        let strategy = PooledBuffers::with_pool(Arc::clone(&pool));

        assert_eq!(fill_and_sum(&strategy, 4), 6);
        assert_eq!(fill_and_sum(&strategy, 4), 6);

        let stats = pool.stats();
        assert_eq!(stats.lent, 0);
        assert_eq!(stats.allocations, 1);
        assert_eq!(stats.reuses, 1);
    }

    #[test]
    fn test_borrowed_strategy_shares_pool() {
        let pool = Arc::new(BufferPool::new());
        let strategy = PooledBuffers::with_pool(Arc::clone(&pool));
        let borrowed = &strategy;

        assert_eq!(fill_and_sum(&borrowed, 3), 3);
        assert_eq!(fill_and_sum(&strategy, 3), 3);
        assert_eq!(pool.stats().reuses, 1);
    }

    #[test]
    fn test_pooled_returns_buffer_on_panic() {
        let pool = Arc::new(BufferPool::new());
        let strategy = PooledBuffers::with_pool(Arc::clone(&pool));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            strategy.with_scratch::<(), _>(8, |_| panic!("boom"))
        }));
        assert!(result.is_err());
        assert_eq!(pool.stats().lent, 0);
        assert_eq!(pool.stats().idle, 1);
    }

    #[test]
    fn test_bounded_zero_ceiling_rejected() {
        let err = BoundedBuffers::new(BoundedConfig { ceiling_bytes: 0 }).unwrap_err();
        assert_eq!(err, ConfigError::ZeroCeiling);
    }

    #[test]
    fn test_bounded_ceiling_clamped() {
        let strategy = BoundedBuffers::new(BoundedConfig {
            ceiling_bytes: MAX_STACK_BYTES * 4,
        })
        .unwrap();
        assert_eq!(strategy.ceiling_bytes(), MAX_STACK_BYTES);
    }

    #[test]
    fn test_bounded_default_ceiling() {
        assert_eq!(BoundedBuffers::default().ceiling_bytes(), DEFAULT_CEILING_BYTES);
        assert_eq!(
            BoundedConfig::default().ceiling_bytes,
            DEFAULT_CEILING_BYTES
        );
    }

    #[test]
    fn test_bounded_stays_on_stack_under_ceiling() {
        let pool = Arc::new(BufferPool::new());
        let strategy = BoundedBuffers::with_fallback(
            BoundedConfig {
                ceiling_bytes: 16 * SLOT_BYTES,
            },
            PooledBuffers::with_pool(Arc::clone(&pool)),
        )
        .unwrap();

        assert!(strategy.fits_on_stack(16));
        assert_eq!(fill_and_sum(&strategy, 16), 120);
        assert_eq!(pool.stats().allocations, 0);
    }

    #[test]
    fn test_bounded_falls_back_above_ceiling() {
        let pool = Arc::new(BufferPool::new());
        let strategy = BoundedBuffers::with_fallback(
            BoundedConfig {
                ceiling_bytes: 16 * SLOT_BYTES,
            },
            PooledBuffers::with_pool(Arc::clone(&pool)),
        )
        .unwrap();

        assert!(!strategy.fits_on_stack(17));
        assert_eq!(fill_and_sum(&strategy, 17), 136);

        let stats = pool.stats();
        assert_eq!(stats.allocations, 1);
        assert_eq!(stats.lent, 0);
    }

    #[test]
    fn test_bounded_large_stack_tier() {
        let strategy = BoundedBuffers::default();
        let len = SMALL_STACK_SLOTS + 1;
        assert!(strategy.fits_on_stack(len));
        assert_eq!(fill_and_sum(&strategy, len), len * (len - 1) / 2);
    }
}
