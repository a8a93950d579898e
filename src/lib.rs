//! # period-rs - Whole-String Repetition Detection
//!
//! Decides whether a sequence is some shorter unit repeated two or more times,
//! and if so returns that unit.
//!
//! Detection runs on the KMP failure function (border array): the border of
//! the whole input gives its minimal period `p`, the input repeats iff `p`
//! divides its length, and the reported unit is the longest one that still
//! tiles the input.
//!
//! ## Example
//!
//! ```
//! use period_rs::{detect_str, DivisorScan, PeriodDetector};
//!
//! let detector = PeriodDetector::new();
//! assert_eq!(detector.detect_str("abab"), Some("ab"));
//! assert_eq!(detector.detect(&[1, 2, 1, 2, 1, 2][..]), Some(&[1, 2][..]));
//! assert_eq!(detector.detect_str("abcde"), None);
//!
//! // Brute-force baselines answer identically
//! assert_eq!(detect_str(&DivisorScan, "abab"), Some("ab"));
//! ```
//!
//! ## Scratch space
//!
//! The border array needs `n` integers of scratch. Where they come from is a
//! [`BufferStrategy`]: [`OwnedBuffers`] allocates per call, [`PooledBuffers`]
//! borrows from a shared [`BufferPool`], and [`BoundedBuffers`] uses the stack
//! below a byte ceiling and the pool above it.
//!
//! ## Performance
//!
//! - O(n) time per call, plus O(sqrt(n)) to pick the unit length
//! - O(n) scratch, reusable across calls with the pooled strategies

mod border;
mod detector;
mod error;
mod matcher;
mod pool;
mod strategy;


pub use border::border_array;
pub use detector::{PeriodDetector, Periodicity, UnitSelection};
pub use error::ConfigError;
pub use matcher::{detect_str, DivisorScan, Matcher, RepeatCompare};
pub use pool::{BufferPool, PoolStats, PooledBuffer, DEFAULT_MAX_IDLE_PER_CLASS};
pub use strategy::{
    BoundedBuffers, BoundedConfig, BufferStrategy, OwnedBuffers, PooledBuffers,
    DEFAULT_CEILING_BYTES, MAX_STACK_BYTES,
};
