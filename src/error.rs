use thiserror::Error;

/// Errors raised while constructing a detector or buffer strategy.
///
/// Detection itself never fails: "no repeating unit" is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Stack ceiling must be a positive number of bytes")]
    ZeroCeiling,

    #[error("Pool must retain at least one buffer per size class")]
    ZeroRetention,
}
