use thiserror::Error;

/// Structural configuration defects. These fail fast at call time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("similarity threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("recency window must be a positive number of hours, got {0}")]
    InvalidRecency(i64),

    #[error("insight concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("insight timeout must be greater than zero")]
    InvalidTimeout,
}
