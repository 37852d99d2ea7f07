/// Result alias for engine construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Invalid construction parameters. Raised once, at initialization; the
/// per-tick path never fails.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive finite number, got {value}")]
    NonPositiveDimension { name: &'static str, value: f64 },

    #[error("grid of {columns}x{rows} cells exceeds the limit of {max} cells")]
    GridTooLarge {
        columns: usize,
        rows: usize,
        max: usize,
    },

    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("base #{index} is invalid: {reason}")]
    InvalidBase { index: usize, reason: &'static str },

    #[error("{name} must be a non-negative finite number, got {value}")]
    NegativeParameter { name: &'static str, value: f64 },

    #[error("failed to spawn worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Reject zero, negative, NaN and infinite values.
pub(crate) fn require_positive(name: &'static str, value: f64) -> ConfigResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositiveDimension { name, value })
    }
}

/// Reject negative, NaN and infinite values. Zero is allowed.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> ConfigResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NegativeParameter { name, value })
    }
}
