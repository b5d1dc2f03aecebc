//! Error types for backtesting operations.

use thiserror::Error;

use crate::frame::FrameError;
use crate::strategy::SignalError;

/// Backtest-specific errors
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BacktestError {
    /// Invalid configuration parameter
    #[error("invalid parameter '{param}': {reason}")]
    InvalidParameter {
        /// Parameter name
        param: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Signal generation failed before the walk could start
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// Table operation failed (missing price or signal column, wrong dtype)
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Result type for backtest operations
pub type Result<T> = std::result::Result<T, BacktestError>;

impl BacktestError {
    /// Create an invalid parameter error
    pub fn invalid_param(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }
}
