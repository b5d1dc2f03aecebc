//! Technical-analysis indicators over tabular OHLCV data.
//!
//! Every indicator is a pure function `(Table, price column, options) →
//! Table`: the input table is returned with one or more new columns appended
//! and nothing else changed. Output columns follow the naming convention
//! `<price_col>_<tag>_<period>` (overrideable where the options struct has a
//! `column_name` field), so downstream layers can locate them
//! deterministically.
//!
//! # Available Indicators
//!
//! ## Moving averages
//! - [`sma`] - Simple Moving Average
//! - [`ema`] - Exponential Moving Average
//! - [`wma`] - Weighted Moving Average
//! - [`hma`] - Hull Moving Average
//! - [`dema`] - Double Exponential Moving Average
//! - [`tema`] - Triple Exponential Moving Average
//! - [`kama`] - Kaufman Adaptive Moving Average
//!
//! ## Oscillators and trend
//! - [`rsi`] - Relative Strength Index (Wilder smoothing)
//! - [`macd`] - Moving Average Convergence Divergence
//! - [`detect_crossovers`] / [`detect_macd_crossovers`] - discrete crossover events
//!
//! # NaN semantics
//!
//! Cells that cannot be computed yet (the warmup prefix of a window) are NaN,
//! and NaN inputs propagate through arithmetic into dependent cells. By
//! default indicators never fail on short inputs — they return all-NaN
//! columns. Passing `validate(true)` in the options turns the short-input
//! case into an [`IndicatorError::InsufficientData`] error instead.
//!
//! # Example
//!
//! ```
//! use tickframe::frame::{Column, Table};
//! use tickframe::indicators::{MaOptions, sma};
//!
//! let table = Table::from_columns([(
//!     "close".to_string(),
//!     Column::from(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
//! )])
//! .unwrap();
//!
//! let table = sma(&table, "close", &MaOptions::new(3)).unwrap();
//! let out = table.float_column("close_sma_3").unwrap();
//! assert!(out[1].is_nan());
//! assert_eq!(out[2], 2.0);
//! assert_eq!(out[4], 4.0);
//! ```

pub mod rolling;

mod crossover;
mod dema;
mod ema;
mod hma;
mod kama;
mod macd;
mod rsi;
mod sma;
mod tema;
mod wma;

pub use crossover::{detect_crossovers, detect_macd_crossovers};
pub use dema::dema;
pub use ema::{EmaOptions, ema};
pub use hma::hma;
pub use kama::{KamaOptions, kama};
pub use macd::{MacdOptions, macd};
pub use rsi::{RsiOptions, rsi, rsi_signals};
pub use sma::{MaOptions, sma};
pub use tema::tema;
pub use wma::{WmaOptions, wma};

use crate::frame::FrameError;

/// Error type for indicator calculations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum IndicatorError {
    /// Invalid period parameter provided
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// Smoothing factor outside the half-open interval (0, 1]
    #[error("invalid alpha {alpha}: must lie in (0.0, 1.0]")]
    InvalidAlpha {
        /// The rejected smoothing factor
        alpha: f64,
    },

    /// Custom weights vector rejected (wrong length or non-positive entries)
    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    /// Not enough rows to produce any numeric output (only raised when the
    /// caller opted into validation; otherwise short inputs yield NaN columns)
    #[error("insufficient data: need at least {need} rows, got {got}")]
    InsufficientData {
        /// Minimum number of rows required
        need: usize,
        /// Actual number of rows provided
        got: usize,
    },

    /// Underlying table operation failed (missing column, wrong dtype,
    /// duplicate output name)
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Result type for indicator calculations.
pub type Result<T> = std::result::Result<T, IndicatorError>;

/// Reject a zero window length before touching the data.
pub(crate) fn check_period(period: usize) -> Result<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod(
            "period must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Enforce `validate=true` semantics: error when fewer than `need` rows.
pub(crate) fn check_rows(validate: bool, need: usize, got: usize) -> Result<()> {
    if validate && got < need {
        return Err(IndicatorError::InsufficientData { need, got });
    }
    Ok(())
}
