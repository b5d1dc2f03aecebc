//! Grid-search parameter optimization over strategies.
//!
//! A [`ParamGrid`] names the parameters to sweep and the values each one
//! takes; [`run_combinations`] (sequential) and [`run_combinations_parallel`]
//! (worker pool) evaluate every point of the cartesian product with a
//! signal-generation + backtest + metric-extraction pipeline, collecting one
//! row per combination into a result table. [`find_best_params`] and
//! [`parameter_heatmap`] rank and pivot that table.
//!
//! Per-combination execution failures (and, in the parallel sweep, timeouts)
//! are logged and dropped — they never abort the sweep. Only structural
//! errors (unknown parameter name, empty grid, every combination failing)
//! surface to the caller.
//!
//! # Example
//!
//! ```
//! use tickframe::frame::{Column, Table};
//! use tickframe::optimizer::{
//!     ParamGrid, ParamRange, StrategyKind, SweepOptions, find_best_params, run_combinations,
//! };
//!
//! let t = Table::from_columns([(
//!     "close".to_string(),
//!     Column::from((0..80).map(|i| 100.0 + (f64::from(i) / 5.0).sin() * 10.0).collect::<Vec<_>>()),
//! )])
//! .unwrap();
//!
//! let grid = ParamGrid::new()
//!     .param("fast", ParamRange::int_range(3, 5))
//!     .param("slow", ParamRange::values_int(&[10, 20]));
//!
//! let report = run_combinations(&t, StrategyKind::SmaCross, &grid, &SweepOptions::default())
//!     .unwrap();
//! let best = find_best_params(&report.results, "sharpe_ratio").unwrap();
//! assert!(best.is_some());
//! ```

mod grid;
mod report;
mod sweep;

pub use grid::{Combinations, ParamGrid, ParamRange, ParamValue};
pub use report::{find_best_params, parameter_heatmap};
pub use sweep::{StrategyKind, SweepOptions, SweepReport, run_combinations, run_combinations_parallel};

use crate::frame::FrameError;

/// Error type for optimizer operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OptimizerError {
    /// A parameter name in the grid is not recognized by the strategy kind
    #[error("unknown option '{key}'")]
    UnknownOption {
        /// The rejected parameter name
        key: String,
    },

    /// A parameter the strategy kind requires is absent from the grid
    #[error("missing required parameter '{key}' for strategy '{kind}'")]
    MissingParam {
        /// The absent parameter name
        key: String,
        /// Kind tag of the strategy being built
        kind: String,
    },

    /// Invalid sweep configuration
    #[error("invalid parameter '{param}': {reason}")]
    InvalidParameter {
        /// Parameter name
        param: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Every combination in the grid failed or timed out
    #[error("no parameter combination produced a valid result")]
    NoValidResults,

    /// Table operation failed
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Result type for optimizer operations.
pub type Result<T> = std::result::Result<T, OptimizerError>;

impl OptimizerError {
    /// Create an invalid parameter error
    pub fn invalid_param(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }
}
