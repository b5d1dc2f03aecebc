//! Backtesting: a sequential portfolio walk over signal columns.
//!
//! The walk is deliberately simple — long-only, single position, whole
//! units, no leverage, no partial fills. A `-1` signal means "exit long",
//! never "open short". What it produces is a set of running columns
//! (`portfolio_value`, `position`, `trade_return`, `total_return`,
//! `max_drawdown`, `win_rate`, `trade_count`) from which
//! [`compute_metrics`] extracts the performance summary the optimizer ranks
//! by.
//!
//! # Quick Start
//!
//! ```
//! use tickframe::backtest::{BacktestConfig, backtest};
//! use tickframe::frame::{Column, Table};
//! use tickframe::strategy::Strategy;
//!
//! let t = Table::from_columns([(
//!     "close".to_string(),
//!     Column::from((1..=60).map(|i| 100.0 + f64::from(i)).collect::<Vec<_>>()),
//! )])
//! .unwrap();
//!
//! let result = backtest(&t, &Strategy::sma_crossover(3, 8), &BacktestConfig::default()).unwrap();
//! assert!(result.contains("portfolio_value"));
//! assert!(result.contains("max_drawdown"));
//! ```

mod config;
mod engine;
mod error;
mod metrics;

pub use config::{BacktestConfig, BacktestConfigBuilder};
pub use engine::backtest;
pub use error::{BacktestError, Result};
pub use metrics::{PerformanceMetrics, compute_metrics};
