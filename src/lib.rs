//! # tickframe
//!
//! A columnar technical-indicator engine for batch OHLCV analysis.
//!
//! tickframe consumes tabular price data and augments it with derived
//! columns, stage by stage: indicator columns, then discrete buy/sell/hold
//! signal columns, then backtest columns, and finally one metric row per
//! point of a parameter grid. Every stage is a pure function of its inputs —
//! tables are immutable, columns are shared by reference, and IEEE-754 NaN
//! marks "not yet computable" cells throughout.
//!
//! ## Features
//!
//! - Seven moving averages (SMA, EMA, WMA, HMA, DEMA, TEMA, KAMA), MACD,
//!   RSI, and crossover detection with exact NaN semantics
//! - Strategy descriptors with a composite combinator (all / any / majority
//!   / weighted vote fusion)
//! - A long-only backtest walk with commission and slippage
//! - A grid-search optimizer, sequential or on a worker pool with
//!   per-combination timeouts and progress reporting
//!
//! ## Quick Start
//!
//! ```
//! use tickframe::backtest::{BacktestConfig, backtest, compute_metrics};
//! use tickframe::frame::{Column, Table};
//! use tickframe::strategy::Strategy;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let prices: Vec<f64> = (0..90)
//!         .map(|i| 100.0 + (f64::from(i) / 7.0).sin() * 8.0 + f64::from(i) * 0.1)
//!         .collect();
//!     let table = Table::from_columns([("close".to_string(), Column::from(prices))])?;
//!
//!     let strategy = Strategy::sma_crossover(5, 15);
//!     let result = backtest(&table, &strategy, &BacktestConfig::default())?;
//!     let metrics = compute_metrics(&result)?;
//!
//!     println!("return: {:.2}%", metrics.total_return * 100.0);
//!     println!("sharpe: {:.2}", metrics.sharpe_ratio);
//!     Ok(())
//! }
//! ```
//!
//! ## Optimization
//!
//! ```
//! use tickframe::frame::{Column, Table};
//! use tickframe::optimizer::{
//!     ParamGrid, ParamRange, StrategyKind, SweepOptions, find_best_params,
//!     run_combinations_parallel,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let prices: Vec<f64> = (0..120)
//!     .map(|i| 100.0 + (f64::from(i) / 6.0).sin() * 9.0)
//!     .collect();
//! let table = Table::from_columns([("close".to_string(), Column::from(prices))])?;
//!
//! let grid = ParamGrid::new()
//!     .param("fast", ParamRange::int_range(3, 6))
//!     .param("slow", ParamRange::values_int(&[12, 20, 30]));
//!
//! let report = run_combinations_parallel(
//!     &table,
//!     StrategyKind::SmaCross,
//!     &grid,
//!     &SweepOptions::default().concurrency(2),
//! )?;
//! let best = find_best_params(&report.results, "sharpe_ratio")?;
//! assert!(best.is_some());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Backtesting walk and performance metrics
pub mod backtest;
/// Columnar primitives: typed columns and the table container
pub mod frame;
/// Rolling kernels and technical indicators
pub mod indicators;
/// Grid-search parameter optimization
pub mod optimizer;
/// Strategy descriptors and signal generation
pub mod strategy;

// Re-export the main types at the crate root
pub use backtest::{BacktestConfig, PerformanceMetrics, backtest, compute_metrics};
pub use frame::{Column, Table};
pub use optimizer::{
    ParamGrid, ParamRange, StrategyKind, SweepOptions, find_best_params, parameter_heatmap,
    run_combinations, run_combinations_parallel,
};
pub use strategy::{CompositeLogic, Strategy, generate_signals};
