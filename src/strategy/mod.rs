//! Trading strategies and signal generation.
//!
//! A [`Strategy`] is plain data: a tagged descriptor naming one of the
//! supported signal rules plus its parameters. Descriptors are cheap to
//! clone, serialize to JSON, and are independently constructible — nothing
//! happens until [`generate_signals`] is called with a table.
//!
//! Signal generation appends exactly three columns to the input table:
//! `signal` (integer, -1/0/1), `signal_strength` (float in `[0, 1]`, never
//! NaN), and `signal_reason` (string). Strategies are composable: a
//! [`Strategy::Composite`] runs its children independently and fuses their
//! votes row-wise under one of four [`CompositeLogic`] policies.
//!
//! # Example
//!
//! ```
//! use tickframe::frame::{Column, Table};
//! use tickframe::strategy::{Strategy, generate_signals};
//!
//! let t = Table::from_columns([(
//!     "close".to_string(),
//!     Column::from((1..=30).map(f64::from).collect::<Vec<_>>()),
//! )])
//! .unwrap();
//!
//! let t = generate_signals(&t, &Strategy::sma_crossover(3, 5)).unwrap();
//! assert!(t.contains("signal"));
//! assert!(t.contains("signal_strength"));
//! assert!(t.contains("signal_reason"));
//! ```

mod composite;
mod signals;

pub use signals::generate_signals;

use serde::{Deserialize, Serialize};

use crate::frame::FrameError;
use crate::indicators::IndicatorError;

/// Default price column consumed by strategies.
pub const DEFAULT_PRICE_COL: &str = "close";

/// Default score threshold for the weighted composite policy.
pub const DEFAULT_COMPOSITE_THRESHOLD: f64 = 0.1;

/// How a composite strategy fuses its children's votes at each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeLogic {
    /// Signal only when every child emits the same non-zero signal;
    /// strength is the mean of child strengths
    All,
    /// Emit the strongest child's signal (ties go to the first child)
    Any,
    /// Emit the value held by a strict majority of children; strength is
    /// the mean strength of the winning voters
    Majority,
    /// Weighted vote: Σ signalᵢ · strengthᵢ · weightᵢ against a threshold
    Weighted,
}

impl std::fmt::Display for CompositeLogic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CompositeLogic::All => "all",
            CompositeLogic::Any => "any",
            CompositeLogic::Majority => "majority",
            CompositeLogic::Weighted => "weighted",
        };
        f.write_str(name)
    }
}

/// A trading-strategy descriptor.
///
/// Descriptors carry parameters only; applying one to a table is
/// [`generate_signals`]'s job. The `price_col` defaults to `"close"` in
/// every constructor and can be redirected with
/// [`with_price_col`](Strategy::with_price_col).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Strategy {
    /// Fast/slow simple-moving-average crossover
    SmaCross {
        /// Fast window length
        fast: usize,
        /// Slow window length (must exceed `fast`)
        slow: usize,
        /// Column the averages are computed over
        price_col: String,
    },
    /// Fast/slow exponential-moving-average crossover
    EmaCross {
        /// Fast window length
        fast: usize,
        /// Slow window length (must exceed `fast`)
        slow: usize,
        /// Column the averages are computed over
        price_col: String,
    },
    /// MACD line crossing its signal line
    MacdCross {
        /// Fast EMA period
        fast: usize,
        /// Slow EMA period
        slow: usize,
        /// Signal-line EMA period
        signal: usize,
        /// Column the MACD is computed over
        price_col: String,
    },
    /// Mean-reversion on RSI threshold breaches
    RsiThreshold {
        /// RSI smoothing period
        period: usize,
        /// Buy at or below this level
        oversold: f64,
        /// Sell at or above this level
        overbought: f64,
        /// Column the RSI is computed over
        price_col: String,
    },
    /// Reserved: Bollinger-band mean reversion. Not yet implemented;
    /// [`generate_signals`] rejects it with `UnsupportedStrategy`.
    BollingerBands {
        /// SMA period for the middle band
        period: usize,
        /// Standard-deviation multiplier for the outer bands
        std_dev: f64,
        /// Column the bands are computed over
        price_col: String,
    },
    /// Row-wise fusion of child strategies
    Composite {
        /// Child strategies, each applied to the input table independently
        children: Vec<Strategy>,
        /// Vote-fusion policy
        logic: CompositeLogic,
        /// Per-child weights for [`CompositeLogic::Weighted`]; equal when
        /// absent
        weights: Option<Vec<f64>>,
        /// Score threshold for [`CompositeLogic::Weighted`]
        threshold: f64,
    },
}

impl Strategy {
    /// SMA crossover over the default `close` column.
    pub fn sma_crossover(fast: usize, slow: usize) -> Self {
        Strategy::SmaCross {
            fast,
            slow,
            price_col: DEFAULT_PRICE_COL.to_string(),
        }
    }

    /// EMA crossover over the default `close` column.
    pub fn ema_crossover(fast: usize, slow: usize) -> Self {
        Strategy::EmaCross {
            fast,
            slow,
            price_col: DEFAULT_PRICE_COL.to_string(),
        }
    }

    /// MACD/signal-line crossover over the default `close` column.
    pub fn macd_crossover(fast: usize, slow: usize, signal: usize) -> Self {
        Strategy::MacdCross {
            fast,
            slow,
            signal,
            price_col: DEFAULT_PRICE_COL.to_string(),
        }
    }

    /// RSI threshold strategy over the default `close` column.
    pub fn rsi_threshold(period: usize, oversold: f64, overbought: f64) -> Self {
        Strategy::RsiThreshold {
            period,
            oversold,
            overbought,
            price_col: DEFAULT_PRICE_COL.to_string(),
        }
    }

    /// Composite of child strategies with equal weights and the default
    /// weighted-vote threshold.
    pub fn composite(children: Vec<Strategy>, logic: CompositeLogic) -> Self {
        Strategy::Composite {
            children,
            logic,
            weights: None,
            threshold: DEFAULT_COMPOSITE_THRESHOLD,
        }
    }

    /// Redirect the strategy (and, for composites, every child) to another
    /// price column.
    pub fn with_price_col(mut self, col: impl Into<String>) -> Self {
        let col = col.into();
        match &mut self {
            Strategy::SmaCross { price_col, .. }
            | Strategy::EmaCross { price_col, .. }
            | Strategy::MacdCross { price_col, .. }
            | Strategy::RsiThreshold { price_col, .. }
            | Strategy::BollingerBands { price_col, .. } => *price_col = col,
            Strategy::Composite { children, .. } => {
                for child in children.iter_mut() {
                    *child = child.clone().with_price_col(col.clone());
                }
            }
        }
        self
    }

    /// Stable kind tag used in error messages and reasons.
    pub fn kind(&self) -> &'static str {
        match self {
            Strategy::SmaCross { .. } => "sma_crossover",
            Strategy::EmaCross { .. } => "ema_crossover",
            Strategy::MacdCross { .. } => "macd_crossover",
            Strategy::RsiThreshold { .. } => "rsi_threshold",
            Strategy::BollingerBands { .. } => "bollinger_bands",
            Strategy::Composite { .. } => "composite",
        }
    }

    /// The price column this strategy reads (the first child's for
    /// composites).
    pub fn price_col(&self) -> &str {
        match self {
            Strategy::SmaCross { price_col, .. }
            | Strategy::EmaCross { price_col, .. }
            | Strategy::MacdCross { price_col, .. }
            | Strategy::RsiThreshold { price_col, .. }
            | Strategy::BollingerBands { price_col, .. } => price_col,
            Strategy::Composite { children, .. } => children
                .first()
                .map_or(DEFAULT_PRICE_COL, Strategy::price_col),
        }
    }

    /// Minimum number of rows before the strategy can emit any signal.
    pub fn min_rows(&self) -> usize {
        match self {
            Strategy::SmaCross { slow, .. } | Strategy::EmaCross { slow, .. } => slow + 1,
            Strategy::MacdCross { slow, signal, .. } => slow + signal,
            Strategy::RsiThreshold { period, .. } => period + 1,
            Strategy::BollingerBands { period, .. } => *period,
            Strategy::Composite { children, .. } => children
                .iter()
                .map(Strategy::min_rows)
                .max()
                .unwrap_or(1),
        }
    }
}

/// Error type for strategy signal generation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SignalError {
    /// An indicator column the signal step depends on is absent
    #[error("required indicator column '{name}' is missing")]
    MissingIndicatorColumn {
        /// Name of the expected column
        name: String,
    },

    /// The strategy kind has no signal implementation
    #[error("strategy '{kind}' is not supported")]
    UnsupportedStrategy {
        /// Kind tag of the rejected strategy
        kind: String,
    },

    /// Not enough rows for the strategy's minimum window
    #[error("insufficient data for '{kind}': need at least {need} rows, got {got}")]
    InsufficientData {
        /// Kind tag of the strategy
        kind: String,
        /// Minimum rows required
        need: usize,
        /// Rows provided
        got: usize,
    },

    /// A composite child failed; the source error carries the detail
    #[error("child strategy {index} ('{kind}') failed")]
    ChildStrategyFailed {
        /// Zero-based child index within the composite
        index: usize,
        /// Kind tag of the failed child
        kind: String,
        /// The child's own error
        #[source]
        source: Box<SignalError>,
    },

    /// Indicator application failed
    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    /// Table operation failed
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Result type for strategy operations.
pub type Result<T> = std::result::Result<T, SignalError>;
