//! Weighted Moving Average (WMA) indicator.

use crate::frame::{Column, Table};

use super::{Result, check_period, check_rows, rolling};

/// Options for the weighted moving average.
#[derive(Debug, Clone)]
pub struct WmaOptions {
    /// Window length (required, must be > 0)
    pub period: usize,
    /// Replacement for the default linear-ramp weights; must have exactly
    /// `period` positive entries
    pub weights: Option<Vec<f64>>,
    /// Override for the output column name
    pub column_name: Option<String>,
    /// When true, short inputs raise `InsufficientData` instead of
    /// propagating NaN
    pub validate: bool,
}

impl WmaOptions {
    /// Options for the given period with the recency-favoring linear ramp
    /// `1..=period`.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            weights: None,
            column_name: None,
            validate: false,
        }
    }

    /// Supply a custom weights vector of length `period`.
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Name the output column explicitly.
    pub fn column_name(mut self, name: impl Into<String>) -> Self {
        self.column_name = Some(name.into());
        self
    }

    /// Toggle strict row-count validation.
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

/// Calculate the Weighted Moving Average of a price column.
///
/// Appends a column named `<price_col>_wma_<period>`. By default the weights
/// are the linear ramp `1..=period`, so the most recent price carries the
/// largest weight.
///
/// # Errors
///
/// [`super::IndicatorError::InvalidWeights`] when a custom weights vector
/// does not have exactly `period` positive entries.
///
/// # Example
///
/// ```
/// use tickframe::frame::{Column, Table};
/// use tickframe::indicators::{WmaOptions, wma};
///
/// let t = Table::from_columns([(
///     "close".to_string(),
///     Column::from(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
/// )])
/// .unwrap();
///
/// let t = wma(&t, "close", &WmaOptions::new(3)).unwrap();
/// // (1*1 + 2*2 + 3*3) / (1+2+3) = 14/6
/// assert!((t.float_column("close_wma_3").unwrap()[2] - 14.0 / 6.0).abs() < 1e-12);
/// ```
pub fn wma(table: &Table, price_col: &str, opts: &WmaOptions) -> Result<Table> {
    check_period(opts.period)?;
    let x = table.float_column(price_col)?;
    check_rows(opts.validate, opts.period, x.len())?;

    let values = rolling::weighted_mean(x, opts.period, opts.weights.as_deref())?;
    let name = opts
        .column_name
        .clone()
        .unwrap_or_else(|| format!("{price_col}_wma_{}", opts.period));
    Ok(table.with_column(name, Column::from(values))?)
}
