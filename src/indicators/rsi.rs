//! Relative Strength Index (RSI) indicator.

use crate::frame::{Column, Table};

use super::{Result, check_period, check_rows, rolling};

/// Options for the Relative Strength Index.
#[derive(Debug, Clone)]
pub struct RsiOptions {
    /// Smoothing period (default 14)
    pub period: usize,
    /// Override for the output column name
    pub column_name: Option<String>,
    /// When true, short inputs raise `InsufficientData` instead of
    /// propagating NaN
    pub validate: bool,
}

impl Default for RsiOptions {
    fn default() -> Self {
        Self {
            period: 14,
            column_name: None,
            validate: false,
        }
    }
}

impl RsiOptions {
    /// Options with an explicit smoothing period.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            ..Self::default()
        }
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

/// Calculate the Relative Strength Index of a price column.
///
/// Price changes split into gains and losses, each smoothed with Wilder's
/// recursion (`α = 1/period`, NaN inputs hold the state). The index is then:
///
/// - `100 - 100 / (1 + avg_gain/avg_loss)` when `avg_loss > 0`,
/// - `100` when only gains have been seen,
/// - `50` when both averages are zero (a perfectly flat market),
/// - NaN when either average is not yet defined.
///
/// Values always lie in `[0, 100]`. Appends `<price_col>_rsi_<period>`.
///
/// # Example
///
/// ```
/// use tickframe::frame::{Column, Table};
/// use tickframe::indicators::{RsiOptions, rsi};
///
/// let t = Table::from_columns([(
///     "close".to_string(),
///     Column::from((0..30).map(f64::from).collect::<Vec<_>>()),
/// )])
/// .unwrap();
///
/// let t = rsi(&t, "close", &RsiOptions::default()).unwrap();
/// // Monotone gains push the index to its ceiling.
/// assert_eq!(t.float_column("close_rsi_14").unwrap()[29], 100.0);
/// ```
pub fn rsi(table: &Table, price_col: &str, opts: &RsiOptions) -> Result<Table> {
    check_period(opts.period)?;
    let x = table.float_column(price_col)?;
    check_rows(opts.validate, opts.period + 1, x.len())?;

    let n = x.len();
    let mut gains = vec![f64::NAN; n];
    let mut losses = vec![f64::NAN; n];
    for i in 1..n {
        let change = x[i] - x[i - 1];
        if !change.is_nan() {
            gains[i] = change.max(0.0);
            losses[i] = (-change).max(0.0);
        }
    }

    let avg_gains = rolling::wilder_smooth(&gains, opts.period)?;
    let avg_losses = rolling::wilder_smooth(&losses, opts.period)?;

    let values: Vec<f64> = avg_gains
        .iter()
        .zip(&avg_losses)
        .map(|(&gain, &loss)| {
            if !gain.is_finite() || !loss.is_finite() {
                f64::NAN
            } else if loss > 0.0 {
                100.0 - 100.0 / (1.0 + gain / loss)
            } else if gain > 0.0 {
                100.0
            } else {
                50.0
            }
        })
        .collect();

    let name = opts
        .column_name
        .clone()
        .unwrap_or_else(|| format!("{price_col}_rsi_{}", opts.period));
    Ok(table.with_column(name, Column::from(values))?)
}

/// Map an RSI column to discrete threshold signals.
///
/// Appends an integer column (`<rsi_col>_signal` unless overridden) holding
/// `1` where the index is at or below `oversold`, `-1` where it is at or
/// above `overbought`, and `0` otherwise. NaN cells emit `0`.
pub fn rsi_signals(
    table: &Table,
    rsi_col: &str,
    oversold: f64,
    overbought: f64,
    output: Option<&str>,
) -> Result<Table> {
    let values = table.float_column(rsi_col)?;
    let signals: Vec<i64> = values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                0
            } else if v <= oversold {
                1
            } else if v >= overbought {
                -1
            } else {
                0
            }
        })
        .collect();

    let name = output.map_or_else(|| format!("{rsi_col}_signal"), str::to_string);
    Ok(table.with_column(name, Column::from(signals))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_table(values: Vec<f64>) -> Table {
        Table::from_columns([("close".to_string(), Column::from(values))]).unwrap()
    }

    #[test]
    fn test_rsi_bounded() {
        let data = vec![
            44.0, 44.3, 44.1, 44.2, 44.5, 43.4, 44.0, 44.25, 44.8, 45.1, 45.4, 45.8, 46.0, 45.9,
            45.2, 44.8, 44.6, 44.4, 44.2, 44.0,
        ];
        let t = close_table(data);
        let t = rsi(&t, "close", &RsiOptions::default()).unwrap();

        let out = t.float_column("close_rsi_14").unwrap();
        assert_eq!(out.len(), 20);
        assert!(out[0].is_nan()); // no delta at row 0
        for &v in &out[1..] {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let t = close_table((0..20).map(f64::from).collect());
        let t = rsi(&t, "close", &RsiOptions::new(5)).unwrap();
        let out = t.float_column("close_rsi_5").unwrap();
        assert_eq!(out[19], 100.0);
    }

    #[test]
    fn test_rsi_flat_market_is_50() {
        let t = close_table(vec![7.0; 12]);
        let t = rsi(&t, "close", &RsiOptions::new(4)).unwrap();
        let out = t.float_column("close_rsi_4").unwrap();
        assert_eq!(out[11], 50.0);
    }

    #[test]
    fn test_rsi_all_losses_near_zero() {
        let t = close_table((0..20).map(|i| 100.0 - f64::from(i)).collect());
        let t = rsi(&t, "close", &RsiOptions::new(5)).unwrap();
        let out = t.float_column("close_rsi_5").unwrap();
        assert_eq!(out[19], 0.0);
    }

    #[test]
    fn test_rsi_signals_thresholds() {
        let t = Table::from_columns([(
            "r".to_string(),
            Column::from(vec![f64::NAN, 25.0, 50.0, 75.0, 30.0, 70.0]),
        )])
        .unwrap();
        let t = rsi_signals(&t, "r", 30.0, 70.0, None).unwrap();

        assert_eq!(t.int_column("r_signal").unwrap(), &[0, 1, 0, -1, 1, -1]);
    }
}
