//! Exponential Moving Average (EMA) indicator.

use crate::frame::{Column, Table};

use super::{Result, check_period, check_rows, rolling};

/// Options for the exponential averages (EMA, DEMA, TEMA).
#[derive(Debug, Clone)]
pub struct EmaOptions {
    /// Window length (required, must be > 0)
    pub period: usize,
    /// Override for the smoothing factor; defaults to `2 / (period + 1)`
    pub alpha: Option<f64>,
    /// Override for the output column name
    pub column_name: Option<String>,
    /// When true, short inputs raise `InsufficientData` instead of
    /// propagating NaN
    pub validate: bool,
}

impl EmaOptions {
    /// Options for the given period with the default smoothing factor.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            alpha: None,
            column_name: None,
            validate: false,
        }
    }

    /// Override the smoothing factor. Must lie in `(0.0, 1.0]`.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
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

    pub(crate) fn output_name(&self, price_col: &str, tag: &str) -> String {
        self.column_name
            .clone()
            .unwrap_or_else(|| format!("{price_col}_{tag}_{}", self.period))
    }
}

/// Calculate the Exponential Moving Average of a price column.
///
/// Appends a column named `<price_col>_ema_<period>`. The first numeric cell
/// sits at index `period - 1` and equals the SMA of the first `period`
/// prices; later cells follow `α·price + (1-α)·previous`. Cells before the
/// seed are NaN.
///
/// # Example
///
/// ```
/// use tickframe::frame::{Column, Table};
/// use tickframe::indicators::{EmaOptions, ema};
///
/// let t = Table::from_columns([(
///     "close".to_string(),
///     Column::from(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
/// )])
/// .unwrap();
///
/// let t = ema(&t, "close", &EmaOptions::new(3).alpha(0.5)).unwrap();
/// assert_eq!(&t.float_column("close_ema_3").unwrap()[2..], &[2.0, 3.0, 4.0]);
/// ```
pub fn ema(table: &Table, price_col: &str, opts: &EmaOptions) -> Result<Table> {
    check_period(opts.period)?;
    let x = table.float_column(price_col)?;
    check_rows(opts.validate, opts.period, x.len())?;

    let values = rolling::ema(x, opts.period, opts.alpha)?;
    let name = opts.output_name(price_col, "ema");
    Ok(table.with_column(name, Column::from(values))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorError;

    fn close_table(values: Vec<f64>) -> Table {
        Table::from_columns([("close".to_string(), Column::from(values))]).unwrap()
    }

    #[test]
    fn test_ema_seed_is_sma_of_first_window() {
        let t = close_table(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let t = ema(&t, "close", &EmaOptions::new(3)).unwrap();

        let out = t.float_column("close_ema_3").unwrap();
        assert!(out[1].is_nan());
        assert_eq!(out[2], 2.0);
    }

    #[test]
    fn test_ema_alpha_override() {
        let t = close_table(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let t = ema(&t, "close", &EmaOptions::new(3).alpha(0.5)).unwrap();
        assert_eq!(
            &t.float_column("close_ema_3").unwrap()[2..],
            &[2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_ema_rejects_bad_alpha() {
        let t = close_table(vec![1.0, 2.0, 3.0]);
        let err = ema(&t, "close", &EmaOptions::new(2).alpha(-0.1)).unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidAlpha { .. }));
    }

    #[test]
    fn test_ema_deterministic() {
        let t = close_table(vec![5.0, 3.0, 8.0, 2.0, 9.0, 4.0]);
        let a = ema(&t, "close", &EmaOptions::new(3)).unwrap();
        let b = ema(&t, "close", &EmaOptions::new(3)).unwrap();
        assert!(
            a.column("close_ema_3")
                .unwrap()
                .bitwise_eq(b.column("close_ema_3").unwrap())
        );
    }
}
