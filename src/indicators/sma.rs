//! Simple Moving Average (SMA) indicator.

use crate::frame::{Column, Table};

use super::{Result, check_period, check_rows, rolling};

/// Options shared by the plain window averages (SMA, HMA).
///
/// # Example
///
/// ```
/// use tickframe::indicators::MaOptions;
///
/// let opts = MaOptions::new(20).column_name("trend").validate(true);
/// assert_eq!(opts.period, 20);
/// ```
#[derive(Debug, Clone)]
pub struct MaOptions {
    /// Window length (required, must be > 0)
    pub period: usize,
    /// Override for the output column name
    pub column_name: Option<String>,
    /// When true, short inputs raise `InsufficientData` instead of
    /// propagating NaN
    pub validate: bool,
}

impl MaOptions {
    /// Options for the given window length with default naming and NaN
    /// propagation on short inputs.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            column_name: None,
            validate: false,
        }
    }

    /// Name the output column explicitly instead of `<price>_<tag>_<period>`.
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

/// Calculate the Simple Moving Average of a price column.
///
/// Appends a column named `<price_col>_sma_<period>` where cell `i` is the
/// arithmetic mean of the trailing `period` prices. The first `period - 1`
/// cells are NaN.
///
/// # Example
///
/// ```
/// use tickframe::frame::{Column, Table};
/// use tickframe::indicators::{MaOptions, sma};
///
/// let t = Table::from_columns([(
///     "close".to_string(),
///     Column::from(vec![10.0, 11.0, 12.0, 13.0, 14.0]),
/// )])
/// .unwrap();
///
/// let t = sma(&t, "close", &MaOptions::new(3)).unwrap();
/// assert_eq!(t.float_column("close_sma_3").unwrap()[2], 11.0);
/// ```
pub fn sma(table: &Table, price_col: &str, opts: &MaOptions) -> Result<Table> {
    check_period(opts.period)?;
    let x = table.float_column(price_col)?;
    check_rows(opts.validate, opts.period, x.len())?;

    let values = rolling::rolling_mean(x, opts.period);
    let name = output_name(opts, price_col, "sma", opts.period);
    Ok(table.with_column(name, Column::from(values))?)
}

/// Resolve the output column name: explicit override or the
/// `<price>_<tag>_<period>` convention.
pub(crate) fn output_name(opts: &MaOptions, price_col: &str, tag: &str, period: usize) -> String {
    opts.column_name
        .clone()
        .unwrap_or_else(|| format!("{price_col}_{tag}_{period}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorError;

    fn close_table(values: Vec<f64>) -> Table {
        Table::from_columns([("close".to_string(), Column::from(values))]).unwrap()
    }

    #[test]
    fn test_sma_basic() {
        let t = close_table(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let t = sma(&t, "close", &MaOptions::new(3)).unwrap();

        let out = t.float_column("close_sma_3").unwrap();
        assert_eq!(out.len(), 5);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert_eq!(&out[2..], &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_sma_period_one_is_identity() {
        let t = close_table(vec![10.0, 20.0, 30.0]);
        let t = sma(&t, "close", &MaOptions::new(1)).unwrap();
        assert_eq!(t.float_column("close_sma_1").unwrap(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_sma_preserves_input_columns() {
        let t = close_table(vec![1.0, 2.0, 3.0]);
        let out = sma(&t, "close", &MaOptions::new(2)).unwrap();
        assert_eq!(out.names()[0], "close");
        assert_eq!(out.float_column("close").unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sma_custom_name() {
        let t = close_table(vec![1.0, 2.0, 3.0]);
        let t = sma(&t, "close", &MaOptions::new(2).column_name("fast")).unwrap();
        assert!(t.contains("fast"));
    }

    #[test]
    fn test_sma_zero_period() {
        let t = close_table(vec![1.0, 2.0]);
        let err = sma(&t, "close", &MaOptions::new(0)).unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidPeriod(_)));
    }

    #[test]
    fn test_sma_missing_column() {
        let t = close_table(vec![1.0, 2.0]);
        let err = sma(&t, "nope", &MaOptions::new(2)).unwrap_err();
        assert!(matches!(err, IndicatorError::Frame(_)));
    }

    #[test]
    fn test_sma_short_input_nan_by_default() {
        let t = close_table(vec![1.0, 2.0]);
        let t = sma(&t, "close", &MaOptions::new(5)).unwrap();
        assert!(
            t.float_column("close_sma_5")
                .unwrap()
                .iter()
                .all(|v| v.is_nan())
        );
    }

    #[test]
    fn test_sma_short_input_errors_with_validate() {
        let t = close_table(vec![1.0, 2.0]);
        let err = sma(&t, "close", &MaOptions::new(5).validate(true)).unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::InsufficientData { need: 5, got: 2 }
        ));
    }
}
