//! Double Exponential Moving Average (DEMA) indicator.

use crate::frame::{Column, Table};

use super::ema::EmaOptions;
use super::{Result, check_period, check_rows, rolling};

/// Calculate the Double Exponential Moving Average of a price column.
///
/// `DEMA = 2·EMA₁ - EMA₂`, where EMA₂ smooths the numeric suffix of EMA₁
/// (the length-preserving EMA kernel seeds past EMA₁'s NaN prefix, which is
/// exactly the "valid suffix, repositioned" construction). The first valid
/// cell sits at index `2·(period - 1)`.
///
/// Appends a column named `<price_col>_dema_<period>`.
///
/// # Example
///
/// ```
/// use tickframe::frame::{Column, Table};
/// use tickframe::indicators::{EmaOptions, dema};
///
/// let t = Table::from_columns([(
///     "close".to_string(),
///     Column::from(vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]),
/// )])
/// .unwrap();
///
/// let t = dema(&t, "close", &EmaOptions::new(3)).unwrap();
/// let out = t.float_column("close_dema_3").unwrap();
/// assert!(out[3].is_nan());
/// assert!(!out[4].is_nan());
/// ```
pub fn dema(table: &Table, price_col: &str, opts: &EmaOptions) -> Result<Table> {
    check_period(opts.period)?;
    let x = table.float_column(price_col)?;
    check_rows(opts.validate, 2 * opts.period - 1, x.len())?;

    let ema1 = rolling::ema(x, opts.period, opts.alpha)?;
    let ema2 = rolling::ema(&ema1, opts.period, opts.alpha)?;

    let values: Vec<f64> = ema1
        .iter()
        .zip(&ema2)
        .map(|(&e1, &e2)| 2.0 * e1 - e2)
        .collect();

    let name = opts.output_name(price_col, "dema");
    Ok(table.with_column(name, Column::from(values))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_table(values: Vec<f64>) -> Table {
        Table::from_columns([("close".to_string(), Column::from(values))]).unwrap()
    }

    #[test]
    fn test_dema_first_valid_index() {
        let t = close_table((10..=16).map(f64::from).collect());
        let t = dema(&t, "close", &EmaOptions::new(3)).unwrap();

        let out = t.float_column("close_dema_3").unwrap();
        assert_eq!(out.len(), 7);
        // First 2*(period-1) = 4 cells are NaN.
        for v in &out[..4] {
            assert!(v.is_nan());
        }
        assert!(!out[4].is_nan());
    }

    #[test]
    fn test_dema_nonnan_only_where_second_ema_is() {
        let t = close_table((1..=12).map(f64::from).collect());
        let t = dema(&t, "close", &EmaOptions::new(4)).unwrap();

        let x: Vec<f64> = (1..=12).map(f64::from).collect();
        let ema1 = rolling::ema(&x, 4, None).unwrap();
        let ema2 = rolling::ema(&ema1, 4, None).unwrap();
        let out = t.float_column("close_dema_4").unwrap();
        for (o, e2) in out.iter().zip(&ema2) {
            assert_eq!(o.is_nan(), e2.is_nan());
        }
    }

    #[test]
    fn test_dema_tracks_linear_trend_tighter_than_ema() {
        let t = close_table((0..30).map(f64::from).collect());
        let with_dema = dema(&t, "close", &EmaOptions::new(5)).unwrap();
        let with_ema = super::super::ema(&t, "close", &EmaOptions::new(5)).unwrap();

        let d = with_dema.float_column("close_dema_5").unwrap()[29];
        let e = with_ema.float_column("close_ema_5").unwrap()[29];
        assert!((29.0 - d).abs() < (29.0 - e).abs());
    }
}
