//! Hull Moving Average (HMA) indicator.

use crate::frame::{Column, Table};

use super::sma::{MaOptions, output_name};
use super::{Result, check_period, check_rows, rolling};

/// Calculate the Hull Moving Average of a price column.
///
/// `HMA(p) = WMA(2·WMA(x, ⌊p/2⌋) - WMA(x, p), round(√p))` — a responsive
/// moving average with reduced lag. The two inner WMAs are subtracted
/// element-wise (NaN propagates), and the recency-weighted outer WMA
/// re-smooths the difference.
///
/// Appends a column named `<price_col>_hma_<period>`.
///
/// # Example
///
/// ```
/// use tickframe::frame::{Column, Table};
/// use tickframe::indicators::{MaOptions, hma};
///
/// let t = Table::from_columns([(
///     "close".to_string(),
///     Column::from((1..=9).map(f64::from).collect::<Vec<_>>()),
/// )])
/// .unwrap();
///
/// let t = hma(&t, "close", &MaOptions::new(4)).unwrap();
/// assert_eq!(t.float_column("close_hma_4").unwrap().len(), 9);
/// ```
pub fn hma(table: &Table, price_col: &str, opts: &MaOptions) -> Result<Table> {
    check_period(opts.period)?;
    let x = table.float_column(price_col)?;
    check_rows(opts.validate, opts.period, x.len())?;

    let half = (opts.period / 2).max(1);
    let sqrt_period = ((opts.period as f64).sqrt().round() as usize).max(1);

    let wma_half = rolling::weighted_mean(x, half, None)?;
    let wma_full = rolling::weighted_mean(x, opts.period, None)?;

    let diff: Vec<f64> = wma_half
        .iter()
        .zip(&wma_full)
        .map(|(&h, &f)| 2.0 * h - f)
        .collect();

    let values = rolling::weighted_mean(&diff, sqrt_period, None)?;
    let name = output_name(opts, price_col, "hma", opts.period);
    Ok(table.with_column(name, Column::from(values))?)
}
