//! Triple Exponential Moving Average (TEMA) indicator.

use crate::frame::{Column, Table};

use super::ema::EmaOptions;
use super::{Result, check_period, check_rows, rolling};

/// Calculate the Triple Exponential Moving Average of a price column.
///
/// `TEMA = 3·EMA₁ - 3·EMA₂ + EMA₃`, with EMA₂ and EMA₃ each smoothing the
/// numeric suffix of the previous stage under the same padding discipline as
/// DEMA. The first valid cell sits at index `3·(period - 1)`.
///
/// Appends a column named `<price_col>_tema_<period>`.
pub fn tema(table: &Table, price_col: &str, opts: &EmaOptions) -> Result<Table> {
    check_period(opts.period)?;
    let x = table.float_column(price_col)?;
    check_rows(opts.validate, 3 * opts.period - 2, x.len())?;

    let ema1 = rolling::ema(x, opts.period, opts.alpha)?;
    let ema2 = rolling::ema(&ema1, opts.period, opts.alpha)?;
    let ema3 = rolling::ema(&ema2, opts.period, opts.alpha)?;

    let values: Vec<f64> = ema1
        .iter()
        .zip(&ema2)
        .zip(&ema3)
        .map(|((&e1, &e2), &e3)| 3.0 * e1 - 3.0 * e2 + e3)
        .collect();

    let name = opts.output_name(price_col, "tema");
    Ok(table.with_column(name, Column::from(values))?)
}
