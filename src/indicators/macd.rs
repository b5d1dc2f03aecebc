//! Moving Average Convergence Divergence (MACD) indicator.

use crate::frame::{Column, TMP_PREFIX, Table};

use super::{IndicatorError, Result, check_period, check_rows, rolling};

/// Options for the MACD indicator.
#[derive(Debug, Clone)]
pub struct MacdOptions {
    /// Fast EMA period (default 12)
    pub fast_period: usize,
    /// Slow EMA period (default 26, must exceed `fast_period`)
    pub slow_period: usize,
    /// Signal-line EMA period (default 9)
    pub signal_period: usize,
    /// When true, short inputs raise `InsufficientData` instead of
    /// propagating NaN
    pub validate: bool,
}

impl Default for MacdOptions {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
            validate: false,
        }
    }
}

impl MacdOptions {
    /// Options with explicit fast/slow/signal periods.
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
            validate: false,
        }
    }

    /// Toggle strict row-count validation.
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

/// Calculate Moving Average Convergence Divergence for a price column.
///
/// Appends three columns:
///
/// - `<price>_macd_<fast>_<slow>` — fast EMA minus slow EMA,
/// - `<price>_signal_<signal>` — a length-preserving EMA of the MACD line,
///   seeded with the SMA of the first `signal` numeric MACD cells and padded
///   with NaN so the column always has exactly N rows,
/// - `<price>_histogram_<fast>_<slow>_<signal>` — MACD minus signal.
///
/// The intermediate EMA columns are staged under the reserved `__tmp_`
/// prefix and stripped before the table is returned.
///
/// # Errors
///
/// [`IndicatorError::InvalidPeriod`] when any period is zero or
/// `fast_period >= slow_period`.
///
/// # Example
///
/// ```
/// use tickframe::frame::{Column, Table};
/// use tickframe::indicators::{MacdOptions, macd};
///
/// let t = Table::from_columns([(
///     "close".to_string(),
///     Column::from((1..=50).map(f64::from).collect::<Vec<_>>()),
/// )])
/// .unwrap();
///
/// let t = macd(&t, "close", &MacdOptions::default()).unwrap();
/// assert!(t.contains("close_macd_12_26"));
/// assert!(t.contains("close_signal_9"));
/// assert!(t.contains("close_histogram_12_26_9"));
/// ```
pub fn macd(table: &Table, price_col: &str, opts: &MacdOptions) -> Result<Table> {
    check_period(opts.fast_period)?;
    check_period(opts.slow_period)?;
    check_period(opts.signal_period)?;
    if opts.fast_period >= opts.slow_period {
        return Err(IndicatorError::InvalidPeriod(format!(
            "fast period {} must be less than slow period {}",
            opts.fast_period, opts.slow_period
        )));
    }

    let x = table.float_column(price_col)?;
    check_rows(
        opts.validate,
        opts.slow_period + opts.signal_period - 1,
        x.len(),
    )?;

    // Stage the two EMAs as temporary columns on a working table.
    let fast_tmp = format!("{TMP_PREFIX}ema_{}", opts.fast_period);
    let slow_tmp = format!("{TMP_PREFIX}ema_{}", opts.slow_period);
    let work = table
        .with_column(
            fast_tmp.clone(),
            Column::from(rolling::ema(x, opts.fast_period, None)?),
        )?
        .with_column(
            slow_tmp.clone(),
            Column::from(rolling::ema(x, opts.slow_period, None)?),
        )?;

    let fast_ema = work.float_column(&fast_tmp)?;
    let slow_ema = work.float_column(&slow_tmp)?;
    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema)
        .map(|(&f, &s)| f - s)
        .collect();

    // The signal line seeds past the MACD line's NaN prefix, so it keeps
    // the full row count instead of shrinking by slow_period - 1.
    let signal_line = rolling::ema(&macd_line, opts.signal_period, None)?;
    let histogram: Vec<f64> = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(&m, &s)| m - s)
        .collect();

    let macd_name = format!(
        "{price_col}_macd_{}_{}",
        opts.fast_period, opts.slow_period
    );
    let signal_name = format!("{price_col}_signal_{}", opts.signal_period);
    let histogram_name = format!(
        "{price_col}_histogram_{}_{}_{}",
        opts.fast_period, opts.slow_period, opts.signal_period
    );

    let out = work
        .with_column(macd_name, Column::from(macd_line))?
        .with_column(signal_name, Column::from(signal_line))?
        .with_column(histogram_name, Column::from(histogram))?
        .drop_temporaries();
    debug_assert!(!out.has_temporaries());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_table(values: Vec<f64>) -> Table {
        Table::from_columns([("close".to_string(), Column::from(values))]).unwrap()
    }

    #[test]
    fn test_macd_column_lengths_and_first_numeric() {
        let t = close_table((1..=60).map(f64::from).collect());
        let t = macd(&t, "close", &MacdOptions::default()).unwrap();

        let line = t.float_column("close_macd_12_26").unwrap();
        let signal = t.float_column("close_signal_9").unwrap();
        assert_eq!(line.len(), 60);
        assert_eq!(signal.len(), 60);

        // MACD numeric from slow-1 = 25; signal from (slow-1)+(signal-1) = 33.
        assert!(line[24].is_nan());
        assert!(!line[25].is_nan());
        assert!(signal[32].is_nan());
        assert!(!signal[33].is_nan());
    }

    #[test]
    fn test_macd_histogram_is_line_minus_signal() {
        let t = close_table((0..80).map(|i| 50.0 + (i as f64 * 0.7).sin() * 5.0).collect());
        let t = macd(&t, "close", &MacdOptions::default()).unwrap();

        let line = t.float_column("close_macd_12_26").unwrap();
        let signal = t.float_column("close_signal_9").unwrap();
        let hist = t.float_column("close_histogram_12_26_9").unwrap();
        for i in 0..80 {
            if !line[i].is_nan() && !signal[i].is_nan() {
                assert!((hist[i] - (line[i] - signal[i])).abs() < 1e-12);
            } else {
                assert!(hist[i].is_nan());
            }
        }
    }

    #[test]
    fn test_macd_no_temporary_leakage() {
        let t = close_table((1..=50).map(f64::from).collect());
        let t = macd(&t, "close", &MacdOptions::default()).unwrap();
        assert!(!t.has_temporaries());
        assert_eq!(t.num_columns(), 4); // close + three MACD columns
    }

    #[test]
    fn test_macd_signal_all_nan_when_seed_does_not_fit() {
        // N = 30 with (12, 26, 9): signal would seed at 33 — out of range.
        let t = close_table((10..40).map(f64::from).collect());
        let t = macd(&t, "close", &MacdOptions::default()).unwrap();

        let signal = t.float_column("close_signal_9").unwrap();
        assert_eq!(signal.len(), 30);
        assert!(signal.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_macd_rejects_fast_not_less_than_slow() {
        let t = close_table((1..=50).map(f64::from).collect());
        let err = macd(&t, "close", &MacdOptions::new(26, 12, 9)).unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidPeriod(_)));
    }

    #[test]
    fn test_macd_validate_short_input() {
        let t = close_table(vec![1.0, 2.0, 3.0]);
        let err = macd(&t, "close", &MacdOptions::default().validate(true)).unwrap_err();
        assert!(matches!(err, IndicatorError::InsufficientData { .. }));
    }
}
