//! Kaufman Adaptive Moving Average (KAMA) indicator.

use crate::frame::{Column, Table};

use super::{IndicatorError, Result, check_period, check_rows};

/// Options for the Kaufman Adaptive Moving Average.
#[derive(Debug, Clone)]
pub struct KamaOptions {
    /// Efficiency-ratio window (required, must be > 0)
    pub period: usize,
    /// Fast smoothing-constant period (default 2)
    pub fast_sc: usize,
    /// Slow smoothing-constant period (default 30, must exceed `fast_sc`)
    pub slow_sc: usize,
    /// Override for the output column name
    pub column_name: Option<String>,
    /// When true, short inputs raise `InsufficientData` instead of
    /// propagating NaN
    pub validate: bool,
}

impl KamaOptions {
    /// Options with the conventional fast/slow constants of 2 and 30.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            fast_sc: 2,
            slow_sc: 30,
            column_name: None,
            validate: false,
        }
    }

    /// Override the fast and slow smoothing-constant periods.
    pub fn smoothing(mut self, fast_sc: usize, slow_sc: usize) -> Self {
        self.fast_sc = fast_sc;
        self.slow_sc = slow_sc;
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

/// Calculate the Kaufman Adaptive Moving Average of a price column.
///
/// KAMA adapts its smoothing speed to the Efficiency Ratio of the market:
/// `ER = |net change over period| / Σ |per-step changes|`, so a perfectly
/// directional market smooths at the fast constant and a perfectly choppy
/// one at the slow constant. The update is path-dependent:
///
/// ```text
/// SC      = (ER · (fast - slow) + slow)²      fast = 2/(fast_sc+1), slow = 2/(slow_sc+1)
/// KAMA[i] = KAMA[i-1] + SC · (x[i] - KAMA[i-1])
/// ```
///
/// Cells at `i < period` are NaN; the seed at `i == period` is the mean of
/// the first `period` prices. Appends `<price_col>_kama_<period>`.
///
/// # Errors
///
/// [`IndicatorError::InvalidPeriod`] when `period == 0`, `fast_sc == 0`, or
/// `fast_sc >= slow_sc`.
pub fn kama(table: &Table, price_col: &str, opts: &KamaOptions) -> Result<Table> {
    check_period(opts.period)?;
    if opts.fast_sc == 0 {
        return Err(IndicatorError::InvalidPeriod(
            "fast smoothing constant must be positive".to_string(),
        ));
    }
    if opts.fast_sc >= opts.slow_sc {
        return Err(IndicatorError::InvalidPeriod(format!(
            "fast smoothing constant {} must be less than slow {}",
            opts.fast_sc, opts.slow_sc
        )));
    }

    let x = table.float_column(price_col)?;
    check_rows(opts.validate, opts.period + 1, x.len())?;

    let fast = 2.0 / (opts.fast_sc as f64 + 1.0);
    let slow = 2.0 / (opts.slow_sc as f64 + 1.0);

    let mut values = vec![f64::NAN; x.len()];
    if x.len() > opts.period {
        values[opts.period] = x[..opts.period].iter().sum::<f64>() / opts.period as f64;

        for i in opts.period + 1..x.len() {
            let change = (x[i] - x[i - opts.period]).abs();
            let volatility: f64 = (1..=opts.period)
                .map(|k| (x[i - k + 1] - x[i - k]).abs())
                .sum();

            let er = if volatility == 0.0 {
                0.0
            } else {
                change / volatility
            };
            let sc = (er * (fast - slow) + slow).powi(2);
            values[i] = values[i - 1] + sc * (x[i] - values[i - 1]);
        }
    }

    let name = opts
        .column_name
        .clone()
        .unwrap_or_else(|| format!("{price_col}_kama_{}", opts.period));
    Ok(table.with_column(name, Column::from(values))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn close_table(values: Vec<f64>) -> Table {
        Table::from_columns([("close".to_string(), Column::from(values))]).unwrap()
    }

    #[test]
    fn test_kama_warmup_and_seed() {
        let t = close_table((1..=20).map(f64::from).collect());
        let t = kama(&t, "close", &KamaOptions::new(10)).unwrap();

        let out = t.float_column("close_kama_10").unwrap();
        for v in &out[..10] {
            assert!(v.is_nan());
        }
        // Seed is the mean of the first 10 prices: (1 + ... + 10) / 10.
        assert_relative_eq!(out[10], 5.5);
    }

    #[test]
    fn test_kama_trending_input_uses_fast_constant() {
        // Strictly monotone prices: |net change| equals the sum of step
        // sizes, so ER = 1 and SC = fast².
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let t = close_table(prices.clone());
        let t = kama(&t, "close", &KamaOptions::new(5).smoothing(2, 30)).unwrap();

        let out = t.float_column("close_kama_5").unwrap();
        let fast_sq = (2.0_f64 / 3.0).powi(2);
        for i in 6..15 {
            let expected = out[i - 1] + fast_sq * (prices[i] - out[i - 1]);
            assert_relative_eq!(out[i], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_kama_oscillating_input_uses_slow_constant() {
        // Zero net change over an even window: ER = 0, SC = slow².
        let prices: Vec<f64> = (0..16)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let t = close_table(prices.clone());
        let t = kama(&t, "close", &KamaOptions::new(4).smoothing(2, 30)).unwrap();

        let out = t.float_column("close_kama_4").unwrap();
        let slow_sq = (2.0_f64 / 31.0).powi(2);
        for i in 5..16 {
            let expected = out[i - 1] + slow_sq * (prices[i] - out[i - 1]);
            assert_relative_eq!(out[i], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_kama_flat_prices_stay_put() {
        let t = close_table(vec![42.0; 12]);
        let t = kama(&t, "close", &KamaOptions::new(4)).unwrap();
        let out = t.float_column("close_kama_4").unwrap();
        assert_relative_eq!(out[11], 42.0);
    }

    #[test]
    fn test_kama_rejects_fast_not_less_than_slow() {
        let t = close_table(vec![1.0; 10]);
        let err = kama(&t, "close", &KamaOptions::new(4).smoothing(30, 30)).unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidPeriod(_)));
    }
}
