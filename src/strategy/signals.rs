//! Signal generation: apply a strategy's indicators and emit the signal
//! triple.

use crate::frame::{Column, Table};
use crate::indicators::{
    EmaOptions, MaOptions, MacdOptions, RsiOptions, detect_macd_crossovers, ema, macd, rsi, sma,
};

use super::composite::composite_signals;
use super::{Result, SignalError, Strategy};

/// The three columns every strategy application emits.
pub(crate) struct SignalTriple {
    pub(crate) signal: Vec<i64>,
    pub(crate) strength: Vec<f64>,
    pub(crate) reason: Vec<String>,
}

impl SignalTriple {
    pub(crate) fn hold(rows: usize) -> Self {
        Self {
            signal: vec![0; rows],
            strength: vec![0.0; rows],
            reason: vec!["no_signal".to_string(); rows],
        }
    }

    pub(crate) fn set(&mut self, row: usize, signal: i64, strength: f64, reason: String) {
        self.signal[row] = signal;
        self.strength[row] = strength;
        self.reason[row] = reason;
    }

    /// Append the triple to a table as `signal` / `signal_strength` /
    /// `signal_reason`.
    pub(crate) fn append_to(self, table: &Table) -> Result<Table> {
        Ok(table
            .with_column("signal", Column::from(self.signal))?
            .with_column("signal_strength", Column::from(self.strength))?
            .with_column("signal_reason", Column::from(self.reason))?)
    }
}

/// Generate buy/sell/hold signals for a strategy.
///
/// Validates the input (non-empty, price column present and numeric, enough
/// rows for the strategy's minimum window), appends the indicator columns
/// the strategy needs, then emits the signal triple: `signal` (-1/0/1),
/// `signal_strength` (`[0, 1]`, NaN-free) and `signal_reason`.
///
/// Composite strategies run every child against the *input* table
/// independently; child indicator columns do not appear in the returned
/// table, only the fused triple does.
///
/// # Errors
///
/// [`SignalError::InsufficientData`] when the table is empty or shorter than
/// the strategy's warmup window, [`SignalError::UnsupportedStrategy`] for
/// the reserved Bollinger variant, [`SignalError::ChildStrategyFailed`] when
/// a composite child fails, plus indicator/frame errors from the indicator
/// application.
///
/// # Example
///
/// ```
/// use tickframe::frame::{Column, Table};
/// use tickframe::strategy::{Strategy, generate_signals};
///
/// let t = Table::from_columns([(
///     "close".to_string(),
///     Column::from((1..=40).map(f64::from).collect::<Vec<_>>()),
/// )])
/// .unwrap();
///
/// let t = generate_signals(&t, &Strategy::rsi_threshold(14, 30.0, 70.0)).unwrap();
/// let signals = t.int_column("signal").unwrap();
/// assert!(signals.iter().all(|s| (-1..=1).contains(s)));
/// ```
pub fn generate_signals(table: &Table, strategy: &Strategy) -> Result<Table> {
    let rows = table.num_rows();
    let need = strategy.min_rows();
    if rows < need {
        return Err(SignalError::InsufficientData {
            kind: strategy.kind().to_string(),
            need,
            got: rows,
        });
    }

    match strategy {
        Strategy::SmaCross {
            fast,
            slow,
            price_col,
        } => ma_crossover_signals(table, price_col, *fast, *slow, MaKind::Sma),
        Strategy::EmaCross {
            fast,
            slow,
            price_col,
        } => ma_crossover_signals(table, price_col, *fast, *slow, MaKind::Ema),
        Strategy::MacdCross {
            fast,
            slow,
            signal,
            price_col,
        } => macd_crossover_signals(table, price_col, *fast, *slow, *signal),
        Strategy::RsiThreshold {
            period,
            oversold,
            overbought,
            price_col,
        } => rsi_threshold_signals(table, price_col, *period, *oversold, *overbought),
        Strategy::BollingerBands { .. } => Err(SignalError::UnsupportedStrategy {
            kind: strategy.kind().to_string(),
        }),
        Strategy::Composite {
            children,
            logic,
            weights,
            threshold,
        } => composite_signals(table, children, *logic, weights.as_deref(), *threshold),
    }
}

#[derive(Clone, Copy)]
enum MaKind {
    Sma,
    Ema,
}

impl MaKind {
    fn tag(self) -> &'static str {
        match self {
            MaKind::Sma => "sma",
            MaKind::Ema => "ema",
        }
    }
}

/// Fast/slow moving-average crossover signals (shared by SMA and EMA).
fn ma_crossover_signals(
    table: &Table,
    price_col: &str,
    fast: usize,
    slow: usize,
    kind: MaKind,
) -> Result<Table> {
    if fast >= slow {
        return Err(SignalError::Indicator(
            crate::indicators::IndicatorError::InvalidPeriod(format!(
                "fast period {fast} must be less than slow period {slow}"
            )),
        ));
    }
    // Surface a missing/mistyped price column before running indicators.
    table.float_column(price_col)?;

    let with_mas = match kind {
        MaKind::Sma => {
            let t = sma(table, price_col, &MaOptions::new(fast))?;
            sma(&t, price_col, &MaOptions::new(slow))?
        }
        MaKind::Ema => {
            let t = ema(table, price_col, &EmaOptions::new(fast))?;
            ema(&t, price_col, &EmaOptions::new(slow))?
        }
    };

    let tag = kind.tag();
    let fast_vals = required_column(&with_mas, &format!("{price_col}_{tag}_{fast}"))?;
    let slow_vals = required_column(&with_mas, &format!("{price_col}_{tag}_{slow}"))?;

    let rows = with_mas.num_rows();
    let mut triple = SignalTriple::hold(rows);
    for i in 1..rows {
        let (pf, ps) = (fast_vals[i - 1], slow_vals[i - 1]);
        let (f, s) = (fast_vals[i], slow_vals[i]);

        // NaN comparisons are false, so warmup rows never fire.
        let bullish = pf <= ps && f > s;
        let bearish = pf >= ps && f < s;
        if bullish || bearish {
            let strength = if s == 0.0 || s.is_nan() || f.is_nan() {
                0.0
            } else {
                ((f - s).abs() / s.abs()).min(1.0)
            };
            let direction = if bullish { "bullish" } else { "bearish" };
            triple.set(
                i,
                if bullish { 1 } else { -1 },
                strength,
                format!("{tag}_{direction}_crossover_{fast}_{slow}"),
            );
        }
    }

    triple.append_to(&with_mas)
}

/// MACD signal-line crossover signals.
fn macd_crossover_signals(
    table: &Table,
    price_col: &str,
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<Table> {
    table.float_column(price_col)?;

    let with_macd = macd(table, price_col, &MacdOptions::new(fast, slow, signal_period))?;
    let macd_name = format!("{price_col}_macd_{fast}_{slow}");
    let signal_name = format!("{price_col}_signal_{signal_period}");
    let with_cross = detect_macd_crossovers(&with_macd, &macd_name, &signal_name, None)?;

    let macd_vals = required_column(&with_cross, &macd_name)?;
    let signal_vals = required_column(&with_cross, &signal_name)?;
    let crossings = with_cross
        .int_column("macd_crossover")
        .map_err(|_| SignalError::MissingIndicatorColumn {
            name: "macd_crossover".to_string(),
        })?;

    let rows = with_cross.num_rows();
    let mut triple = SignalTriple::hold(rows);
    for i in 0..rows {
        if crossings[i] == 0 {
            continue;
        }
        let strength = if signal_vals[i] == 0.0 || signal_vals[i].is_nan() || macd_vals[i].is_nan()
        {
            0.0
        } else {
            ((macd_vals[i] - signal_vals[i]).abs() / signal_vals[i].abs()).min(1.0)
        };
        let direction = if crossings[i] > 0 { "bullish" } else { "bearish" };
        triple.set(
            i,
            crossings[i],
            strength,
            format!("macd_{direction}_crossover_{fast}_{slow}_{signal_period}"),
        );
    }

    triple.append_to(&with_cross)
}

/// RSI threshold-breach signals.
fn rsi_threshold_signals(
    table: &Table,
    price_col: &str,
    period: usize,
    oversold: f64,
    overbought: f64,
) -> Result<Table> {
    table.float_column(price_col)?;

    let with_rsi = rsi(table, price_col, &RsiOptions::new(period))?;
    let rsi_vals = required_column(&with_rsi, &format!("{price_col}_rsi_{period}"))?;

    let rows = with_rsi.num_rows();
    let mut triple = SignalTriple::hold(rows);
    for (i, &value) in rsi_vals.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        if value <= oversold {
            let strength = if oversold > 0.0 {
                ((oversold - value) / oversold).clamp(0.0, 1.0)
            } else {
                0.0
            };
            triple.set(i, 1, strength, format!("rsi_oversold_{oversold}"));
        } else if value >= overbought {
            let strength = if overbought < 100.0 {
                ((value - overbought) / (100.0 - overbought)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            triple.set(i, -1, strength, format!("rsi_overbought_{overbought}"));
        }
    }

    triple.append_to(&with_rsi)
}

/// Look up an indicator column the signal step depends on.
fn required_column<'a>(table: &'a Table, name: &str) -> Result<&'a [f64]> {
    table
        .column(name)
        .and_then(Column::as_float)
        .ok_or_else(|| SignalError::MissingIndicatorColumn {
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_table(values: Vec<f64>) -> Table {
        Table::from_columns([("close".to_string(), Column::from(values))]).unwrap()
    }

    /// A series that dips then rallies, forcing a bullish SMA cross.
    fn v_shape(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                if i < n / 2 {
                    100.0 - x
                } else {
                    100.0 - (n / 2) as f64 + (x - (n / 2) as f64) * 2.0
                }
            })
            .collect()
    }

    #[test]
    fn test_sma_crossover_emits_triple() {
        let t = close_table(v_shape(30));
        let t = generate_signals(&t, &Strategy::sma_crossover(3, 8)).unwrap();

        assert_eq!(t.int_column("signal").unwrap().len(), 30);
        assert_eq!(t.float_column("signal_strength").unwrap().len(), 30);
        assert_eq!(t.str_column("signal_reason").unwrap().len(), 30);
    }

    #[test]
    fn test_sma_crossover_fires_on_v_shape() {
        let t = close_table(v_shape(30));
        let t = generate_signals(&t, &Strategy::sma_crossover(3, 8)).unwrap();

        let signals = t.int_column("signal").unwrap();
        let reasons = t.str_column("signal_reason").unwrap();
        let bullish = signals.iter().position(|&s| s == 1);
        assert!(bullish.is_some(), "expected a bullish cross on the rally");
        assert_eq!(reasons[bullish.unwrap()], "sma_bullish_crossover_3_8");
    }

    #[test]
    fn test_strength_is_bounded_and_nan_free() {
        let t = close_table(v_shape(40));
        let t = generate_signals(&t, &Strategy::ema_crossover(4, 9)).unwrap();

        for &s in t.float_column("signal_strength").unwrap() {
            assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_row_zero_is_always_hold() {
        let t = close_table(v_shape(30));
        let t = generate_signals(&t, &Strategy::sma_crossover(3, 8)).unwrap();
        assert_eq!(t.int_column("signal").unwrap()[0], 0);
        assert_eq!(t.str_column("signal_reason").unwrap()[0], "no_signal");
    }

    #[test]
    fn test_macd_strategy_maps_crossover_column() {
        let prices: Vec<f64> = (0..120)
            .map(|i| 100.0 + (i as f64 / 6.0).sin() * 10.0)
            .collect();
        let t = close_table(prices);
        let t = generate_signals(&t, &Strategy::macd_crossover(12, 26, 9)).unwrap();

        let crossings = t.int_column("macd_crossover").unwrap();
        let signals = t.int_column("signal").unwrap();
        for (c, s) in crossings.iter().zip(signals) {
            assert_eq!(c, s);
        }
    }

    #[test]
    fn test_rsi_threshold_signs() {
        // Down leg then up leg long enough to breach both thresholds.
        let mut prices: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        prices.extend((0..30).map(|i| 70.0 + i as f64));
        let t = close_table(prices);
        let t = generate_signals(&t, &Strategy::rsi_threshold(14, 30.0, 70.0)).unwrap();

        let rsi_vals = t.float_column("close_rsi_14").unwrap();
        let signals = t.int_column("signal").unwrap();
        for (i, &s) in signals.iter().enumerate() {
            let v = rsi_vals[i];
            if v.is_nan() {
                assert_eq!(s, 0);
            } else if v <= 30.0 {
                assert_eq!(s, 1, "row {i}: rsi {v}");
            } else if v >= 70.0 {
                assert_eq!(s, -1, "row {i}: rsi {v}");
            } else {
                assert_eq!(s, 0, "row {i}: rsi {v}");
            }
        }
    }

    #[test]
    fn test_insufficient_rows() {
        let t = close_table(vec![1.0, 2.0, 3.0]);
        let err = generate_signals(&t, &Strategy::sma_crossover(3, 8)).unwrap_err();
        assert!(matches!(err, SignalError::InsufficientData { need: 9, .. }));
    }

    #[test]
    fn test_empty_table_is_insufficient() {
        let t = Table::new();
        let err = generate_signals(&t, &Strategy::sma_crossover(3, 8)).unwrap_err();
        assert!(matches!(err, SignalError::InsufficientData { got: 0, .. }));
    }

    #[test]
    fn test_bollinger_is_unsupported() {
        let t = close_table(v_shape(30));
        let strategy = Strategy::BollingerBands {
            period: 20,
            std_dev: 2.0,
            price_col: "close".to_string(),
        };
        let err = generate_signals(&t, &strategy).unwrap_err();
        assert!(matches!(err, SignalError::UnsupportedStrategy { .. }));
    }

    #[test]
    fn test_fast_must_be_below_slow() {
        let t = close_table(v_shape(30));
        let err = generate_signals(&t, &Strategy::sma_crossover(8, 8)).unwrap_err();
        assert!(matches!(err, SignalError::Indicator(_)));
    }
}
