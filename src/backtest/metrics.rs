//! Performance-metric extraction from backtest columns.

use serde::{Deserialize, Serialize};

use crate::frame::Table;

use super::error::Result;

/// Bars per calendar year used for annualization (US equity daily bars).
pub(crate) const BARS_PER_YEAR: f64 = 252.0;

/// Performance summary of one backtest run.
///
/// The ratio metrics follow a uniform degenerate-denominator rule: whenever
/// the denominator is not finite or not positive, the ratio is `0.0` rather
/// than an error or infinity. That keeps sweep result tables NaN-free and
/// JSON-serializable.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Cumulative return over the whole walk, as a fraction
    pub total_return: f64,

    /// Total return annualized over 252 bars per year
    pub annualized_return: f64,

    /// Total return divided by per-bar volatility
    pub sharpe_ratio: f64,

    /// Total return divided by downside deviation
    pub sortino_ratio: f64,

    /// Total return divided by maximum drawdown
    pub calmar_ratio: f64,

    /// Deepest peak-to-trough loss as a positive fraction
    pub max_drawdown: f64,

    /// Winning trades / closed trades (0.0 with no trades)
    pub win_rate: f64,

    /// Number of closed trades
    pub trade_count: i64,

    /// Sample standard deviation of per-bar portfolio returns
    pub volatility: f64,
}

impl PerformanceMetrics {
    /// Metric value by column name, as used in sweep result tables.
    ///
    /// Returns `None` for unknown names. `trade_count` is reported as a
    /// float here for uniform ranking; the sweep table stores it as an
    /// integer column.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "total_return" => Some(self.total_return),
            "annualized_return" => Some(self.annualized_return),
            "sharpe_ratio" => Some(self.sharpe_ratio),
            "sortino_ratio" => Some(self.sortino_ratio),
            "calmar_ratio" => Some(self.calmar_ratio),
            "max_drawdown" => Some(self.max_drawdown),
            "win_rate" => Some(self.win_rate),
            "trade_count" => Some(self.trade_count as f64),
            "volatility" => Some(self.volatility),
            _ => None,
        }
    }
}

/// Extract performance metrics from a backtested table.
///
/// Reads the final row of the running columns appended by
/// [`backtest`](super::backtest) and derives the volatility-based ratios
/// from the `portfolio_value` series.
pub fn compute_metrics(table: &Table) -> Result<PerformanceMetrics> {
    let values = table.float_column("portfolio_value")?;
    let total_return = last_or_zero(table.float_column("total_return")?);
    let max_drawdown = last_or_zero(table.float_column("max_drawdown")?);
    let win_rate = last_or_zero(table.float_column("win_rate")?);
    let trade_count = table.int_column("trade_count")?.last().copied().unwrap_or(0);

    let returns = per_bar_returns(values);
    let volatility = std_dev(&returns);
    let downside = downside_deviation(&returns);

    let annualized_return = if values.is_empty() || total_return <= -1.0 {
        0.0
    } else {
        (1.0 + total_return).powf(BARS_PER_YEAR / values.len() as f64) - 1.0
    };

    Ok(PerformanceMetrics {
        total_return,
        annualized_return,
        sharpe_ratio: ratio_or_zero(total_return, volatility),
        sortino_ratio: ratio_or_zero(total_return, downside),
        calmar_ratio: ratio_or_zero(total_return, max_drawdown),
        max_drawdown,
        win_rate,
        trade_count,
        volatility,
    })
}

fn last_or_zero(values: &[f64]) -> f64 {
    values.last().copied().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Per-bar fractional changes of the portfolio value, skipping non-finite
/// pairs.
fn per_bar_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter_map(|w| {
            let (a, b) = (w[0], w[1]);
            (a.is_finite() && b.is_finite() && a != 0.0).then(|| b / a - 1.0)
        })
        .collect()
}

/// Sample standard deviation; 0.0 with fewer than two observations.
fn std_dev(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance =
        returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (returns.len() - 1) as f64;
    variance.sqrt()
}

/// Downside deviation: like [`std_dev`] but only negative returns count.
fn downside_deviation(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let sum: f64 = returns
        .iter()
        .map(|&r| if r < 0.0 { r * r } else { 0.0 })
        .sum();
    (sum / (returns.len() - 1) as f64).sqrt()
}

/// `numerator / denominator`, or 0.0 when the denominator is degenerate.
fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator.is_finite() && denominator > 0.0 && numerator.is_finite() {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::{BacktestConfig, backtest};
    use crate::frame::Column;
    use crate::strategy::Strategy;

    fn backtested(prices: Vec<f64>, signals: Vec<i64>) -> Table {
        let t = Table::from_columns([
            ("close".to_string(), Column::from(prices)),
            ("signal".to_string(), Column::from(signals)),
        ])
        .unwrap();
        backtest(
            &t,
            &Strategy::sma_crossover(3, 8),
            &BacktestConfig::frictionless(),
        )
        .unwrap()
    }

    #[test]
    fn test_flat_walk_yields_zero_metrics() {
        let t = backtested(vec![100.0; 20], vec![0; 20]);
        let m = compute_metrics(&t).unwrap();

        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.volatility, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.sortino_ratio, 0.0);
        assert_eq!(m.calmar_ratio, 0.0);
        assert_eq!(m.trade_count, 0);
    }

    #[test]
    fn test_profitable_walk_has_positive_sharpe() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let mut signals = vec![0_i64; 30];
        signals[1] = 1;
        for s in signals.iter_mut().skip(2).take(26) {
            *s = 1;
        }
        // exit near the end
        signals[28] = 0;

        let t = backtested(prices, signals);
        let m = compute_metrics(&t).unwrap();

        assert!(m.total_return > 0.0);
        assert!(m.volatility > 0.0);
        assert!(m.sharpe_ratio > 0.0);
        assert!(m.annualized_return > m.total_return); // 30 bars << a year
        assert_eq!(m.trade_count, 1);
        assert_eq!(m.win_rate, 1.0);
    }

    #[test]
    fn test_sortino_zero_when_no_down_bars() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let mut signals = vec![1_i64; 20];
        signals[0] = 0;

        let t = backtested(prices, signals);
        let m = compute_metrics(&t).unwrap();
        // No losing bars → downside deviation 0 → ratio collapses to 0.
        assert_eq!(m.sortino_ratio, 0.0);
    }

    #[test]
    fn test_metric_lookup_by_name() {
        let t = backtested(vec![100.0; 10], vec![0; 10]);
        let m = compute_metrics(&t).unwrap();
        assert_eq!(m.get("sharpe_ratio"), Some(0.0));
        assert_eq!(m.get("trade_count"), Some(0.0));
        assert_eq!(m.get("nonsense"), None);
    }
}
