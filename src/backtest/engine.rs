//! The sequential portfolio walk.

use crate::frame::{Column, Table};
use crate::strategy::{Strategy, generate_signals};

use super::config::BacktestConfig;
use super::error::Result;

/// Run a backtest of a strategy over a table.
///
/// When the table already carries a `signal` column the walk consumes it
/// directly; otherwise [`generate_signals`] is run first. The returned table
/// is the signaled table plus seven running columns:
///
/// | Column            | Type  | Meaning                                         |
/// |-------------------|-------|-------------------------------------------------|
/// | `portfolio_value` | float | cash + units · price at every row               |
/// | `position`        | int   | units held after the row's trades               |
/// | `trade_return`    | float | return of a trade closed at this row, else NaN  |
/// | `total_return`    | float | running (value / initial_capital) - 1           |
/// | `max_drawdown`    | float | running max of (peak - value) / peak            |
/// | `win_rate`        | float | winning / closed trades so far (0 before any)   |
/// | `trade_count`     | int   | closed trades so far                            |
///
/// Trade rules: a signal transition to `1` opens a long for
/// `floor(cash / (price · (1 + slippage)))` units with commission deducted
/// as `units · price · commission`; a transition from `1` to `0` or `-1`
/// closes the position to cash, recording the round-trip return net of
/// slippage on both fills and two commissions. `-1` never opens a short.
/// Rows with a non-finite price carry the previous portfolio value forward
/// and never trade.
pub fn backtest(table: &Table, strategy: &Strategy, config: &BacktestConfig) -> Result<Table> {
    config.validate()?;

    let signaled = if table.contains("signal") {
        table.clone()
    } else {
        generate_signals(table, strategy)?
    };

    let prices = signaled.float_column(&config.price_col)?;
    let signals = signaled.int_column("signal")?;
    let rows = prices.len();

    let mut portfolio_value = Vec::with_capacity(rows);
    let mut position = Vec::with_capacity(rows);
    let mut trade_return = Vec::with_capacity(rows);
    let mut total_return = Vec::with_capacity(rows);
    let mut max_drawdown = Vec::with_capacity(rows);
    let mut win_rate = Vec::with_capacity(rows);
    let mut trade_count = Vec::with_capacity(rows);

    let mut cash = config.initial_capital;
    let mut units: i64 = 0;
    let mut entry_price = f64::NAN;
    let mut prev_signal: i64 = 0;

    let mut peak = config.initial_capital;
    let mut worst_drawdown = 0.0_f64;
    let mut closed: i64 = 0;
    let mut wins: i64 = 0;
    let mut last_value = config.initial_capital;

    for i in 0..rows {
        let price = prices[i];
        let signal = signals[i];
        let mut closed_return = f64::NAN;

        if price.is_finite() {
            if units == 0 && signal == 1 && prev_signal != 1 {
                // Transition 0→1 or -1→1: open a long with whole units.
                let fill = price * (1.0 + config.slippage);
                let size = (cash / fill).floor();
                if size > 0.0 {
                    cash -= size * fill + size * price * config.commission;
                    units = size as i64;
                    entry_price = price;
                }
            } else if units > 0 && prev_signal == 1 && signal != 1 {
                // Transition 1→0 or 1→-1: close to cash.
                let fill = price * (1.0 - config.slippage);
                let size = units as f64;
                cash += size * fill - size * price * config.commission;

                let entry_fill = entry_price * (1.0 + config.slippage);
                closed_return = (fill - entry_fill) / entry_fill - 2.0 * config.commission;
                closed += 1;
                if closed_return > 0.0 {
                    wins += 1;
                }
                units = 0;
                entry_price = f64::NAN;
            }
            last_value = cash + units as f64 * price;
        }

        if last_value > peak {
            peak = last_value;
        }
        let drawdown = (peak - last_value) / peak;
        if drawdown > worst_drawdown {
            worst_drawdown = drawdown;
        }

        portfolio_value.push(last_value);
        position.push(units);
        trade_return.push(closed_return);
        total_return.push(last_value / config.initial_capital - 1.0);
        max_drawdown.push(worst_drawdown);
        win_rate.push(if closed > 0 {
            wins as f64 / closed as f64
        } else {
            0.0
        });
        trade_count.push(closed);

        prev_signal = signal;
    }

    Ok(signaled
        .with_column("portfolio_value", Column::from(portfolio_value))?
        .with_column("position", Column::from(position))?
        .with_column("trade_return", Column::from(trade_return))?
        .with_column("total_return", Column::from(total_return))?
        .with_column("max_drawdown", Column::from(max_drawdown))?
        .with_column("win_rate", Column::from(win_rate))?
        .with_column("trade_count", Column::from(trade_count))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a table with a prescribed signal column so the walk can be
    /// tested without a strategy.
    fn signaled_table(prices: Vec<f64>, signals: Vec<i64>) -> Table {
        Table::from_columns([
            ("close".to_string(), Column::from(prices)),
            ("signal".to_string(), Column::from(signals)),
        ])
        .unwrap()
    }

    // The walk ignores the strategy when a signal column is present; any
    // descriptor satisfies the argument.
    fn any_strategy() -> Strategy {
        Strategy::sma_crossover(3, 8)
    }

    #[test]
    fn test_flat_signals_hold_cash() {
        let t = signaled_table(vec![100.0, 101.0, 102.0], vec![0, 0, 0]);
        let result = backtest(&t, &any_strategy(), &BacktestConfig::frictionless()).unwrap();

        let values = result.float_column("portfolio_value").unwrap();
        assert!(values.iter().all(|&v| v == 10_000.0));
        assert_eq!(result.int_column("trade_count").unwrap()[2], 0);
    }

    #[test]
    fn test_round_trip_trade() {
        // Buy at 100, close at 110: 100 units, +10% before costs.
        let t = signaled_table(
            vec![100.0, 100.0, 110.0, 110.0],
            vec![0, 1, 0, 0],
        );
        let result = backtest(&t, &any_strategy(), &BacktestConfig::frictionless()).unwrap();

        let values = result.float_column("portfolio_value").unwrap();
        let positions = result.int_column("position").unwrap();
        assert_eq!(positions[1], 100);
        assert_eq!(positions[2], 0);
        assert_eq!(values[3], 11_000.0);

        let trade_returns = result.float_column("trade_return").unwrap();
        assert!(trade_returns[1].is_nan());
        assert!((trade_returns[2] - 0.10).abs() < 1e-12);

        assert_eq!(result.int_column("trade_count").unwrap()[3], 1);
        assert_eq!(result.float_column("win_rate").unwrap()[3], 1.0);
    }

    #[test]
    fn test_commission_and_slippage_reduce_proceeds() {
        let config = BacktestConfig::builder()
            .commission(0.001)
            .slippage(0.0005)
            .build()
            .unwrap();
        let t = signaled_table(vec![100.0, 100.0, 110.0], vec![0, 1, 0]);
        let result = backtest(&t, &any_strategy(), &config).unwrap();

        let gross = 11_000.0;
        let net = result.float_column("portfolio_value").unwrap()[2];
        assert!(net < gross, "costs must eat into the gross {gross}, got {net}");

        let trade_returns = result.float_column("trade_return").unwrap();
        assert!(trade_returns[2] < 0.10);
    }

    #[test]
    fn test_minus_one_exits_instead_of_shorting() {
        let t = signaled_table(
            vec![100.0, 100.0, 90.0, 80.0],
            vec![0, 1, -1, -1],
        );
        let result = backtest(&t, &any_strategy(), &BacktestConfig::frictionless()).unwrap();

        let positions = result.int_column("position").unwrap();
        assert_eq!(positions[1], 100);
        assert_eq!(positions[2], 0);
        assert_eq!(positions[3], 0); // never short

        // Losing trade: win rate stays at zero.
        assert_eq!(result.float_column("win_rate").unwrap()[3], 0.0);
        assert_eq!(result.int_column("trade_count").unwrap()[3], 1);
    }

    #[test]
    fn test_max_drawdown_tracks_peak() {
        let t = signaled_table(
            vec![100.0, 100.0, 120.0, 90.0, 90.0],
            vec![0, 1, 1, 1, 1],
        );
        let result = backtest(&t, &any_strategy(), &BacktestConfig::frictionless()).unwrap();

        let drawdowns = result.float_column("max_drawdown").unwrap();
        // Peak 12_000 at row 2, value 9_000 at row 3: (12000-9000)/12000 = 0.25.
        assert!((drawdowns[3] - 0.25).abs() < 1e-12);
        assert!((drawdowns[4] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_nan_price_rows_carry_value_forward() {
        let t = signaled_table(
            vec![100.0, 100.0, f64::NAN, 110.0],
            vec![0, 1, 0, 0],
        );
        let result = backtest(&t, &any_strategy(), &BacktestConfig::frictionless()).unwrap();

        let values = result.float_column("portfolio_value").unwrap();
        assert!(values[2].is_finite());
        assert_eq!(values[2], values[1]);
        // The close could not execute on the NaN row; position persists.
        assert_eq!(result.int_column("position").unwrap()[2], 100);
    }

    #[test]
    fn test_generates_signals_when_absent() {
        let t = Table::from_columns([(
            "close".to_string(),
            Column::from((1..=40).map(|i| 100.0 + f64::from(i)).collect::<Vec<_>>()),
        )])
        .unwrap();
        let result = backtest(&t, &Strategy::sma_crossover(3, 8), &BacktestConfig::default())
            .unwrap();
        assert!(result.contains("signal"));
        assert!(result.contains("portfolio_value"));
        assert_eq!(result.float_column("portfolio_value").unwrap().len(), 40);
    }

    #[test]
    fn test_row_count_preserved() {
        let t = signaled_table(vec![100.0; 10], vec![0; 10]);
        let result = backtest(&t, &any_strategy(), &BacktestConfig::default()).unwrap();
        assert_eq!(result.num_rows(), 10);
    }
}
