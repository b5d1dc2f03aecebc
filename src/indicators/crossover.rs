//! Discrete crossover events between two indicator columns.

use crate::frame::{Column, Table};

use super::Result;

/// Relative position of one series against another at a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrossState {
    Above,
    Below,
    Equal,
    Invalid,
}

fn classify(fast: f64, slow: f64) -> CrossState {
    if !fast.is_finite() || !slow.is_finite() {
        CrossState::Invalid
    } else if fast > slow {
        CrossState::Above
    } else if fast < slow {
        CrossState::Below
    } else {
        CrossState::Equal
    }
}

/// Detect crossover events between two float columns.
///
/// Walks the rows left to right tracking the relative state of
/// `fast_col` against `slow_col` (above / below / equal / invalid, where any
/// non-finite value is invalid). Appends an integer column holding:
///
/// - `1` at a below → above transition (bullish cross),
/// - `-1` at an above → below transition (bearish cross),
/// - `0` everywhere else, including transitions through equal or invalid
///   states, and always on row 0.
///
/// # Example
///
/// ```
/// use tickframe::frame::{Column, Table};
/// use tickframe::indicators::detect_crossovers;
///
/// let t = Table::from_columns([
///     ("fast".to_string(), Column::from(vec![1.0, 3.0, 2.0])),
///     ("slow".to_string(), Column::from(vec![2.0, 2.0, 2.5])),
/// ])
/// .unwrap();
///
/// let t = detect_crossovers(&t, "fast", "slow", "cross").unwrap();
/// assert_eq!(t.int_column("cross").unwrap(), &[0, 1, -1]);
/// ```
pub fn detect_crossovers(
    table: &Table,
    fast_col: &str,
    slow_col: &str,
    output: &str,
) -> Result<Table> {
    let fast = table.float_column(fast_col)?;
    let slow = table.float_column(slow_col)?;

    let mut events = Vec::with_capacity(fast.len());
    let mut prev: Option<CrossState> = None;
    for (&f, &s) in fast.iter().zip(slow) {
        let state = classify(f, s);
        let event = match (prev, state) {
            (Some(CrossState::Below), CrossState::Above) => 1,
            (Some(CrossState::Above), CrossState::Below) => -1,
            _ => 0,
        };
        events.push(event);
        prev = Some(state);
    }

    Ok(table.with_column(output.to_string(), Column::from(events))?)
}

/// Detect crossovers of a MACD line against its signal line.
///
/// Identical to [`detect_crossovers`] with the output column defaulting to
/// `macd_crossover`.
pub fn detect_macd_crossovers(
    table: &Table,
    macd_col: &str,
    signal_col: &str,
    output: Option<&str>,
) -> Result<Table> {
    detect_crossovers(table, macd_col, signal_col, output.unwrap_or("macd_crossover"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_columns(fast: Vec<f64>, slow: Vec<f64>) -> Table {
        Table::from_columns([
            ("fast".to_string(), Column::from(fast)),
            ("slow".to_string(), Column::from(slow)),
        ])
        .unwrap()
    }

    #[test]
    fn test_row_zero_always_emits_zero() {
        let t = two_columns(vec![5.0, 5.0], vec![1.0, 1.0]);
        let t = detect_crossovers(&t, "fast", "slow", "x").unwrap();
        assert_eq!(t.int_column("x").unwrap()[0], 0);
    }

    #[test]
    fn test_bullish_and_bearish_transitions() {
        let t = two_columns(vec![1.0, 3.0, 3.0, 1.0], vec![2.0, 2.0, 2.0, 2.0]);
        let t = detect_crossovers(&t, "fast", "slow", "x").unwrap();
        assert_eq!(t.int_column("x").unwrap(), &[0, 1, 0, -1]);
    }

    #[test]
    fn test_equal_state_breaks_the_transition() {
        // below → equal → above never emits: the cross must be direct.
        let t = two_columns(vec![1.0, 2.0, 3.0], vec![2.0, 2.0, 2.0]);
        let t = detect_crossovers(&t, "fast", "slow", "x").unwrap();
        assert_eq!(t.int_column("x").unwrap(), &[0, 0, 0]);
    }

    #[test]
    fn test_invalid_state_suppresses_events() {
        let t = two_columns(
            vec![1.0, f64::NAN, 3.0, 1.0],
            vec![2.0, 2.0, 2.0, 2.0],
        );
        let t = detect_crossovers(&t, "fast", "slow", "x").unwrap();
        // below → invalid → above → below: only the last pair is a real
        // above → below transition.
        assert_eq!(t.int_column("x").unwrap(), &[0, 0, 0, -1]);
    }

    #[test]
    fn test_macd_wrapper_default_name() {
        let t = two_columns(vec![1.0, 3.0], vec![2.0, 2.0]);
        let t = detect_macd_crossovers(&t, "fast", "slow", None).unwrap();
        assert_eq!(t.int_column("macd_crossover").unwrap(), &[0, 1]);
    }
}
