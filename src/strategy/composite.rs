//! Row-wise fusion of child-strategy signals.

use crate::frame::Table;
use crate::indicators::IndicatorError;

use super::signals::{SignalTriple, generate_signals};
use super::{CompositeLogic, Result, SignalError, Strategy};

/// One child's vote at a single row.
#[derive(Clone, Copy)]
struct Vote {
    signal: i64,
    strength: f64,
}

/// Run every child against the input table and fuse their signal columns.
///
/// Children are independent: each sees the original table, and their
/// indicator columns never reach the composite's output — only the fused
/// triple is appended.
pub(crate) fn composite_signals(
    table: &Table,
    children: &[Strategy],
    logic: CompositeLogic,
    weights: Option<&[f64]>,
    threshold: f64,
) -> Result<Table> {
    let rows = table.num_rows();

    let weights = resolve_weights(children.len(), weights)?;

    let mut child_votes: Vec<(Vec<i64>, Vec<f64>)> = Vec::with_capacity(children.len());
    for (index, child) in children.iter().enumerate() {
        let signaled =
            generate_signals(table, child).map_err(|e| SignalError::ChildStrategyFailed {
                index,
                kind: child.kind().to_string(),
                source: Box::new(e),
            })?;
        let signals = signaled.int_column("signal")?.to_vec();
        let strengths = signaled.float_column("signal_strength")?.to_vec();
        child_votes.push((signals, strengths));
    }

    let mut triple = SignalTriple::hold(rows);
    let mut votes = Vec::with_capacity(children.len());
    for row in 0..rows {
        votes.clear();
        votes.extend(child_votes.iter().map(|(s, st)| Vote {
            signal: s[row],
            strength: st[row],
        }));

        let (signal, strength) = match logic {
            CompositeLogic::All => combine_all(&votes),
            CompositeLogic::Any => combine_any(&votes),
            CompositeLogic::Majority => combine_majority(&votes),
            CompositeLogic::Weighted => combine_weighted(&votes, &weights, threshold),
        };

        if signal != 0 {
            let direction = if signal > 0 { "bullish" } else { "bearish" };
            triple.set(row, signal, strength, format!("composite_{logic}_{direction}"));
        }
    }

    triple.append_to(table)
}

/// Default to equal weights; reject custom vectors with the wrong length or
/// non-positive entries.
fn resolve_weights(children: usize, weights: Option<&[f64]>) -> Result<Vec<f64>> {
    match weights {
        Some(w) => {
            if w.len() != children {
                return Err(SignalError::Indicator(IndicatorError::InvalidWeights(
                    format!("expected {} weights, got {}", children, w.len()),
                )));
            }
            if w.iter().any(|&v| !(v > 0.0)) {
                return Err(SignalError::Indicator(IndicatorError::InvalidWeights(
                    "weights must be positive".to_string(),
                )));
            }
            Ok(w.to_vec())
        }
        None => {
            let equal = if children == 0 {
                0.0
            } else {
                1.0 / children as f64
            };
            Ok(vec![equal; children])
        }
    }
}

/// Non-zero only when every child emits the same non-zero signal; strength
/// is the mean of child strengths.
fn combine_all(votes: &[Vote]) -> (i64, f64) {
    let Some(first) = votes.first() else {
        return (0, 0.0);
    };
    if first.signal == 0 || votes.iter().any(|v| v.signal != first.signal) {
        return (0, 0.0);
    }
    let mean = votes.iter().map(|v| v.strength).sum::<f64>() / votes.len() as f64;
    (first.signal, mean)
}

/// The strongest non-zero vote wins; ties go to the earliest child.
fn combine_any(votes: &[Vote]) -> (i64, f64) {
    let mut winner: Option<Vote> = None;
    for vote in votes {
        if vote.signal == 0 {
            continue;
        }
        match winner {
            Some(w) if vote.strength <= w.strength => {}
            _ => winner = Some(*vote),
        }
    }
    winner.map_or((0, 0.0), |w| (w.signal, w.strength))
}

/// A strict majority (> n/2) of children voting the same non-zero value
/// wins; strength is the mean strength of the winning voters.
fn combine_majority(votes: &[Vote]) -> (i64, f64) {
    let half = votes.len() / 2;
    for candidate in [1_i64, -1] {
        let backers: Vec<&Vote> = votes.iter().filter(|v| v.signal == candidate).collect();
        if backers.len() > half {
            let mean = backers.iter().map(|v| v.strength).sum::<f64>() / backers.len() as f64;
            return (candidate, mean);
        }
    }
    (0, 0.0)
}

/// Weighted score Σ signalᵢ·strengthᵢ·weightᵢ compared against ±threshold;
/// strength is the score normalized by total weight, capped at 1.
fn combine_weighted(votes: &[Vote], weights: &[f64], threshold: f64) -> (i64, f64) {
    let score: f64 = votes
        .iter()
        .zip(weights)
        .map(|(v, &w)| v.signal as f64 * v.strength * w)
        .sum();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return (0, 0.0);
    }

    if score > threshold {
        (1, (score / total).min(1.0))
    } else if score < -threshold {
        (-1, (-score / total).min(1.0))
    } else {
        (0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(signal: i64, strength: f64) -> Vote {
        Vote { signal, strength }
    }

    #[test]
    fn test_all_requires_unanimity() {
        assert_eq!(combine_all(&[vote(1, 0.4), vote(1, 0.6)]), (1, 0.5));
        assert_eq!(combine_all(&[vote(1, 0.4), vote(-1, 0.6)]), (0, 0.0));
        assert_eq!(combine_all(&[vote(0, 0.0), vote(0, 0.0)]), (0, 0.0));
        assert_eq!(combine_all(&[]), (0, 0.0));
    }

    #[test]
    fn test_any_picks_strongest_nonzero() {
        assert_eq!(combine_any(&[vote(1, 0.3), vote(-1, 0.8)]), (-1, 0.8));
        assert_eq!(combine_any(&[vote(0, 0.0), vote(1, 0.2)]), (1, 0.2));
        assert_eq!(combine_any(&[vote(0, 0.0), vote(0, 0.0)]), (0, 0.0));
    }

    #[test]
    fn test_any_breaks_ties_by_first_occurrence() {
        assert_eq!(combine_any(&[vote(1, 0.5), vote(-1, 0.5)]), (1, 0.5));
    }

    #[test]
    fn test_majority_needs_strict_majority() {
        // Two children cannot form a strict majority when they disagree.
        assert_eq!(combine_majority(&[vote(1, 0.4), vote(-1, 0.4)]), (0, 0.0));
        // 2 of 3 is a strict majority.
        let (signal, strength) =
            combine_majority(&[vote(1, 0.2), vote(1, 0.6), vote(-1, 0.9)]);
        assert_eq!(signal, 1);
        assert!((strength - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_threshold_and_symmetry() {
        let weights = [0.5, 0.5];
        // score = 0.5*0.8*1 + 0.5*0.2*(-1) = 0.3 > 0.1
        let (signal, strength) =
            combine_weighted(&[vote(1, 0.8), vote(-1, 0.2)], &weights, 0.1);
        assert_eq!(signal, 1);
        assert!((strength - 0.3).abs() < 1e-12);

        // Opposing equal-strength votes cancel out.
        assert_eq!(
            combine_weighted(&[vote(1, 0.5), vote(-1, 0.5)], &weights, 0.1),
            (0, 0.0)
        );
    }

    #[test]
    fn test_resolve_weights_defaults_equal() {
        let w = resolve_weights(4, None).unwrap();
        assert_eq!(w, vec![0.25; 4]);
    }

    #[test]
    fn test_resolve_weights_rejects_mismatch() {
        let err = resolve_weights(3, Some(&[1.0, 2.0])).unwrap_err();
        assert!(matches!(err, SignalError::Indicator(_)));
    }
}
