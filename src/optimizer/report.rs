//! Ranking and pivoting of sweep results.

use std::collections::HashMap;

use crate::frame::{Column, Table};

use super::grid::ParamValue;
use super::sweep::metric_by_name;
use super::Result;

/// Find the result row that maximizes a metric.
///
/// NaN metric cells never win; ties break toward the earliest (first
/// dispatched) row. Returns `None` for an empty result table or when every
/// metric cell is NaN. The returned map holds every numeric column of the
/// winning row — parameters and metrics alike — keyed by column name.
///
/// # Errors
///
/// A frame error when `metric` names a missing or non-numeric column.
pub fn find_best_params(
    results: &Table,
    metric: &str,
) -> Result<Option<HashMap<String, ParamValue>>> {
    if results.num_rows() == 0 {
        return Ok(None);
    }
    let scores = metric_by_name(results, metric)?;

    let mut best: Option<(usize, f64)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((index, score));
        }
    }
    let Some((winner, _)) = best else {
        return Ok(None);
    };

    let mut row = HashMap::new();
    for name in results.names() {
        match results.column(name) {
            Some(Column::Int(values)) => {
                row.insert(name.clone(), ParamValue::Int(values[winner]));
            }
            Some(Column::Float(values)) => {
                row.insert(name.clone(), ParamValue::Float(values[winner]));
            }
            _ => {}
        }
    }
    Ok(Some(row))
}

/// Pivot sweep results into a 2-D metric table over two parameters.
///
/// Rows are the distinct `y` levels (ascending), columns the distinct `x`
/// levels (ascending, named `<x>_<level>`), and each cell averages the
/// metric over every result row sharing that `(x, y)` pair — NaN where no
/// result lands. The first output column repeats the `y` levels under the
/// parameter's own name.
///
/// # Errors
///
/// A frame error when any of the three columns is missing or non-numeric.
pub fn parameter_heatmap(results: &Table, x: &str, y: &str, metric: &str) -> Result<Table> {
    let xs = metric_by_name(results, x)?;
    let ys = metric_by_name(results, y)?;
    let scores = metric_by_name(results, metric)?;

    let x_levels = distinct_sorted(&xs);
    let y_levels = distinct_sorted(&ys);

    // (y index, x index) → running (sum, count) over duplicate cells.
    let mut cells: Vec<Vec<(f64, usize)>> = vec![vec![(0.0, 0); x_levels.len()]; y_levels.len()];
    for ((&xv, &yv), &score) in xs.iter().zip(&ys).zip(&scores) {
        let (Some(col), Some(row)) = (level_index(&x_levels, xv), level_index(&y_levels, yv))
        else {
            continue;
        };
        if score.is_nan() {
            continue;
        }
        cells[row][col].0 += score;
        cells[row][col].1 += 1;
    }

    let x_is_int = results.column(x).is_some_and(|c| c.as_int().is_some());
    let y_is_int = results.column(y).is_some_and(|c| c.as_int().is_some());

    let mut table = Table::new();
    let y_column = if y_is_int {
        Column::from(y_levels.iter().map(|&v| v as i64).collect::<Vec<i64>>())
    } else {
        Column::from(y_levels.clone())
    };
    table.insert(y.to_string(), y_column)?;

    for (col, &level) in x_levels.iter().enumerate() {
        let values: Vec<f64> = cells
            .iter()
            .map(|row| {
                let (sum, count) = row[col];
                if count == 0 { f64::NAN } else { sum / count as f64 }
            })
            .collect();
        let label = if x_is_int {
            format!("{x}_{}", level as i64)
        } else {
            format!("{x}_{level}")
        };
        table.insert(label, Column::from(values))?;
    }
    Ok(table)
}

fn distinct_sorted(values: &[f64]) -> Vec<f64> {
    let mut levels: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    levels.sort_by(|a, b| a.partial_cmp(b).expect("NaN filtered out"));
    levels.dedup();
    levels
}

fn level_index(levels: &[f64], value: f64) -> Option<usize> {
    levels.iter().position(|&l| l == value)
}
