//! Parameter values, ranges, and the cartesian grid.

use serde::{Deserialize, Serialize};

// ── Parameter types ──────────────────────────────────────────────────────────

/// A single parameter value used in a sweep.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Integer parameter (e.g. a period length)
    Int(i64),
    /// Floating-point parameter (e.g. a threshold)
    Float(f64),
}

impl ParamValue {
    /// Return the value as `i64`, truncating floats.
    pub fn as_int(&self) -> i64 {
        match self {
            ParamValue::Int(v) => *v,
            ParamValue::Float(v) => *v as i64,
        }
    }

    /// Return the value as `f64`.
    pub fn as_float(&self) -> f64 {
        match self {
            ParamValue::Int(v) => *v as f64,
            ParamValue::Float(v) => *v,
        }
    }

    /// True for the integer variant.
    pub fn is_int(&self) -> bool {
        matches!(self, ParamValue::Int(_))
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
        }
    }
}

/// The values one parameter takes during a sweep.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum ParamRange {
    /// Inclusive integer range with a step size.
    IntRange {
        /// First value to include
        start: i64,
        /// Last value to include (inclusive)
        end: i64,
        /// Increment between values
        step: i64,
    },
    /// Explicit list of values; may mix integers and floats.
    Values(Vec<ParamValue>),
}

impl ParamRange {
    /// Inclusive integer range with step 1.
    pub fn int_range(start: i64, end: i64) -> Self {
        Self::IntRange {
            start,
            end,
            step: 1,
        }
    }

    /// Inclusive integer range with an explicit step.
    pub fn int_range_step(start: i64, end: i64, step: i64) -> Self {
        Self::IntRange { start, end, step }
    }

    /// Explicit integer value list.
    pub fn values_int(values: &[i64]) -> Self {
        Self::Values(values.iter().map(|&v| ParamValue::Int(v)).collect())
    }

    /// Explicit float value list.
    pub fn values_float(values: &[f64]) -> Self {
        Self::Values(values.iter().map(|&v| ParamValue::Float(v)).collect())
    }

    /// Expand the range into a flat value list.
    pub(crate) fn expand(&self) -> Vec<ParamValue> {
        match self {
            ParamRange::IntRange { start, end, step } => {
                if *step <= 0 {
                    return vec![];
                }
                let mut values = Vec::new();
                let mut cursor = *start;
                while cursor <= *end {
                    values.push(ParamValue::Int(cursor));
                    cursor += step;
                }
                values
            }
            ParamRange::Values(values) => values.clone(),
        }
    }
}

// ── ParamGrid ────────────────────────────────────────────────────────────────

/// An ordered set of named parameter ranges.
///
/// Insertion order is load-bearing twice over: it fixes the column order of
/// the sweep's result table, and it fixes the enumeration order of the
/// cartesian product (the first parameter added cycles slowest).
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    params: Vec<(String, ParamRange)>,
}

impl ParamGrid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named parameter range.
    pub fn param(mut self, name: impl Into<String>, range: ParamRange) -> Self {
        self.params.push((name.into(), range));
        self
    }

    /// Parameter names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Total number of combinations (the product of all range sizes).
    pub fn len(&self) -> usize {
        if self.params.is_empty() {
            return 0;
        }
        self.params
            .iter()
            .map(|(_, range)| range.expand().len())
            .product()
    }

    /// True when the grid expands to no combinations at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every value this parameter takes is an integer.
    ///
    /// Decides the dtype of the parameter's column in the result table:
    /// heterogeneous lists coerce to float.
    pub(crate) fn is_int_param(&self, index: usize) -> bool {
        self.params[index].1.expand().iter().all(ParamValue::is_int)
    }

    /// Lazily enumerate the cartesian product.
    ///
    /// The last parameter added cycles fastest. The product is only
    /// materialized by callers that need random access (the parallel sweep).
    pub fn combinations(&self) -> Combinations {
        let values: Vec<Vec<ParamValue>> =
            self.params.iter().map(|(_, range)| range.expand()).collect();
        let empty = values.is_empty() || values.iter().any(Vec::is_empty);
        Combinations {
            indices: vec![0; values.len()],
            values,
            done: empty,
        }
    }
}

/// Odometer-style iterator over a grid's cartesian product.
#[derive(Debug)]
pub struct Combinations {
    values: Vec<Vec<ParamValue>>,
    indices: Vec<usize>,
    done: bool,
}

impl Iterator for Combinations {
    type Item = Vec<ParamValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let current: Vec<ParamValue> = self
            .indices
            .iter()
            .zip(&self.values)
            .map(|(&i, vals)| vals[i])
            .collect();

        // Advance the odometer from the rightmost digit.
        self.done = true;
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.values[pos].len() {
                self.done = false;
                break;
            }
            self.indices[pos] = 0;
        }

        Some(current)
    }
}
