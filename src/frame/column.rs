//! Dense typed columns with shared ownership.

use std::sync::Arc;

/// The data type stored in a [`Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    /// 64-bit float; NaN marks missing values
    Float,
    /// 64-bit signed integer (signals, positions, counts)
    Int,
    /// Owned UTF-8 strings (signal reasons)
    Str,
}

impl DType {
    /// Human-readable dtype name, used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::Float => "float",
            DType::Int => "int",
            DType::Str => "str",
        }
    }
}

/// A dense, immutable column of values.
///
/// Columns are the unit of sharing between tables: cloning a column bumps a
/// reference count rather than copying the buffer, which is what makes
/// "return the input table plus one new column" cheap for every indicator.
///
/// Float columns use quiet NaN as the missing marker. Comparisons against NaN
/// are false and arithmetic with NaN yields NaN, so missingness flows through
/// cascaded computations without any extra bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Float values (prices, indicator outputs, metrics)
    Float(Arc<Vec<f64>>),
    /// Integer values (signals, crossover events, trade counts)
    Int(Arc<Vec<i64>>),
    /// String values (signal reasons)
    Str(Arc<Vec<String>>),
}

impl Column {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }

    /// True when the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The column's data type.
    pub fn dtype(&self) -> DType {
        match self {
            Column::Float(_) => DType::Float,
            Column::Int(_) => DType::Int,
            Column::Str(_) => DType::Str,
        }
    }

    /// Borrow the float values, or `None` for non-float columns.
    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            Column::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the integer values, or `None` for non-integer columns.
    pub fn as_int(&self) -> Option<&[i64]> {
        match self {
            Column::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the string values, or `None` for non-string columns.
    pub fn as_str(&self) -> Option<&[String]> {
        match self {
            Column::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Bit-for-bit equality.
    ///
    /// Unlike `PartialEq`, float cells are compared via their raw bit
    /// patterns, so NaN cells compare equal to NaN cells. This backs the
    /// determinism guarantee: running an indicator twice on the same input
    /// must produce columns for which `bitwise_eq` holds.
    pub fn bitwise_eq(&self, other: &Column) -> bool {
        match (self, other) {
            (Column::Float(a), Column::Float(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Column::Int(a), Column::Int(b)) => a == b,
            (Column::Str(a), Column::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::Float(Arc::new(values))
    }
}

impl From<Vec<i64>> for Column {
    fn from(values: Vec<i64>) -> Self {
        Column::Int(Arc::new(values))
    }
}

impl From<Vec<String>> for Column {
    fn from(values: Vec<String>) -> Self {
        Column::Str(Arc::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_and_len() {
        let c = Column::from(vec![1.0, 2.0, f64::NAN]);
        assert_eq!(c.dtype(), DType::Float);
        assert_eq!(c.len(), 3);
        assert!(!c.is_empty());
        assert!(c.as_float().is_some());
        assert!(c.as_int().is_none());
    }

    #[test]
    fn test_bitwise_eq_treats_nan_as_equal() {
        let a = Column::from(vec![1.0, f64::NAN, 3.0]);
        let b = Column::from(vec![1.0, f64::NAN, 3.0]);

        // PartialEq on floats says NaN != NaN...
        assert_ne!(a, b);
        // ...but bitwise equality holds.
        assert!(a.bitwise_eq(&b));
    }

    #[test]
    fn test_bitwise_eq_dtype_mismatch() {
        let a = Column::from(vec![1.0, 2.0]);
        let b = Column::from(vec![1_i64, 2]);
        assert!(!a.bitwise_eq(&b));
    }

    #[test]
    fn test_clone_shares_buffer() {
        let a = Column::from(vec![1.0; 1024]);
        let b = a.clone();
        match (&a, &b) {
            (Column::Float(x), Column::Float(y)) => assert!(Arc::ptr_eq(x, y)),
            _ => unreachable!(),
        }
    }
}
