//! Columnar primitives: dense typed columns and the tabular container.
//!
//! A [`Table`] is an ordered mapping from unique column names to [`Column`]s
//! that all share one row count. Columns are reference-counted internally, so
//! cloning a table (or deriving a new one with an extra column) shares the
//! underlying buffers instead of copying them. Tables are immutable at the
//! API boundary: every operation that "adds" a column returns a new table.
//!
//! Float columns use IEEE-754 quiet NaN as the missing-value marker. There is
//! no separate validity bitmap; NaN propagates through arithmetic, which is
//! exactly the behavior the indicator layer relies on.
//!
//! # Example
//!
//! ```
//! use tickframe::frame::{Column, Table};
//!
//! let table = Table::from_columns([
//!     ("close".to_string(), Column::from(vec![10.0, 11.0, 12.0])),
//!     ("volume".to_string(), Column::from(vec![100_i64, 250, 175])),
//! ])
//! .unwrap();
//!
//! assert_eq!(table.num_rows(), 3);
//! assert_eq!(table.names(), &["close".to_string(), "volume".to_string()]);
//! ```

mod column;
mod table;

pub use column::{Column, DType};
pub use table::{TMP_PREFIX, Table};

/// Error type for table and column operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FrameError {
    /// A named column was not found in the table.
    #[error("column '{name}' not found")]
    ColumnMissing {
        /// Name of the missing column
        name: String,
    },

    /// A column with this name already exists; appends never overwrite.
    #[error("column '{name}' already exists")]
    DuplicateColumn {
        /// Name of the conflicting column
        name: String,
    },

    /// A column's length does not match the table's row count.
    #[error("column '{name}' has {got} rows, expected {expected}")]
    LengthMismatch {
        /// Name of the offending column
        name: String,
        /// Row count of the table
        expected: usize,
        /// Row count of the rejected column
        got: usize,
    },

    /// A column exists but holds a different dtype than requested.
    #[error("column '{name}' has dtype {got}, expected {expected}")]
    TypeMismatch {
        /// Name of the offending column
        name: String,
        /// The dtype the caller asked for
        expected: &'static str,
        /// The dtype actually stored
        got: &'static str,
    },

    /// A row record's key set differs from the first record's.
    #[error("record {index} does not match the key set of the first record")]
    RecordMismatch {
        /// Zero-based index of the offending record
        index: usize,
    },
}

/// Result type for frame operations.
pub type Result<T> = std::result::Result<T, FrameError>;
