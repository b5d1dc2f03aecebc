//! The tabular container: ordered named columns of uniform length.

use std::collections::{BTreeMap, HashMap};

use super::column::{Column, DType};
use super::{FrameError, Result};

/// Reserved name prefix for intermediate columns.
///
/// Cascaded indicators (MACD, DEMA, TEMA) stage partial results as columns on
/// a working table. Anything named with this prefix is stripped by
/// [`Table::drop_temporaries`] before the table crosses an API boundary.
pub const TMP_PREFIX: &str = "__tmp_";

/// An ordered mapping from unique column names to [`Column`]s.
///
/// Invariants:
/// - all columns share one row count,
/// - names are unique,
/// - insertion order is preserved and observable via [`Table::names`].
///
/// Tables are cheap to clone and derive: the columns themselves are shared by
/// reference, never copied, and never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct Table {
    names: Vec<String>,
    index: HashMap<String, usize>,
    columns: Vec<Column>,
}

impl Table {
    /// Create an empty table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, column)` pairs.
    ///
    /// Fails with [`FrameError::DuplicateColumn`] on repeated names and
    /// [`FrameError::LengthMismatch`] when lengths disagree.
    ///
    /// # Example
    ///
    /// ```
    /// use tickframe::frame::{Column, Table};
    ///
    /// let t = Table::from_columns([
    ///     ("close".to_string(), Column::from(vec![1.0, 2.0])),
    ///     ("open".to_string(), Column::from(vec![0.9, 1.9])),
    /// ])
    /// .unwrap();
    /// assert_eq!(t.num_columns(), 2);
    /// ```
    pub fn from_columns<I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Column)>,
    {
        let mut table = Table::new();
        for (name, column) in columns {
            table.insert(name, column)?;
        }
        Ok(table)
    }

    /// Build a table from uniform row records.
    ///
    /// Every record must carry exactly the key set of the first record;
    /// otherwise [`FrameError::RecordMismatch`] names the offending row.
    /// Column order follows the (sorted) key order of the first record.
    /// An empty slice produces an empty table.
    pub fn from_records(records: &[BTreeMap<String, f64>]) -> Result<Self> {
        let Some(first) = records.first() else {
            return Ok(Table::new());
        };

        let keys: Vec<&String> = first.keys().collect();
        let mut buffers: Vec<Vec<f64>> = vec![Vec::with_capacity(records.len()); keys.len()];

        for (i, record) in records.iter().enumerate() {
            if record.len() != keys.len() {
                return Err(FrameError::RecordMismatch { index: i });
            }
            for (k, key) in keys.iter().enumerate() {
                let Some(&value) = record.get(*key) else {
                    return Err(FrameError::RecordMismatch { index: i });
                };
                buffers[k].push(value);
            }
        }

        let mut table = Table::new();
        for (key, buffer) in keys.into_iter().zip(buffers) {
            table.insert(key.clone(), Column::from(buffer))?;
        }
        Ok(table)
    }

    /// Number of rows shared by every column (0 for an empty table).
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// True when the table holds a column with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    /// Borrow a float column by name, checking dtype.
    pub fn float_column(&self, name: &str) -> Result<&[f64]> {
        self.typed_column(name, DType::Float, Column::as_float)
    }

    /// Borrow an integer column by name, checking dtype.
    pub fn int_column(&self, name: &str) -> Result<&[i64]> {
        self.typed_column(name, DType::Int, Column::as_int)
    }

    /// Borrow a string column by name, checking dtype.
    pub fn str_column(&self, name: &str) -> Result<&[String]> {
        self.typed_column(name, DType::Str, Column::as_str)
    }

    fn typed_column<'a, T: ?Sized>(
        &'a self,
        name: &str,
        expected: DType,
        cast: impl Fn(&'a Column) -> Option<&'a T>,
    ) -> Result<&'a T> {
        let column = self.column(name).ok_or_else(|| FrameError::ColumnMissing {
            name: name.to_string(),
        })?;
        cast(column).ok_or_else(|| FrameError::TypeMismatch {
            name: name.to_string(),
            expected: expected.as_str(),
            got: column.dtype().as_str(),
        })
    }

    /// Return a new table with one additional column.
    ///
    /// The existing columns are shared by reference. Fails with
    /// [`FrameError::DuplicateColumn`] when the name is taken — callers must
    /// pick a distinct name — and [`FrameError::LengthMismatch`] when the new
    /// column's length differs from the table's row count.
    pub fn with_column(&self, name: impl Into<String>, column: Column) -> Result<Self> {
        let mut next = self.clone();
        next.insert(name.into(), column)?;
        Ok(next)
    }

    /// Keep only the columns whose name satisfies the predicate.
    ///
    /// Relative order of surviving columns is preserved.
    pub fn select(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        let mut out = Table::new();
        for (name, column) in self.names.iter().zip(&self.columns) {
            if keep(name.as_str()) {
                // Names were unique and lengths uniform in self.
                out.insert(name.clone(), column.clone())
                    .expect("selected columns preserve table invariants");
            }
        }
        out
    }

    /// Drop every column whose name starts with [`TMP_PREFIX`].
    pub fn drop_temporaries(&self) -> Self {
        self.select(|name| !name.starts_with(TMP_PREFIX))
    }

    /// True when any column still carries the reserved temporary prefix.
    pub fn has_temporaries(&self) -> bool {
        self.names.iter().any(|n| n.starts_with(TMP_PREFIX))
    }

    /// In-place append used by the constructors and `with_column`.
    pub(crate) fn insert(&mut self, name: String, column: Column) -> Result<()> {
        if self.index.contains_key(&name) {
            return Err(FrameError::DuplicateColumn { name });
        }
        if !self.columns.is_empty() && column.len() != self.num_rows() {
            return Err(FrameError::LengthMismatch {
                name,
                expected: self.num_rows(),
                got: column.len(),
            });
        }
        self.index.insert(name.clone(), self.columns.len());
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }
}
