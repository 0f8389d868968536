//! Reading and writing cell values on row data.
//!
//! The row model does not know the shape of `D`; a [`ValueService`] maps a
//! column to a value in a row's data and back.

use std::sync::Arc;

use crate::node::RowNode;
use crate::value::{CellValue, ColumnId};

/// Reads and writes the raw (non-aggregated) value of a cell.
pub trait ValueService<D> {
    /// Returns the raw value of `column` for `node`.
    fn get_value(&self, node: &RowNode<D>, column: &ColumnId) -> CellValue;

    /// Stores `new_value` for `column` in the node's data.
    ///
    /// Returns `false` if the value could not be stored.
    fn set_value(&self, node: &mut RowNode<D>, column: &ColumnId, new_value: CellValue) -> bool;
}

/// Type alias for a cell value getter.
pub type ValueGetter<D> = Arc<dyn Fn(&D, &ColumnId) -> CellValue + Send + Sync>;

/// Type alias for a cell value setter.
pub type ValueSetter<D> = Arc<dyn Fn(&mut D, &ColumnId, CellValue) -> bool + Send + Sync>;

/// Closure-backed value service.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use horizon_grid::{CellValue, ExtractorValueService};
///
/// type Row = HashMap<String, i64>;
///
/// let service = ExtractorValueService::new(|row: &Row, column| {
///     CellValue::from(row.get(column.as_str()).copied())
/// })
/// .with_setter(|row: &mut Row, column, value| match value.as_int() {
///     Some(n) => {
///         row.insert(column.to_string(), n);
///         true
///     }
///     None => false,
/// });
/// # let _ = service;
/// ```
pub struct ExtractorValueService<D> {
    getter: ValueGetter<D>,
    setter: Option<ValueSetter<D>>,
}

impl<D> ExtractorValueService<D> {
    /// Creates a read-only service from a getter.
    pub fn new<F>(getter: F) -> Self
    where
        F: Fn(&D, &ColumnId) -> CellValue + Send + Sync + 'static,
    {
        Self {
            getter: Arc::new(getter),
            setter: None,
        }
    }

    /// A service that knows no columns: every read is empty, every write rejected.
    pub fn empty() -> Self {
        Self::new(|_, _| CellValue::None)
    }

    /// Adds a setter, making the service writable.
    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut D, &ColumnId, CellValue) -> bool + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }
}

impl<D> ValueService<D> for ExtractorValueService<D> {
    fn get_value(&self, node: &RowNode<D>, column: &ColumnId) -> CellValue {
        node.data()
            .map(|data| (self.getter)(data, column))
            .unwrap_or_default()
    }

    fn set_value(&self, node: &mut RowNode<D>, column: &ColumnId, new_value: CellValue) -> bool {
        let Some(setter) = &self.setter else {
            return false;
        };
        match node.data_mut() {
            Some(data) => setter(data, column, new_value),
            None => false,
        }
    }
}
