//! Column identity and cell values.
//!
//! Column definitions and value coercion live outside the row model; the
//! row model only needs a stable column key and a type-erased value to carry
//! in aggregate data, group data and change notifications.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a grid column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(String);

impl ColumnId {
    /// Creates a column id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ColumnId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ColumnId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Type-erased container for a single cell value.
///
/// # Example
///
/// ```
/// use horizon_grid::CellValue;
///
/// let value = CellValue::from("Hello");
/// assert_eq!(value.as_string(), Some("Hello"));
/// assert_eq!(CellValue::from(3i64).as_f64(), Some(3.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// No value.
    #[default]
    None,
    /// String value.
    String(String),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
}

impl CellValue {
    /// Returns `true` if this is `CellValue::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, CellValue::None)
    }

    /// Returns the string value, if this holds one.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this holds one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns a numeric value, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(n) => Some(*n as f64),
            CellValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean value, if this holds one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::None => Ok(()),
            CellValue::String(s) => f.write_str(s),
            CellValue::Int(n) => write!(f, "{n}"),
            CellValue::Float(n) => write!(f, "{n}"),
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Int(n as i64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Per-column values, as used for aggregate data and group data.
pub type ColumnValues = BTreeMap<ColumnId, CellValue>;
