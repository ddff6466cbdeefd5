//! Evaluation value types

use crate::area::Area;
use crate::error_code::ErrorCode;

/// Value passed to and returned from every built-in function
///
/// Operands arrive fully resolved: a reference carries its dereferenced content and an
/// area carries its materialized grid, so the engine never reads cells itself.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Numeric value (dates are serial numbers)
    Number(f64),
    /// Text value
    Text(String),
    /// Boolean value (TRUE/FALSE)
    Boolean(bool),
    /// Error value (#VALUE!, #REF!, etc.)
    Error(ErrorCode),
    /// Empty cell
    Blank,
    /// Omitted argument, e.g. the middle operand of `COUNT(1,,3)`
    Missing,
    /// Single cell reference together with the cell's content
    Reference(CellRef),
    /// Rectangular area of cells
    Range(Area),
}

/// A single-cell reference
///
/// Keeps the coordinates next to the evaluated content so ROW/COLUMN and the IS-functions
/// can inspect the reference rather than only its value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRef {
    /// 0-based row
    pub row: u32,
    /// 0-based column
    pub col: u32,
    /// Content of the referenced cell
    pub value: Box<Value>,
}

impl CellRef {
    /// Create a reference to `(row, col)` holding `value`
    pub fn new(row: u32, col: u32, value: Value) -> Self {
        Self {
            row,
            col,
            value: Box::new(value),
        }
    }

    /// Content of the referenced cell
    pub fn inner(&self) -> &Value {
        &self.value
    }
}

impl Value {
    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    /// Create a single-cell reference value
    pub fn reference(row: u32, col: u32, value: Value) -> Self {
        Value::Reference(CellRef::new(row, col, value))
    }

    /// Check if this is an empty cell
    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Blank)
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Get the error if this is one
    pub fn error(&self) -> Option<ErrorCode> {
        match self {
            Value::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// Check if this is a reference or an area
    pub fn is_reference(&self) -> bool {
        matches!(self, Value::Reference(_) | Value::Range(_))
    }

    /// Short name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Error(_) => "error",
            Value::Blank => "blank",
            Value::Missing => "missing",
            Value::Reference(_) => "reference",
            Value::Range(_) => "range",
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<ErrorCode> for Value {
    fn from(e: ErrorCode) -> Self {
        Value::Error(e)
    }
}

impl From<Area> for Value {
    fn from(area: Area) -> Self {
        Value::Range(area)
    }
}
