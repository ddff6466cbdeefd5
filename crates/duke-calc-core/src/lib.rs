//! # duke-calc-core
//!
//! Value model shared by the duke-calc function engine.
//!
//! This crate provides the fundamental types every function consumes and returns:
//! - [`Value`] - the tagged evaluation result (numbers, text, booleans, errors, blanks,
//!   single-cell references and rectangular areas)
//! - [`ErrorCode`] - the fixed set of spreadsheet error values (`#DIV/0!`, `#N/A`, ...)
//! - [`Area`] - a materialized, read-only rectangular block of cell values
//!
//! ## Example
//!
//! ```rust
//! use duke_calc_core::{Area, Value};
//!
//! let area = Area::new(0, 0, vec![
//!     vec![Value::Number(1.0), Value::text("a")],
//!     vec![Value::Number(2.0), Value::text("b")],
//! ]).unwrap();
//!
//! assert_eq!(area.height(), 2);
//! assert_eq!(area.get(1, 1), Some(&Value::text("b")));
//! ```

pub mod area;
pub mod error;
pub mod error_code;
pub mod value;

pub use area::Area;
pub use error::{Error, Result};
pub use error_code::ErrorCode;
pub use value::{CellRef, Value};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;
