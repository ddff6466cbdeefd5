//! Rectangular cell areas

use crate::error::{Error, Result};
use crate::value::Value;
use crate::{MAX_COLS, MAX_ROWS};

/// A materialized rectangular block of cells
///
/// Cells are stored row-major. The declared shape always matches the backing grid; every
/// constructor checks it. Coordinates are 0-based sheet positions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Area {
    first_row: u32,
    first_col: u32,
    height: usize,
    width: usize,
    cells: Vec<Value>,
}

impl Area {
    /// Build an area from a grid of rows anchored at `(first_row, first_col)`
    ///
    /// Fails when the grid is empty or ragged.
    pub fn new(first_row: u32, first_col: u32, rows: Vec<Vec<Value>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(bad) = rows.iter().position(|r| r.len() != width) {
            return Err(Error::InvalidRange(format!(
                "row {} has {} cells, expected {}",
                bad,
                rows[bad].len(),
                width
            )));
        }
        let cells = rows.into_iter().flatten().collect();
        Self::from_cells(first_row, first_col, height, width, cells)
    }

    /// Build an area from row-major cells
    pub fn from_cells(
        first_row: u32,
        first_col: u32,
        height: usize,
        width: usize,
        cells: Vec<Value>,
    ) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(Error::InvalidRange(format!(
                "area must have at least one cell, got {}x{}",
                height, width
            )));
        }
        if cells.len() != height * width {
            return Err(Error::InvalidRange(format!(
                "{} cells supplied for a {}x{} area",
                cells.len(),
                height,
                width
            )));
        }
        let last_row = first_row as u64 + height as u64 - 1;
        let last_col = first_col as u64 + width as u64 - 1;
        if last_row >= MAX_ROWS as u64 || last_col >= MAX_COLS as u64 {
            return Err(Error::OutOfBounds {
                row: last_row,
                col: last_col,
            });
        }
        Ok(Self {
            first_row,
            first_col,
            height,
            width,
            cells,
        })
    }

    /// Build a single-column area
    pub fn column(first_row: u32, col: u32, values: Vec<Value>) -> Result<Self> {
        let height = values.len();
        Self::from_cells(first_row, col, height, 1, values)
    }

    /// Build a single-row area
    pub fn row(row: u32, first_col: u32, values: Vec<Value>) -> Result<Self> {
        let width = values.len();
        Self::from_cells(row, first_col, 1, width, values)
    }

    pub fn first_row(&self) -> u32 {
        self.first_row
    }

    pub fn first_col(&self) -> u32 {
        self.first_col
    }

    pub fn last_row(&self) -> u32 {
        self.first_row + self.height as u32 - 1
    }

    pub fn last_col(&self) -> u32 {
        self.first_col + self.width as u32 - 1
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; areas hold at least one cell
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True for a single-row area
    pub fn is_row(&self) -> bool {
        self.height == 1
    }

    /// True for a single-column area
    pub fn is_column(&self) -> bool {
        self.width == 1
    }

    /// Cell at a position relative to the top-left corner
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.cells.get(row * self.width + col)
    }

    /// Cell at an absolute sheet position
    pub fn get_absolute(&self, row: u32, col: u32) -> Option<&Value> {
        if !self.contains(row, col) {
            return None;
        }
        self.get(
            (row - self.first_row) as usize,
            (col - self.first_col) as usize,
        )
    }

    /// Whether `(row, col)` lies inside the area
    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.contains_row(row) && self.contains_column(col)
    }

    /// Whether the sheet row crosses the area
    pub fn contains_row(&self, row: u32) -> bool {
        row >= self.first_row && row <= self.last_row()
    }

    /// Whether the sheet column crosses the area
    pub fn contains_column(&self, col: u32) -> bool {
        col >= self.first_col && col <= self.last_col()
    }

    /// Cells of one relative row
    pub fn row_values(&self, row: usize) -> Option<&[Value]> {
        if row >= self.height {
            return None;
        }
        let start = row * self.width;
        Some(&self.cells[start..start + self.width])
    }

    /// Cells of one relative column, top to bottom
    pub fn column_values(&self, col: usize) -> Option<impl Iterator<Item = &Value> + '_> {
        if col >= self.width {
            return None;
        }
        Some(self.cells.iter().skip(col).step_by(self.width))
    }

    /// All cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &Value> + '_ {
        self.cells.iter()
    }

    /// All cells with their relative `(row, col)` positions
    pub fn indexed(&self) -> impl Iterator<Item = ((usize, usize), &Value)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| ((i / width, i % width), v))
    }

    /// The area anchored at the same top-left corner but with a new shape
    ///
    /// Cells beyond the materialized grid were never supplied by the caller and read as
    /// blank.
    pub fn reshaped(&self, height: usize, width: usize) -> Result<Area> {
        let mut cells = Vec::with_capacity(height * width);
        for r in 0..height {
            for c in 0..width {
                cells.push(self.get(r, c).cloned().unwrap_or(Value::Blank));
            }
        }
        Area::from_cells(self.first_row, self.first_col, height, width, cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn n(v: f64) -> Value {
        Value::Number(v)
    }

    fn grid() -> Area {
        Area::new(
            2,
            1,
            vec![vec![n(1.0), n(2.0), n(3.0)], vec![n(4.0), n(5.0), n(6.0)]],
        )
        .unwrap()
    }

    #[test]
    fn test_shape() {
        let a = grid();
        assert_eq!(a.height(), 2);
        assert_eq!(a.width(), 3);
        assert_eq!(a.last_row(), 3);
        assert_eq!(a.last_col(), 3);
        assert!(!a.is_row());
        assert!(!a.is_column());
    }

    #[test]
    fn test_ragged_grid_rejected() {
        let err = Area::new(0, 0, vec![vec![n(1.0), n(2.0)], vec![n(3.0)]]);
        assert!(matches!(err, Err(Error::InvalidRange(_))));
        assert!(Area::new(0, 0, vec![]).is_err());
        assert!(Area::from_cells(0, 0, 2, 2, vec![n(1.0)]).is_err());
    }

    #[test]
    fn test_indexing() {
        let a = grid();
        assert_eq!(a.get(1, 2), Some(&n(6.0)));
        assert_eq!(a.get(2, 0), None);
        assert_eq!(a.get_absolute(2, 1), Some(&n(1.0)));
        assert_eq!(a.get_absolute(0, 0), None);
        assert_eq!(a.row_values(1).unwrap(), &[n(4.0), n(5.0), n(6.0)]);
        let col: Vec<&Value> = a.column_values(1).unwrap().collect();
        assert_eq!(col, vec![&n(2.0), &n(5.0)]);
    }

    #[test]
    fn test_reshaped_pads_with_blank() {
        let a = Area::column(0, 0, vec![n(1.0), n(2.0)]).unwrap();
        let b = a.reshaped(3, 2).unwrap();
        assert_eq!(b.get(1, 0), Some(&n(2.0)));
        assert_eq!(b.get(2, 0), Some(&Value::Blank));
        assert_eq!(b.get(0, 1), Some(&Value::Blank));
    }
}
