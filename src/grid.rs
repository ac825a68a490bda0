use crate::error::{PackError, PackResult};
use crate::packer::Placement;
use crate::shape::Shape;
use serde::Serialize;
use std::fmt;

/// Row-major occupancy grid. `true` means occupied (by an obstruction or a
/// placed piece).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Builds a grid from 0/1 rows; any non-zero value is an obstruction.
    pub fn from_rows(rows: &[Vec<u8>]) -> PackResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if let Some(r) = rows.iter().position(|row| row.len() != width) {
            return Err(PackError::Validation(format!(
                "grid row {} has {} cells, expected {}",
                r,
                rows[r].len(),
                width
            )));
        }

        let cells = rows.iter().flatten().map(|&v| v != 0).collect();
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    #[inline(always)]
    pub fn is_occupied(&self, r: usize, c: usize) -> bool {
        self.cells[r * self.width + c]
    }

    /// Marks a single cell, used for obstructions.
    pub fn set(&mut self, r: usize, c: usize, occupied: bool) {
        self.cells[r * self.width + c] = occupied;
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn empty_count(&self) -> usize {
        self.area() - self.occupied_count()
    }

    /// True iff the shape's bounding box at (top_row, top_col) lies inside
    /// the grid and every filled shape cell lands on an empty grid cell.
    pub fn can_place(&self, shape: &Shape, top_row: isize, top_col: isize) -> bool {
        let n = shape.size() as isize;
        if top_row < 0
            || top_col < 0
            || top_row + n > self.height as isize
            || top_col + n > self.width as isize
        {
            return false;
        }
        let (top_row, top_col) = (top_row as usize, top_col as usize);
        shape
            .filled_cells()
            .all(|(r, c)| !self.is_occupied(top_row + r, top_col + c))
    }

    pub fn apply(&mut self, placement: &Placement) {
        self.paint(placement, true);
    }

    pub fn unapply(&mut self, placement: &Placement) {
        self.paint(placement, false);
    }

    fn paint(&mut self, placement: &Placement, value: bool) {
        for (r, c) in placement.shape.filled_cells() {
            let idx = (placement.top_row + r) * self.width + placement.top_col + c;
            self.cells[idx] = value;
        }
    }

    /// Cells empty in `original` but occupied in `self`.
    pub fn occupied_delta(&self, original: &Grid) -> usize {
        original
            .cells
            .iter()
            .zip(&self.cells)
            .filter(|(&before, &now)| !before && now)
            .count()
    }

    /// Rows of 0/1 values, the inverse of `from_rows`.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.width.max(1))
            .take(self.height)
            .map(|row| row.iter().map(|&c| c as u8).collect())
            .collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.height {
            for c in 0..self.width {
                write!(f, "{}", if self.is_occupied(r, c) { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
