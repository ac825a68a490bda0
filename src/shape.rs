use crate::error::{PackError, PackResult};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Canonical bit-packed form of a shape's filled/empty pattern (row-major).
/// Two shapes of the same size are structurally equal iff their keys match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeKey(Vec<u64>);

/// A square N x N occupancy pattern with at least one filled cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shape {
    pub id: usize,
    size: usize,
    cells: Vec<bool>,
}

impl Shape {
    /// Builds a shape from rows of filled flags.
    /// Rejects ragged, non-square and empty patterns.
    pub fn from_rows(id: usize, rows: &[Vec<bool>]) -> PackResult<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(PackError::InvalidShape {
                id,
                reason: "shape has no rows".to_string(),
            });
        }
        if let Some((r, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != size) {
            return Err(PackError::InvalidShape {
                id,
                reason: format!(
                    "shape is not square: {} rows but row {} has {} cells",
                    size,
                    r,
                    row.len()
                ),
            });
        }

        let cells: Vec<bool> = rows.iter().flatten().copied().collect();
        if !cells.iter().any(|&c| c) {
            return Err(PackError::InvalidShape {
                id,
                reason: "shape has no filled cells".to_string(),
            });
        }

        Ok(Self { id, size, cells })
    }

    /// Parses `#` (filled) / `.` (empty) lines.
    pub fn parse(id: usize, lines: &[&str]) -> PackResult<Self> {
        let mut rows = Vec::with_capacity(lines.len());
        for line in lines {
            let row = line
                .trim()
                .chars()
                .map(|ch| match ch {
                    '#' => Ok(true),
                    '.' => Ok(false),
                    other => Err(PackError::InvalidShape {
                        id,
                        reason: format!("unexpected character '{}'", other),
                    }),
                })
                .collect::<PackResult<Vec<bool>>>()?;
            rows.push(row);
        }
        Self::from_rows(id, &rows)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn is_filled(&self, r: usize, c: usize) -> bool {
        self.cells[r * self.size + c]
    }

    /// Filled cells as (row, col) offsets in row-major order.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &filled)| filled)
            .map(move |(i, _)| (i / n, i % n))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn key(&self) -> ShapeKey {
        let mut words = vec![0u64; self.cells.len().div_ceil(64)];
        for (i, &filled) in self.cells.iter().enumerate() {
            if filled {
                words[i / 64] |= 1u64 << (i % 64);
            }
        }
        ShapeKey(words)
    }

    /// 90 degrees clockwise: out(r, c) = src(n-1-c, r).
    pub fn rotate_cw(&self) -> Self {
        let n = self.size;
        let mut cells = vec![false; n * n];
        for r in 0..n {
            for c in 0..n {
                cells[r * n + c] = self.is_filled(n - 1 - c, r);
            }
        }
        Self {
            id: self.id,
            size: n,
            cells,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.size {
            for c in 0..self.size {
                write!(f, "{}", if self.is_filled(r, c) { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The distinct rotations of one shape type, in rotation order.
#[derive(Debug, Clone)]
pub struct RotationSet {
    pub type_index: usize,
    pub rotations: Vec<Arc<Shape>>,
}

impl RotationSet {
    pub fn len(&self) -> usize {
        self.rotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rotations.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.rotations.first().map_or(0, |s| s.cell_count())
    }
}

/// Rotates up to four times, keeping each rotation whose key is new.
pub fn rotations(type_index: usize, shape: &Shape) -> RotationSet {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(4);
    let mut cur = shape.clone();

    for _ in 0..4 {
        let next = cur.rotate_cw();
        if seen.insert(cur.key()) {
            out.push(Arc::new(cur));
        }
        cur = next;
    }

    RotationSet {
        type_index,
        rotations: out,
    }
}
