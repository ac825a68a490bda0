use crate::puzzle::{Puzzle, Region};
use crate::shape::Shape;
use serde::Serialize;

/// Area-ratio guess for one region; no placement is attempted.
#[derive(Debug, Clone, Serialize)]
pub struct AreaEstimate {
    pub region: usize,
    pub grid_cells: usize,
    pub required_cells: usize,
    /// `required_cells / grid_cells`
    pub fill_ratio: f64,
    pub plausible: bool,
}

/// A region is plausible when `required_cells * factor` still fits in its
/// area. With `factor = 1.0` this is the hard capacity bound.
pub fn estimate_region(index: usize, region: &Region, shapes: &[Shape], factor: f64) -> AreaEstimate {
    let grid_cells = region.width.saturating_mul(region.height);
    let required_cells = region.required_cells(shapes);
    let fill_ratio = if grid_cells > 0 {
        required_cells as f64 / grid_cells as f64
    } else {
        0.0
    };

    AreaEstimate {
        region: index,
        grid_cells,
        required_cells,
        fill_ratio,
        plausible: (required_cells as f64 * factor).floor() <= grid_cells as f64,
    }
}

pub fn estimate_puzzle(puzzle: &Puzzle, factor: f64) -> Vec<AreaEstimate> {
    puzzle
        .regions
        .iter()
        .enumerate()
        .map(|(i, r)| estimate_region(i, r, &puzzle.shapes, factor))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn puzzle(region_line: &str) -> Puzzle {
        Puzzle::parse(&format!("0:\n###\n#..\n#..\n\n{}\n", region_line)).unwrap()
    }

    #[rstest]
    #[case("4x4: 2", 1.0, true)] // 10 <= 16
    #[case("4x4: 2", 1.23, true)] // 12.3 -> 12 <= 16
    #[case("4x4: 3", 1.0, true)] // 15 <= 16
    #[case("4x4: 3", 1.23, false)] // 18.45 -> 18 > 16
    #[case("3x3: 2", 1.0, false)] // 10 > 9
    #[case("3x3: 0", 1.23, true)]
    fn test_plausibility(#[case] line: &str, #[case] factor: f64, #[case] expected: bool) {
        let p = puzzle(line);
        let est = estimate_region(0, &p.regions[0], &p.shapes, factor);
        assert_eq!(est.plausible, expected);
    }

    #[test]
    fn test_huge_count_is_implausible() {
        let p = puzzle(&format!("4x4: {}", usize::MAX));
        let est = estimate_region(0, &p.regions[0], &p.shapes, 1.23);
        assert_eq!(est.required_cells, usize::MAX);
        assert!(!est.plausible);
    }

    #[test]
    fn test_fill_ratio() {
        let p = puzzle("5x2: 2");
        let est = &estimate_puzzle(&p, 1.23)[0];
        assert_eq!(est.required_cells, 10);
        assert_eq!(est.grid_cells, 10);
        assert!((est.fill_ratio - 1.0).abs() < 1e-9);
    }
}
