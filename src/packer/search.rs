use crate::grid::Grid;
use crate::packer::enumerator::best_placement;
use crate::packer::{AttemptConfig, AttemptResult, CancelToken, Placement};
use crate::shape::RotationSet;
use tracing::trace;

/// Runs one greedy-with-repair attempt on a private copy of `grid`.
///
/// Each iteration either applies the best next placement or, when stuck,
/// undoes between `remove_min` and `remove_max` of the most recent ones.
/// Every iteration spends one step of `step_budget`. An attempt that cannot
/// place even its first piece fails immediately; one that runs out of budget
/// returns the placements it holds at that point.
pub fn run_attempt(
    grid: &Grid,
    rotation_sets: &[RotationSet],
    counts: &[usize],
    cfg: &AttemptConfig,
    cancel: &CancelToken,
) -> AttemptResult {
    let mut rng = fastrand::Rng::with_seed(cfg.seed);
    let mut g = grid.clone();
    let mut remaining = counts.to_vec();
    let mut placements: Vec<Placement> = Vec::new();
    let mut remaining_pieces = remaining.iter().fold(0usize, |acc, &c| acc.saturating_add(c));

    let mut steps = 0;
    let mut cancelled = false;

    while remaining_pieces > 0 && steps < cfg.step_budget {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        steps += 1;

        if let Some(pl) = best_placement(
            &g,
            rotation_sets,
            &remaining,
            &mut rng,
            cfg.scan_cap,
            cfg.lookahead,
        ) {
            g.apply(&pl);
            remaining[pl.type_index] -= 1;
            remaining_pieces -= 1;
            placements.push(pl);
            continue;
        }

        // Nothing placed yet means nothing fits at all. A repair on the
        // last step could never be followed by a retry, so keep the partial
        // packing instead.
        if placements.is_empty() || steps >= cfg.step_budget {
            break;
        }

        let span = cfg.remove_max.saturating_sub(cfg.remove_min).saturating_add(1);
        let k = cfg.remove_min.saturating_add(rng.usize(0..span)).min(placements.len());
        trace!(
            "Repair at step {}: removing {} of {} placements",
            steps,
            k,
            placements.len()
        );
        remaining_pieces += undo_recent(&mut g, &mut placements, &mut remaining, k).len();
    }

    AttemptResult {
        success: remaining_pieces == 0,
        grid: g,
        placements,
        seed: cfg.seed,
        steps,
        cancelled,
    }
}

/// Pops up to `k` of the most recent placements, newest first, clearing
/// their cells and returning them to `remaining`.
pub fn undo_recent(
    grid: &mut Grid,
    placements: &mut Vec<Placement>,
    remaining: &mut [usize],
    k: usize,
) -> Vec<Placement> {
    let keep = placements.len().saturating_sub(k);
    let removed: Vec<Placement> = placements.drain(keep..).rev().collect();
    for p in &removed {
        grid.unapply(p);
        remaining[p.type_index] += 1;
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{rotations, Shape};

    fn config(seed: u64) -> AttemptConfig {
        AttemptConfig {
            step_budget: 2000,
            remove_min: 1,
            remove_max: 4,
            seed,
            scan_cap: 0,
            lookahead: 1,
        }
    }

    fn square_set() -> Vec<RotationSet> {
        vec![rotations(0, &Shape::parse(0, &["##", "##"]).unwrap())]
    }

    #[test]
    fn test_tiles_4x4_with_squares() {
        let grid = Grid::new(4, 4);
        let res = run_attempt(&grid, &square_set(), &[4], &config(1), &CancelToken::new());
        assert!(res.success);
        assert_eq!(res.placements.len(), 4);
        assert_eq!(res.grid.occupied_count(), 16);
        assert_eq!(res.steps, 4);
    }

    #[test]
    fn test_zero_counts_succeed_without_steps() {
        let grid = Grid::new(3, 3);
        let res = run_attempt(&grid, &square_set(), &[0], &config(1), &CancelToken::new());
        assert!(res.success);
        assert!(res.placements.is_empty());
        assert_eq!(res.grid, grid);
        assert_eq!(res.steps, 0);
    }

    #[test]
    fn test_fails_fast_when_first_piece_cannot_fit() {
        let grid = Grid::new(1, 5);
        let res = run_attempt(&grid, &square_set(), &[1], &config(1), &CancelToken::new());
        assert!(!res.success);
        assert!(res.placements.is_empty());
        assert_eq!(res.steps, 1);
    }

    #[test]
    fn test_exhausts_budget_with_partial_result() {
        let grid = Grid::new(3, 3);
        let mut cfg = config(5);
        cfg.step_budget = 50;
        let res = run_attempt(&grid, &square_set(), &[3], &cfg, &CancelToken::new());
        assert!(!res.success);
        assert_eq!(res.steps, 50);
        assert_eq!(res.placements.len(), 1);
        assert_eq!(res.grid.occupied_count(), 4);
    }

    #[test]
    fn test_undo_recent_reverses_latest_placements() {
        let sets = square_set();
        let mut rng = fastrand::Rng::with_seed(3);
        let mut grid = Grid::new(4, 4);
        let mut remaining = vec![4];
        let mut placements = Vec::new();
        let mut snapshots = vec![grid.clone()];

        while let Some(p) = best_placement(&grid, &sets, &remaining, &mut rng, 0, 1) {
            grid.apply(&p);
            remaining[0] -= 1;
            placements.push(p);
            snapshots.push(grid.clone());
        }
        assert_eq!(placements.len(), 4);
        let anchors: Vec<(usize, usize)> = placements.iter().map(|p| (p.top_row, p.top_col)).collect();

        let removed = undo_recent(&mut grid, &mut placements, &mut remaining, 3);
        let removed_anchors: Vec<(usize, usize)> = removed.iter().map(|p| (p.top_row, p.top_col)).collect();
        assert_eq!(removed_anchors, vec![anchors[3], anchors[2], anchors[1]]);
        assert_eq!(placements.len(), 1);
        assert_eq!(remaining, vec![3]);
        assert_eq!(grid, snapshots[1]);

        // Asking for more than is placed clears everything.
        let removed = undo_recent(&mut grid, &mut placements, &mut remaining, 5);
        assert_eq!(removed.len(), 1);
        assert!(placements.is_empty());
        assert_eq!(remaining, vec![4]);
        assert_eq!(grid, snapshots[0]);
    }

    #[test]
    fn test_repair_recovers_from_dead_end() {
        // A lone cell ties with a lone cell in a 3x3 box, which only fits on
        // the corners of a 3x3 grid. Any corner taken by the plain cell
        // strands a corner piece, so success needs every tie won by the
        // corner piece; repair keeps reshuffling until that happens.
        let sets = vec![
            rotations(0, &Shape::parse(0, &["#"]).unwrap()),
            rotations(1, &Shape::parse(1, &["#..", "...", "..."]).unwrap()),
        ];
        let counts = [5, 4];
        let total_pieces = 9;
        let grid = Grid::new(3, 3);

        let mut repaired = 0;
        for seed in 0..32 {
            let cfg = AttemptConfig {
                step_budget: 5000,
                remove_min: 1,
                remove_max: 9,
                seed,
                scan_cap: 0,
                lookahead: 1,
            };
            let res = run_attempt(&grid, &sets, &counts, &cfg, &CancelToken::new());
            assert!(res.success, "seed {} failed after {} steps", seed, res.steps);
            assert_eq!(res.grid.occupied_count(), 9);
            for p in res.placements.iter().filter(|p| p.type_index == 1) {
                assert!(p.top_row == 0 && p.top_col == 0);
            }
            if res.steps > total_pieces {
                repaired += 1;
            }
        }
        assert!(repaired > 0);
    }

    #[test]
    fn test_cancelled_before_start() {
        let grid = Grid::new(4, 4);
        let token = CancelToken::new();
        token.cancel();
        let res = run_attempt(&grid, &square_set(), &[4], &config(1), &token);
        assert!(!res.success);
        assert!(res.cancelled);
        assert_eq!(res.steps, 0);
    }

    #[test]
    fn test_same_seed_same_result() {
        let shapes = [
            Shape::parse(0, &["###", "#..", "#.."]).unwrap(),
            Shape::parse(1, &[".#.", "###", ".#."]).unwrap(),
        ];
        let sets: Vec<_> = shapes.iter().enumerate().map(|(i, s)| rotations(i, s)).collect();
        let grid = Grid::new(8, 7);
        let a = run_attempt(&grid, &sets, &[3, 2], &config(42), &CancelToken::new());
        let b = run_attempt(&grid, &sets, &[3, 2], &config(42), &CancelToken::new());
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.success, b.success);
        assert_eq!(a.placements.len(), b.placements.len());
    }
}
