use crate::config::SearchParams;
use crate::grid::Grid;
use crate::packer::search::run_attempt;
use crate::packer::{AttemptConfig, AttemptResult, CancelToken};
use crate::shape::{rotations, RotationSet, Shape};
use rayon::prelude::*;
use serde::Serialize;
use strum_macros::Display;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Inputs were inconsistent; no search ran.
    Rejected,
    Deterministic,
    Randomized,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptSummary {
    pub index: usize,
    pub phase: Phase,
    pub seed: u64,
    pub success: bool,
    pub pieces_placed: usize,
    pub placed_cells: usize,
    pub steps: usize,
}

/// Receives a summary after every finished attempt. Returning `false` stops
/// the search; the best result so far is still returned.
pub trait ProgressCallback: Send + Sync {
    fn on_attempt(&self, summary: &AttemptSummary) -> bool;
}

impl<F> ProgressCallback for F
where
    F: Fn(&AttemptSummary) -> bool + Send + Sync,
{
    fn on_attempt(&self, summary: &AttemptSummary) -> bool {
        self(summary)
    }
}

#[derive(Debug, Clone)]
pub struct PackOutcome {
    pub result: AttemptResult,
    /// Phase of the attempt that produced `result`.
    pub phase: Phase,
    pub attempts: usize,
    pub placed_cells: usize,
}

impl PackOutcome {
    pub fn success(&self) -> bool {
        self.result.success
    }
}

pub struct Packer {
    params: SearchParams,
    cancel: CancelToken,
}

impl Packer {
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Tries to place exactly `counts[i]` copies of `shapes[i]` on the empty
    /// cells of `grid`. Full coverage is not required.
    ///
    /// Runs one deterministic attempt, then randomized restarts until one
    /// succeeds. When all fail, the attempt that occupied the most cells is
    /// returned with `success == false`.
    pub fn run<CB: ProgressCallback>(
        &self,
        grid: &Grid,
        shapes: &[Shape],
        counts: &[usize],
        callback: CB,
    ) -> PackOutcome {
        if shapes.len() != counts.len() {
            warn!(
                "Shape/count mismatch: {} shapes but {} counts",
                shapes.len(),
                counts.len()
            );
            return PackOutcome {
                result: AttemptResult::rejected(grid),
                phase: Phase::Rejected,
                attempts: 0,
                placed_cells: 0,
            };
        }

        let opts = &self.params;
        let stop = self.cancel.child();
        let rotation_sets: Vec<RotationSet> = shapes
            .iter()
            .enumerate()
            .map(|(i, s)| rotations(i, s))
            .collect();

        let total_needed = counts.iter().fold(0usize, |acc, &c| acc.saturating_add(c));
        let required_cells = rotation_sets
            .iter()
            .zip(counts)
            .fold(0usize, |acc, (set, &c)| {
                acc.saturating_add(set.cell_count().saturating_mul(c))
            });
        if required_cells > grid.empty_count() {
            debug!(
                "Required cells {} exceed {} empty cells; expecting failure",
                required_cells,
                grid.empty_count()
            );
        }

        // Pieces beyond the empty cell count can never be placed, so they earn
        // no extra budget.
        let budget_pieces = total_needed.min(grid.empty_count());

        // 1. Deterministic attempt
        let det_cfg = AttemptConfig {
            step_budget: opts
                .deterministic_step_floor
                .max(opts.deterministic_steps_per_piece.saturating_mul(budget_pieces)),
            remove_min: opts.deterministic_remove_min,
            remove_max: opts.deterministic_remove_max,
            seed: opts.deterministic_seed,
            scan_cap: opts.anchor_scan_cap,
            lookahead: opts.anchor_lookahead,
        };
        let det = run_attempt(grid, &rotation_sets, counts, &det_cfg, &stop);
        let det_cells = det.grid.occupied_delta(grid);
        let keep_going = self.report(&callback, 0, Phase::Deterministic, &det, det_cells);

        if det.success {
            info!("Deterministic attempt succeeded in {} steps", det.steps);
            return PackOutcome {
                result: det,
                phase: Phase::Deterministic,
                attempts: 1,
                placed_cells: det_cells,
            };
        }

        let mut best = (det, Phase::Deterministic, det_cells);
        if !keep_going || stop.is_cancelled() {
            info!("Search stopped after the deterministic attempt");
            return best_outcome(best, 1);
        }

        // 2. Randomized restarts
        let mut master = match opts.seed {
            Some(s) => fastrand::Rng::with_seed(s),
            None => fastrand::Rng::new(),
        };
        let seeds: Vec<u64> = (0..opts.random_attempts).map(|_| master.u64(..)).collect();
        let rand_budget = opts
            .random_step_floor
            .max(opts.random_steps_per_piece.saturating_mul(budget_pieces));

        info!(
            "Deterministic attempt failed ({} cells). Starting {} randomized attempts (budget {})",
            best.2,
            seeds.len(),
            rand_budget
        );

        let attempt = |index: usize, seed: u64| -> Option<AttemptResult> {
            if stop.is_cancelled() {
                return None;
            }
            let cfg = AttemptConfig {
                step_budget: rand_budget,
                remove_min: opts.random_remove_min,
                remove_max: opts.random_remove_max,
                seed,
                scan_cap: opts.anchor_scan_cap,
                lookahead: opts.anchor_lookahead,
            };
            let res = run_attempt(grid, &rotation_sets, counts, &cfg, &stop);
            let cells = res.grid.occupied_delta(grid);
            let keep_going = self.report(&callback, index, Phase::Randomized, &res, cells);
            if res.success || !keep_going {
                stop.cancel();
            }
            Some(res)
        };

        let mut attempts = 1;
        if opts.threads == 1 {
            for (i, &seed) in seeds.iter().enumerate() {
                let Some(res) = attempt(i + 1, seed) else {
                    break;
                };
                attempts += 1;
                if res.success {
                    let cells = res.grid.occupied_delta(grid);
                    return success_outcome(res, attempts, cells);
                }
                consider(&mut best, res, grid);
            }
        } else {
            let work = || -> Vec<Option<AttemptResult>> {
                seeds
                    .par_iter()
                    .enumerate()
                    .map(|(i, &seed)| attempt(i + 1, seed))
                    .collect()
            };
            let results = match opts.threads {
                0 => work(),
                n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                    Ok(pool) => pool.install(work),
                    Err(e) => {
                        warn!("Failed to build a {}-thread pool ({}); using the global pool", n, e);
                        work()
                    }
                },
            };

            // Reduce in attempt order so the chosen result does not depend on
            // which worker finished first.
            for res in results.into_iter().flatten() {
                attempts += 1;
                if res.success {
                    let cells = res.grid.occupied_delta(grid);
                    return success_outcome(res, attempts, cells);
                }
                consider(&mut best, res, grid);
            }
        }

        info!(
            "No packing found after {} attempts; best placed {} cells",
            attempts, best.2
        );
        best_outcome(best, attempts)
    }

    fn report<CB: ProgressCallback>(
        &self,
        callback: &CB,
        index: usize,
        phase: Phase,
        res: &AttemptResult,
        placed_cells: usize,
    ) -> bool {
        let summary = AttemptSummary {
            index,
            phase,
            seed: res.seed,
            success: res.success,
            pieces_placed: res.placements.len(),
            placed_cells,
            steps: res.steps,
        };
        debug!(
            "Attempt #{} ({}) seed={} success={} pieces={} cells={} steps={}",
            summary.index,
            summary.phase,
            summary.seed,
            summary.success,
            summary.pieces_placed,
            summary.placed_cells,
            summary.steps
        );
        callback.on_attempt(&summary)
    }
}

fn consider(best: &mut (AttemptResult, Phase, usize), res: AttemptResult, original: &Grid) {
    let cells = res.grid.occupied_delta(original);
    if cells > best.2 {
        *best = (res, Phase::Randomized, cells);
    }
}

fn success_outcome(result: AttemptResult, attempts: usize, placed_cells: usize) -> PackOutcome {
    info!(
        "Randomized attempt succeeded (seed {}) after {} attempts",
        result.seed, attempts
    );
    PackOutcome {
        result,
        phase: Phase::Randomized,
        attempts,
        placed_cells,
    }
}

fn best_outcome(best: (AttemptResult, Phase, usize), attempts: usize) -> PackOutcome {
    let (result, phase, placed_cells) = best;
    PackOutcome {
        result,
        phase,
        attempts,
        placed_cells,
    }
}

/// Packs with default search parameters.
pub fn can_pack(grid: &Grid, shapes: &[Shape], counts: &[usize]) -> AttemptResult {
    Packer::new(SearchParams::default())
        .run(grid, shapes, counts, |_: &AttemptSummary| true)
        .result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn square() -> Shape {
        Shape::parse(0, &["##", "##"]).unwrap()
    }

    fn quick_params(threads: usize) -> SearchParams {
        SearchParams {
            random_attempts: 8,
            deterministic_step_floor: 200,
            random_step_floor: 100,
            threads,
            seed: Some(7),
            ..Default::default()
        }
    }

    #[test]
    fn test_mismatch_is_rejected_without_search() {
        let grid = Grid::new(4, 4);
        let calls = AtomicUsize::new(0);
        let out = Packer::new(quick_params(1)).run(&grid, &[square()], &[1, 2], |_: &AttemptSummary| {
            calls.fetch_add(1, Ordering::Relaxed);
            true
        });
        assert!(!out.success());
        assert_eq!(out.phase, Phase::Rejected);
        assert_eq!(out.result.grid, grid);
        assert!(out.result.placements.is_empty());
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_deterministic_success_short_circuits() {
        let grid = Grid::new(4, 4);
        let out = Packer::new(quick_params(1)).run(&grid, &[square()], &[4], |_: &AttemptSummary| true);
        assert!(out.success());
        assert_eq!(out.phase, Phase::Deterministic);
        assert_eq!(out.attempts, 1);
        assert_eq!(out.placed_cells, 16);
    }

    #[test]
    fn test_failure_runs_every_attempt_sequentially() {
        let grid = Grid::new(3, 3);
        let calls = AtomicUsize::new(0);
        let out = Packer::new(quick_params(1)).run(&grid, &[square()], &[3], |_: &AttemptSummary| {
            calls.fetch_add(1, Ordering::Relaxed);
            true
        });
        assert!(!out.success());
        assert_eq!(out.attempts, 9);
        assert_eq!(calls.load(Ordering::Relaxed), 9);
        assert!(!out.result.placements.is_empty());
        assert_eq!(out.placed_cells, 4);
    }

    #[test]
    fn test_failure_runs_every_attempt_in_parallel() {
        let grid = Grid::new(3, 3);
        let out = Packer::new(quick_params(2)).run(&grid, &[square()], &[3], |_: &AttemptSummary| true);
        assert!(!out.success());
        assert_eq!(out.attempts, 9);
        assert_eq!(out.placed_cells, 4);
    }

    #[test]
    fn test_callback_can_stop_search() {
        let grid = Grid::new(3, 3);
        let out = Packer::new(quick_params(1)).run(&grid, &[square()], &[3], |s: &AttemptSummary| {
            s.index < 2
        });
        assert!(!out.success());
        assert_eq!(out.attempts, 3);
    }

    #[test]
    fn test_external_cancel_returns_deterministic_result() {
        let grid = Grid::new(3, 3);
        let token = CancelToken::new();
        token.cancel();
        let out = Packer::new(quick_params(1))
            .with_cancel_token(token)
            .run(&grid, &[square()], &[3], |_: &AttemptSummary| true);
        assert!(!out.success());
        assert_eq!(out.attempts, 1);
        assert!(out.result.cancelled);
    }

    #[test]
    fn test_huge_counts_do_not_overflow() {
        let grid = Grid::new(4, 4);
        let res = can_pack(&grid, &[square()], &[usize::MAX / 2]);
        assert!(!res.success);
        assert!(!res.placements.is_empty());
        assert!(res.placements.len() <= 4);

        let dot = Shape::parse(1, &["#"]).unwrap();
        let out = Packer::new(quick_params(1)).run(
            &grid,
            &[square(), dot],
            &[usize::MAX, usize::MAX],
            |_: &AttemptSummary| true,
        );
        assert!(!out.success());
        assert_eq!(out.attempts, 9);
        assert!(out.placed_cells <= 16);
    }

    #[test]
    fn test_can_pack_defaults() {
        let grid = Grid::new(4, 4);
        let res = can_pack(&grid, &[square()], &[4]);
        assert!(res.success);
        assert_eq!(res.placements.len(), 4);
    }
}
