mod grid;
mod tables;

pub use self::grid::{print_layout, render_layout};
pub use self::tables::{estimates as print_estimate_report, regions as print_solve_report};

use polypack::estimate::AreaEstimate;
use polypack::packer::{PackOutcome, Phase};
use polypack::puzzle::Region;
use polypack::{Placement, Shape};
use serde::Serialize;
use std::time::Duration;

/// Everything reported about one solved region, in both text and JSON form.
#[derive(Debug, Serialize)]
pub struct RegionReport {
    pub region: usize,
    pub width: usize,
    pub height: usize,
    pub counts: Vec<usize>,
    pub total_pieces: usize,
    pub required_cells: usize,
    pub grid_cells: usize,
    pub success: bool,
    pub phase: Phase,
    pub attempts: usize,
    pub seed: u64,
    pub steps: usize,
    pub pieces_placed: usize,
    pub placed_cells: usize,
    pub elapsed_ms: u64,
    pub placements: Vec<Placement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Vec<String>>,
}

impl RegionReport {
    pub fn new(
        index: usize,
        region: &Region,
        shapes: &[Shape],
        outcome: PackOutcome,
        elapsed: Duration,
        with_layout: bool,
    ) -> Self {
        let layout = with_layout.then(|| render_layout(&region.grid(), &outcome.result.placements));
        let result = outcome.result;

        Self {
            region: index,
            width: region.width,
            height: region.height,
            counts: region.counts.clone(),
            total_pieces: region.total_pieces(),
            required_cells: region.required_cells(shapes),
            grid_cells: region.width.saturating_mul(region.height),
            success: result.success,
            phase: outcome.phase,
            attempts: outcome.attempts,
            seed: result.seed,
            steps: result.steps,
            pieces_placed: result.placements.len(),
            placed_cells: outcome.placed_cells,
            elapsed_ms: elapsed.as_millis() as u64,
            placements: result.placements,
            layout,
        }
    }

    pub fn fill_ratio(&self) -> f64 {
        if self.grid_cells == 0 {
            0.0
        } else {
            self.required_cells as f64 / self.grid_cells as f64
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SolveReport {
    pub solved: usize,
    pub total: usize,
    pub regions: Vec<RegionReport>,
}

impl SolveReport {
    pub fn new(regions: Vec<RegionReport>) -> Self {
        Self {
            solved: regions.iter().filter(|r| r.success).count(),
            total: regions.len(),
            regions,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EstimateReport {
    pub factor: f64,
    pub plausible: usize,
    pub total: usize,
    pub regions: Vec<AreaEstimate>,
}

impl EstimateReport {
    pub fn new(factor: f64, regions: Vec<AreaEstimate>) -> Self {
        Self {
            factor,
            plausible: regions.iter().filter(|e| e.plausible).count(),
            total: regions.len(),
            regions,
        }
    }
}
