pub mod enumerator;
pub mod runner;
pub mod search;

pub use self::runner::{can_pack, AttemptSummary, PackOutcome, Packer, Phase, ProgressCallback};
pub use self::search::run_attempt;

use crate::grid::Grid;
use crate::shape::Shape;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One rotated shape positioned on the grid. Only valid against the grid
/// state it was generated for.
#[derive(Debug, Clone, Serialize)]
pub struct Placement {
    pub type_index: usize,
    pub rotation_index: usize,
    pub top_row: usize,
    pub top_col: usize,
    #[serde(skip)]
    pub shape: Arc<Shape>,
    pub score: u32,
}

#[derive(Debug, Clone)]
pub struct AttemptConfig {
    pub step_budget: usize,
    pub remove_min: usize,
    pub remove_max: usize,
    pub seed: u64,
    pub scan_cap: usize,
    pub lookahead: usize,
}

#[derive(Debug, Clone)]
pub struct AttemptResult {
    pub success: bool,
    pub grid: Grid,
    pub placements: Vec<Placement>,
    pub seed: u64,
    pub steps: usize,
    pub cancelled: bool,
}

impl AttemptResult {
    /// Result for inputs rejected before any search took place.
    pub fn rejected(grid: &Grid) -> Self {
        Self {
            success: false,
            grid: grid.clone(),
            placements: Vec::new(),
            seed: 0,
            steps: 0,
            cancelled: false,
        }
    }
}

/// Shared stop flag, checked once per search step. A child token also
/// observes its parent, so a run can stop its own workers without touching
/// the caller's token.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    parent: Option<Arc<AtomicBool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(self.is_cancelled())),
            parent: Some(self.flag.clone()),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self
                .parent
                .as_ref()
                .is_some_and(|p| p.load(Ordering::Relaxed))
    }
}
