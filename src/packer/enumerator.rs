use crate::grid::Grid;
use crate::packer::Placement;
use crate::shape::{RotationSet, Shape};
use fastrand::Rng;

const DIRS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Counts (filled cell, direction) pairs whose neighbour is off-grid or
/// already occupied.
pub fn contact_score(grid: &Grid, shape: &Shape, top_row: usize, top_col: usize) -> u32 {
    let h = grid.height() as isize;
    let w = grid.width() as isize;
    let mut contact = 0;

    for (r, c) in shape.filled_cells() {
        let gr = (top_row + r) as isize;
        let gc = (top_col + c) as isize;
        for (dr, dc) in DIRS {
            let nr = gr + dr;
            let nc = gc + dc;
            if nr < 0 || nr >= h || nc < 0 || nc >= w || grid.is_occupied(nr as usize, nc as usize)
            {
                contact += 1;
            }
        }
    }
    contact
}

/// Scans empty anchors row-major and returns the highest-scoring placement
/// covering one of them.
///
/// Every placement whose footprint covers the anchor is tried, by aligning
/// each filled cell of each rotation with it. The scan commits once
/// `lookahead` anchors have yielded a feasible placement (`1` = first
/// productive anchor, `0` = never commit early). `scan_cap > 0` bounds the
/// number of empty anchors inspected.
pub fn best_placement(
    grid: &Grid,
    rotation_sets: &[RotationSet],
    remaining: &[usize],
    rng: &mut Rng,
    scan_cap: usize,
    lookahead: usize,
) -> Option<Placement> {
    let mut best: Option<Placement> = None;
    let mut scanned = 0;
    let mut productive = 0;
    let mut type_order: Vec<usize> = Vec::with_capacity(rotation_sets.len());

    for anchor_r in 0..grid.height() {
        for anchor_c in 0..grid.width() {
            if grid.is_occupied(anchor_r, anchor_c) {
                continue;
            }
            scanned += 1;
            if scan_cap > 0 && scanned > scan_cap {
                return best;
            }

            type_order.clear();
            type_order.extend((0..rotation_sets.len()).filter(|&t| remaining[t] > 0));
            rng.shuffle(&mut type_order);

            let mut found_here = false;
            for &t in &type_order {
                for (ri, shape) in rotation_sets[t].rotations.iter().enumerate() {
                    for (pr, pc) in shape.filled_cells() {
                        let top_row = anchor_r as isize - pr as isize;
                        let top_col = anchor_c as isize - pc as isize;
                        if !grid.can_place(shape, top_row, top_col) {
                            continue;
                        }
                        let (top_row, top_col) = (top_row as usize, top_col as usize);
                        let score = contact_score(grid, shape, top_row, top_col);
                        found_here = true;
                        if best.as_ref().map_or(true, |b| score > b.score) {
                            best = Some(Placement {
                                type_index: t,
                                rotation_index: ri,
                                top_row,
                                top_col,
                                shape: shape.clone(),
                                score,
                            });
                        }
                    }
                }
            }

            if found_here {
                productive += 1;
                if lookahead > 0 && productive >= lookahead {
                    return best;
                }
            }
        }
    }

    best
}
