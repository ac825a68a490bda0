use polypack::{Grid, Placement};

const LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Renders `placements` over `original`: obstructions as `#`, free cells as
/// `.`, and each placed piece with its own letter (labels repeat after 62).
pub fn render_layout(original: &Grid, placements: &[Placement]) -> Vec<String> {
    let mut rows: Vec<Vec<u8>> = (0..original.height())
        .map(|r| {
            (0..original.width())
                .map(|c| if original.is_occupied(r, c) { b'#' } else { b'.' })
                .collect()
        })
        .collect();

    for (i, p) in placements.iter().enumerate() {
        let label = LABELS[i % LABELS.len()];
        for (r, c) in p.shape.filled_cells() {
            rows[p.top_row + r][p.top_col + c] = label;
        }
    }

    rows.into_iter()
        .map(|row| String::from_utf8_lossy(&row).into_owned())
        .collect()
}

pub fn print_layout(region: usize, rows: &[String]) {
    println!("\nRegion {} layout:", region);
    for row in rows {
        println!("  {}", row);
    }
}
