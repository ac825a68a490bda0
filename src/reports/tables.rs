use super::RegionReport;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use polypack::estimate::AreaEstimate;
use polypack::puzzle::Region;

fn counts_label(counts: &[usize]) -> String {
    counts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn regions(reports: &[RegionReport]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Region").add_attribute(Attribute::Bold),
        Cell::new("Size"),
        Cell::new("Counts"),
        Cell::new("Need"),
        Cell::new("Fill"),
        Cell::new("Result").add_attribute(Attribute::Bold),
        Cell::new("Pieces"),
        Cell::new("Cells"),
        Cell::new("Tries"),
        Cell::new("Phase"),
        Cell::new("ms"),
    ]);

    for i in [3, 4, 6, 7, 8, 10] {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for r in reports {
        let result = if r.success {
            Cell::new("packed").fg(Color::Green)
        } else {
            Cell::new("failed").fg(Color::Red)
        };

        table.add_row(vec![
            Cell::new(r.region).add_attribute(Attribute::Bold),
            Cell::new(format!("{}x{}", r.width, r.height)),
            Cell::new(counts_label(&r.counts)),
            Cell::new(r.required_cells),
            Cell::new(format!("{:.1}%", r.fill_ratio() * 100.0)),
            result,
            Cell::new(format!("{}/{}", r.pieces_placed, r.total_pieces)),
            Cell::new(r.placed_cells),
            Cell::new(r.attempts),
            Cell::new(r.phase),
            Cell::new(r.elapsed_ms),
        ]);
    }
    println!("\n{}", table);
}

pub fn estimates(estimates: &[AreaEstimate], regions: &[Region]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Region").add_attribute(Attribute::Bold),
        Cell::new("Size"),
        Cell::new("Counts"),
        Cell::new("Need"),
        Cell::new("Area"),
        Cell::new("Fill").fg(Color::Cyan),
        Cell::new("Plausible").add_attribute(Attribute::Bold),
    ]);

    for i in 3..=5 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for (e, region) in estimates.iter().zip(regions) {
        let verdict = if e.plausible {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        };

        table.add_row(vec![
            Cell::new(e.region).add_attribute(Attribute::Bold),
            Cell::new(format!("{}x{}", region.width, region.height)),
            Cell::new(counts_label(&region.counts)),
            Cell::new(e.required_cells),
            Cell::new(e.grid_cells),
            Cell::new(format!("{:.1}%", e.fill_ratio * 100.0)).fg(Color::Cyan),
            verdict,
        ]);
    }
    println!("\n{}", table);
}
