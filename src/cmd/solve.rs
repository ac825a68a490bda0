use crate::reports::{self, RegionReport, SolveReport};
use clap::Args;
use polypack::config::{OutputFormat, SearchParams};
use polypack::packer::{AttemptSummary, Packer, ProgressCallback};
use polypack::puzzle::{Puzzle, Region};
use polypack::{PackError, PackResult};
use std::time::Instant;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[command(flatten)]
    pub search: SearchParams,

    /// Solve only this region (0-based, in file order)
    #[arg(short, long)]
    pub region: Option<usize>,

    /// Print the packed grid of each region
    #[arg(short, long, default_value_t = false)]
    pub layout: bool,

    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

struct CliLogger {
    region: usize,
}

impl ProgressCallback for CliLogger {
    fn on_attempt(&self, s: &AttemptSummary) -> bool {
        if s.success || s.index % 20 == 0 {
            info!(
                "Region {} | Attempt {:3} ({}) | {} pieces, {} cells",
                self.region, s.index, s.phase, s.pieces_placed, s.placed_cells
            );
        }
        true
    }
}

pub fn run(args: &SolveArgs, params: &SearchParams, puzzle: &Puzzle) -> PackResult<()> {
    let selected: Vec<(usize, &Region)> = match args.region {
        Some(i) => {
            let region = puzzle.regions.get(i).ok_or_else(|| {
                PackError::Validation(format!(
                    "region {} does not exist ({} regions)",
                    i,
                    puzzle.regions.len()
                ))
            })?;
            vec![(i, region)]
        }
        None => puzzle.regions.iter().enumerate().collect(),
    };

    let text = args.format == OutputFormat::Text;
    let packer = Packer::new(params.clone());
    let mut results = Vec::with_capacity(selected.len());

    for (index, region) in selected {
        info!(
            "Region {}: {}x{} with {} pieces",
            index,
            region.width,
            region.height,
            region.total_pieces()
        );
        let start = Instant::now();
        let outcome = packer.run(
            &region.grid(),
            &puzzle.shapes,
            &region.counts,
            CliLogger { region: index },
        );
        let report = RegionReport::new(
            index,
            region,
            &puzzle.shapes,
            outcome,
            start.elapsed(),
            args.layout,
        );

        if text {
            println!(
                "Region {} ({}x{}): {} {}/{} pieces, {} cells, {} attempts",
                report.region,
                report.width,
                report.height,
                if report.success { "packed" } else { "failed" },
                report.pieces_placed,
                report.total_pieces,
                report.placed_cells,
                report.attempts
            );
            if let Some(rows) = &report.layout {
                reports::print_layout(report.region, rows);
            }
        }
        results.push(report);
    }

    let summary = SolveReport::new(results);
    match args.format {
        OutputFormat::Text => {
            reports::print_solve_report(&summary.regions);
            println!("\nPackable regions: {}/{}", summary.solved, summary.total);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}
