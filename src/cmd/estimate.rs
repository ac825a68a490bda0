use crate::reports::{self, EstimateReport};
use clap::Args;
use polypack::config::{EstimateParams, OutputFormat};
use polypack::estimate::estimate_puzzle;
use polypack::puzzle::Puzzle;
use polypack::PackResult;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub estimate: EstimateParams,

    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

pub fn run(args: &EstimateArgs, params: &EstimateParams, puzzle: &Puzzle) -> PackResult<()> {
    info!("Estimating {} regions with factor {}", puzzle.regions.len(), params.factor);
    let report = EstimateReport::new(params.factor, estimate_puzzle(puzzle, params.factor));

    match args.format {
        OutputFormat::Text => {
            reports::print_estimate_report(&report.regions, &puzzle.regions);
            println!("\nPlausible regions: {}/{}", report.plausible, report.total);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
