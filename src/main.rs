use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use polypack::config::Config;
use polypack::puzzle::Puzzle;
use polypack::PackResult;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Puzzle file (reads stdin when omitted)
    #[arg(global = true, short, long)]
    input: Option<PathBuf>,

    /// JSON file with search/estimate parameters; explicit flags win
    #[arg(global = true, long)]
    config: Option<PathBuf>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack every region (or one) and report the results
    Solve(cmd::solve::SolveArgs),
    /// Area-ratio guess per region without packing
    Estimate(cmd::estimate::EstimateArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading parameters from {}", path.display());
            Config::load_from_file(path).unwrap_or_else(|e| {
                error!("{}: {}", path.display(), e);
                process::exit(1);
            })
        }
        None => Config::default(),
    };

    let puzzle = load_puzzle(cli.input.as_deref()).unwrap_or_else(|e| {
        error!("Failed to read puzzle: {}", e);
        process::exit(1);
    });
    info!(
        "Loaded {} shapes and {} regions",
        puzzle.shapes.len(),
        puzzle.regions.len()
    );

    let outcome = match &cli.command {
        Commands::Solve(args) => {
            if let Some(sub) = matches.subcommand_matches("solve") {
                config.search.merge_from_cli(&args.search, sub);
            }
            config
                .search
                .validate()
                .and_then(|_| cmd::solve::run(args, &config.search, &puzzle))
        }
        Commands::Estimate(args) => {
            if let Some(sub) = matches.subcommand_matches("estimate") {
                config.estimate.merge_from_cli(&args.estimate, sub);
            }
            config
                .estimate
                .validate()
                .and_then(|_| cmd::estimate::run(args, &config.estimate, &puzzle))
        }
    };

    if let Err(e) = outcome {
        error!("{}", e);
        process::exit(1);
    }
}

fn load_puzzle(path: Option<&Path>) -> PackResult<Puzzle> {
    match path {
        Some(p) => {
            info!("Reading puzzle from {}", p.display());
            Puzzle::load_from_file(p)
        }
        None => {
            info!("Reading puzzle from stdin");
            Puzzle::load_from_reader(io::stdin().lock())
        }
    }
}
