use clap::Parser;
use log::LevelFilter;
use rummikub_cover::json::SolverResult;
use rummikub_cover::{CoveredTable, SolverConfig, TileBag, solve_with_config};
use std::process::ExitCode;

/// Decide whether tiles from your hand can extend the Rummikub table
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Tiles on the table, comma separated (e.g. "1r,2r,3r,4b,4n,4o,j")
    #[arg(short, long, value_delimiter = ',', num_args = 0..)]
    table: Vec<String>,

    /// Tiles in your hand, comma separated (e.g. "3b,2r,j")
    #[arg(short = 'H', long, value_delimiter = ',', num_args = 0..)]
    hand: Vec<String>,

    /// Stop searching after this many milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Count a table rebuilt without any hand tile as playable
    #[arg(long)]
    accept_exact_cover: bool,

    /// Print the verdict as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    // Let RUST_LOG override our defaults if explicitly set
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let table = TileBag::from_tokens(cli.table.iter().filter(|t| !t.trim().is_empty()))?;
    let hand = TileBag::from_tokens(cli.hand.iter().filter(|t| !t.trim().is_empty()))?;
    log::debug!(
        "table: {} tiles, hand: {} tiles",
        table.total(),
        hand.total()
    );

    let config = SolverConfig {
        time_limit_ms: cli.time_limit_ms,
        covered_table: if cli.accept_exact_cover {
            CoveredTable::Accept
        } else {
            CoveredTable::SpareRow
        },
    };
    let solution = solve_with_config(&table, &hand, &config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&SolverResult::from(&solution))?);
        return Ok(());
    }

    if solution.solvable {
        println!("You can play! Here is how:");
        for meld in &solution.sets {
            println!("  {meld}");
        }
    } else if solution.search_completed {
        println!("Looks like you can't play.");
    } else {
        println!("No way to play found before the time limit.");
    }
    log::info!(
        "explored {} nodes, deepest branch used {} sets",
        solution.nodes_visited,
        solution.depth_reached
    );
    Ok(())
}
