use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use fairdiv::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "fairdiv")]
#[command(about = "Look for envy-free allocations of random valuations by sampling", long_about = None)]
struct Args {
    /// Number of agents
    #[arg(short, long, default_value = "3")]
    agents: usize,

    /// Number of items
    #[arg(short, long, default_value = "5")]
    items: usize,

    /// Smallest valuation
    #[arg(long, default_value = "0")]
    min_value: Value,

    /// Upper bound for valuations
    #[arg(long, default_value = "10")]
    max_value: Value,

    /// Give every item of a row a different value when the range allows it
    #[arg(long)]
    distinct: bool,

    /// Random allocations tried per matrix
    #[arg(short = 'n', long, default_value = "1000")]
    simulations: usize,

    /// Minimum bundle size
    #[arg(long, default_value = "1")]
    min_items: usize,

    /// Maximum bundle size (unbounded if omitted)
    #[arg(long)]
    max_items: Option<usize>,

    /// Only accept allocations that hand out every item
    #[arg(long)]
    force_all: bool,

    /// Retries allowed for --force-all
    #[arg(long, default_value = "10000")]
    max_attempts: usize,

    /// Survey this many random matrices instead of a single one
    #[arg(short, long)]
    matrices: Option<usize>,

    /// Seed for the random number generator
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output
    #[arg(long)]
    json: bool,
}

fn run(args: &Args) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let params = ValuationParams::new(args.agents, args.items, args.max_value)
        .min_value(args.min_value)
        .allow_item_equality(!args.distinct);
    let constraints = AllocationConstraints::default()
        .min_items(args.min_items)
        .max_items(args.max_items)
        .force_allocate_all(args.force_all)
        .max_attempts(args.max_attempts);

    let now = Instant::now();
    if let Some(n_matrices) = args.matrices {
        let report = survey(&params, n_matrices, args.simulations, &constraints, &mut rng)?;
        println!("envy-free allocation found for {} of {} matrices", report.possible, report.total);
        if let Some(m) = report.counterexample {
            println!("first matrix without one:\n{m}");
        }
    } else {
        let valuations = ValuationMatrix::random(&params, &mut rng)?;
        let outcome = is_envy_freeness_possible(&valuations, args.simulations, &constraints, &mut rng)?;
        if args.json {
            match serde_json::to_string_pretty(&outcome) {
                Ok(json) => println!("{json}"),
                Err(e) => error!("failed to serialize outcome: {e}"),
            }
        } else {
            println!("{valuations}");
            match (&outcome.example_allocation, outcome.match_sim_index) {
                (Some(alloc), Some(sim)) => {
                    println!("envy-free allocation found at simulation {sim}:");
                    print!("{}", alloc.display(&valuations));
                }
                _ => println!("no envy-free allocation in {} simulations", args.simulations),
            }
        }
    }
    info!("Time: {} seconds", now.elapsed().as_secs_f64());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to set tracing subscriber");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
