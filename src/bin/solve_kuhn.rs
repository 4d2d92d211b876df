//! Kuhn poker solver binary.
//!
//! Usage:
//!   cargo run --release --bin solve_kuhn -- [OPTIONS]
//!
//! Trains n-player Kuhn poker with vanilla CFR, prints the expected value
//! per player and the average strategy, and writes the profile as JSON Lines.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cfr_engine::cfr::{CFRConfig, CFRSolver};
use cfr_engine::games::kuhn::{KuhnDealer, KuhnState, MAX_PLAYERS, MIN_PLAYERS};
use cfr_engine::SolverError;

#[derive(Parser, Debug)]
#[command(author, version, about = "Solve n-player Kuhn poker with CFR", long_about = None)]
struct Args {
    /// Number of CFR iterations
    #[arg(short, long, default_value_t = 100_000)]
    iterations: u64,

    /// Number of players
    #[arg(short, long, default_value_t = 2)]
    players: usize,

    /// Seed for the card dealer
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Worker threads (0 = all cores)
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Use CFR+ regret flooring and linear averaging
    #[arg(long)]
    fast: bool,

    /// Where to write the strategy profile
    #[arg(short, long, default_value = "kuhn_profile.jsonl")]
    output: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&args.players) {
        log::error!(
            "Kuhn poker needs {}..={} players, got {}",
            MIN_PLAYERS,
            MAX_PLAYERS,
            args.players
        );
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = if args.fast {
        CFRConfig::fast()
    } else {
        CFRConfig::default()
    };
    config.num_threads = if args.threads == 0 {
        None
    } else {
        Some(args.threads)
    };
    config.progress_interval = 0;

    let mut dealer = KuhnDealer::new(args.players, args.seed);
    let mut solver: CFRSolver<KuhnState> = CFRSolver::new(args.players, config)?;

    let progress = ProgressBar::new(args.iterations);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}] {msg}")?,
    );

    let interval = (args.iterations / 100).max(1);
    let result: Result<_, SolverError> = solver
        .train_with_callback(args.iterations, || dealer.deal(), interval, |stats| {
            progress.set_position(stats.iterations);
            progress.set_message(format!("{} info sets", stats.info_sets));
        })
        .map(|stats| stats.clone());
    progress.finish_and_clear();
    let stats = result?;

    println!(
        "Trained {} iterations in {:.2}s ({:.0} it/s)",
        stats.iterations, stats.elapsed_seconds, stats.iterations_per_second
    );
    for (player, value) in stats.expected_values.iter().enumerate() {
        println!("  Player {} expected value: {:+.4}", player, value);
    }

    let profile = solver.profile();
    println!("\nAverage strategy (Check, Bet):");
    for key in profile.keys() {
        let probs = profile.lookup(key)?;
        println!("  {:<12} {:.3}  {:.3}", key, probs[0], probs[1]);
    }

    profile.save(&args.output)?;
    println!("\nSaved {} information sets to {}", profile.len(), args.output.display());

    Ok(())
}
