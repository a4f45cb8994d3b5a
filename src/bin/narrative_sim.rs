//! Narrative contagion runner
//! Runs one scenario, or the same scenario over a range of seeds

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use narrative_contagion::core::{Result, SimulationConfig};
use narrative_contagion::simulation::{consecutive_seeds, run_seeds, simulate, SummaryStats};

/// Narrative Contagion - SEIRS disinformation spread on a scale-free network
#[derive(Parser, Debug)]
#[command(name = "narrative_sim")]
#[command(about = "Simulate a disinformation narrative spreading through a population")]
struct Args {
    /// TOML scenario file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the population size
    #[arg(long)]
    population: Option<usize>,

    /// Maximum steps to run
    #[arg(long, default_value_t = 365)]
    steps: u64,

    /// Random seed (first seed of a batch)
    #[arg(long)]
    seed: Option<u64>,

    /// Seeding strategy: random, hub_targeted or archetype_proportional
    #[arg(long)]
    strategy: Option<String>,

    /// Run this many consecutive seeds and report summary statistics
    #[arg(long)]
    batch: Option<u64>,

    /// Write the full JSON output here
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(population) = args.population {
        config.population = population;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(strategy) = args.strategy {
        config.seeding_strategy = strategy;
    }
    config.validate()?;

    println!("Narrative Contagion");
    println!("===================");
    println!(
        "Population: {} (m = {}), seeding: {}",
        config.population, config.edges_per_node, config.seeding_strategy
    );
    println!(
        "Narrative: beta0={} emo={} idw={} p0={}",
        config.narrative.baseline_transmission,
        config.narrative.emotional_intensity,
        config.narrative.identity_weight,
        config.narrative.initial_seeding
    );
    println!();

    if let Some(count) = args.batch {
        let seeds = consecutive_seeds(config.seed.unwrap_or(0), count);
        let report = run_seeds(&config, &seeds, args.steps)?;

        println!("--- Batch of {} seeds ---", report.runs.len());
        for (name, stats) in [
            ("R0", report.r0),
            ("peak infected", report.peak_infected),
            ("peak fraction", report.peak_pct),
            ("time to peak", report.time_to_peak),
            ("attack rate", report.attack_rate),
        ] {
            print_stats(name, stats);
        }

        if let Some(path) = &args.output {
            std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
            println!("\nBatch report written to {}", path.display());
        }
        return Ok(());
    }

    let output = simulate(&config, args.steps)?;
    println!("{}", output.summary());

    if let Some(path) = &args.output {
        std::fs::write(path, output.to_json()?)?;
        println!("\nFull output written to {}", path.display());
    }

    Ok(())
}

fn print_stats(name: &str, stats: Option<SummaryStats>) {
    match stats {
        Some(s) => println!(
            "{:<14} mean {:>9.3}  std {:>8.3}  min {:>9.3}  max {:>9.3}",
            name, s.mean, s.std, s.min, s.max
        ),
        None => println!("{:<14} n/a", name),
    }
}
