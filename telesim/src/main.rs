use anyhow::{Context as _, Result};
use clap::Parser;
use std::{fs, path::PathBuf};
use telesim::{CapacityOverride, RateOverride, Simulation, SimulationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run the telecommunication traffic simulation and print its final
/// statistics as JSON.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON network configuration, the default five nodes network otherwise
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// seed of the destination picker, overrides the configuration's
    #[arg(long)]
    seed: Option<u64>,

    /// number of ticks to run
    #[arg(long, default_value_t = 10)]
    ticks: u64,

    /// move to the next time slot every N ticks, 0 to stay on the first
    #[arg(long, value_name = "N", default_value_t = 0)]
    advance_every: u64,

    /// set the rate of a node in every time slot
    #[arg(long = "rate", value_name = "NODE=RATE")]
    rates: Vec<RateOverride>,

    /// set the capacity of a link
    #[arg(long = "capacity", value_name = "FROM-TO=CAPACITY")]
    capacities: Vec<CapacityOverride>,

    /// pretty print the statistics
    #[arg(long)]
    pretty: bool,
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.set_seed(seed);
    }
    for rate in &args.rates {
        rate.apply(&mut config);
    }

    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = load_config(&args)?;
    let mut simulation = Simulation::new(config).context("Invalid simulation configuration")?;
    for capacity in &args.capacities {
        capacity
            .apply(&mut simulation)
            .with_context(|| format!("Cannot set the capacity of {}", capacity.link))?;
    }

    simulation.start();
    for tick in 1..=args.ticks {
        simulation.tick();

        if args.advance_every != 0 && tick % args.advance_every == 0 {
            simulation.advance_time_slot();
        }
    }
    simulation.pause();

    let stats = simulation.stats();
    info!(
        step = %stats.simulation_step,
        generated = stats.summary.total_packets_generated,
        transmitted = stats.summary.total_packets_transmitted,
        loss = stats.summary.packet_loss,
        "simulation finished"
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&stats)
    } else {
        serde_json::to_string(&stats)
    }
    .context("Failed to serialize the statistics")?;
    println!("{json}");

    Ok(())
}
