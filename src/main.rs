use anyhow::{Context, Result};
use capsim_lib::model::config::AppConfig;
use capsim_lib::model::environment::Environment;
use capsim_lib::model::world::World;
use clap::Parser;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path; defaults are used if it does not exist
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Number of ticks to run (overrides `world.ticks`)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// World seed (overrides `world.seed`)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory for event logs, population frames and the lineage archive
    #[arg(short, long, default_value = "logs")]
    log_dir: String,

    /// Ticks between population frames (overrides `world.export_interval`)
    #[arg(long)]
    export_interval: Option<u64>,

    /// Initial population size (overrides `world.initial_population`)
    #[arg(short, long)]
    population: Option<usize>,
}

fn load_config(path: &str) -> Result<AppConfig> {
    if Path::new(path).exists() {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
        AppConfig::from_toml(&content).with_context(|| format!("loading config {path}"))
    } else {
        tracing::warn!(path = path, "Config file not found, using defaults");
        Ok(AppConfig::default())
    }
}

fn main() -> Result<()> {
    capsim_core::init_logging();
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(ticks) = args.ticks {
        config.world.ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }
    if let Some(interval) = args.export_interval {
        config.world.export_interval = interval;
    }
    if let Some(population) = args.population {
        config.world.initial_population = population;
    }

    let mut env = Environment::from_config(&config);
    let ticks = config.world.ticks;
    let mut world = World::new_at(config, &args.log_dir)?;
    tracing::info!(ticks = ticks, log_dir = %args.log_dir, "Running headless");

    world.run(&mut env, ticks)?;
    world.finalize()?;
    Ok(())
}
