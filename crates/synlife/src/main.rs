use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use synlife::config::RunConfig;
use synlife::headless::run_headless;
use synlife::SimulationConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Runner configuration file (default: synlife.ron if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulation preset in RON
    #[arg(long)]
    preset: Option<String>,

    /// Use the built-in demo arena with zones
    #[arg(long)]
    demo: bool,

    /// Number of ticks to run
    #[arg(long)]
    ticks: Option<u64>,

    /// Seconds per tick
    #[arg(long)]
    dt: Option<f32>,

    /// Run seed
    #[arg(long)]
    seed: Option<u64>,

    /// Population capacity
    #[arg(long)]
    capacity: Option<usize>,

    /// Number of founders
    #[arg(long)]
    founders: Option<usize>,

    /// Print the default simulation preset as RON and exit
    #[arg(long)]
    dump_preset: bool,

    /// Print per-creature episode summaries as RON after the run
    #[arg(long)]
    summaries: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if args.dump_preset {
        let preset = if args.demo {
            SimulationConfig::demo()
        } else {
            SimulationConfig::default()
        };
        println!("{}", preset.to_ron_string()?);
        return Ok(());
    }

    let mut config = RunConfig::load(args.config.as_deref())?;

    // Layer 4: command-line flags
    if let Some(preset) = args.preset {
        config.preset.path = Some(preset);
    }
    if args.demo {
        config.preset.demo = true;
    }
    if let Some(ticks) = args.ticks {
        config.run.ticks = ticks;
    }
    if let Some(dt) = args.dt {
        config.run.dt = dt;
    }
    if args.seed.is_some() {
        config.preset.seed = args.seed;
    }
    if args.capacity.is_some() {
        config.preset.capacity = args.capacity;
    }
    if args.founders.is_some() {
        config.preset.initial_population = args.founders;
    }

    log::info!("Starting synlife ({} ticks, dt {})", config.run.ticks, config.run.dt);
    let (_, episodes) = run_headless(&config)?;

    if args.summaries {
        let ron = ron::ser::to_string_pretty(&episodes, ron::ser::PrettyConfig::default())
            .context("Failed to serialize episode summaries")?;
        println!("{}", ron);
    }

    Ok(())
}
