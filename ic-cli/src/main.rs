//! icsim - IC Simulator
//! Command-line interface for documenting chips and running scripted simulations

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ic_core::prelude::*;
use ic_core::{MemoryWorld, MessageLog};
use ic_logic::clock::{DEFAULT_PERIOD, MAX_PERIOD, MIN_PERIOD};
use ic_orchestration::{Engine, EngineConfig, render_ic_table, substitute_ic_table};

#[derive(Parser)]
#[command(name = "icsim")]
#[command(author = "IC Simulator Contributors")]
#[command(version = "2026.10.17")]
#[command(about = "icsim - integrated circuits for block worlds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the IC documentation table
    Docs {
        /// Print rows as JSON instead of reStructuredText
        #[arg(long)]
        json: bool,

        /// Template file whose %IC_TABLE% placeholder is replaced
        #[arg(short, long, value_name = "TEMPLATE")]
        template: Option<PathBuf>,
    },

    /// Place one IC in an empty world and run it for a number of ticks
    Simulate {
        /// Chip type as written on the marker (e.g. "clock", "and:siso")
        #[arg(short, long)]
        chip: String,

        /// Configuration line (line 2 of the marker)
        #[arg(long, default_value = "")]
        config: String,

        /// Ticks to run
        #[arg(short, long, default_value_t = 40)]
        ticks: u64,

        /// Facing of the marker
        #[arg(short, long, default_value = "north")]
        facing: Direction,

        /// Engine configuration file (TOML)
        #[arg(short, long, value_name = "FILE", env = "IC_ENGINE_CONFIG")]
        engine_config: Option<PathBuf>,

        /// Toggle input PIN after tick TICK, written TICK:PIN (repeatable)
        #[arg(long, value_name = "TICK:PIN", value_parser = parse_toggle)]
        toggle: Vec<(u64, usize)>,

        /// Print the trace as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show registered chips and pin families
    Info {
        /// Engine configuration file (TOML)
        #[arg(short, long, value_name = "FILE", env = "IC_ENGINE_CONFIG")]
        engine_config: Option<PathBuf>,
    },
}

fn parse_toggle(text: &str) -> Result<(u64, usize), String> {
    let (tick, pin) = text
        .split_once(':')
        .ok_or_else(|| format!("expected TICK:PIN, got '{}'", text))?;
    let tick = tick.trim().parse().map_err(|_| format!("invalid tick '{}'", tick))?;
    let pin = pin.trim().parse().map_err(|_| format!("invalid pin '{}'", pin))?;
    Ok((tick, pin))
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "ic_orchestration=info,icsim=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Docs { json, template } => docs_command(json, template.as_deref()),
        Commands::Simulate {
            chip,
            config,
            ticks,
            facing,
            engine_config,
            toggle,
            json,
        } => simulate_command(&chip, &config, ticks, facing, engine_config.as_deref(), &toggle, json),
        Commands::Info { engine_config } => info_command(engine_config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

fn docs_command(json: bool, template: Option<&Path>) -> Result<()> {
    let engine = Engine::new(EngineConfig::default())?;
    let rows = engine.registry().rows();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    match template {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            print!("{}", substitute_ic_table(&text, &rows));
        }
        None => print!("{}", render_ic_table(&rows)),
    }
    Ok(())
}

fn info_command(engine_config: Option<&Path>) -> Result<()> {
    let config = load_config(engine_config)?;
    let engine = Engine::new(config)?;

    println!("{}", "icsim - IC Simulator".cyan().bold());
    println!("Version: 2026.10.17");
    println!();
    println!("{}", "Chips:".bold());
    for definition in engine.registry().iter() {
        let triggering = if definition.is_self_triggering() {
            "self-triggering".yellow()
        } else {
            "".normal()
        };
        println!(
            "  {} {:<9} {:<10} {:<5} {}",
            definition.model_id().green(),
            definition.shorthand_id(),
            definition.name(),
            definition.default_family(),
            triggering
        );
    }
    println!();
    println!("{} {}", "Pin families:".bold(), engine.pin_sets().names().join(", "));
    println!(
        "{} {}..{} ticks (default {})",
        "Clock period:".bold(),
        MIN_PERIOD,
        MAX_PERIOD,
        DEFAULT_PERIOD
    );
    println!(
        "{} self_triggering={} load_delay_ticks={}",
        "Engine:".bold(),
        engine.config().self_triggering,
        engine.config().load_delay_ticks
    );
    Ok(())
}

/// Uma linha do trace
#[derive(Serialize)]
struct TraceRow {
    tick: u64,
    inputs: Vec<bool>,
    outputs: Vec<bool>,
}

fn simulate_command(
    chip: &str,
    config_line: &str,
    ticks: u64,
    facing: Direction,
    engine_config: Option<&Path>,
    toggles: &[(u64, usize)],
    json: bool,
) -> Result<()> {
    let config = load_config(engine_config)?;
    let mut engine = Engine::new(config)?;
    engine.start()?;

    let mut world = MemoryWorld::new();
    let spot = Location::new(0, 64, 0);
    world.place_marker(spot, Marker::wall(facing, ["", chip, config_line, ""]));

    let mut lines = world
        .marker(spot)
        .map(|marker| marker.lines.clone())
        .ok_or_else(|| anyhow!("marker vanished at {}", spot))?;
    let mut creator = MessageLog::new("icsim");
    let created = engine.create_ic(&world, spot, &mut lines, &mut creator);
    for message in creator.messages() {
        eprintln!("{} {}", "  Creator".green().bold(), message);
    }
    let definition = created?;
    world.set_lines(spot, lines);
    tracing::debug!(chip = %definition.shorthand_id(), ticks, toggles = toggles.len(), "simulation starting");

    if !json {
        println!(
            "{} {} ({}) facing {} for {} ticks",
            "  Simulating".green().bold(),
            definition.name().cyan(),
            definition.shorthand_id(),
            facing,
            ticks
        );
    }

    for tick in 1..=ticks {
        engine.tick(&mut world)?;

        for (_, pin) in toggles.iter().filter(|(at, _)| *at == tick) {
            let instance = engine
                .instance(spot)
                .ok_or_else(|| anyhow!("no IC at {}", spot))?;
            let direction = instance
                .direction_for_pin(Pin::Input(*pin))
                .ok_or_else(|| anyhow!("{} has no input pin {}", definition.shorthand_id(), pin))?;
            let neighbour = spot.relative(direction);
            world.set_powered(neighbour, !world.is_powered(neighbour));
            engine.notify_neighbors(&mut world, spot, &[direction])?;
        }

        let row = trace_row(&engine, &world, spot, tick)?;
        if json {
            println!("{}", serde_json::to_string(&row)?);
        } else {
            println!(
                "{:>6}  in {}  out {}",
                tick,
                levels(&row.inputs),
                levels(&row.outputs).bold()
            );
        }
    }

    let stats = engine.stats();
    engine.shutdown();
    if !json {
        println!(
            "{} {} ticks, {} thinks, {} faults, {} events",
            "    Finished".green().bold(),
            stats.tick,
            stats.scheduler.thinks,
            stats.scheduler.faults,
            stats.events_published
        );
    }
    Ok(())
}

fn trace_row(engine: &Engine, world: &MemoryWorld, spot: Location, tick: u64) -> Result<TraceRow> {
    let instance = engine.instance(spot).ok_or_else(|| anyhow!("no IC at {}", spot))?;
    let pin_set = instance.pin_set();

    let inputs = (0..pin_set.input_count())
        .map(|pin| {
            instance
                .direction_for_pin(Pin::Input(pin))
                .is_some_and(|direction| world.is_powered(spot.relative(direction)))
        })
        .collect();
    let outputs = (0..pin_set.output_count())
        .map(|pin| {
            instance
                .direction_for_pin(Pin::Output(pin))
                .is_some_and(|direction| world.is_powered(spot.relative(direction)))
        })
        .collect();

    Ok(TraceRow { tick, inputs, outputs })
}

fn levels(levels: &[bool]) -> String {
    if levels.is_empty() {
        return "-".to_string();
    }
    levels.iter().map(|level| if *level { '1' } else { '0' }).collect()
}
