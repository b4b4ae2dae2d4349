//! GOAP demo CLI.
//!
//! - `goap run` - tick a worker through the demo world until its goal holds
//! - `goap plan` - print the plan the worker would start with

mod actions;
mod config;
mod rng;
mod scenario;
mod worker;
mod world;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use goap_core::{ContextPool, TickContext, WorldView};
use goap_planner::{GoapBrain, GoapPlanner, PlanRequest};
use goap_tools::Tracer;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{DemoConfig, Role};
use crate::scenario::Scenario;
use crate::worker::Worker;
use crate::world::DemoWorld;

#[derive(Parser)]
#[command(name = "goap")]
#[command(about = "Goal-oriented action planning demo", version)]
struct Cli {
    /// YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo world tick by tick
    Run {
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,

        /// Worker role
        #[arg(long, value_enum)]
        role: Option<Role>,

        /// Seed for unknown pile contents
        #[arg(long)]
        seed: Option<u64>,

        /// Write the agent's trace events to this file as JSON
        #[arg(long)]
        trace: Option<PathBuf>,
    },

    /// Print the first plan and its cost
    Plan {
        /// Worker role
        #[arg(long, value_enum)]
        role: Option<Role>,

        /// Seed for unknown pile contents
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let mut config = DemoConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            ticks,
            role,
            seed,
            trace,
        } => {
            apply_overrides(&mut config, role, seed);
            let ticks = ticks.unwrap_or(config.max_ticks);
            run_demo(&config, ticks, trace.as_deref())
        }
        Commands::Plan { role, seed } => {
            apply_overrides(&mut config, role, seed);
            show_plan(&config)
        }
    }
}

fn apply_overrides(config: &mut DemoConfig, role: Option<Role>, seed: Option<u64>) {
    if let Some(role) = role {
        config.role = role;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }
}

fn run_demo(config: &DemoConfig, ticks: u64, trace: Option<&Path>) -> Result<()> {
    let mut scenario = Scenario::new(config);
    tracing::info!(role = ?config.role, goal = %scenario.goal, "Starting demo");

    let worker = Worker::new(scenario.goal.clone(), config.move_speed);
    let actions = std::mem::take(&mut scenario.actions);
    let tracer = match trace {
        Some(_) => Tracer::new().with_log(),
        None => Tracer::new(),
    };
    let mut brain = GoapBrain::new(scenario.agent, actions, worker, config.brain.clone())
        .with_tracer(tracer);

    let mut ctx = TickContext::new(config.dt_seconds);
    let mut reached = false;
    let mut ran = 0;
    for _ in 0..ticks {
        ran += 1;
        brain
            .tick(&ctx, &mut scenario.world)
            .context("Planner setup error")?;
        if scenario.is_done() {
            reached = true;
            break;
        }
        ctx = ctx.advance();
    }

    let stats = brain.behavior.stats;
    println!("Role:           {:?}", config.role);
    println!("Ticks:          {ran} ({:.1}s)", ctx.time_seconds);
    println!(
        "Plans:          {} calls, {} found, {} failed, {} aborted, {} finished",
        brain.plan_calls(),
        stats.plans_found,
        stats.plans_failed,
        stats.plans_aborted,
        stats.plans_finished,
    );
    println!("Piles searched: {}", scenario.searched());
    if let Some(state) = scenario.world.state(scenario.agent) {
        println!("Inventory:      {state}");
    }

    if let Some(path) = trace {
        let log = brain.tracer_mut().take_log().unwrap_or_default();
        let json = serde_json::to_string_pretty(&log).context("Failed to encode trace")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write trace: {}", path.display()))?;
        println!("Trace:          {} events -> {}", log.events.len(), path.display());
    }

    if !reached {
        bail!("goal {} not reached after {} ticks", scenario.goal, ticks);
    }
    println!("Goal reached:   {}", scenario.goal);
    Ok(())
}

fn show_plan(config: &DemoConfig) -> Result<()> {
    let scenario = Scenario::new(config);
    let mut planner =
        GoapPlanner::<DemoWorld>::new().with_config(config.brain.planner.clone());
    let mut pool = ContextPool::with_capacity(
        config.brain.context_pool_capacity,
        config.brain.context_pool_growth,
    );

    let request = PlanRequest {
        agent: scenario.agent,
        actions: &scenario.actions,
        goal: &scenario.goal,
    };
    let plan = planner
        .plan(request, &scenario.world, &mut pool)
        .with_context(|| format!("No plan for {}", scenario.goal))?;

    println!("Goal:       {}", scenario.goal);
    println!("Plan:       {}", plan.pretty(&scenario.world));
    println!("Cost:       {:.2}", plan.cost);
    println!("Expansions: {}", plan.expansions);
    plan.release(&mut pool);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "goap", "-v", "run", "--ticks", "50", "--role", "pirate", "--seed", "9",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                ticks, role, seed, ..
            } => {
                assert_eq!(ticks, Some(50));
                assert_eq!(role, Some(Role::Pirate));
                assert_eq!(seed, Some(9));
            }
            Commands::Plan { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut config = DemoConfig::default();
        apply_overrides(&mut config, Some(Role::Creature), Some(3));
        assert_eq!(config.role, Role::Creature);
        assert_eq!(config.seed, 3);
    }
}
