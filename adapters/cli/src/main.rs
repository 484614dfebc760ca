#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Percent Maze collection lessons in a terminal.

mod app;
mod input;
mod lesson;
mod render;
mod settings;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use percent_maze_core::{Tally, Variant};
use percent_maze_driver::Simulation;
use percent_maze_handoff::{persist_tally, resolve_tally, FileStore, TallySource};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::{App, Flow};

/// Command-line arguments accepted by the `percent-maze` binary.
#[derive(Debug, Parser)]
#[command(
    name = "percent-maze",
    about = "Collect animals in a maze, then learn percentages from your haul."
)]
pub(crate) struct Args {
    /// TOML settings file; flags override its values.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Lesson screen to run.
    #[arg(long)]
    pub(crate) variant: Option<Variant>,
    /// Seed for the first run; later restarts count up from it.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Side length of the square maze.
    #[arg(long)]
    pub(crate) grid_size: Option<u32>,
    /// JSON document the completed tally is handed off through.
    #[arg(long)]
    pub(crate) store: Option<PathBuf>,
    /// Keys to play without reading stdin, e.g. "ddss..wq".
    #[arg(long)]
    pub(crate) script: Option<String>,
    /// Simulated milliseconds that pass per key press.
    #[arg(long, default_value_t = 100)]
    pub(crate) step_ms: u64,
}

/// Entry point for the Percent Maze command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let settings = settings::load(&args)?;
    info!(variant = %settings.variant, seed = settings.seed, "starting");

    let mut store = FileStore::open(&settings.store)
        .with_context(|| format!("failed to open store {}", settings.store.display()))?;
    let simulation =
        Simulation::new(settings.config.clone()).context("invalid session configuration")?;
    let mut app = App::new(
        simulation,
        settings.variant,
        Duration::from_millis(args.step_ms),
        settings.seed,
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let outcome = match &args.script {
        Some(script) => run_script(&mut app, script, &mut out)?,
        None => run_interactive(&mut app, &mut out)?,
    };

    if let Flow::Finished(tally) = outcome {
        persist_tally(&mut store, &tally)
            .with_context(|| format!("failed to persist tally to {}", store.path().display()))?;
        let (tally, source) = resolve_tally(app.simulation().published_tally(), &store);
        write_summary(settings.variant, &tally, source, &mut out)?;
    }

    out.flush()?;
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_script<W: Write>(app: &mut App, script: &str, out: &mut W) -> Result<Flow> {
    let mut flow = app.start(out)?;
    for action in input::parse_line(script) {
        if flow != Flow::Continue {
            break;
        }
        flow = app.apply(action, out)?;
    }
    app.render(out)?;
    Ok(flow)
}

fn run_interactive<W: Write>(app: &mut App, out: &mut W) -> Result<Flow> {
    let mut flow = app.start(out)?;
    app.render(out)?;
    writeln!(out, "Move with WASD or arrows, '.' waits, r restarts, q quits.")?;
    out.flush()?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read from stdin")?;
        for action in input::parse_line(&line) {
            flow = app.apply(action, out)?;
            if flow != Flow::Continue {
                break;
            }
        }
        app.render(out)?;
        out.flush()?;
        if flow != Flow::Continue {
            break;
        }
    }
    Ok(flow)
}

fn write_summary<W: Write>(
    variant: Variant,
    tally: &Tally,
    source: TallySource,
    out: &mut W,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "Lesson summary ({source:?}):")?;
    for line in lesson::summary_lines(variant, tally) {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}
