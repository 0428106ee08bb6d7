//! Multi-Store Command Front End Example
//!
//! Two stores with different configuration types share one root directory
//! and one command line. The first argument picks the store, the rest is
//! parsed into a [`Command`] and handed to [`RunStore::execute`].
//!
//! Run with:
//!   cargo run --example multi_store -- walk run '{"steps": 5, "drift": 0.1}'
//!   cargo run --example multi_store -- walk preset long
//!   cargo run --example multi_store -- decay reproduce "<run folder name>"
//!   cargo run --example multi_store -- decay plot /abs/path/to/run --absolute
//!
//! Without arguments a short scripted session is executed instead.

use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use trueno_runs::plot::{BytesFigure, Plot, Plotter};
use trueno_runs::{context, logging, Command, Location, RunStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WalkConfig {
    steps: usize,
    drift: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DecayConfig {
    half_life: f64,
    samples: usize,
}

fn walk(config: &WalkConfig) -> anyhow::Result<Vec<f64>> {
    let positions: Vec<f64> = (0..config.steps)
        .scan(0.0, |x, _| {
            *x += config.drift;
            Some(*x)
        })
        .collect();

    let mut log = context::open("positions.txt", context::OpenMode::Write)?;
    for p in &positions {
        writeln!(log, "{p}")?;
    }
    Ok(positions)
}

fn decay(config: &DecayConfig) -> anyhow::Result<Vec<f64>> {
    if config.half_life <= 0.0 {
        bail!("half life must be positive, got {}", config.half_life);
    }
    Ok((0..config.samples)
        .map(|t| 0.5_f64.powf(t as f64 / config.half_life))
        .collect())
}

fn series_plotter<C: 'static>(name: &str) -> Plotter<C, Vec<f64>> {
    Plotter::new(name, |_: &C, series: &Vec<f64>| {
        let csv: String = series.iter().map(|v| format!("{v}\n")).collect();
        Ok(Plot::single(BytesFigure::new(csv)))
    })
    .format("csv")
}

fn parse_command<C: DeserializeOwned>(args: &[String]) -> anyhow::Result<Command<C>> {
    let absolute = args.iter().any(|a| a == "--absolute");
    let positional: Vec<&str> = args
        .iter()
        .filter(|a| *a != "--absolute")
        .map(String::as_str)
        .collect();

    match positional.as_slice() {
        ["run", json] => Ok(Command::Run(
            serde_json::from_str(json).context("configuration is not valid JSON")?,
        )),
        ["preset", name] => Ok(Command::Preset((*name).to_string())),
        ["plot", location] => Ok(Command::Plot(Location::new(*location, absolute))),
        ["reproduce", location] => Ok(Command::Reproduce(Location::new(*location, absolute))),
        _ => bail!("usage: <store> run <json> | preset <name> | plot <location> | reproduce <location> [--absolute]"),
    }
}

fn dispatch(root: &Path, store: &str, args: &[String]) -> anyhow::Result<PathBuf> {
    let outcome = match store {
        "walk" => {
            let store = RunStore::builder(root, "walk", walk)
                .plotter(series_plotter("positions"))
                .preset("short", WalkConfig { steps: 5, drift: 0.5 })
                .preset("long", WalkConfig { steps: 500, drift: 0.01 })
                .build();
            store.execute(parse_command(args)?)?
        }
        "decay" => {
            let store = RunStore::builder(root, "decay", decay)
                .plotter(series_plotter("curve"))
                .preset("fast", DecayConfig { half_life: 2.0, samples: 20 })
                .build();
            store.execute(parse_command(args)?)?
        }
        other => bail!("unknown store '{other}' (known: walk, decay)"),
    };
    Ok(outcome.into_path())
}

fn scripted(root: &Path) -> anyhow::Result<()> {
    println!("=== trueno-runs multi-store session ===\n");

    println!("1. Running walk preset 'short'...");
    let walk_run = dispatch(root, "walk", &["preset".to_string(), "short".to_string()])?;
    println!("   Saved to {}", walk_run.display());

    println!("\n2. Running decay with an explicit configuration...");
    let decay_run = dispatch(
        root,
        "decay",
        &["run".to_string(), r#"{"half_life": 3.0, "samples": 8}"#.to_string()],
    )?;
    println!("   Saved to {}", decay_run.display());

    println!("\n3. Re-plotting the walk run by absolute path...");
    let plots = dispatch(
        root,
        "walk",
        &["plot".to_string(), walk_run.display().to_string(), "--absolute".to_string()],
    )?;
    println!("   Plots in {}", plots.display());

    println!("\n4. Reproducing the decay run by folder name...");
    let name = decay_run
        .file_name()
        .context("run folder has no name")?
        .to_string_lossy()
        .into_owned();
    let again = dispatch(root, "decay", &["reproduce".to_string(), name])?;
    println!("   Saved to {}", again.display());

    println!("\n5. A failing procedure keeps its configuration on disk...");
    match dispatch(
        root,
        "decay",
        &["run".to_string(), r#"{"half_life": 0.0, "samples": 3}"#.to_string()],
    ) {
        Ok(path) => println!("   Unexpectedly saved to {}", path.display()),
        Err(e) => println!("   Failed as expected: {e}"),
    }

    println!("\n=== Done ===");
    Ok(())
}

fn main() -> ExitCode {
    logging::init();

    let root = env::var_os("TRUENO_RUNS_DIR").map_or_else(|| PathBuf::from("runs"), PathBuf::from);
    let args: Vec<String> = env::args().skip(1).collect();

    let outcome = match args.split_first() {
        None => scripted(&root),
        Some((store, rest)) => dispatch(&root, store, rest).map(|_| ()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
