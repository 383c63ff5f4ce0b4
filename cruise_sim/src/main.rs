//! # cruise-sim - Cruise control simulator
//!
//! Runs a PI speed controller against the nonlinear vehicle model.
//!
//! Usage:
//!   cruise-sim run                               # Reference scenario
//!   cruise-sim run --config highway.toml --csv out.csv
//!   cruise-sim sweep --load 0,200,400 --kc 2,4.17 # Parallel what-if runs
//!   cruise-sim config > scenario.toml            # Dump the default scenario

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use cruise_core::{
    run_sweep, PiController, ScenarioConfig, Simulation, Solver, TimeSeries, TrackingMetrics,
    VehicleParams,
};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "cruise-sim")]
#[command(about = "Closed-loop cruise control simulator")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single scenario
    Run {
        /// Scenario file (TOML), defaults to the reference scenario
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Export the recorded series as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Export the recorded series as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Skip the summary table
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run every load and gain combination in parallel
    Sweep {
        /// Base scenario file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Vehicle loads to try (kg)
        #[arg(long, value_delimiter = ',', required = true)]
        load: Vec<f64>,

        /// Proportional gains to try, defaults to the base scenario's
        #[arg(long, value_delimiter = ',')]
        kc: Vec<f64>,
    },

    /// Print the default scenario as TOML
    Config,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run_command(cli.command) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "cruise_sim=debug,cruise_core=debug"
    } else {
        "cruise_sim=info,cruise_core=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            config,
            csv,
            json,
            quiet,
        } => {
            let scenario = load_scenario(config.as_deref())?;
            let sim = scenario.build().context("invalid scenario")?;
            debug!(scenario = %describe_scenario(&sim), "built scenario");
            let series = sim.run().context("simulation failed")?;

            if let Some(path) = csv {
                series
                    .export_csv(&path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "exported CSV");
            }
            if let Some(path) = json {
                series
                    .export_json(&path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "exported JSON");
            }
            if !quiet {
                println!("{}", describe_scenario(&sim));
                print_summary(&series);
            }
            Ok(())
        }

        Commands::Sweep { config, load, kc } => {
            let base = load_scenario(config.as_deref())?;
            let gains = if kc.is_empty() {
                vec![base.controller.kc]
            } else {
                kc
            };

            let mut scenarios = Vec::with_capacity(load.len() * gains.len());
            for &mass in &load {
                for &gain in &gains {
                    scenarios.push(base.clone().with_load(mass).with_kc(gain));
                }
            }
            info!(runs = scenarios.len(), "sweeping loads and gains");

            println!(
                "{:>10} {:>10} {:>10} {:>10} {:>10}",
                "load".bold(),
                "kc".bold(),
                "final v".bold(),
                "IAE".bold(),
                "sat".bold()
            );
            for (scenario, result) in scenarios.iter().zip(run_sweep(&scenarios)) {
                let load = scenario.initial.load;
                let kc = scenario.controller.kc;
                match result {
                    Ok(series) => {
                        let metrics = TrackingMetrics::from_series(&series);
                        let final_velocity = series.last().map_or(f64::NAN, |s| s.velocity);
                        println!(
                            "{:>10.1} {:>10.3} {:>10.3} {:>10.2} {:>10}",
                            load, kc, final_velocity, metrics.iae, metrics.saturated_steps
                        );
                    }
                    Err(e) => {
                        println!("{:>10.1} {:>10.3} {}", load, kc, e.to_string().red());
                    }
                }
            }
            Ok(())
        }

        Commands::Config => {
            print!("{}", ScenarioConfig::default().to_toml_string()?);
            Ok(())
        }
    }
}

fn load_scenario(path: Option<&Path>) -> Result<ScenarioConfig> {
    match path {
        Some(path) => ScenarioConfig::load(path)
            .with_context(|| format!("failed to load scenario {}", path.display())),
        None => {
            debug!("using reference scenario");
            Ok(ScenarioConfig::default())
        }
    }
}

/// One-line description of the horizon, setpoint changes and top speed
fn describe_scenario(sim: &Simulation<VehicleParams, PiController, Solver>) -> String {
    let changes: Vec<String> = sim
        .schedule()
        .change_steps()
        .map(|step| step.to_string())
        .collect();
    let changes = if changes.is_empty() {
        "none".to_string()
    } else {
        changes.join(", ")
    };
    let top_speed = sim
        .plant()
        .terminal_velocity(sim.controller().limits().max())
        .map_or_else(|| "n/a".to_string(), |v| format!("{v:.2} m/s"));

    format!(
        "horizon {} s over {} steps, setpoint changes at steps [{}], top speed {}",
        sim.clock().horizon(),
        sim.clock().steps(),
        changes,
        top_speed
    )
}

fn print_summary(series: &TimeSeries) {
    let metrics = TrackingMetrics::from_series(series);

    println!("{}", "Tracking summary".bold());
    println!(
        "  {:>6} {:>6} {:>10} {:>12} {:>10} {:>6}",
        "start", "end", "setpoint", "final error", "overshoot", "sat"
    );
    for segment in &metrics.segments {
        let final_error = format!("{:>12.4}", segment.final_error);
        let final_error = if segment.final_error.abs() < 0.5 {
            final_error.green()
        } else {
            final_error.yellow()
        };
        println!(
            "  {:>6} {:>6} {:>10.2} {} {:>10.4} {:>6}",
            segment.start,
            segment.end,
            segment.setpoint,
            final_error,
            segment.peak_overshoot,
            segment.saturated_steps
        );
    }

    println!();
    println!("  samples:          {}", series.len());
    println!("  saturated steps:  {}", metrics.saturated_steps);
    println!("  max |integral|:   {:.3}", metrics.max_abs_integral);
    println!("  IAE:              {:.3}", metrics.iae);
    if let Some(last) = series.last() {
        println!(
            "  final velocity:   {} m/s",
            format!("{:.3}", last.velocity).cyan()
        );
    }
}
