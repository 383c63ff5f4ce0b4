//! Shared fixtures for the cruise control benchmarks

use cruise_core::{PiController, ScenarioConfig, SimResult, Simulation, Solver, VehicleParams};

/// Reference scenario built with the given solver
pub fn reference_with_solver(
    solver: Solver,
) -> SimResult<Simulation<VehicleParams, PiController, Solver>> {
    ScenarioConfig {
        solver,
        ..ScenarioConfig::default()
    }
    .build()
}

/// Reference scenario repeated over evenly spaced loads
pub fn load_sweep(runs: usize, step: f64) -> Vec<ScenarioConfig> {
    (0..runs)
        .map(|i| ScenarioConfig::default().with_load(step * i as f64))
        .collect()
}
