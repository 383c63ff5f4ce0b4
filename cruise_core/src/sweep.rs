//! Parallel what-if sweeps
//!
//! Each scenario is an independent simulation with its own plant and
//! controller state, so scenarios run concurrently on the rayon pool while
//! every individual run stays strictly sequential.

use rayon::prelude::*;
use tracing::info;

use crate::config::ScenarioConfig;
use crate::error::SimResult;
use crate::record::TimeSeries;

/// Build and run every scenario, returning results in input order
pub fn run_sweep(scenarios: &[ScenarioConfig]) -> Vec<SimResult<TimeSeries>> {
    info!(scenarios = scenarios.len(), "starting sweep");
    scenarios
        .par_iter()
        .map(|scenario| scenario.build()?.run())
        .collect()
}
