//! Scenario configuration
//!
//! A scenario is a TOML document with one table per concern. Every table
//! defaults to the reference scenario, so an empty document is valid:
//!
//! ```toml
//! [clock]
//! tf = 300.0
//! nsteps = 301
//!
//! [controller]
//! kc = 4.1666666667
//! tau_i = 30.0
//! bias = 0.0
//! u_min = -50.0
//! u_max = 100.0
//!
//! [initial]
//! velocity = 0.0
//! load = 200.0
//!
//! [setpoint]
//! initial = 25.0
//! changes = [{ step = 50, value = 0.0 }, { step = 100, value = 15.0 }]
//!
//! [solver]
//! kind = "dormand-prince"
//! rtol = 1e-8
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::SimulationClock;
use crate::controller::{ActuatorLimits, PiController, PiGains};
use crate::error::SimResult;
use crate::integrator::Solver;
use crate::plant::{PlantState, VehicleParams};
use crate::schedule::SetpointSchedule;
use crate::simulation::Simulation;

/// Simulation horizon and resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Final time (s)
    pub tf: f64,
    /// Number of time points, including t = 0
    pub nsteps: usize,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tf: 300.0,
            nsteps: 301,
        }
    }
}

/// PI tuning and actuator bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub kc: f64,
    pub tau_i: f64,
    pub bias: f64,
    pub u_min: f64,
    pub u_max: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            kc: 5.0 / 1.2,
            tau_i: 30.0,
            bias: 0.0,
            u_min: -50.0,
            u_max: 100.0,
        }
    }
}

/// Initial plant and controller state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConfig {
    /// Velocity at t = 0 (m/s)
    pub velocity: f64,
    /// Added mass (kg)
    pub load: f64,
    /// Integral accumulator at t = 0
    pub sum_int: f64,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            velocity: 0.0,
            load: 200.0,
            sum_int: 0.0,
        }
    }
}

/// Complete closed-loop scenario
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub clock: ClockConfig,
    pub vehicle: VehicleParams,
    pub controller: ControllerConfig,
    pub initial: InitialConfig,
    pub setpoint: SetpointSchedule,
    pub solver: Solver,
}

impl ScenarioConfig {
    /// Load a scenario from a TOML file
    pub fn load(path: &Path) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "loaded scenario");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> SimResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> SimResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Same scenario with a different load
    pub fn with_load(mut self, load: f64) -> Self {
        self.initial.load = load;
        self
    }

    /// Same scenario with a different proportional gain
    pub fn with_kc(mut self, kc: f64) -> Self {
        self.controller.kc = kc;
        self
    }

    /// Validate every section and assemble a runnable simulation
    pub fn build(&self) -> SimResult<Simulation<VehicleParams, PiController, Solver>> {
        let clock = SimulationClock::new(self.clock.tf, self.clock.nsteps)?;
        let gains = PiGains::new(self.controller.kc, self.controller.tau_i)?;
        let limits = ActuatorLimits::new(self.controller.u_min, self.controller.u_max)?;
        let controller = PiController::new(gains, self.controller.bias, limits)
            .with_initial_integral(self.initial.sum_int);

        Simulation::new(
            clock,
            self.setpoint.clone(),
            self.vehicle,
            controller,
            self.solver,
            PlantState::new(self.initial.velocity, self.initial.load),
        )
    }
}
