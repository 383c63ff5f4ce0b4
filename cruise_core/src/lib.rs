//! # CRUISE Core
//!
//! Closed-loop velocity control of a single-mass vehicle: a discrete-time PI
//! controller with integral anti-windup driving a continuous-time nonlinear
//! drag plant, co-simulated on a fixed time grid.
//!
//! # Architecture
//!
//! - **plant**: the vehicle's `dv/dt` right-hand side ([`Plant`], [`VehicleParams`])
//! - **integrator**: ODE solvers that advance the plant across one controller step
//! - **controller**: PI control with actuator saturation and integral rollback
//! - **simulation**: the fixed-step driver that ties the three together
//! - **record** / **metrics**: the produced time series and its analysis
//! - **config** / **sweep**: TOML scenarios and parallel what-if runs
//!
//! # Example
//!
//! ```rust
//! use cruise_core::ScenarioConfig;
//!
//! let simulation = ScenarioConfig::default().build().unwrap();
//! let series = simulation.run().unwrap();
//!
//! assert_eq!(series.len(), 301);
//! assert_eq!(series.command[1], 100.0); // saturated on the first step
//! ```

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod integrator;
pub mod metrics;
pub mod plant;
pub mod record;
pub mod schedule;
pub mod simulation;
pub mod sweep;

pub use clock::SimulationClock;
pub use config::ScenarioConfig;
pub use controller::{
    ActuatorLimits, ControlOutput, Controller, ControllerState, PiController, PiGains, Saturation,
};
pub use error::{ConfigError, SimError, SimResult, SolverError};
pub use integrator::{DormandPrince, Integrator, Rk4, Solver};
pub use metrics::{SegmentMetrics, TrackingMetrics};
pub use plant::{Plant, PlantState, VehicleParams};
pub use record::{Sample, TimeSeries};
pub use schedule::{SetpointChange, SetpointSchedule};
pub use simulation::Simulation;
pub use sweep::run_sweep;
