//! Vehicle plant model
//!
//! First-order nonlinear velocity dynamics of a single mass pushed by a
//! thrust proportional to the actuator command and slowed by quadratic drag:
//!
//! ```text
//! dv/dt = (Fp * u - 0.5 * rho * Cd * A * v^2) / (m + load)
//! ```
//!
//! # Example
//!
//! ```rust
//! use cruise_core::{Plant, VehicleParams};
//!
//! let vehicle = VehicleParams::default();
//! let accel = vehicle.acceleration(0.0, 0.0, 100.0, 200.0);
//! assert!((accel - 3000.0 / 700.0).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{require_finite, require_positive, ConfigError};

/// Right-hand side of the plant's ODE
///
/// Implementations must be pure: identical inputs give identical outputs.
pub trait Plant: Send + Sync {
    /// Instantaneous rate of change of velocity
    ///
    /// # Arguments
    /// * `velocity` - Current velocity (m/s)
    /// * `time` - Simulation time (s), available for time-varying plants
    /// * `command` - Actuator command (%)
    /// * `load` - Mass added on top of the vehicle's own (kg)
    fn acceleration(&self, velocity: f64, time: f64, command: f64, load: f64) -> f64;

    /// Check physical parameters against the initial state before a run
    fn validate(&self, _initial: &PlantState) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Physical parameters of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// Drag coefficient (dimensionless)
    pub drag_coefficient: f64,
    /// Air density (kg/m^3)
    pub air_density: f64,
    /// Frontal cross-section area (m^2)
    pub area: f64,
    /// Thrust per percent of actuator command (N/%)
    pub thrust_gain: f64,
    /// Vehicle mass without load (kg)
    pub mass: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            drag_coefficient: 0.24,
            air_density: 1.225,
            area: 5.0,
            thrust_gain: 30.0,
            mass: 500.0,
        }
    }
}

impl VehicleParams {
    /// Lumped drag constant `0.5 * rho * Cd * A` (kg/m)
    pub fn drag_constant(&self) -> f64 {
        0.5 * self.air_density * self.drag_coefficient * self.area
    }

    /// Velocity at which drag balances the thrust of a constant command
    ///
    /// Drag `k * v^2` always opposes forward thrust, so an equilibrium exists
    /// only for non-negative thrust; braking thrust returns `None`. The load
    /// only changes how fast this velocity is approached.
    pub fn terminal_velocity(&self, command: f64) -> Option<f64> {
        let thrust = self.thrust_gain * command;
        if thrust < 0.0 {
            return None;
        }
        Some((thrust / self.drag_constant()).sqrt())
    }
}

impl Plant for VehicleParams {
    fn acceleration(&self, velocity: f64, _time: f64, command: f64, load: f64) -> f64 {
        // v^2 rather than v*|v|: drag is symmetric in the sign of v
        (1.0 / (self.mass + load))
            * (self.thrust_gain * command - self.drag_constant() * velocity.powi(2))
    }

    fn validate(&self, initial: &PlantState) -> Result<(), ConfigError> {
        require_finite("drag_coefficient", self.drag_coefficient)?;
        require_positive("air_density", self.air_density)?;
        require_positive("area", self.area)?;
        require_finite("thrust_gain", self.thrust_gain)?;
        require_positive("mass", self.mass)?;
        require_positive("total mass", self.mass + initial.load)?;
        Ok(())
    }
}

/// Evolving plant state owned by the simulation driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantState {
    /// Velocity (m/s), replaced once per step by the integrator's result
    pub velocity: f64,
    /// Added mass (kg), fixed for the whole run
    pub load: f64,
}

impl PlantState {
    pub fn new(velocity: f64, load: f64) -> Self {
        Self { velocity, load }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_finite("initial velocity", self.velocity)?;
        require_finite("load", self.load)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_full_thrust_from_rest() {
        let vehicle = VehicleParams::default();

        // No drag at rest: a = Fp * u / (m + load)
        let accel = vehicle.acceleration(0.0, 0.0, 100.0, 200.0);
        assert_relative_eq!(accel, 3000.0 / 700.0);
    }

    #[test]
    fn test_drag_decelerates_coasting_vehicle() {
        let vehicle = VehicleParams::default();

        let accel = vehicle.acceleration(25.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(accel, -vehicle.drag_constant() * 625.0 / 500.0);
        assert!(accel < 0.0);
    }

    #[test]
    fn test_drag_symmetric_in_velocity_sign() {
        let vehicle = VehicleParams::default();

        let forward = vehicle.acceleration(10.0, 0.0, 20.0, 200.0);
        let backward = vehicle.acceleration(-10.0, 0.0, 20.0, 200.0);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_pure_function() {
        let vehicle = VehicleParams::default();

        let first = vehicle.acceleration(12.5, 3.0, 42.0, 200.0);
        let second = vehicle.acceleration(12.5, 3.0, 42.0, 200.0);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_time_does_not_affect_dynamics() {
        let vehicle = VehicleParams::default();

        let early = vehicle.acceleration(5.0, 0.0, 50.0, 0.0);
        let late = vehicle.acceleration(5.0, 1000.0, 50.0, 0.0);
        assert_eq!(early, late);
    }

    #[test]
    fn test_terminal_velocity_balances_forces() {
        let vehicle = VehicleParams::default();

        for command in [0.0, 15.0, 100.0] {
            let v = vehicle.terminal_velocity(command).unwrap();
            assert!(v >= 0.0);
            assert_relative_eq!(
                vehicle.acceleration(v, 0.0, command, 200.0),
                0.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_no_terminal_velocity_under_braking() {
        let vehicle = VehicleParams::default();

        assert_eq!(vehicle.terminal_velocity(-15.0), None);
        // drag adds to braking thrust at any velocity
        for v in [-30.0, -5.0, 0.0, 5.0, 30.0] {
            assert!(vehicle.acceleration(v, 0.0, -15.0, 200.0) < 0.0);
        }
    }

    #[test]
    fn test_validate_rejects_zero_mass() {
        let vehicle = VehicleParams {
            mass: 0.0,
            ..Default::default()
        };
        let state = PlantState::new(0.0, 200.0);
        assert!(vehicle.validate(&state).is_err());
        assert!(VehicleParams::default().validate(&state).is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_total_mass() {
        let vehicle = VehicleParams::default();
        assert!(vehicle.validate(&PlantState::new(0.0, -600.0)).is_err());
        assert!(PlantState::new(f64::NAN, 200.0).validate().is_err());
    }
}
