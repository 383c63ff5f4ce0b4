//! PI controller with conditional-integration anti-windup
//!
//! Each step tentatively integrates the error, computes the raw command and
//! clamps it to the actuator limits. When the clamp engages, the tentative
//! integral update is discarded so the accumulator never grows while the
//! actuator is pinned at a bound.
//!
//! # Example
//!
//! ```rust
//! use cruise_core::{ActuatorLimits, Controller, PiController, PiGains, Saturation};
//!
//! let pi = PiController::new(
//!     PiGains::new(5.0 / 1.2, 30.0).unwrap(),
//!     0.0,
//!     ActuatorLimits::new(-50.0, 100.0).unwrap(),
//! );
//! let mut state = pi.initial_state();
//!
//! // Large initial error pins the actuator at its upper bound
//! let out = pi.update(&mut state, 25.0, 0.0, 1.0);
//! assert_eq!(out.command, 100.0);
//! assert_eq!(out.saturation, Saturation::Upper);
//! assert_eq!(state.sum_int, 0.0);
//! ```

use serde::{Deserialize, Serialize};

use super::{ControlOutput, Controller, Saturation};
use crate::error::{require_finite, require_positive, ConfigError};

/// Proportional gain and integral time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiGains {
    kc: f64,
    tau_i: f64,
}

impl PiGains {
    /// # Arguments
    /// * `kc` - Proportional gain (% per m/s), non-zero
    /// * `tau_i` - Integral time (s), positive
    pub fn new(kc: f64, tau_i: f64) -> Result<Self, ConfigError> {
        require_finite("kc", kc)?;
        if kc == 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "kc",
                value: kc,
                reason: "must be non-zero",
            });
        }
        require_positive("tau_i", tau_i)?;
        Ok(Self { kc, tau_i })
    }

    pub fn kc(&self) -> f64 {
        self.kc
    }

    pub fn tau_i(&self) -> f64 {
        self.tau_i
    }

    /// Gain applied to the accumulated error, `kc / tau_i`
    pub fn integral_gain(&self) -> f64 {
        self.kc / self.tau_i
    }
}

/// Closed interval of physically achievable commands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorLimits {
    min: f64,
    max: f64,
}

impl ActuatorLimits {
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        require_finite("u_min", min)?;
        require_finite("u_max", max)?;
        if min > max {
            return Err(ConfigError::InvertedLimits { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Clamp a raw command; a value exactly on a bound counts as saturated
    pub fn clamp(&self, raw: f64) -> (f64, Saturation) {
        if raw >= self.max {
            (self.max, Saturation::Upper)
        } else if raw <= self.min {
            (self.min, Saturation::Lower)
        } else {
            (raw, Saturation::None)
        }
    }
}

/// Integral accumulator carried between steps
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerState {
    pub sum_int: f64,
}

impl ControllerState {
    pub fn new(sum_int: f64) -> Self {
        Self { sum_int }
    }

    pub fn reset(&mut self) {
        self.sum_int = 0.0;
    }
}

/// Single-input PI controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiController {
    gains: PiGains,
    bias: f64,
    limits: ActuatorLimits,
    initial_integral: f64,
}

impl PiController {
    pub fn new(gains: PiGains, bias: f64, limits: ActuatorLimits) -> Self {
        Self {
            gains,
            bias,
            limits,
            initial_integral: 0.0,
        }
    }

    /// Start runs from a non-zero accumulator
    pub fn with_initial_integral(mut self, sum_int: f64) -> Self {
        self.initial_integral = sum_int;
        self
    }

    pub fn gains(&self) -> PiGains {
        self.gains
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn limits(&self) -> ActuatorLimits {
        self.limits
    }

    /// Raw command for a given error and accumulator
    pub fn raw_command(&self, error: f64, sum_int: f64) -> f64 {
        self.bias + self.gains.kc * error + self.gains.integral_gain() * sum_int
    }

    /// Accumulator magnitude that alone drives the actuator to its upper bound
    ///
    /// While saturated the accumulator is frozen, so it cannot run past this
    /// value on account of the saturation itself.
    pub fn integral_bound(&self) -> f64 {
        ((self.limits.max - self.bias) / self.gains.integral_gain()).abs()
    }
}

impl Controller for PiController {
    type State = ControllerState;

    fn initial_state(&self) -> ControllerState {
        ControllerState::new(self.initial_integral)
    }

    fn integral(&self, state: &ControllerState) -> f64 {
        state.sum_int
    }

    fn update(
        &self,
        state: &mut ControllerState,
        setpoint: f64,
        measured: f64,
        dt: f64,
    ) -> ControlOutput {
        let error = setpoint - measured;

        // Rectangular integration, committed only if the actuator is not pinned
        let candidate = state.sum_int + error * dt;
        let raw_command = self.raw_command(error, candidate);
        let (command, saturation) = self.limits.clamp(raw_command);

        if !saturation.is_saturated() {
            state.sum_int = candidate;
        }

        ControlOutput {
            error,
            raw_command,
            command,
            integral: state.sum_int,
            saturation,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require_finite("bias", self.bias)?;
        require_finite("initial sum_int", self.initial_integral)?;
        Ok(())
    }
}
