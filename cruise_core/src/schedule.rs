//! Piecewise-constant setpoint schedule
//!
//! The target velocity changes only at predetermined step indices,
//! independently of the plant and controller. A change registered at step
//! `k` is in effect from step `k` onwards, never a step early or late.
//!
//! # Example
//!
//! ```rust
//! use cruise_core::SetpointSchedule;
//!
//! let schedule = SetpointSchedule::new(25.0).then(50, 0.0).then(100, 15.0);
//! assert_eq!(schedule.at(49), 25.0);
//! assert_eq!(schedule.at(50), 0.0);
//! assert_eq!(schedule.at(120), 15.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{require_finite, ConfigError};

/// Target value taking effect at a given step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetpointChange {
    pub step: usize,
    pub value: f64,
}

/// Step index to target velocity mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetpointSchedule {
    /// Value before the first change
    pub initial: f64,
    /// Changes in strictly increasing step order
    #[serde(default)]
    pub changes: Vec<SetpointChange>,
}

impl Default for SetpointSchedule {
    fn default() -> Self {
        Self::new(25.0)
            .then(50, 0.0)
            .then(100, 15.0)
            .then(150, 20.0)
            .then(200, 10.0)
    }
}

impl SetpointSchedule {
    pub fn new(initial: f64) -> Self {
        Self {
            initial,
            changes: Vec::new(),
        }
    }

    /// A schedule that never changes
    pub fn constant(value: f64) -> Self {
        Self::new(value)
    }

    /// Append a change
    pub fn then(mut self, step: usize, value: f64) -> Self {
        self.changes.push(SetpointChange { step, value });
        self
    }

    /// Target velocity in effect at `step`
    pub fn at(&self, step: usize) -> f64 {
        let applied = self.changes.partition_point(|change| change.step <= step);
        match applied {
            0 => self.initial,
            n => self.changes[n - 1].value,
        }
    }

    /// Step indices at which the target changes
    pub fn change_steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.changes.iter().map(|change| change.step)
    }

    /// Reject unordered or duplicate steps and non-finite targets
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_finite("setpoint", self.initial)?;

        let mut previous: Option<usize> = None;
        for change in &self.changes {
            require_finite("setpoint", change.value)?;
            if let Some(previous) = previous {
                if change.step <= previous {
                    return Err(ConfigError::UnorderedSchedule {
                        step: change.step,
                        previous,
                    });
                }
            }
            previous = Some(change.step);
        }
        Ok(())
    }

    /// Reject changes that would never take effect within `steps` steps
    pub(crate) fn validate_range(&self, steps: usize) -> Result<(), ConfigError> {
        match self.changes.last() {
            Some(change) if change.step >= steps => Err(ConfigError::ScheduleOutOfRange {
                step: change.step,
                last: steps - 1,
            }),
            _ => Ok(()),
        }
    }
}
