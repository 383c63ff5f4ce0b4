//! Fixed-step closed-loop simulation driver
//!
//! Each step reads the setpoint for the step index, lets the controller turn
//! the tracking error into a clamped command, advances the plant across the
//! step with that command held constant, and records the outcome. The plant
//! velocity and the controller accumulator live on this driver's stack, so
//! any number of simulations can run side by side.

use tracing::{debug, error, info, info_span, trace};

use crate::clock::SimulationClock;
use crate::controller::{Controller, Saturation};
use crate::error::{SimError, SimResult};
use crate::integrator::Integrator;
use crate::plant::{Plant, PlantState};
use crate::record::{Sample, TimeSeries};
use crate::schedule::SetpointSchedule;

/// A validated closed-loop scenario ready to run
#[derive(Debug, Clone)]
pub struct Simulation<P, C, I> {
    clock: SimulationClock,
    schedule: SetpointSchedule,
    plant: P,
    controller: C,
    integrator: I,
    initial: PlantState,
}

impl<P, C, I> Simulation<P, C, I>
where
    P: Plant,
    C: Controller,
    I: Integrator,
{
    /// Assemble a simulation, rejecting invalid configuration up front
    pub fn new(
        clock: SimulationClock,
        schedule: SetpointSchedule,
        plant: P,
        controller: C,
        integrator: I,
        initial: PlantState,
    ) -> SimResult<Self> {
        schedule.validate()?;
        schedule.validate_range(clock.steps())?;
        initial.validate()?;
        plant.validate(&initial)?;
        controller.validate()?;
        integrator.validate()?;

        Ok(Self {
            clock,
            schedule,
            plant,
            controller,
            integrator,
            initial,
        })
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn schedule(&self) -> &SetpointSchedule {
        &self.schedule
    }

    pub fn plant(&self) -> &P {
        &self.plant
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn initial_state(&self) -> PlantState {
        self.initial
    }

    /// Run every step and return the completed series
    ///
    /// There is no early exit: the loop always covers the whole clock unless
    /// the integrator fails, in which case the run is aborted.
    pub fn run(&self) -> SimResult<TimeSeries> {
        let span = info_span!("simulation", steps = self.clock.steps(), dt = self.clock.dt());
        let _enter = span.enter();

        let dt = self.clock.dt();
        let mut plant_state = self.initial;
        let mut controller_state = self.controller.initial_state();
        let mut series = TimeSeries::with_capacity(self.clock.len());
        let mut saturation = Saturation::None;

        info!(
            velocity = plant_state.velocity,
            load = plant_state.load,
            "starting closed-loop run"
        );

        let initial_setpoint = self.schedule.at(0);
        series.push(Sample {
            time: self.clock.time(0),
            setpoint: initial_setpoint,
            velocity: plant_state.velocity,
            error: initial_setpoint - plant_state.velocity,
            integral: self.controller.integral(&controller_state),
            command: 0.0,
            saturation: Saturation::None,
        });

        for step in 0..self.clock.steps() {
            let time = self.clock.time(step);
            let setpoint = self.schedule.at(step);

            let output =
                self.controller
                    .update(&mut controller_state, setpoint, plant_state.velocity, dt);

            if output.saturation != saturation {
                debug!(
                    step,
                    time,
                    from = %saturation,
                    to = %output.saturation,
                    raw_command = output.raw_command,
                    "actuator saturation changed"
                );
                saturation = output.saturation;
            }

            // The clamped command, not the raw one, is what reaches the plant
            let command = output.command;
            let load = plant_state.load;
            let plant = &self.plant;
            let next = self
                .integrator
                .advance(
                    |velocity, t| plant.acceleration(velocity, t, command, load),
                    plant_state.velocity,
                    time,
                    dt,
                )
                .map_err(|source| {
                    error!(step, time, %source, "plant integration failed");
                    SimError::Numerical { step, time, source }
                })?;
            plant_state.velocity = next;

            trace!(step, setpoint, velocity = next, command, integral = output.integral);

            series.push(Sample {
                time: self.clock.time(step + 1),
                setpoint,
                velocity: next,
                error: output.error,
                integral: output.integral,
                command,
                saturation: output.saturation,
            });
        }

        info!(
            final_velocity = plant_state.velocity,
            samples = series.len(),
            "closed-loop run complete"
        );
        Ok(series)
    }
}
