//! Fixed-step clock
//!
//! Hosts tick at whatever rate they render; the simulation only ever advances
//! in whole steps of a constant `dt`. [`FixedTimestep`] turns elapsed frame
//! time into a count of fixed steps and carries the remainder forward.

use crate::engine::World;
use crate::error::SimError;
use log::warn;

/// Fixed step used when none is configured (50 Hz).
pub const DEFAULT_FIXED_DT: f32 = 0.02;

/// Upper bound on steps taken for one call to [`FixedTimestep::advance`].
pub const DEFAULT_MAX_STEPS_PER_ADVANCE: usize = 8;

#[derive(Debug, Clone)]
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
    max_steps: usize,
    total_steps: u64,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Result<Self, SimError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidTimestep(dt));
        }
        Ok(Self {
            dt,
            accumulator: 0.0,
            max_steps: DEFAULT_MAX_STEPS_PER_ADVANCE,
            total_steps: 0,
        })
    }

    /// Cap on catch-up steps per advance. Time beyond the cap is dropped.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Fraction of a step left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    /// Feed elapsed time and return how many fixed steps are now due.
    pub fn advance(&mut self, elapsed: f32) -> usize {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator += elapsed;
        }

        let mut steps = 0;
        while self.accumulator >= self.dt && steps < self.max_steps {
            self.accumulator -= self.dt;
            steps += 1;
        }

        if self.accumulator >= self.dt {
            let dropped = self.accumulator - self.accumulator % self.dt;
            warn!(
                "fixed timestep fell behind, dropping {:.4}s after {} steps",
                dropped, steps
            );
            self.accumulator %= self.dt;
        }

        self.total_steps += steps as u64;
        steps
    }

    /// Advance the clock and step `world` once per due step.
    pub fn run(&mut self, elapsed: f32, world: &mut World) -> usize {
        let steps = self.advance(elapsed);
        for _ in 0..steps {
            world.step(self.dt);
        }
        steps
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self {
            dt: DEFAULT_FIXED_DT,
            accumulator: 0.0,
            max_steps: DEFAULT_MAX_STEPS_PER_ADVANCE,
            total_steps: 0,
        }
    }
}
