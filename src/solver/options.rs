//! solver::options — configuration of the damped Newton method.
//!
//! Purpose
//! -------
//! Bundle every knob of the Newton solver and its finite-difference
//! Jacobian in one validated value that can also be read from a
//! calibration configuration file.
//!
//! Key behaviors
//! -------------
//! - [`NewtonOptions::new`] validates all fields; [`NewtonOptions::validate`]
//!   re-checks values that came in through deserialisation.
//! - [`NewtonOptions::damping_schedule`] and
//!   [`NewtonOptions::step_schedule`] expand the decade ladders
//!   `lambda 10^-k >= floor` and `step 10^-k >= min_step`; both include the
//!   floor itself when it lies on the ladder.
//!
//! Defaults
//! --------
//! `step = 1e-10`, `min_step = 1e-12`, `max_iter = 35`, `lambda = 1`,
//! `damping_floor = 1e-6`, `ftol = 1e-8`, `htol = 1e-8`.
use serde::{Deserialize, Serialize};

use crate::solver::{
    errors::SolveResult,
    validation::{verify_damping, verify_max_iter, verify_steps, verify_tolerance},
};

/// Relative slack when comparing a ladder rung with its floor.
const LADDER_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonOptions {
    /// Initial central-difference step.
    pub step: f64,
    /// Smallest central-difference step tried.
    pub min_step: f64,
    /// Maximum number of Newton iterations.
    pub max_iter: usize,
    /// Initial damping multiplier.
    pub lambda: f64,
    /// Smallest damping multiplier tried.
    pub damping_floor: f64,
    /// Residual-norm tolerance.
    pub ftol: f64,
    /// Step-norm tolerance.
    pub htol: f64,
}

impl Default for NewtonOptions {
    fn default() -> Self {
        Self {
            step: 1e-10,
            min_step: 1e-12,
            max_iter: 35,
            lambda: 1.0,
            damping_floor: 1e-6,
            ftol: 1e-8,
            htol: 1e-8,
        }
    }
}

impl NewtonOptions {
    /// # Errors
    /// Any of the option validation errors of
    /// [`crate::solver::validation`].
    pub fn new(
        step: f64, min_step: f64, max_iter: usize, lambda: f64, damping_floor: f64, ftol: f64,
        htol: f64,
    ) -> SolveResult<Self> {
        let opts = Self { step, min_step, max_iter, lambda, damping_floor, ftol, htol };
        opts.validate()?;
        Ok(opts)
    }

    /// # Errors
    /// See [`NewtonOptions::new`].
    pub fn validate(&self) -> SolveResult<()> {
        verify_steps(self.step, self.min_step)?;
        verify_max_iter(self.max_iter)?;
        verify_damping(self.lambda, self.damping_floor)?;
        verify_tolerance("ftol", self.ftol)?;
        verify_tolerance("htol", self.htol)?;
        Ok(())
    }

    /// Damping multipliers in the order they are tried.
    pub fn damping_schedule(&self) -> Vec<f64> {
        decade_ladder(self.lambda, self.damping_floor)
    }

    /// Finite-difference steps in the order they are tried.
    pub fn step_schedule(&self) -> Vec<f64> {
        decade_ladder(self.step, self.min_step)
    }
}

fn decade_ladder(start: f64, floor: f64) -> Vec<f64> {
    (0..)
        .map(|k| start * 10f64.powi(-k))
        .take_while(|&rung| rung >= floor * (1.0 - LADDER_SLACK))
        .collect()
}
