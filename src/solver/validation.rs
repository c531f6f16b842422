//! Validation helpers for the Newton solver.
//!
//! - **Option checks**: [`verify_tolerance`], [`verify_steps`],
//!   [`verify_damping`], [`verify_max_iter`] reject non-finite,
//!   non-positive or misordered settings.
//! - **State checks**: [`validate_state`] enforces dimension and
//!   finiteness of a starting point; [`validate_residual`] does the same
//!   for the residual there.
//! - [`is_admissible`] is the candidate filter used while backtracking.
use crate::solver::{
    errors::{SolveError, SolveResult},
    types::{Residual, State},
};

/// Validate a convergence tolerance.
///
/// # Errors
/// [`SolveError::InvalidTolerance`] if `tol` is non-finite or `<= 0`.
pub fn verify_tolerance(name: &'static str, tol: f64) -> SolveResult<()> {
    if !tol.is_finite() {
        return Err(SolveError::InvalidTolerance { name, tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 {
        return Err(SolveError::InvalidTolerance {
            name,
            tol,
            reason: "Tolerance must be positive.",
        });
    }
    Ok(())
}

/// Validate the initial and minimal finite-difference steps.
///
/// # Errors
/// [`SolveError::InvalidStep`] unless both are finite, positive and
/// `min_step <= step`.
pub fn verify_steps(step: f64, min_step: f64) -> SolveResult<()> {
    if !step.is_finite() || !min_step.is_finite() {
        return Err(SolveError::InvalidStep { step, min_step, reason: "Steps must be finite." });
    }
    if step <= 0.0 || min_step <= 0.0 {
        return Err(SolveError::InvalidStep { step, min_step, reason: "Steps must be positive." });
    }
    if min_step > step {
        return Err(SolveError::InvalidStep {
            step,
            min_step,
            reason: "Minimum step must not exceed the initial step.",
        });
    }
    Ok(())
}

/// Validate the damping multiplier and its floor.
///
/// # Errors
/// [`SolveError::InvalidDamping`] unless both are finite, positive and
/// `floor <= lambda`.
pub fn verify_damping(lambda: f64, floor: f64) -> SolveResult<()> {
    if !lambda.is_finite() || !floor.is_finite() {
        return Err(SolveError::InvalidDamping { lambda, floor, reason: "Damping must be finite." });
    }
    if lambda <= 0.0 || floor <= 0.0 {
        return Err(SolveError::InvalidDamping {
            lambda,
            floor,
            reason: "Damping must be positive.",
        });
    }
    if floor > lambda {
        return Err(SolveError::InvalidDamping {
            lambda,
            floor,
            reason: "Damping floor must not exceed the initial multiplier.",
        });
    }
    Ok(())
}

/// # Errors
/// [`SolveError::InvalidMaxIter`] if `max_iter == 0`.
pub fn verify_max_iter(max_iter: usize) -> SolveResult<()> {
    if max_iter == 0 {
        return Err(SolveError::InvalidMaxIter {
            max_iter,
            reason: "Maximum iterations must be greater than zero.",
        });
    }
    Ok(())
}

/// Validate a state vector against dimension and finiteness.
///
/// # Errors
/// - [`SolveError::StateDimMismatch`] if `y.len() != dim`.
/// - [`SolveError::NonFiniteState`] with the first offending entry.
pub fn validate_state(y: &State, dim: usize) -> SolveResult<()> {
    if y.len() != dim {
        return Err(SolveError::StateDimMismatch { expected: dim, found: y.len() });
    }
    for (index, &value) in y.iter().enumerate() {
        if !value.is_finite() {
            return Err(SolveError::NonFiniteState { index, value });
        }
    }
    Ok(())
}

/// Validate a residual vector against dimension and finiteness.
///
/// # Errors
/// - [`SolveError::StateDimMismatch`] if `f.len() != dim`.
/// - [`SolveError::NonFiniteResidual`] with the first offending entry.
pub fn validate_residual(f: &Residual, dim: usize) -> SolveResult<()> {
    if f.len() != dim {
        return Err(SolveError::StateDimMismatch { expected: dim, found: f.len() });
    }
    for (index, &value) in f.iter().enumerate() {
        if !value.is_finite() {
            return Err(SolveError::NonFiniteResidual { index, value });
        }
    }
    Ok(())
}

/// Candidate filter: non-negative components, finite residual.
pub fn is_admissible(y: &State, f: &Residual) -> bool {
    y.iter().all(|&v| v >= 0.0) && f.iter().all(|v| v.is_finite())
}
