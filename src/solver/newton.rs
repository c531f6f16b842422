//! solver::newton — damped Newton method for small square systems.
//!
//! Purpose
//! -------
//! Find `y` with `F(y) = 0` for a [`ResidualSystem`], starting from a
//! caller-supplied guess. Used to solve the household first-order
//! conditions for `(tw, sf, sm)` inside every calibration trial.
//!
//! Key behaviors
//! -------------
//! - Each iteration computes the Newton direction `h = -J^{-1} F` from a
//!   central-difference Jacobian ([`crate::solver::finite_diff`]).
//! - Backtracking tries the damping factors `lambda, lambda/10, ...` down
//!   to and including `damping_floor`. A candidate `y + a h` is accepted
//!   when all its components are non-negative, its residual is finite with
//!   a norm strictly below the current one, and the Jacobian there is
//!   finite and invertible. That Jacobian is reused by the next iteration.
//! - Convergence: `|F| <= ftol` at the current iterate, or `|a h| <= htol`
//!   for the accepted step.
//! - Exhausting `max_iter` is not an error: a warning is logged and the
//!   last accepted iterate is returned with `converged = false` unless its
//!   residual happens to meet `ftol`.
//!
//! Errors
//! ------
//! - Invalid options or starting point (dimension, finiteness).
//! - `NonFiniteResidual` at the starting point.
//! - `JacobianFailed` / `SingularJacobian` at the starting point.
//! - `StepRejected` when no damping factor is admissible.
//!
//! Logging
//! -------
//! `debug` per accepted step, `warn` on non-convergence, `info` with the
//! final iterate.
use slog::{debug, info, warn, Logger};

use crate::solver::{
    errors::{SolveError, SolveResult},
    finite_diff::{invert, jacobian, newton_direction},
    options::NewtonOptions,
    traits::ResidualSystem,
    types::{Jacobian, Residual, State},
    validation::{is_admissible, validate_residual, validate_state},
};

/// Result of a Newton solve.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonOutcome {
    /// Last accepted iterate.
    pub solution: State,
    pub converged: bool,
    /// Number of accepted steps.
    pub iterations: usize,
    /// `|F|` at `solution`.
    pub residual_norm: f64,
    /// Norm of the last accepted step; `None` if no step was taken.
    pub step_norm: Option<f64>,
    /// Damping factor accepted at each step.
    pub damping: Vec<f64>,
}

/// solve — damped Newton iteration from `y0`.
///
/// Parameters
/// ----------
/// - `system`: residual system of dimension `n`.
/// - `y0`: starting point, length `n`, finite.
/// - `opts`: validated again on entry.
/// - `logger`: receives progress and the non-convergence warning.
///
/// Returns
/// -------
/// `SolveResult<NewtonOutcome>`; non-convergence within `max_iter` is
/// reported through `converged = false`, not as an error.
///
/// Errors
/// ------
/// See the module documentation.
pub fn solve<S: ResidualSystem + ?Sized>(
    system: &S, y0: &State, opts: &NewtonOptions, logger: &Logger,
) -> SolveResult<NewtonOutcome> {
    opts.validate()?;
    let dim = system.dim();
    validate_state(y0, dim)?;

    let mut y = y0.clone();
    let mut f = system.residuals(&y)?;
    validate_residual(&f, dim)?;
    let mut fnorm = norm(&f);
    let mut jac: Option<Jacobian> = None;
    let mut damping = Vec::new();
    let mut step_norm = None;
    let schedule = opts.damping_schedule();

    for iteration in 0..opts.max_iter {
        if fnorm <= opts.ftol {
            return Ok(finish(y, fnorm, step_norm, damping, true, logger));
        }
        let current = match jac.take() {
            Some(j) => j,
            None => jacobian(system, &y, opts)?.0,
        };
        let h = newton_direction(&current, &f)?;
        let hnorm = norm(&h);

        let mut accepted = None;
        for &alpha in &schedule {
            if let Some(step) = try_step(system, &y, &h, alpha, fnorm, opts)? {
                accepted = Some((alpha, step));
                break;
            }
        }
        let Some((alpha, (candidate, fc, jc))) = accepted else {
            let smallest_damping = schedule.last().copied().unwrap_or(opts.damping_floor);
            warn!(logger, "newton backtracking exhausted";
                "iteration" => iteration, "residual_norm" => fnorm);
            return Err(SolveError::StepRejected { iteration, smallest_damping });
        };

        let taken = alpha * hnorm;
        y = candidate;
        f = fc;
        fnorm = norm(&f);
        jac = Some(jc);
        damping.push(alpha);
        step_norm = Some(taken);
        system.inspect(&y);
        debug!(logger, "newton step";
            "iteration" => iteration + 1, "residual_norm" => fnorm, "step_norm" => taken,
            "damping" => alpha, "y" => format!("{y}"));

        if taken <= opts.htol {
            return Ok(finish(y, fnorm, step_norm, damping, true, logger));
        }
    }

    let converged = fnorm <= opts.ftol;
    if !converged {
        warn!(logger, "newton solver did not converge";
            "max_iter" => opts.max_iter, "residual_norm" => fnorm);
    }
    Ok(finish(y, fnorm, step_norm, damping, converged, logger))
}

/// One damping trial; `Ok(None)` means the candidate is not admissible.
fn try_step<S: ResidualSystem + ?Sized>(
    system: &S, y: &State, h: &State, alpha: f64, fnorm: f64, opts: &NewtonOptions,
) -> SolveResult<Option<(State, Residual, Jacobian)>> {
    let candidate = y + &(h * alpha);
    let fc = system.residuals(&candidate)?;
    if fc.len() != y.len() || !is_admissible(&candidate, &fc) {
        return Ok(None);
    }
    if norm(&fc) >= fnorm {
        return Ok(None);
    }
    let jc = match jacobian(system, &candidate, opts) {
        Ok((jc, _)) => jc,
        Err(SolveError::JacobianFailed { .. }) => return Ok(None),
        Err(err) => return Err(err),
    };
    if invert(&jc).is_err() {
        return Ok(None);
    }
    Ok(Some((candidate, fc, jc)))
}

fn finish(
    solution: State, residual_norm: f64, step_norm: Option<f64>, damping: Vec<f64>,
    converged: bool, logger: &Logger,
) -> NewtonOutcome {
    let iterations = damping.len();
    info!(logger, "newton solve finished";
        "converged" => converged, "iterations" => iterations,
        "residual_norm" => residual_norm, "y" => format!("{solution}"));
    NewtonOutcome { solution, converged, iterations, residual_norm, step_norm, damping }
}

fn norm(v: &State) -> f64 {
    v.dot(v).sqrt()
}
