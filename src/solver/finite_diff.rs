//! solver::finite_diff — central-difference Jacobians and Newton directions.
//!
//! Purpose
//! -------
//! Approximate `J = dF/dy` of a [`ResidualSystem`] by central differences
//! with an adaptive step, and solve the Newton equation `J h = -F` through
//! an explicit inverse computed in `nalgebra`.
//!
//! Key behaviors
//! -------------
//! - [`jacobian`] walks the step ladder `step, step/10, ...` down to and
//!   including `min_step`, returning the first fully finite Jacobian
//!   together with the step that produced it.
//! - Column `j` is `(F(y + s/2 e_j) - F(y - s/2 e_j)) / s`.
//! - [`invert`] copies the `ndarray` Jacobian into a `DMatrix`
//!   ([`fill_dmatrix`]), inverts it and rejects non-finite inverses.
//! - [`newton_direction`] returns `-J^{-1} F`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Errors raised by the system propagate unchanged; only non-finite
//!   entries trigger a smaller step.
//! - The Jacobian is square with side `system.dim()`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the step shrink, the failure when no step works,
//!   singular matrices, and agreement with the `finitediff` crate on a
//!   smooth system.
use nalgebra::DMatrix;
use ndarray::Array2;

use crate::solver::{
    errors::{SolveError, SolveResult},
    options::NewtonOptions,
    traits::ResidualSystem,
    types::{Jacobian, Residual, State},
};

/// jacobian — central-difference Jacobian with adaptive step.
///
/// Parameters
/// ----------
/// - `system`: residual system to differentiate.
/// - `y`: point of evaluation; assumed finite with length `system.dim()`.
/// - `opts`: supplies `step` and `min_step`.
///
/// Returns
/// -------
/// `SolveResult<(Jacobian, f64)>`
///   The first finite Jacobian on the step ladder and the step used.
///
/// Errors
/// ------
/// - Any error returned by `system.residuals`.
/// - `SolveError::JacobianFailed` when every step down to `min_step`
///   produces a non-finite entry.
pub fn jacobian<S: ResidualSystem + ?Sized>(
    system: &S, y: &State, opts: &NewtonOptions,
) -> SolveResult<(Jacobian, f64)> {
    for step in opts.step_schedule() {
        let jac = central_jacobian(system, y, step)?;
        if jac.iter().all(|v| v.is_finite()) {
            return Ok((jac, step));
        }
    }
    Err(SolveError::JacobianFailed { min_step: opts.min_step })
}

fn central_jacobian<S: ResidualSystem + ?Sized>(
    system: &S, y: &State, step: f64,
) -> SolveResult<Jacobian> {
    let n = system.dim();
    let half = 0.5 * step;
    let mut jac = Array2::<f64>::zeros((n, n));
    let mut probe = y.clone();
    for j in 0..n {
        probe[j] = y[j] + half;
        let upper = system.residuals(&probe)?;
        probe[j] = y[j] - half;
        let lower = system.residuals(&probe)?;
        probe[j] = y[j];
        if upper.len() != n || lower.len() != n {
            return Err(SolveError::StateDimMismatch {
                expected: n,
                found: upper.len().min(lower.len()),
            });
        }
        for i in 0..n {
            jac[[i, j]] = (upper[i] - lower[i]) / step;
        }
    }
    Ok(jac)
}

/// invert — finite inverse of a square Jacobian.
///
/// # Errors
/// [`SolveError::SingularJacobian`] if `nalgebra` cannot invert the matrix
/// or the inverse holds non-finite entries.
pub fn invert(jac: &Jacobian) -> SolveResult<Jacobian> {
    let n = jac.nrows();
    let mut dense = DMatrix::<f64>::zeros(n, jac.ncols());
    fill_dmatrix(jac, &mut dense);
    let inv = dense.try_inverse().ok_or(SolveError::SingularJacobian)?;
    if !inv.iter().all(|v| v.is_finite()) {
        return Err(SolveError::SingularJacobian);
    }
    Ok(Array2::from_shape_fn((n, n), |(i, j)| inv[(i, j)]))
}

/// Newton direction `h = -J^{-1} F`.
///
/// # Errors
/// As [`invert`].
pub fn newton_direction(jac: &Jacobian, f: &Residual) -> SolveResult<State> {
    let inv = invert(jac)?;
    Ok(-inv.dot(f))
}

/// Copy an `ndarray` matrix into a preallocated `DMatrix`, column by column.
fn fill_dmatrix(src: &Array2<f64>, dst: &mut DMatrix<f64>) {
    for j in 0..src.ncols() {
        for i in 0..src.nrows() {
            dst[(i, j)] = src[[i, j]];
        }
    }
}
