//! solver::traits — the seam between a model and the Newton solver.
//!
//! Purpose
//! -------
//! Define [`ResidualSystem`], the only thing the solver knows about the
//! equations it solves. The first-order conditions of the economy
//! implement it; so do the synthetic systems the solver is tested with.
//!
//! Conventions
//! -----------
//! - `residuals` must be pure: the Jacobian evaluates it at perturbed points
//!   and the backtracking loop at rejected candidates.
//! - Numerical trouble (division by zero, powers of negatives) is reported
//!   by returning non-finite residuals, not errors. Errors are reserved for
//!   states the system cannot interpret at all (e.g. wrong dimension).
//! - `inspect` is the hook for side effects such as consistency warnings;
//!   the solver calls it once per accepted iterate.
use crate::solver::{
    errors::SolveResult,
    types::{Residual, State},
};

/// A square system `F(y) = 0`.
pub trait ResidualSystem {
    /// Number of unknowns and equations.
    fn dim(&self) -> usize;

    /// Evaluate `F(y)`.
    ///
    /// # Errors
    /// Only for states the system cannot evaluate at all; numerical failures
    /// should show up as non-finite entries.
    fn residuals(&self, y: &State) -> SolveResult<Residual>;

    /// Report on an accepted iterate. Default: nothing.
    fn inspect(&self, _y: &State) {}
}
