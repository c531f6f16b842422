//! solver — damped Newton method for the household first-order conditions.
//!
//! Purpose
//! -------
//! Solve small square systems `F(y) = 0` without analytic derivatives. The
//! only production caller is the first-order-condition system of
//! [`crate::model::foc`] with `y = (tw, sf, sm)`; the solver itself knows
//! nothing about the economy and is exercised on synthetic systems as well.
//!
//! Key behaviors
//! -------------
//! - [`traits::ResidualSystem`] is the seam: dimension, residuals, and an
//!   `inspect` hook called on accepted iterates.
//! - [`finite_diff`] builds central-difference Jacobians, shrinking the
//!   step by decades until every entry is finite.
//! - [`newton`] iterates Newton directions with decade backtracking,
//!   rejecting candidates with negative components or a residual norm that
//!   does not strictly decrease.
//! - [`options::NewtonOptions`] carries the steps, damping ladder,
//!   tolerances and iteration cap; all are validated before use.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every accepted iterate is non-negative with a finite residual.
//! - Accepted residual norms are strictly decreasing.
//! - The solve terminates after at most `max_iter` accepted steps.
//!
//! Conventions
//! -----------
//! - Vectors and matrices are `ndarray` containers; dense inversion goes
//!   through `nalgebra`.
//! - Failures that make the current solve meaningless (singular or
//!   non-finite Jacobian, exhausted backtracking) are `SolveError`s;
//!   running out of iterations is reported through
//!   [`newton::NewtonOutcome::converged`].
//!
//! Testing notes
//! -------------
//! - Unit tests per submodule; backtracking and step shrinking are also
//!   covered by integration tests on purpose-built residual systems.

pub mod errors;
pub mod finite_diff;
pub mod newton;
pub mod options;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use schooling_gap::solver::prelude::*;
//
// to import the solver surface in a single line.

pub mod prelude {
    pub use super::errors::{SolveError, SolveResult};
    pub use super::finite_diff::jacobian;
    pub use super::newton::{solve, NewtonOutcome};
    pub use super::options::NewtonOptions;
    pub use super::traits::ResidualSystem;
    pub use super::types::{Jacobian, Residual, State};
}
