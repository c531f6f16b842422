//! solver::types — numeric aliases shared by the Newton solver.
//!
//! All vectors and matrices are `ndarray` containers over `f64`. The
//! Jacobian is stored row-major as `J[[i, j]] = dF_i / dy_j`.
use ndarray::{Array1, Array2};

/// Point `y` the residuals are evaluated at.
pub type State = Array1<f64>;

/// Residual vector `F(y)`.
pub type Residual = Array1<f64>;

/// Dense Jacobian `dF/dy`.
pub type Jacobian = Array2<f64>;
