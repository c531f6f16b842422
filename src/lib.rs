//! schooling_gap — gendered time allocation, schooling and structural change.
//!
//! Purpose
//! -------
//! Solve and calibrate a general-equilibrium model in which women and men
//! split their time between schooling, work in six production cells
//! (agriculture, manufacturing and services, each with a traditional and a
//! modern technology) and leisure. The equilibrium is the triple
//! `(tw, sf, sm)`: the female-to-male wage ratio and the schooling years of
//! each gender.
//!
//! Key behaviors
//! -------------
//! - [`model`] holds the parameters, the closed-form primitives, the
//!   relative-expenditure resolver, aggregate allocations and the
//!   three-equation first-order-condition system.
//! - [`solver`] solves square residual systems with a damped Newton method
//!   and finite-difference Jacobians.
//! - [`calibration`] fits the free parameters per income group with
//!   argmin's Nelder-Mead and persists the results as JSON.
//! - [`logging`] builds the `slog` root passed into all of the above.
//!
//! Invariants & assumptions
//! ------------------------
//! - Single-threaded. Independent (setup, group) calibrations may be run in
//!   separate processes.
//! - Library code reports failures through the per-layer error enums
//!   (`ModelError`, `SolveError`, `CalibError`) and never panics on bad
//!   input.
//!
//! Downstream usage
//! ----------------
//! - `use schooling_gap::prelude::*;` imports the common surface.
//! - Binaries build a [`logging::terminal_logger`], load a
//!   `CalibrationConfig` and call `calibrate_many`.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code; integration tests in `tests/` run
//!   the reference economy end to end, the solver on synthetic systems and
//!   the persistence layer against temporary directories.

pub mod calibration;
pub mod logging;
pub mod model;
pub mod solver;

pub mod prelude {
    pub use crate::calibration::prelude::*;
    pub use crate::logging::{discard_logger, terminal_logger};
    pub use crate::model::prelude::*;
    pub use crate::solver::prelude::*;
}
