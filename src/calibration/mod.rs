//! calibration — fitting the free parameters to observed statistics.
//!
//! Purpose
//! -------
//! Choose the free parameters of an income group's aggregate so that the
//! solved equilibrium reproduces the group's observed time allocation,
//! schooling, wage ratio and subsistence share as closely as possible.
//!
//! Key behaviors
//! -------------
//! - [`setup`] names the 27 calibration setups and applies their edits to
//!   the aggregate and the target set.
//! - [`targets`] holds weighted targets and computes absolute errors.
//! - [`adapter`] wraps one trial (project, solve, score) as an argmin
//!   `CostFunction`, with warm starts and a finite penalty for failed
//!   solves.
//! - [`run`] drives argmin's Nelder-Mead and normalises its result.
//! - [`persist`] stores one JSON record per (setup, group) and skips
//!   calibrations that are already on disk.
//! - [`config`] and [`summary`] cover the run configuration and the result
//!   table.
//!
//! Invariants & assumptions
//! ------------------------
//! - Trials are sequential; the adaptive warm start depends on the order in
//!   which the simplex evaluates them.
//! - A trial never mutates the prepared aggregate.
//! - Model errors abort a calibration; numerical solve failures only
//!   penalise the trial.
//!
//! Testing notes
//! -------------
//! - Persistence tests write into `tempfile` directories.
//! - Simplex runs in tests use small iteration caps.

pub mod adapter;
pub mod config;
pub mod errors;
pub mod persist;
pub mod run;
pub mod setup;
pub mod summary;
pub mod targets;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use schooling_gap::calibration::prelude::*;
//
// to import the calibration surface in a single line.

pub mod prelude {
    pub use super::adapter::{CalibrationProblem, TrialMemory, FAILED_TRIAL_PENALTY};
    pub use super::config::{load_group_table, CalibrationConfig, Initializers};
    pub use super::errors::{CalibError, CalibResult};
    pub use super::persist::{
        calibrate_and_save_or_load, calibrate_many, load, prepare_calibration, record_path,
        save_if_absent, CalibrationRecord,
    };
    pub use super::run::{calibrate, CalibrationOutcome, SimplexOptions};
    pub use super::setup::{SchoolingTarget, Setup, Variant};
    pub use super::summary::{render_summary, SummaryRow};
    pub use super::targets::{Target, TargetKey, Targets};
}
