//! calibration::run — Nelder-Mead over the free parameters.
//!
//! Purpose
//! -------
//! Drive argmin's Nelder-Mead simplex over a [`CalibrationProblem`] and
//! normalise the result into a [`CalibrationOutcome`]; afterwards write the
//! best vector back into the aggregate and re-solve its equilibrium.
//!
//! Key behaviors
//! -------------
//! - The initial simplex is the starting vector plus, per coordinate, a
//!   copy with that coordinate scaled by 1.05 (or set to 0.00025 when it is
//!   zero), all projected onto the parameter box.
//! - `max_iters` defaults to `200 n` for `n` free parameters.
//! - With the `obs_slog` feature and `verbose` set, argmin's slog observer
//!   reports every iteration.
//! - `converged` is true only for a solver-side stop (simplex spread
//!   below `sd_tolerance` or target cost); hitting `max_iters` is reported
//!   in `status` with `converged = false`.
use std::cell::RefCell;

use argmin::{
    core::{Executor, State, TerminationReason, TerminationStatus},
    solver::neldermead::NelderMead,
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use slog::{info, warn, Logger};

use crate::{
    calibration::{
        adapter::{project, CalibrationProblem, TrialMemory},
        errors::{CalibError, CalibResult},
        targets::Targets,
    },
    model::{data::ModelData, equilibrium::Equilibrium, params::Bounds},
};

/// Relative perturbation of each simplex vertex.
pub const SIMPLEX_SCALE: f64 = 1.05;

/// Vertex coordinate used where the starting value is zero.
pub const SIMPLEX_ZERO_STEP: f64 = 0.00025;

/// Default iteration budget per free parameter.
pub const ITERS_PER_PARAMETER: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplexOptions {
    /// Iteration cap; `None` means `200 n`.
    pub max_iters: Option<u64>,
    /// Standard-deviation tolerance of the simplex costs.
    pub sd_tolerance: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self { max_iters: None, sd_tolerance: 1e-4 }
    }
}

impl SimplexOptions {
    /// # Errors
    /// [`CalibError::InvalidSimplexOptions`] for a zero iteration cap or a
    /// non-positive or non-finite tolerance.
    pub fn validate(&self) -> CalibResult<()> {
        let max_iters = self.max_iters.unwrap_or(1);
        if max_iters == 0 {
            return Err(CalibError::InvalidSimplexOptions {
                max_iters,
                sd_tolerance: self.sd_tolerance,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        if !self.sd_tolerance.is_finite() || self.sd_tolerance <= 0.0 {
            return Err(CalibError::InvalidSimplexOptions {
                max_iters,
                sd_tolerance: self.sd_tolerance,
                reason: "Tolerance must be finite and positive.",
            });
        }
        Ok(())
    }

    pub fn max_iters_for(&self, n: usize) -> u64 {
        self.max_iters.unwrap_or(ITERS_PER_PARAMETER * n as u64)
    }
}

/// Normalised result of one calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationOutcome {
    /// Free-parameter labels in schema order.
    pub labels: Vec<String>,
    /// Best parameter vector, projected onto the box.
    pub x: Array1<f64>,
    /// Objective at `x` as reported by the simplex.
    pub fun: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: u64,
    /// Trials evaluated and penalised.
    pub trials: usize,
    pub penalized: usize,
    /// Equilibrium of the best trial below the warm-start threshold.
    pub warm_start: Option<Equilibrium>,
    /// Equilibrium re-solved at `x`, if the solve succeeded.
    pub xstar: Option<Equilibrium>,
}

/// Initial simplex around `x0`.
pub fn initial_simplex(x0: &Array1<f64>, bounds: &[Bounds]) -> Vec<Array1<f64>> {
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(project(x0, bounds));
    for i in 0..x0.len() {
        let mut vertex = x0.clone();
        vertex[i] = if vertex[i] == 0.0 { SIMPLEX_ZERO_STEP } else { SIMPLEX_SCALE * vertex[i] };
        simplex.push(project(&vertex, bounds));
    }
    simplex
}

fn status_of(status: &TerminationStatus) -> (bool, String) {
    match status {
        TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
        TerminationStatus::Terminated(reason) => {
            let converged = matches!(
                reason,
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached
            );
            (converged, format!("{reason:?}"))
        }
    }
}

/// calibrate — minimise the target objective of a prepared aggregate.
///
/// Parameters
/// ----------
/// - `data`: prepared aggregate with every free parameter initialised. On
///   success its free parameters hold the best vector, `x0` the warm start
///   (if adaptive) and `xstar` the re-solved equilibrium.
/// - `targets`: prepared target set.
/// - `opts`: simplex options.
/// - `adaptive`: warm-start later Newton solves from the best trial.
/// - `verbose`: attach argmin's slog observer (feature `obs_slog`).
///
/// Errors
/// ------
/// - `CalibError::EmptyParameterVector` when nothing is free.
/// - `CalibError::Model` for unset parameters or an unresolvable economy.
/// - argmin errors, mapped through `From<argmin::core::Error>`.
pub fn calibrate(
    data: &mut ModelData, targets: &Targets, opts: &SimplexOptions, adaptive: bool,
    verbose: bool, logger: &Logger,
) -> CalibResult<CalibrationOutcome> {
    opts.validate()?;
    if data.free.is_empty() {
        return Err(CalibError::EmptyParameterVector);
    }
    let x0 = data.free.values()?;
    data.economy()?;
    let bounds = data.free.bounds();
    let n = x0.len();

    let template = data.clone();
    let memory = RefCell::new(TrialMemory::default());
    let problem = CalibrationProblem::new(&template, targets, adaptive, &memory, logger);
    let solver = NelderMead::new(initial_simplex(&x0, &bounds)).with_sd_tolerance(opts.sd_tolerance)?;

    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.max_iters(opts.max_iters_for(n)));
    #[cfg(feature = "obs_slog")]
    if verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    #[cfg(not(feature = "obs_slog"))]
    let _ = verbose;

    let result = optimizer.run()?;
    let state = result.state();
    let best = state.get_best_param().cloned().ok_or(CalibError::MissingBestParam)?;
    let fun = state.get_best_cost();
    let iterations = state.get_iter();
    let (converged, status) = status_of(state.get_termination_status());
    let x = project(&best, &bounds);
    let (trials, penalized, warm_start) = {
        let memory = memory.borrow();
        (memory.trials, memory.penalized, memory.best_equilibrium)
    };
    info!(logger, "simplex finished";
        "status" => &status, "fun" => fun, "iterations" => iterations,
        "trials" => trials, "penalized" => penalized);

    data.free.assign(&x)?;
    if adaptive {
        if let Some(eq) = warm_start {
            data.x0 = eq;
        }
    }
    data.xstar = None;
    if let Err(err) = data.solve_equilibrium(logger) {
        warn!(logger, "equilibrium at calibrated parameters not solved: {}", err);
    }

    Ok(CalibrationOutcome {
        labels: data.free.labels(),
        x,
        fun,
        converged,
        status,
        iterations,
        trials,
        penalized,
        warm_start,
        xstar: data.xstar,
    })
}
