//! calibration::adapter — the calibration objective as an argmin problem.
//!
//! Purpose
//! -------
//! Evaluate one Nelder-Mead trial: project the trial vector onto the
//! parameter box, build a fresh economy from a clone of the prepared
//! aggregate, solve its first-order conditions and return the sum of
//! weighted absolute target errors.
//!
//! Key behaviors
//! -------------
//! - Trials whose Newton solve fails numerically (singular or non-finite
//!   Jacobian, exhausted backtracking) or whose objective is not finite
//!   cost [`FAILED_TRIAL_PENALTY`] and are logged at `warn`; the simplex
//!   carries on.
//! - Configuration errors (wrong vector length, unresolvable economy) abort
//!   the run: they would fail every trial.
//! - A shared [`TrialMemory`] keeps the best trial below
//!   [`WARM_START_THRESHOLD`]. With adaptive initialisation its equilibrium
//!   is the Newton starting point of every later trial.
//!
//! Invariants & assumptions
//! ------------------------
//! - The prepared aggregate is never mutated; each trial works on a clone.
//! - Trials are evaluated sequentially; the memory is a `RefCell`.
use std::cell::RefCell;

use argmin::core::{CostFunction, Error};
use ndarray::Array1;
use slog::{debug, info, o, warn, Logger};

use crate::{
    calibration::{
        errors::{CalibError, CalibResult},
        targets::Targets,
    },
    model::{data::ModelData, equilibrium::Equilibrium, foc::solve_economy, params::Bounds},
    solver::errors::{SolveError, SolveResult},
};

/// Objective value of a trial whose equilibrium could not be solved.
pub const FAILED_TRIAL_PENALTY: f64 = 1e10;

/// Objective a trial must beat before it can seed later Newton solves.
pub const WARM_START_THRESHOLD: f64 = 100.0;

/// Best trial seen so far plus trial counters.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialMemory {
    pub best_cost: f64,
    pub best_params: Option<Array1<f64>>,
    pub best_equilibrium: Option<Equilibrium>,
    pub trials: usize,
    pub penalized: usize,
}

impl Default for TrialMemory {
    fn default() -> Self {
        Self {
            best_cost: WARM_START_THRESHOLD,
            best_params: None,
            best_equilibrium: None,
            trials: 0,
            penalized: 0,
        }
    }
}

impl TrialMemory {
    fn record(&mut self, cost: f64, params: &Array1<f64>, eq: Equilibrium) {
        if cost < self.best_cost {
            self.best_cost = cost;
            self.best_params = Some(params.clone());
            self.best_equilibrium = Some(eq);
        }
    }
}

/// Project `x` onto the box described by `bounds`.
pub fn project(x: &Array1<f64>, bounds: &[Bounds]) -> Array1<f64> {
    Array1::from_iter(x.iter().zip(bounds).map(|(&v, b)| b.clamp(v)))
}

/// Calibration objective over the free parameters of a prepared aggregate.
#[derive(Debug)]
pub struct CalibrationProblem<'a> {
    template: &'a ModelData,
    targets: &'a Targets,
    bounds: Vec<Bounds>,
    adaptive: bool,
    memory: &'a RefCell<TrialMemory>,
    logger: Logger,
}

impl<'a> CalibrationProblem<'a> {
    pub fn new(
        template: &'a ModelData, targets: &'a Targets, adaptive: bool,
        memory: &'a RefCell<TrialMemory>, logger: &Logger,
    ) -> Self {
        Self {
            template,
            targets,
            bounds: template.free.bounds(),
            adaptive,
            memory,
            logger: logger.new(o!("component" => "calibration")),
        }
    }

    /// Objective at `x`; failed trials evaluate to [`FAILED_TRIAL_PENALTY`].
    ///
    /// # Errors
    /// [`CalibError::Model`] when `x` cannot be assigned to the free
    /// parameters or the economy cannot be built.
    pub fn evaluate(&self, x: &Array1<f64>) -> CalibResult<f64> {
        let projected = project(x, &self.bounds);
        let mut trial = self.template.clone();
        trial.free.assign(&projected)?;
        if self.adaptive {
            if let Some(eq) = self.memory.borrow().best_equilibrium {
                trial.x0 = eq;
            }
        }
        debug!(self.logger, "calibration trial";
            "params" => format!("{projected}"), "x0" => format!("{:?}", trial.x0));
        self.memory.borrow_mut().trials += 1;

        let (cost, eq) = match self.trial_cost(&trial) {
            Ok(found) => found,
            Err(SolveError::Model(err)) => return Err(CalibError::Model(err)),
            Err(err) => {
                warn!(self.logger, "penalising failed trial: {}", err;
                    "params" => format!("{projected}"));
                self.memory.borrow_mut().penalized += 1;
                return Ok(FAILED_TRIAL_PENALTY);
            }
        };
        if !cost.is_finite() {
            warn!(self.logger, "penalising non-finite objective";
                "params" => format!("{projected}"));
            self.memory.borrow_mut().penalized += 1;
            return Ok(FAILED_TRIAL_PENALTY);
        }
        self.memory.borrow_mut().record(cost, &projected, eq);
        Ok(cost)
    }

    fn trial_cost(&self, trial: &ModelData) -> SolveResult<(f64, Equilibrium)> {
        let economy = trial.economy()?;
        let (eq, _) = solve_economy(&economy, trial.x0, &trial.newton, &self.logger)?;
        let snapshot = economy.at(eq);
        let errors = self.targets.errors(&snapshot);
        let cost: f64 = errors.iter().map(|e| e.error).sum();
        let detail = errors
            .iter()
            .map(|e| format!("{}={:.6}", e.key, e.error))
            .collect::<Vec<_>>()
            .join(" ");
        info!(self.logger, "trial errors";
            "sum" => cost, "errors" => detail,
            "tw" => eq.tw, "sf" => eq.sf, "sm" => eq.sm);
        Ok((cost, eq))
    }
}

impl CostFunction for CalibrationProblem<'_> {
    type Param = Array1<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.evaluate(x)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        errors::ModelError,
        inputs::{AllocationShares, GroupData, IncomeGroup},
        params::ParamKey,
    };
    use ndarray::array;
    use slog::Discard;

    fn record() -> GroupData {
        GroupData {
            life_expectancy: 40.0,
            sf: 8.0,
            sm: 10.0,
            tw: 0.8,
            gamma: 0.1033,
            tbeta: 1.0,
            female: AllocationShares::from_array([
                0.0379944, 0.0036603, 0.2767614, 0.0095324, 0.0180480, 0.0722065, 0.5817970,
            ]),
            male: AllocationShares::from_array([
                0.0474138, 0.0064630, 0.1083183, 0.0267603, 0.0513731, 0.1056088, 0.6540626,
            ]),
        }
    }

    fn reference() -> Array1<f64> {
        array![5.0, 1.5, 0.4, 0.15, 2.0, 0.17, 3.0, 13.0]
    }

    fn logger() -> Logger {
        Logger::root(Discard, o!())
    }

    #[test]
    // Purpose
    // -------
    // Projection clamps every coordinate into its bounds.
    //
    // Given
    // -----
    // - Default bounds and a vector with negative entries.
    //
    // Expect
    // ------
    // - `hat_c` clamps to 0, the rest to `1e-3`; in-box values unchanged.
    fn projection_clamps() {
        let data = ModelData::new(IncomeGroup::All, &record()).unwrap();
        let bounds = data.free.bounds();
        let x = array![-1.0, -1.0, 0.4, 0.15, 2.0, 0.17, 3.0, 13.0];
        let p = project(&x, &bounds);
        assert_eq!(p[0], 0.0);
        assert_eq!(p[1], 1e-3);
        assert_eq!(p[2], 0.4);
    }

    #[test]
    // Purpose
    // -------
    // A solvable trial returns the target objective and seeds the memory.
    //
    // Given
    // -----
    // - The reference parameters on the "all" record with adaptive
    //   initialisation.
    //
    // Expect
    // ------
    // - A finite objective equal to the stored best cost, one trial, no
    //   penalties, and a remembered equilibrium.
    fn solvable_trial_updates_memory() {
        let record = record();
        let data = ModelData::new(IncomeGroup::All, &record).unwrap();
        let targets = Targets::from_group(&record);
        let memory = RefCell::new(TrialMemory::default());
        let problem = CalibrationProblem::new(&data, &targets, true, &memory, &logger());
        let cost = problem.evaluate(&reference()).unwrap();
        assert!(cost.is_finite() && cost < FAILED_TRIAL_PENALTY);
        let memory = memory.borrow();
        assert_eq!(memory.trials, 1);
        assert_eq!(memory.penalized, 0);
        if cost < WARM_START_THRESHOLD {
            assert_eq!(memory.best_cost, cost);
            assert!(memory.best_equilibrium.is_some());
        }
    }

    #[test]
    // Purpose
    // -------
    // Numerically failing trials are penalised, not fatal.
    //
    // Given
    // -----
    // - The reference parameters with the Newton start at
    //   `(tw, sf, sm) = (0, 0, 0)`, where the human-capital slope and
    //   therefore the residuals are not finite.
    //
    // Expect
    // ------
    // - The trial costs exactly the penalty and is counted as penalised.
    fn failing_trial_is_penalised() {
        let record = record();
        let mut data = ModelData::new(IncomeGroup::All, &record).unwrap();
        data.x0 = Equilibrium::new(0.0, 0.0, 0.0);
        let targets = Targets::from_group(&record);
        let memory = RefCell::new(TrialMemory::default());
        let problem = CalibrationProblem::new(&data, &targets, false, &memory, &logger());
        let cost = problem.evaluate(&reference()).unwrap();
        assert_eq!(cost, FAILED_TRIAL_PENALTY);
        assert_eq!(memory.borrow().penalized, 1);
    }

    #[test]
    // Purpose
    // -------
    // Adaptive trials start Newton from the remembered equilibrium,
    // non-adaptive trials from the aggregate's own start.
    //
    // Given
    // -----
    // - The reference parameters with the aggregate start at
    //   `(0, 0, 0)`, where no solve succeeds, and a memory seeded with the
    //   observed point `(0.8, 8, 10)`.
    //
    // Expect
    // ------
    // - Adaptive: a finite objective below the penalty, nothing penalised.
    // - Non-adaptive: exactly the penalty.
    fn warm_start_follows_memory() {
        let record = record();
        let mut data = ModelData::new(IncomeGroup::All, &record).unwrap();
        data.x0 = Equilibrium::new(0.0, 0.0, 0.0);
        let targets = Targets::from_group(&record);
        let seeded = || {
            RefCell::new(TrialMemory {
                best_equilibrium: Some(Equilibrium::new(0.8, 8.0, 10.0)),
                ..TrialMemory::default()
            })
        };

        let memory = seeded();
        let problem = CalibrationProblem::new(&data, &targets, true, &memory, &logger());
        let cost = problem.evaluate(&reference()).unwrap();
        assert!(cost.is_finite() && cost < FAILED_TRIAL_PENALTY);
        assert_eq!(memory.borrow().penalized, 0);

        let memory = seeded();
        let problem = CalibrationProblem::new(&data, &targets, false, &memory, &logger());
        assert_eq!(problem.evaluate(&reference()).unwrap(), FAILED_TRIAL_PENALTY);
        assert_eq!(memory.borrow().penalized, 1);
    }

    #[test]
    // Purpose
    // -------
    // Vectors of the wrong length abort the run.
    //
    // Given
    // -----
    // - A 3-vector for an 8-parameter schema.
    //
    // Expect
    // ------
    // - `CalibError::Model(ParameterLengthMismatch)`.
    fn wrong_length_is_fatal() {
        let record = record();
        let data = ModelData::new(IncomeGroup::All, &record).unwrap();
        assert!(data.free.contains(&ParamKey::HatC));
        let targets = Targets::from_group(&record);
        let memory = RefCell::new(TrialMemory::default());
        let problem = CalibrationProblem::new(&data, &targets, false, &memory, &logger());
        let err = problem.evaluate(&array![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            CalibError::Model(ModelError::ParameterLengthMismatch { expected: 8, found: 3 })
        ));
    }
}
