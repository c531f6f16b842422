//! model::foc — first-order conditions of the household problem.
//!
//! Purpose
//! -------
//! Assemble the three residuals whose common root is the equilibrium
//! `(tw, sf, sm)`, and expose them to the Newton solver as a
//! [`ResidualSystem`].
//!
//! Key behaviors
//! -------------
//! With reference index `x = Sh`:
//! - `f1` (reduced constraint): `sum_i L_f(i)/L_f(x)` minus
//!   `sum_p E(p, x) I_f(x) / I_L`, where `I_L` is the female share of the
//!   total wage bill.
//! - `f2` (combined schooling condition): for both genders,
//!   `W'_g(s_g) + L_g^r / L_g(x) g(s_g) / (1 - gamma) E_S / (1 + E(Sh, x))
//!   I_g(x) delta(0)` with `g(s) = H'/H + d'/d`, summed.
//! - `f3` (schooling ratio condition):
//!   `W'_f(sf) / W'_m(sm) - L_f^r / L_m^r tw gg(sf) / gg(sm)` with
//!   `gg(s) = g(s) d(s) H(s)`.
//!
//! Consistency checks
//! ------------------
//! At accepted iterates the system reports (as `warn` log records) total
//! time allocations off their endowment by more than
//! [`ALLOCATION_TOLERANCE`] and subsistence shares outside `[0, 1]`.
//! Neither stops the solver.
use std::fmt;

use slog::{o, warn, Logger};

use crate::{
    model::{
        data::{Economy, ModelData},
        equilibrium::{Equilibrium, EQUILIBRIUM_DIM},
        index::{FlowIndex, Gender, ProductionIndex},
        primitives::{marginal_schooling_cost, schooling_return, weighted_schooling_return},
        snapshot::Snapshot,
    },
    solver::{
        errors::{SolveError, SolveResult},
        newton::{solve, NewtonOutcome},
        options::NewtonOptions,
        traits::ResidualSystem,
        types::{Residual, State},
    },
};

/// Index whose conditions close the system.
pub const REFERENCE_INDEX: ProductionIndex = ProductionIndex::SH;

/// Admissible deviation of total time allocation from the endowment.
pub const ALLOCATION_TOLERANCE: f64 = 1e-2;

impl Snapshot<'_> {
    /// `f1`: labor-market clearing for `idx`.
    pub fn reduced_constraint(&self, idx: ProductionIndex) -> f64 {
        let under = FlowIndex::from(idx);
        let expenditure: f64 = ProductionIndex::ALL
            .iter()
            .map(|&p| self.relative_expenditure(p.into(), under))
            .sum();
        self.aggregate_flow_ratio(Gender::Female, under)
            - expenditure * self.female_wage_bill(under) / self.female_total_wage_bill()
    }

    /// Schooling condition of one gender for `idx`.
    pub fn schooling_condition(&self, gender: Gender, idx: ProductionIndex) -> f64 {
        let economy = self.economy();
        let fixed = economy.fixed();
        let eq = self.equilibrium();
        let s = match gender {
            Gender::Female => eq.sf,
            Gender::Male => eq.sm,
        };
        let under = FlowIndex::from(idx);
        let sector = idx.sector;
        let sector_traditional = FlowIndex::from(sector.traditional());
        marginal_schooling_cost(fixed, gender, economy.beta_f(), s)
            + self.modern_allocation(gender) / self.time_allocation(gender, under)
                * schooling_return(fixed, s)
                / self.non_subsistence_share()
                * self.sector_share(sector)
                / (1.0 + self.relative_expenditure(sector_traditional, under))
                * self.wage_bill(gender, under)
                * self.life().working_zero
    }

    /// `f2`: female plus male schooling conditions.
    pub fn combined_schooling_condition(&self, idx: ProductionIndex) -> f64 {
        self.schooling_condition(Gender::Female, idx) + self.schooling_condition(Gender::Male, idx)
    }

    /// `f3`: female/male ratio of marginal schooling costs against modern
    /// allocation and human-capital growth.
    pub fn schooling_ratio_condition(&self) -> f64 {
        let economy = self.economy();
        let fixed = economy.fixed();
        let eq = self.equilibrium();
        let beta_f = economy.beta_f();
        marginal_schooling_cost(fixed, Gender::Female, beta_f, eq.sf)
            / marginal_schooling_cost(fixed, Gender::Male, beta_f, eq.sm)
            - self.modern_allocation(Gender::Female) / self.modern_allocation(Gender::Male)
                * eq.tw
                * weighted_schooling_return(fixed, eq.sf)
                / weighted_schooling_return(fixed, eq.sm)
    }

    /// `[f1, f2, f3]` at the reference index.
    pub fn foc(&self) -> [f64; 3] {
        [
            self.reduced_constraint(REFERENCE_INDEX),
            self.combined_schooling_condition(REFERENCE_INDEX),
            self.schooling_ratio_condition(),
        ]
    }

    /// Allocation and subsistence checks of this point.
    pub fn consistency(&self) -> Vec<ConsistencyWarning> {
        let mut warnings = Vec::new();
        for gender in Gender::ALL {
            let total = self.total_allocation(gender);
            let endowment = self.economy().fixed().endowment(gender);
            if !((total - endowment).abs() <= ALLOCATION_TOLERANCE) {
                warnings.push(ConsistencyWarning::TimeAllocation { gender, total, endowment });
            }
        }
        let share = self.subsistence_share();
        if !(0.0..=1.0).contains(&share) {
            warnings.push(ConsistencyWarning::SubsistenceShare { share });
        }
        warnings
    }
}

/// Non-fatal inconsistency of an equilibrium candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsistencyWarning {
    TimeAllocation { gender: Gender, total: f64, endowment: f64 },
    SubsistenceShare { share: f64 },
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyWarning::TimeAllocation { gender, total, endowment } => write!(
                f,
                "total {} time allocation {total:.6} deviates from endowment {endowment}",
                match gender {
                    Gender::Female => "female",
                    Gender::Male => "male",
                }
            ),
            ConsistencyWarning::SubsistenceShare { share } => {
                write!(f, "subsistence share {share:.6} outside [0, 1]")
            }
        }
    }
}

/// First-order conditions of an economy as a Newton residual system.
#[derive(Debug, Clone)]
pub struct FocSystem<'a> {
    economy: &'a Economy,
    logger: Logger,
}

impl<'a> FocSystem<'a> {
    pub fn new(economy: &'a Economy, logger: &Logger) -> Self {
        Self { economy, logger: logger.new(o!("component" => "foc")) }
    }

    pub fn economy(&self) -> &'a Economy {
        self.economy
    }
}

impl ModelData {
    /// Solve the first-order conditions from `x0` and store the result in
    /// `xstar`.
    ///
    /// A solve that runs out of iterations still stores its last iterate.
    ///
    /// # Errors
    /// - [`SolveError::Model`] if the economy cannot be built.
    /// - Any Newton failure (see [`crate::solver::newton`]); `xstar` is left
    ///   untouched in that case.
    pub fn solve_equilibrium(&mut self, logger: &Logger) -> SolveResult<NewtonOutcome> {
        let economy = self.economy()?;
        let (xstar, outcome) = solve_economy(&economy, self.x0, &self.newton, logger)?;
        self.xstar = Some(xstar);
        Ok(outcome)
    }
}

/// Solve the first-order conditions of `economy` from `x0`.
///
/// # Errors
/// Any Newton failure (see [`crate::solver::newton`]).
pub fn solve_economy(
    economy: &Economy, x0: Equilibrium, opts: &NewtonOptions, logger: &Logger,
) -> SolveResult<(Equilibrium, NewtonOutcome)> {
    let system = FocSystem::new(economy, logger);
    let outcome = solve(&system, &x0.to_array(), opts, logger)?;
    let xstar = equilibrium_of(&outcome.solution)?;
    Ok((xstar, outcome))
}

fn equilibrium_of(y: &State) -> SolveResult<Equilibrium> {
    Equilibrium::from_array(y)
        .ok_or(SolveError::StateDimMismatch { expected: EQUILIBRIUM_DIM, found: y.len() })
}

impl ResidualSystem for FocSystem<'_> {
    fn dim(&self) -> usize {
        EQUILIBRIUM_DIM
    }

    fn residuals(&self, y: &State) -> SolveResult<Residual> {
        let eq = equilibrium_of(y)?;
        Ok(Residual::from(self.economy.at(eq).foc().to_vec()))
    }

    fn inspect(&self, y: &State) {
        let Ok(eq) = equilibrium_of(y) else {
            return;
        };
        for warning in self.economy.at(eq).consistency() {
            warn!(self.logger, "inconsistent equilibrium candidate: {}", warning;
                "tw" => eq.tw, "sf" => eq.sf, "sm" => eq.sm);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::inputs::{AllocationShares, GroupData, IncomeGroup};
    use approx::assert_relative_eq;
    use slog::Discard;

    fn aggregate() -> ModelData {
        let record = GroupData {
            life_expectancy: 40.0,
            sf: 8.0,
            sm: 10.0,
            tw: 0.8,
            gamma: 0.1,
            tbeta: 1.0,
            female: AllocationShares::from_array([
                0.0379944, 0.0036603, 0.2767614, 0.0095324, 0.0180480, 0.0722065, 0.5817970,
            ]),
            male: AllocationShares::from_array([
                0.0474138, 0.0064630, 0.1083183, 0.0267603, 0.0513731, 0.1056088, 0.6540626,
            ]),
        };
        let mut data = ModelData::new(IncomeGroup::All, &record).unwrap();
        data.initialize([
            ("hat_c", 5.0),
            ("varphi", 1.5),
            ("beta_f", 0.4),
            ("Z_ArAh", 0.15),
            ("Z_MrMh", 2.0),
            ("Z_SrSh", 0.17),
            ("Z_ArSr", 3.0),
            ("Z_MrSr", 13.0),
        ])
        .unwrap();
        data
    }

    fn logger() -> Logger {
        Logger::root(Discard, o!())
    }

    #[test]
    // Purpose
    // -------
    // The residual system evaluates to the three conditions of a snapshot.
    //
    // Given
    // -----
    // - The calibrated economy at its observed starting point.
    //
    // Expect
    // ------
    // - Residuals are finite and equal `Snapshot::foc` entry by entry.
    fn residuals_match_snapshot() {
        let data = aggregate();
        let economy = data.economy().unwrap();
        let system = FocSystem::new(&economy, &logger());
        let y = data.x0.to_array();
        let residuals = system.residuals(&y).unwrap();
        let direct = economy.at(data.x0).foc();
        assert_eq!(system.dim(), 3);
        for i in 0..3 {
            assert!(residuals[i].is_finite());
            assert_eq!(residuals[i], direct[i]);
        }
    }

    #[test]
    // Purpose
    // -------
    // Solving the conditions yields a consistent equilibrium.
    //
    // Given
    // -----
    // - The calibrated economy from `(0.8, 8, 10)` with default options.
    //
    // Expect
    // ------
    // - Converged, `xstar` stored, `sf < sm`, `tw > 0`, both totals within
    //   the allocation tolerance and no consistency warnings.
    fn solves_to_consistent_equilibrium() {
        let mut data = aggregate();
        let outcome = data.solve_equilibrium(&logger()).unwrap();
        assert!(outcome.converged);
        assert!(outcome.iterations <= 35);
        let xstar = data.xstar.unwrap();
        assert!(xstar.tw > 0.0);
        assert!(xstar.schooling_ratio() < 1.0);
        let economy = data.economy().unwrap();
        let snapshot = economy.at(xstar);
        for gender in Gender::ALL {
            assert_relative_eq!(snapshot.total_allocation(gender), 1.0, epsilon = ALLOCATION_TOLERANCE);
        }
        assert!(snapshot.consistency().is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Wrong-length states are reported, not evaluated.
    //
    // Given
    // -----
    // - A length-2 state.
    //
    // Expect
    // ------
    // - `StateDimMismatch { expected: 3, found: 2 }`.
    fn rejects_wrong_dimension() {
        let data = aggregate();
        let economy = data.economy().unwrap();
        let system = FocSystem::new(&economy, &logger());
        let err = system.residuals(&State::from(vec![1.0, 2.0])).unwrap_err();
        assert_eq!(err, SolveError::StateDimMismatch { expected: 3, found: 2 });
    }
}
