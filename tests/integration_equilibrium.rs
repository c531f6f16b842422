//! Integration tests for the reference economy.
//!
//! Purpose
//! -------
//! - Solve the first-order conditions of a fully parameterised economy end
//!   to end and compare with known equilibrium values.
//! - Check the structural identities of the model on the solved economy
//!   rather than on hand-built fixtures.
//!
//! Coverage
//! --------
//! - `model::data` and `model::foc`: aggregate construction,
//!   initialisation, `solve_equilibrium`.
//! - `model::allocation`: 7x7 relative expenditures, wage-bill shares,
//!   time-allocation totals.
//!
//! Exclusions
//! ----------
//! - Closed-form primitives and the resolver's expression shapes; those are
//!   covered by unit tests.
use approx::assert_relative_eq;
use schooling_gap::{
    logging::discard_logger,
    model::{
        data::ModelData,
        equilibrium::Equilibrium,
        index::{FlowIndex, Gender},
        inputs::{AllocationShares, GroupData, IncomeGroup},
    },
};

/// Observed record of the pooled ("all") income group.
fn all_income_record() -> GroupData {
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

fn reference_aggregate() -> ModelData {
    let mut data = ModelData::new(IncomeGroup::All, &all_income_record()).unwrap();
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

fn solved() -> (ModelData, Equilibrium) {
    let mut data = reference_aggregate();
    let outcome = data.solve_equilibrium(&discard_logger()).unwrap();
    assert!(outcome.converged);
    let xstar = data.xstar.unwrap();
    (data, xstar)
}

#[test]
// Purpose
// -------
// The reference economy solves to its known equilibrium.
//
// Given
// -----
// - Reference parameters, start at the observed `(0.8, 8, 10)`, default
//   Newton options.
//
// Expect
// ------
// - Convergence to `(1.24171, 2.98233, 10.47111)` to three significant
//   digits, female schooling below male schooling.
fn reference_equilibrium() {
    let (_, xstar) = solved();
    assert_relative_eq!(xstar.tw, 1.24171, max_relative = 1e-3);
    assert_relative_eq!(xstar.sf, 2.98233, max_relative = 1e-3);
    assert_relative_eq!(xstar.sm, 10.47111, max_relative = 1e-3);
    assert!(xstar.schooling_ratio() < 1.0);
}

#[test]
// Purpose
// -------
// Time allocations are consistent at the solution.
//
// Given
// -----
// - The solved reference economy.
//
// Expect
// ------
// - Each gender's seven controls are positive and sum to one within
//   1e-2; no consistency warnings.
fn allocations_add_up() {
    let (data, xstar) = solved();
    let economy = data.economy().unwrap();
    let snapshot = economy.at(xstar);
    for gender in Gender::ALL {
        for idx in FlowIndex::ALL {
            assert!(snapshot.time_allocation(gender, idx) > 0.0);
        }
        assert_relative_eq!(snapshot.total_allocation(gender), 1.0, epsilon = 1e-2);
    }
    assert!(snapshot.consistency().is_empty());
}

#[test]
// Purpose
// -------
// Relative expenditures over all seven flow indices are reciprocal.
//
// Given
// -----
// - The reference economy at its observed point and at the solution.
//
// Expect
// ------
// - `E(i, i) = 1` exactly and `E(i, j) E(j, i) = 1` to 1e-12.
fn expenditure_reciprocity() {
    let (data, xstar) = solved();
    let economy = data.economy().unwrap();
    for eq in [data.x0, xstar] {
        let snapshot = economy.at(eq);
        for over in FlowIndex::ALL {
            assert_eq!(snapshot.relative_expenditure(over, over), 1.0);
            for under in FlowIndex::ALL {
                let there = snapshot.relative_expenditure(over, under);
                let back = snapshot.relative_expenditure(under, over);
                assert!(there.is_finite() && there > 0.0);
                assert_relative_eq!(there * back, 1.0, max_relative = 1e-12);
            }
        }
    }
}

#[test]
// Purpose
// -------
// Female and male wage-bill shares complement each other.
//
// Given
// -----
// - The solved reference economy.
//
// Expect
// ------
// - For every flow index the two shares lie in (0, 1) and sum to one; the
//   economy-wide female share lies in (0, 1).
fn wage_bills_complement() {
    let (data, xstar) = solved();
    let economy = data.economy().unwrap();
    let snapshot = economy.at(xstar);
    for idx in FlowIndex::ALL {
        let female = snapshot.female_wage_bill(idx);
        let male = snapshot.male_wage_bill(idx);
        assert!(female > 0.0 && female < 1.0);
        assert_relative_eq!(female + male, 1.0, max_relative = 1e-14);
    }
    let total = snapshot.female_total_wage_bill();
    assert!(total > 0.0 && total < 1.0);
}
