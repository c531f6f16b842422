//! model::allocation — time allocation across the flow indices.
//!
//! Purpose
//! -------
//! Turn relative expenditures and wage bills into how each gender splits
//! its time endowment:
//! - the *flow ratio* `L_g(over) / L_g(under)` over the seven flow
//!   indices;
//! - the *aggregate flow ratio* `sum_i L_g(i) / L_g(under)`;
//! - the *time-allocation control* `L_g(idx) = endowment / aggregate`, the
//!   equilibrium time share the calibration targets.
//!
//! Key behaviors
//! -------------
//! - Production pairs use
//!   `E(over, under) I_g(over) / I_g(under) disc^([over r] - [under r])`
//!   where `disc = d(sf)/d(0) delta(0)/delta(sf)` discounts modern labor.
//! - Leisure over a production index drops the leisure side of the
//!   exponent; production over leisure is the reciprocal.
//!
//! Invariants & assumptions
//! ------------------------
//! - `flow_ratio(g, i, i) == 1` exactly.
//! - The controls of a gender sum to its endowment at a true equilibrium;
//!   away from it they need not, which the first-order conditions report.
use crate::model::{
    expenditure::flow_expenditure,
    index::{FlowIndex, Gender, ProductionIndex, Sector},
    primitives::LifeCycle,
    snapshot::Snapshot,
};

impl Snapshot<'_> {
    pub fn female_wage_bill(&self, idx: FlowIndex) -> f64 {
        self.production().wage_bill(Gender::Female, idx)
    }

    pub fn male_wage_bill(&self, idx: FlowIndex) -> f64 {
        self.production().wage_bill(Gender::Male, idx)
    }

    pub fn wage_bill(&self, gender: Gender, idx: FlowIndex) -> f64 {
        self.production().wage_bill(gender, idx)
    }

    /// Relative expenditure over flow indices, leisure included.
    pub fn relative_expenditure(&self, over: FlowIndex, under: FlowIndex) -> f64 {
        flow_expenditure(&self.production().expenditure, self.leisure_row(), over, under)
    }

    pub fn sector_share(&self, sector: Sector) -> f64 {
        self.production().sector_share(sector)
    }

    /// Production-to-production labor ratio of a gender.
    pub fn labor_ratio(&self, gender: Gender, over: ProductionIndex, under: ProductionIndex) -> f64 {
        self.production().labor_ratio(gender, over, under)
    }

    /// Flow-time ratio `L_g(over) / L_g(under)` over flow indices.
    pub fn flow_ratio(&self, gender: Gender, over: FlowIndex, under: FlowIndex) -> f64 {
        match (over, under) {
            _ if over == under => 1.0,
            (_, FlowIndex::Leisure) => 1.0 / self.flow_ratio(gender, under, over),
            (FlowIndex::Leisure, FlowIndex::Production(p)) => {
                let exponent = -(p.is_modern() as i32);
                self.relative_expenditure(over, under) * self.wage_bill(gender, over)
                    / self.wage_bill(gender, under)
                    * self.life().modern_discount().powi(exponent)
            }
            (FlowIndex::Production(o), FlowIndex::Production(u)) => self.labor_ratio(gender, o, u),
        }
    }

    /// `sum_p L_g(p) / L_g(under)` over the six production indices.
    pub fn aggregate_labor_ratio(&self, gender: Gender, under: FlowIndex) -> f64 {
        ProductionIndex::ALL.iter().map(|&p| self.flow_ratio(gender, p.into(), under)).sum()
    }

    /// [`Self::aggregate_labor_ratio`] plus the leisure ratio.
    pub fn aggregate_flow_ratio(&self, gender: Gender, under: FlowIndex) -> f64 {
        self.aggregate_labor_ratio(gender, under) + self.flow_ratio(gender, FlowIndex::Leisure, under)
    }

    /// Time share of `gender` devoted to `idx`.
    pub fn time_allocation(&self, gender: Gender, idx: FlowIndex) -> f64 {
        self.economy().fixed().endowment(gender) / self.aggregate_flow_ratio(gender, idx)
    }

    /// Time in modern production, summed over sectors.
    pub fn modern_allocation(&self, gender: Gender) -> f64 {
        Sector::ALL.iter().map(|s| self.time_allocation(gender, s.modern().into())).sum()
    }

    /// Time summed over all seven flow indices.
    pub fn total_allocation(&self, gender: Gender) -> f64 {
        FlowIndex::ALL.iter().map(|&idx| self.time_allocation(gender, idx)).sum()
    }

    /// Female share of the economy-wide wage bill,
    /// `1 / (1 + L_m/L_f d(sm)/d(sf) H(sm)/H(sf) / tw)`.
    pub fn female_total_wage_bill(&self) -> f64 {
        let female = self.total_allocation(Gender::Female);
        let male = self.total_allocation(Gender::Male);
        let LifeCycle { d_female, d_male, h_female, h_male, .. } = *self.life();
        1.0 / (1.0 + male / female * d_male / d_female * h_male / h_female / self.equilibrium().tw)
    }
}
