//! model::snapshot — every closed-form quantity of an economy at one point.
//!
//! Purpose
//! -------
//! Evaluate the economy once at an equilibrium candidate `(tw, sf, sm)` and
//! keep the building blocks (life-cycle terms, wage bills, the production
//! expenditure table, sectoral shares, the subsistence block and leisure
//! expenditures) so that allocation ratios, controls and first-order
//! conditions are cheap lookups. Values are the same as evaluating each
//! closed form from scratch.
//!
//! Conventions
//! -----------
//! - Construction happens in two stages. [`ProductionSide`] only depends on
//!   production indices; the subsistence block is solved from it, and
//!   leisure expenditures follow from the subsistence share.
//! - No method fails: degenerate points yield non-finite numbers, which the
//!   solver rejects.
use crate::model::{
    data::Economy,
    equilibrium::Equilibrium,
    expenditure::{leisure_expenditure, sector_shares, PricingContext},
    index::{FlowIndex, Gender, ProductionIndex, Sector},
    primitives::{female_wage_bill, LifeCycle},
    subsistence::SubsistenceBlock,
};

/// Quantities that only involve production indices.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionSide {
    pub eq: Equilibrium,
    pub life: LifeCycle,
    /// Female wage bills in [`FlowIndex::ALL`] order (leisure included).
    pub female_wage: [f64; 7],
    /// `E(over, under)`, row `over`, column `under`.
    pub expenditure: [[f64; 6]; 6],
    /// Sectoral expenditure shares by [`Sector::position`].
    pub sector_shares: [f64; 3],
}

impl ProductionSide {
    pub fn new(economy: &Economy, eq: Equilibrium) -> Self {
        let fixed = economy.fixed();
        let life = LifeCycle::at(fixed, &eq);
        let female_wage: [f64; 7] =
            std::array::from_fn(|i| female_wage_bill(fixed, FlowIndex::ALL[i], eq.tw, &life));
        let ctx = PricingContext { fixed, life: &life, female_wage: &female_wage };
        let expenditure = economy.table().evaluate(&ctx);
        let sector_shares = sector_shares(&expenditure);
        Self { eq, life, female_wage, expenditure, sector_shares }
    }

    pub fn wage_bill(&self, gender: Gender, idx: FlowIndex) -> f64 {
        let female = self.female_wage[idx.position()];
        match gender {
            Gender::Female => female,
            Gender::Male => 1.0 - female,
        }
    }

    pub fn relative(&self, over: ProductionIndex, under: ProductionIndex) -> f64 {
        self.expenditure[over.position()][under.position()]
    }

    pub fn sector_share(&self, sector: Sector) -> f64 {
        self.sector_shares[sector.position()]
    }

    /// Labor of `gender` in `over` relative to `under`:
    /// `E(over, under) I_g(over) / I_g(under) disc^([over r] - [under r])`.
    pub fn labor_ratio(&self, gender: Gender, over: ProductionIndex, under: ProductionIndex) -> f64 {
        let exponent = over.is_modern() as i32 - under.is_modern() as i32;
        self.relative(over, under) * self.wage_bill(gender, over.into())
            / self.wage_bill(gender, under.into())
            * self.life.modern_discount().powi(exponent)
    }

    /// Sum of [`Self::labor_ratio`] over all production indices.
    pub fn aggregate_labor_ratio(&self, gender: Gender, under: ProductionIndex) -> f64 {
        ProductionIndex::ALL.iter().map(|&over| self.labor_ratio(gender, over, under)).sum()
    }
}

/// All closed-form quantities of an economy at one equilibrium candidate.
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    economy: &'a Economy,
    production: ProductionSide,
    subsistence: SubsistenceBlock,
    /// `E(l, X)` by production position.
    leisure: [f64; 6],
}

impl Economy {
    /// Evaluate the economy at `eq`.
    pub fn at(&self, eq: Equilibrium) -> Snapshot<'_> {
        Snapshot::new(self, eq)
    }
}

impl<'a> Snapshot<'a> {
    pub fn new(economy: &'a Economy, eq: Equilibrium) -> Self {
        let production = ProductionSide::new(economy, eq);
        let subsistence = SubsistenceBlock::solve(economy, &production);
        let leisure = leisure_expenditure(
            economy.varphi(),
            subsistence.non_subsistence_share(),
            &production.sector_shares,
            &production.expenditure,
        );
        Self { economy, production, subsistence, leisure }
    }

    pub fn economy(&self) -> &'a Economy {
        self.economy
    }

    pub fn equilibrium(&self) -> Equilibrium {
        self.production.eq
    }

    pub fn life(&self) -> &LifeCycle {
        &self.production.life
    }

    pub fn production(&self) -> &ProductionSide {
        &self.production
    }

    pub fn subsistence(&self) -> &SubsistenceBlock {
        &self.subsistence
    }

    pub(crate) fn leisure_row(&self) -> &[f64; 6] {
        &self.leisure
    }
}
