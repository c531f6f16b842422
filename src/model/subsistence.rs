//! model::subsistence — the subsistence consumption block.
//!
//! Households must consume `hat_c` units of the traditional services good
//! before any other spending. Services is the anchor sector because its
//! modern productivity is normalised (`Z_Sr = 1`). The block solves, at a
//! given equilibrium candidate:
//!
//! - the implicit traditional-technology coefficient
//!   `P = (1 + E(Sr,Sh))^{sigma/(sigma-1)} E_S^{eps/(1-eps)} Z_Sr
//!   (xi_Sr / I_f(Sr))^{eta/(eta-1)} H(sf) delta(sf) L_f(Sr,Sh)`;
//! - the base female traditional labor
//!   `L_fSh = (L_f + alpha hat_c / P) / (sum_i L_f(i,Sh) + alpha)`, where
//!   `L_f` is the female time endowment and
//!   `alpha = varphi (1 + E(Sr,Sh)) / E_S I_f(l) / I_f(Sh)`;
//! - the subsistence share `gamma = hat_c / P / L_fSh`.
//!
//! A share outside `[0, 1]` is not an error here; the first-order
//! condition system reports it as a warning.
use crate::model::{
    data::Economy,
    index::{FlowIndex, Gender, Sector},
    snapshot::{ProductionSide, Snapshot},
};

/// Sector whose traditional good carries the subsistence requirement.
pub const SUBSISTENCE_SECTOR: Sector = Sector::Services;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubsistenceBlock {
    /// Implicit traditional-technology coefficient `P`.
    pub coefficient: f64,
    /// Base female labor in the anchor's traditional technology.
    pub base_labor: f64,
    /// Subsistence consumption share.
    pub share: f64,
}

impl SubsistenceBlock {
    pub fn solve(economy: &Economy, side: &ProductionSide) -> Self {
        let fixed = economy.fixed();
        let (eta, sigma, epsilon) = (fixed.eta, fixed.sigma, fixed.epsilon);
        let traditional = SUBSISTENCE_SECTOR.traditional();
        let modern = SUBSISTENCE_SECTOR.modern();
        let own = 1.0 + side.relative(modern, traditional);
        let share = side.sector_share(SUBSISTENCE_SECTOR);
        let modern_wage = side.wage_bill(Gender::Female, modern.into());

        let coefficient = own.powf(sigma / (sigma - 1.0))
            * share.powf(epsilon / (1.0 - epsilon))
            * fixed.z_modern_services
            * (fixed.xi(modern.into()) / modern_wage).powf(eta / (eta - 1.0))
            * side.life.h_female
            * side.life.working_female
            * side.labor_ratio(Gender::Female, modern, traditional);

        let alpha = economy.varphi() * own / share
            * side.wage_bill(Gender::Female, FlowIndex::Leisure)
            / side.wage_bill(Gender::Female, traditional.into());
        let hat_c = economy.hat_c();
        let base_labor = (fixed.endowment(Gender::Female) + alpha * hat_c / coefficient)
            / (side.aggregate_labor_ratio(Gender::Female, traditional) + alpha);

        Self { coefficient, base_labor, share: hat_c / coefficient / base_labor }
    }

    pub fn non_subsistence_share(&self) -> f64 {
        1.0 - self.share
    }
}

impl Snapshot<'_> {
    pub fn subsistence_share(&self) -> f64 {
        self.subsistence().share
    }

    pub fn non_subsistence_share(&self) -> f64 {
        self.subsistence().non_subsistence_share()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        data::ModelData,
        equilibrium::Equilibrium,
        inputs::{AllocationShares, GroupData, IncomeGroup},
    };
    use approx::assert_relative_eq;

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

    fn block(female_endowment: f64) -> SubsistenceBlock {
        let mut data = ModelData::new(IncomeGroup::All, &record()).unwrap();
        data.remove_subsistence();
        data.fixed.female_endowment = female_endowment;
        data.initialize([
            ("varphi", 1.5),
            ("beta_f", 0.4),
            ("Z_ArAh", 0.15),
            ("Z_MrMh", 2.0),
            ("Z_SrSh", 0.17),
            ("Z_ArSr", 3.0),
            ("Z_MrSr", 13.0),
        ])
        .unwrap();
        let economy = data.economy().unwrap();
        *economy.at(Equilibrium::new(0.8, 8.0, 10.0)).subsistence()
    }

    #[test]
    // Purpose
    // -------
    // Base female labor scales with the female time endowment.
    //
    // Given
    // -----
    // - The reference economy without subsistence (`hat_c = 0`) at the
    //   observed point, with female endowments 1 and 2.
    //
    // Expect
    // ------
    // - Doubling the endowment doubles the base labor; the share stays 0.
    fn base_labor_follows_endowment() {
        let unit = block(1.0);
        let doubled = block(2.0);
        assert!(unit.base_labor.is_finite() && unit.base_labor > 0.0);
        assert_relative_eq!(doubled.base_labor, 2.0 * unit.base_labor, max_relative = 1e-12);
        assert_eq!(unit.coefficient.to_bits(), doubled.coefficient.to_bits());
        assert_eq!(unit.share, 0.0);
        assert_eq!(doubled.non_subsistence_share(), 1.0);
    }
}
