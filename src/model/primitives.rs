//! model::primitives — closed-form building blocks of the household problem.
//!
//! Purpose
//! -------
//! Provide the pure functions everything else is assembled from: time
//! discounting over the working life, human-capital accumulation, the
//! lifetime cost of schooling and the gender split of each index's wage
//! bill. No iteration happens here.
//!
//! Key behaviors
//! -------------
//! - `d(s) = (e^{-rho s} - e^{-rho T}) / rho` discounts a unit flow from
//!   the end of schooling `s` to the end of life `T`.
//! - `H(s) = exp(zeta / (1 - nu) s^{1 - nu})` is human capital after `s`
//!   years of schooling.
//! - The female wage bill of index `i` is
//!   `1 / (1 + A tw^{eta-1} adj^{eta-1})`, `A = (xi_i / (1 - xi_i))^{-eta}`,
//!   with `adj = d(sf)H(sf) / (d(sm)H(sm))` for traditional indices and
//!   leisure, `adj = 1` for modern ones. The male wage bill is its
//!   complement.
//!
//! Invariants & assumptions
//! ------------------------
//! - Schooling years are non-negative and below `T`; outside this range the
//!   functions return non-finite values rather than errors, which the
//!   Newton solver treats as an inadmissible point.
//! - `female + male == 1` holds exactly for every index.
use crate::model::{
    equilibrium::Equilibrium,
    index::{FlowIndex, Gender},
    params::FixedParams,
};

/// Present value at schooling end of a unit flow until `T`.
pub fn discounter(fixed: &FixedParams, s: f64) -> f64 {
    let rho = fixed.rho;
    ((-rho * s).exp() - (-rho * fixed.life_expectancy).exp()) / rho
}

/// Derivative of [`discounter`] in `s`.
pub fn discounter_slope(fixed: &FixedParams, s: f64) -> f64 {
    -(-fixed.rho * s).exp()
}

pub fn human_capital(fixed: &FixedParams, s: f64) -> f64 {
    (fixed.zeta / (1.0 - fixed.nu) * s.powf(1.0 - fixed.nu)).exp()
}

/// Derivative of [`human_capital`] in `s`; infinite at `s = 0`.
pub fn human_capital_slope(fixed: &FixedParams, s: f64) -> f64 {
    human_capital(fixed, s) * fixed.zeta * s.powf(-fixed.nu)
}

/// Years left to work after `s` years of schooling.
pub fn working_life(fixed: &FixedParams, s: f64) -> f64 {
    fixed.life_expectancy - s
}

/// Schooling cost coefficient of a gender, `beta_m = beta_f / tbeta`.
pub fn schooling_cost_coefficient(fixed: &FixedParams, gender: Gender, beta_f: f64) -> f64 {
    match gender {
        Gender::Female => beta_f,
        Gender::Male => beta_f / fixed.tbeta,
    }
}

/// Marginal lifetime schooling cost `W'_g(s) = -beta_g e^{-rho s}`.
pub fn marginal_schooling_cost(fixed: &FixedParams, gender: Gender, beta_f: f64, s: f64) -> f64 {
    -schooling_cost_coefficient(fixed, gender, beta_f) * (-fixed.rho * s).exp()
}

/// Lifetime schooling cost `W_g(s) = -W'_g(s)/rho - beta_g/rho`.
pub fn schooling_cost(fixed: &FixedParams, gender: Gender, beta_f: f64, s: f64) -> f64 {
    let beta = schooling_cost_coefficient(fixed, gender, beta_f);
    -marginal_schooling_cost(fixed, gender, beta_f, s) / fixed.rho - beta / fixed.rho
}

/// Marginal growth of discounted human capital, `H'/H + d'/d`.
pub fn schooling_return(fixed: &FixedParams, s: f64) -> f64 {
    human_capital_slope(fixed, s) / human_capital(fixed, s)
        + discounter_slope(fixed, s) / discounter(fixed, s)
}

/// [`schooling_return`] scaled by discounted human capital `d(s) H(s)`.
pub fn weighted_schooling_return(fixed: &FixedParams, s: f64) -> f64 {
    schooling_return(fixed, s) * discounter(fixed, s) * human_capital(fixed, s)
}

/// Discounting and human-capital terms evaluated once per equilibrium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifeCycle {
    pub d_female: f64,
    pub d_male: f64,
    pub d_zero: f64,
    pub h_female: f64,
    pub h_male: f64,
    pub working_female: f64,
    pub working_zero: f64,
}

impl LifeCycle {
    pub fn at(fixed: &FixedParams, eq: &Equilibrium) -> Self {
        Self {
            d_female: discounter(fixed, eq.sf),
            d_male: discounter(fixed, eq.sm),
            d_zero: discounter(fixed, 0.0),
            h_female: human_capital(fixed, eq.sf),
            h_male: human_capital(fixed, eq.sm),
            working_female: working_life(fixed, eq.sf),
            working_zero: working_life(fixed, 0.0),
        }
    }

    /// Female-to-male discounted human capital, the traditional wage-bill
    /// adjustment.
    pub fn capital_gap(&self) -> f64 {
        self.d_female * self.h_female / self.d_male / self.h_male
    }

    /// Discount factor applied to modern labor, `d(sf)/d(0) delta(0)/delta(sf)`.
    pub fn modern_discount(&self) -> f64 {
        self.d_female / self.d_zero * self.working_zero / self.working_female
    }
}

/// Female share of the wage bill of `idx`.
pub fn female_wage_bill(fixed: &FixedParams, idx: FlowIndex, tw: f64, life: &LifeCycle) -> f64 {
    let eta = fixed.eta_of(idx);
    let xi = fixed.xi(idx);
    let adj = if idx.is_modern() { 1.0 } else { life.capital_gap() };
    let a = (xi / (1.0 - xi)).powf(-eta);
    1.0 / (1.0 + a * tw.powf(eta - 1.0) * adj.powf(eta - 1.0))
}

/// Male share of the wage bill of `idx`.
pub fn male_wage_bill(fixed: &FixedParams, idx: FlowIndex, tw: f64, life: &LifeCycle) -> f64 {
    1.0 - female_wage_bill(fixed, idx, tw, life)
}

pub fn wage_bill(
    fixed: &FixedParams, gender: Gender, idx: FlowIndex, tw: f64, life: &LifeCycle,
) -> f64 {
    match gender {
        Gender::Female => female_wage_bill(fixed, idx, tw, life),
        Gender::Male => male_wage_bill(fixed, idx, tw, life),
    }
}
