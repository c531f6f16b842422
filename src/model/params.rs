//! model::params — fixed structural constants and the free-parameter schema.
//!
//! Purpose
//! -------
//! Separate the two kinds of parameters the economy is built from:
//! - [`FixedParams`]: elasticities, discount rate, human-capital curvature,
//!   endowments, life expectancy, the modern-services productivity
//!   normalisation and the seven female labor-share parameters `xi`, which
//!   are derived once from an income group's observed record.
//! - [`FreeParams`]: the calibrated parameters, an insertion-ordered list of
//!   `(key, value, bounds)` entries whose order fixes the layout of the
//!   optimiser's parameter vector.
//!
//! Key behaviors
//! -------------
//! - [`FixedParams::from_group`] derives `xi_i` from observed wages,
//!   schooling and allocation shares.
//! - [`FreeParams::standard`] builds the default schema; the subsistence
//!   term is only part of it when [`Subsistence::Calibrated`].
//! - Reads of unset free parameters fail with
//!   [`ModelError::UnsetParameter`]; writes outside the bounds fail with
//!   [`ModelError::ParameterOutOfBounds`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Productivity keys always relate two production indices; which pairs
//!   are present is a property of the schema, not of the code reading it.
//! - Bounds are closed intervals and may be unbounded above.
use std::{fmt, str::FromStr};

use ndarray::Array1;

use crate::model::{
    errors::{ModelError, ModelResult},
    index::{FlowIndex, Gender, ProductionIndex},
    inputs::GroupData,
    primitives::{discounter, human_capital},
};

/// Elasticity of substitution between female and male labor.
pub const ETA: f64 = 2.27;
/// Same elasticity for leisure.
pub const ETA_LEISURE: f64 = 2.27;
/// Elasticity of substitution across sectors.
pub const EPSILON: f64 = 0.002;
/// Elasticity of substitution across technologies within a sector.
pub const SIGMA: f64 = 2.0;
/// Human-capital curvature.
pub const NU: f64 = 0.58;
/// Human-capital scale.
pub const ZETA: f64 = 0.32;
/// Discount rate.
pub const RHO: f64 = 0.04;
/// Modern-services productivity normalisation.
pub const Z_MODERN_SERVICES: f64 = 1.0;

/// Female labor shares of the low-income group, in [`FlowIndex::ALL`] order.
pub const LOW_INCOME_SHARES: [f64; 7] = [
    0.4222009770484617,
    0.41351920932976727,
    0.5251019307659601,
    0.35886350218684315,
    0.35599394768067955,
    0.3487734856125632,
    0.4185418363758875,
];

/// Structural constants of one economy.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedParams {
    pub eta: f64,
    pub eta_leisure: f64,
    pub epsilon: f64,
    pub sigma: f64,
    pub nu: f64,
    pub zeta: f64,
    pub rho: f64,
    /// Life expectancy `T`.
    pub life_expectancy: f64,
    /// Female time endowment.
    pub female_endowment: f64,
    /// Male time endowment.
    pub male_endowment: f64,
    /// Modern-services productivity `Z_Sr`.
    pub z_modern_services: f64,
    /// Ratio of female to male schooling cost coefficients.
    pub tbeta: f64,
    /// Female labor shares in [`FlowIndex::ALL`] order.
    pub xi: [f64; 7],
}

impl FixedParams {
    /// Constants with life expectancy `t` and cost ratio `tbeta`; every `xi`
    /// starts at one half.
    pub fn with_life_expectancy(life_expectancy: f64, tbeta: f64) -> Self {
        Self {
            eta: ETA,
            eta_leisure: ETA_LEISURE,
            epsilon: EPSILON,
            sigma: SIGMA,
            nu: NU,
            zeta: ZETA,
            rho: RHO,
            life_expectancy,
            female_endowment: 1.0,
            male_endowment: 1.0,
            z_modern_services: Z_MODERN_SERVICES,
            tbeta,
            xi: [0.5; 7],
        }
    }

    /// Constants for an observed group, with `xi` derived from its record.
    ///
    /// With observed `tw, sf, sm` and shares `Lf_i`, `Lm_i`:
    /// `txi = tw d(sf)/d(sm) H(sf)/H(sm) (Lf_i/Lm_i)^(1/eta_i)` and
    /// `xi_i = txi / (1 + txi)`.
    ///
    /// # Errors
    /// Propagates [`GroupData::validate`].
    pub fn from_group(data: &GroupData) -> ModelResult<Self> {
        data.validate()?;
        let mut fixed = Self::with_life_expectancy(data.life_expectancy, data.tbeta);
        let discount_ratio = discounter(&fixed, data.sf) / discounter(&fixed, data.sm);
        let capital_ratio = human_capital(&fixed, data.sf) / human_capital(&fixed, data.sm);
        for idx in FlowIndex::ALL {
            let eta = fixed.eta_of(idx);
            let labor_ratio = data.female.get(idx) / data.male.get(idx);
            let txi = data.tw * discount_ratio * capital_ratio * labor_ratio.powf(1.0 / eta);
            fixed.xi[idx.position()] = txi / (1.0 + txi);
        }
        Ok(fixed)
    }

    pub fn xi(&self, idx: FlowIndex) -> f64 {
        self.xi[idx.position()]
    }

    pub fn set_xi(&mut self, idx: FlowIndex, value: f64) {
        self.xi[idx.position()] = value;
    }

    /// Gender substitution elasticity of an index.
    pub fn eta_of(&self, idx: FlowIndex) -> f64 {
        match idx {
            FlowIndex::Leisure => self.eta_leisure,
            FlowIndex::Production(_) => self.eta,
        }
    }

    pub fn endowment(&self, gender: Gender) -> f64 {
        match gender {
            Gender::Female => self.female_endowment,
            Gender::Male => self.male_endowment,
        }
    }
}

/// Whether the subsistence consumption term is part of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsistence {
    /// `hat_c` is a free parameter.
    Calibrated,
    /// `hat_c` is absent from the schema and reads as zero.
    Absent,
}

/// Identifier of a free parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// Subsistence consumption adjustment `hat_c`.
    HatC,
    /// Leisure preference scale `varphi`.
    Varphi,
    /// Female schooling cost coefficient `beta_f`.
    BetaF,
    /// Relative productivity `Z_{over}{under}`.
    Productivity { over: ProductionIndex, under: ProductionIndex },
}

impl ParamKey {
    pub fn label(&self) -> String {
        match self {
            ParamKey::HatC => "hat_c".to_string(),
            ParamKey::Varphi => "varphi".to_string(),
            ParamKey::BetaF => "beta_f".to_string(),
            ParamKey::Productivity { over, under } => format!("Z_{over}{under}"),
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for ParamKey {
    type Err = ModelError;

    fn from_str(label: &str) -> ModelResult<Self> {
        let unknown = || ModelError::UnknownParameter { key: label.to_string() };
        match label {
            "hat_c" => Ok(ParamKey::HatC),
            "varphi" => Ok(ParamKey::Varphi),
            "beta_f" => Ok(ParamKey::BetaF),
            _ => {
                let pair = label.strip_prefix("Z_").ok_or_else(unknown)?;
                if pair.len() != 4 || !pair.is_ascii() {
                    return Err(unknown());
                }
                let over = pair[..2].parse().map_err(|_| unknown())?;
                let under = pair[2..].parse().map_err(|_| unknown())?;
                Ok(ParamKey::Productivity { over, under })
            }
        }
    }
}

/// Closed interval `[lower, upper]`; `upper` may be `+inf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    /// # Errors
    /// [`ModelError::InvalidBounds`] if either bound is NaN or `lower > upper`.
    pub fn new(key: &ParamKey, lower: f64, upper: f64) -> ModelResult<Self> {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(ModelError::InvalidBounds { key: key.label(), lower, upper });
        }
        Ok(Self { lower, upper })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Project onto the interval.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FreeParam {
    pub key: ParamKey,
    pub value: Option<f64>,
    pub bounds: Bounds,
}

/// Insertion-ordered free parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FreeParams {
    entries: Vec<FreeParam>,
}

impl FreeParams {
    /// Default schema, all values unset.
    ///
    /// Order: `hat_c` (only when calibrated, bounds `[0, inf)`), `varphi`,
    /// `beta_f`, `Z_ArAh`, `Z_MrMh`, `Z_SrSh`, `Z_ArSr`, `Z_MrSr` (bounds
    /// `[1e-3, inf)`).
    pub fn standard(subsistence: Subsistence) -> Self {
        let mut entries = Vec::with_capacity(8);
        let unbounded = |lower| Bounds { lower, upper: f64::INFINITY };
        if subsistence == Subsistence::Calibrated {
            entries.push(FreeParam { key: ParamKey::HatC, value: None, bounds: unbounded(0.0) });
        }
        let keys = [
            ParamKey::Varphi,
            ParamKey::BetaF,
            ParamKey::Productivity { over: ProductionIndex::AR, under: ProductionIndex::AH },
            ParamKey::Productivity { over: ProductionIndex::MR, under: ProductionIndex::MH },
            ParamKey::Productivity { over: ProductionIndex::SR, under: ProductionIndex::SH },
            ParamKey::Productivity { over: ProductionIndex::AR, under: ProductionIndex::SR },
            ParamKey::Productivity { over: ProductionIndex::MR, under: ProductionIndex::SR },
        ];
        entries.extend(
            keys.into_iter().map(|key| FreeParam { key, value: None, bounds: unbounded(1e-3) }),
        );
        Self { entries }
    }

    /// Append a parameter; replaces an existing entry with the same key.
    pub fn insert(&mut self, key: ParamKey, value: Option<f64>, bounds: Bounds) {
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => {
                entry.value = value;
                entry.bounds = bounds;
            }
            None => self.entries.push(FreeParam { key, value, bounds }),
        }
    }

    pub fn remove(&mut self, key: &ParamKey) -> Option<FreeParam> {
        let pos = self.entries.iter().position(|e| e.key == *key)?;
        Some(self.entries.remove(pos))
    }

    pub fn contains(&self, key: &ParamKey) -> bool {
        self.entries.iter().any(|e| e.key == *key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FreeParam> {
        self.entries.iter()
    }

    pub fn keys(&self) -> Vec<ParamKey> {
        self.entries.iter().map(|e| e.key).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key.label()).collect()
    }

    pub fn bounds(&self) -> Vec<Bounds> {
        self.entries.iter().map(|e| e.bounds).collect()
    }

    /// # Errors
    /// [`ModelError::UnknownParameter`] if the key is not in the schema,
    /// [`ModelError::UnsetParameter`] if it has no value yet.
    pub fn get(&self, key: &ParamKey) -> ModelResult<f64> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.key == *key)
            .ok_or_else(|| ModelError::UnknownParameter { key: key.label() })?;
        entry.value.ok_or_else(|| ModelError::UnsetParameter { key: key.label() })
    }

    /// # Errors
    /// [`ModelError::UnknownParameter`] for keys outside the schema and
    /// [`ModelError::ParameterOutOfBounds`] for non-finite or out-of-bounds
    /// values.
    pub fn set(&mut self, key: &ParamKey, value: f64) -> ModelResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.key == *key)
            .ok_or_else(|| ModelError::UnknownParameter { key: key.label() })?;
        if !value.is_finite() || !entry.bounds.contains(value) {
            return Err(ModelError::ParameterOutOfBounds {
                key: key.label(),
                value,
                lower: entry.bounds.lower,
                upper: entry.bounds.upper,
            });
        }
        entry.value = Some(value);
        Ok(())
    }

    /// Current values in schema order.
    ///
    /// # Errors
    /// [`ModelError::UnsetParameter`] for the first unset entry.
    pub fn values(&self) -> ModelResult<Array1<f64>> {
        self.entries
            .iter()
            .map(|e| e.value.ok_or_else(|| ModelError::UnsetParameter { key: e.key.label() }))
            .collect::<ModelResult<Vec<f64>>>()
            .map(Array1::from)
    }

    /// Overwrite every value from a vector in schema order.
    ///
    /// # Errors
    /// [`ModelError::ParameterLengthMismatch`] or any error of [`Self::set`].
    /// On error no entry is modified.
    pub fn assign(&mut self, values: &Array1<f64>) -> ModelResult<()> {
        if values.len() != self.entries.len() {
            return Err(ModelError::ParameterLengthMismatch {
                expected: self.entries.len(),
                found: values.len(),
            });
        }
        let mut updated = self.clone();
        for (entry, &value) in self.entries.iter().zip(values.iter()) {
            updated.set(&entry.key, value)?;
        }
        *self = updated;
        Ok(())
    }

    /// Calibrated productivity ratios in schema order.
    pub fn productivities(&self) -> Vec<(ProductionIndex, ProductionIndex, Option<f64>)> {
        self.entries
            .iter()
            .filter_map(|e| match e.key {
                ParamKey::Productivity { over, under } => Some((over, under, e.value)),
                _ => None,
            })
            .collect()
    }
}
