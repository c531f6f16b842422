//! model::inputs — empirical records per income group.
//!
//! Purpose
//! -------
//! Hold the observed statistics a calibration is anchored to: life
//! expectancy, schooling years by gender, the relative wage, the
//! subsistence consumption share, the relative schooling cost and the
//! time-allocation shares of both genders over the seven flow indices.
//!
//! Conventions
//! -----------
//! - Field names in JSON follow the data files (`"T"`, `"Lf"`, `"Lm"`,
//!   share keys `"Ah"`, ..., `"l"`); Rust names are descriptive.
//! - Records are validated once with [`GroupData::validate`] before any
//!   derived parameter is computed from them.
use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::model::{
    errors::{ModelError, ModelResult},
    index::{FlowIndex, Gender, ProductionIndex},
};

/// Empirical cohort a calibration is run for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeGroup {
    Low,
    Middle,
    High,
    All,
}

impl IncomeGroup {
    pub const ALL: [IncomeGroup; 4] =
        [IncomeGroup::Low, IncomeGroup::Middle, IncomeGroup::High, IncomeGroup::All];

    pub fn label(self) -> &'static str {
        match self {
            IncomeGroup::Low => "low",
            IncomeGroup::Middle => "middle",
            IncomeGroup::High => "high",
            IncomeGroup::All => "all",
        }
    }
}

impl fmt::Display for IncomeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IncomeGroup {
    type Err = ModelError;

    fn from_str(label: &str) -> ModelResult<Self> {
        IncomeGroup::ALL
            .into_iter()
            .find(|g| g.label() == label)
            .ok_or_else(|| ModelError::UnknownIncomeGroup { label: label.to_string() })
    }
}

/// Observed time-allocation shares of one gender.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationShares {
    #[serde(rename = "Ah")]
    pub agriculture_traditional: f64,
    #[serde(rename = "Mh")]
    pub manufacturing_traditional: f64,
    #[serde(rename = "Sh")]
    pub services_traditional: f64,
    #[serde(rename = "Ar")]
    pub agriculture_modern: f64,
    #[serde(rename = "Mr")]
    pub manufacturing_modern: f64,
    #[serde(rename = "Sr")]
    pub services_modern: f64,
    #[serde(rename = "l")]
    pub leisure: f64,
}

impl AllocationShares {
    /// Build from values in [`FlowIndex::ALL`] order.
    pub fn from_array(values: [f64; 7]) -> Self {
        Self {
            agriculture_traditional: values[0],
            manufacturing_traditional: values[1],
            services_traditional: values[2],
            agriculture_modern: values[3],
            manufacturing_modern: values[4],
            services_modern: values[5],
            leisure: values[6],
        }
    }

    pub fn to_array(&self) -> [f64; 7] {
        [
            self.agriculture_traditional,
            self.manufacturing_traditional,
            self.services_traditional,
            self.agriculture_modern,
            self.manufacturing_modern,
            self.services_modern,
            self.leisure,
        ]
    }

    pub fn get(&self, idx: FlowIndex) -> f64 {
        self.to_array()[idx.position()]
    }

    /// Observed ratio of time in `over` to time in `under`.
    pub fn ratio(&self, over: ProductionIndex, under: ProductionIndex) -> f64 {
        self.get(over.into()) / self.get(under.into())
    }
}

/// Observed statistics for one income group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupData {
    /// Life expectancy in years (`T`).
    #[serde(rename = "T")]
    pub life_expectancy: f64,
    /// Female schooling years.
    pub sf: f64,
    /// Male schooling years.
    pub sm: f64,
    /// Female-to-male wage ratio.
    pub tw: f64,
    /// Subsistence consumption share.
    pub gamma: f64,
    /// Ratio of female to male schooling cost coefficients.
    #[serde(default = "default_tbeta")]
    pub tbeta: f64,
    #[serde(rename = "Lf")]
    pub female: AllocationShares,
    #[serde(rename = "Lm")]
    pub male: AllocationShares,
}

fn default_tbeta() -> f64 {
    1.0
}

impl GroupData {
    pub fn shares(&self, gender: Gender) -> &AllocationShares {
        match gender {
            Gender::Female => &self.female,
            Gender::Male => &self.male,
        }
    }

    /// Check every field used downstream.
    ///
    /// # Errors
    /// [`ModelError::InvalidGroupData`] naming the first offending field:
    /// non-finite values, non-positive `T`, `tw`, `tbeta` or shares,
    /// schooling outside `(0, T)`, and `gamma` outside `[0, 1]`.
    pub fn validate(&self) -> ModelResult<()> {
        let positive = [
            ("T", self.life_expectancy),
            ("tw", self.tw),
            ("tbeta", self.tbeta),
            ("sf", self.sf),
            ("sm", self.sm),
        ];
        for (field, value) in positive {
            if !value.is_finite() {
                return Err(ModelError::InvalidGroupData { field, value, reason: "must be finite" });
            }
            if value <= 0.0 {
                return Err(ModelError::InvalidGroupData {
                    field,
                    value,
                    reason: "must be positive",
                });
            }
        }
        for (field, value) in [("sf", self.sf), ("sm", self.sm)] {
            if value >= self.life_expectancy {
                return Err(ModelError::InvalidGroupData {
                    field,
                    value,
                    reason: "schooling must end before life expectancy",
                });
            }
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(ModelError::InvalidGroupData {
                field: "gamma",
                value: self.gamma,
                reason: "share must lie in [0, 1]",
            });
        }
        for (field, shares) in [("Lf", &self.female), ("Lm", &self.male)] {
            for value in shares.to_array() {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ModelError::InvalidGroupData {
                        field,
                        value,
                        reason: "time-allocation shares must be finite and positive",
                    });
                }
            }
        }
        Ok(())
    }
}

/// Group records keyed by income group, as stored in the parameter file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupTable {
    pub groups: BTreeMap<IncomeGroup, GroupData>,
}

impl GroupTable {
    /// # Errors
    /// [`ModelError::MissingGroup`] when the table has no record for `group`.
    pub fn group(&self, group: IncomeGroup) -> ModelResult<&GroupData> {
        self.groups
            .get(&group)
            .ok_or_else(|| ModelError::MissingGroup { group: group.label().to_string() })
    }
}
