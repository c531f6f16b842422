//! calibration::setup — named calibration setups.
//!
//! A setup is a schooling-target treatment combined with a variant. The
//! name is `<treatment>-schooling[-<variant>]`, e.g. `rel-schooling` or
//! `abs-schooling-no-subsistence-scl-wages`. Preparing a setup edits the
//! aggregate and the target set before calibration starts:
//!
//! | piece | effect |
//! |---|---|
//! | `abs` | schooling weights set to 1 |
//! | `rel` | schooling weights kept at `1 / T` |
//! | `no` | `sf` and `sm` targets removed |
//! | `no-subsistence` | subsistence removed, `hat_c` leaves the free set |
//! | `no-wages` | `tw` target removed |
//! | `scl-wages` | `tw` weight set to 100 |
//! | `scl-subsistence` | `gamma` weight set to 100 |
//! | `no-modern-service-share-heterogeneity` | `xi_Sr = 0.5` |
//! | `with-low-income-shares` | all `xi` replaced by the low-income values |
use std::{fmt, str::FromStr};

use crate::{
    calibration::{
        errors::{CalibError, CalibResult},
        targets::{TargetKey, Targets},
    },
    model::{
        data::ModelData,
        index::{FlowIndex, ProductionIndex},
        params::LOW_INCOME_SHARES,
    },
};

/// Weight of a target the setup emphasises.
pub const SCALED_WEIGHT: f64 = 100.0;

/// Female share of modern services when share heterogeneity is removed.
pub const HOMOGENEOUS_MODERN_SERVICE_SHARE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchoolingTarget {
    Absolute,
    Relative,
    Excluded,
}

impl SchoolingTarget {
    pub const ALL: [SchoolingTarget; 3] =
        [SchoolingTarget::Absolute, SchoolingTarget::Excluded, SchoolingTarget::Relative];

    pub fn prefix(self) -> &'static str {
        match self {
            SchoolingTarget::Absolute => "abs",
            SchoolingTarget::Relative => "rel",
            SchoolingTarget::Excluded => "no",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Baseline,
    NoModernServiceShareHeterogeneity,
    NoSubsistence,
    NoSubsistenceNoWages,
    NoSubsistenceSclWages,
    NoWages,
    SclSubsistenceSclWages,
    SclWages,
    WithLowIncomeShares,
}

impl Variant {
    pub const ALL: [Variant; 9] = [
        Variant::Baseline,
        Variant::NoModernServiceShareHeterogeneity,
        Variant::NoSubsistence,
        Variant::NoSubsistenceNoWages,
        Variant::NoSubsistenceSclWages,
        Variant::NoWages,
        Variant::SclSubsistenceSclWages,
        Variant::SclWages,
        Variant::WithLowIncomeShares,
    ];

    /// Name suffix; empty for the baseline.
    pub fn suffix(self) -> &'static str {
        match self {
            Variant::Baseline => "",
            Variant::NoModernServiceShareHeterogeneity => "no-modern-service-share-heterogeneity",
            Variant::NoSubsistence => "no-subsistence",
            Variant::NoSubsistenceNoWages => "no-subsistence-no-wages",
            Variant::NoSubsistenceSclWages => "no-subsistence-scl-wages",
            Variant::NoWages => "no-wages",
            Variant::SclSubsistenceSclWages => "scl-subsistence-scl-wages",
            Variant::SclWages => "scl-wages",
            Variant::WithLowIncomeShares => "with-low-income-shares",
        }
    }

    fn removes_subsistence(self) -> bool {
        matches!(
            self,
            Variant::NoSubsistence | Variant::NoSubsistenceNoWages | Variant::NoSubsistenceSclWages
        )
    }

    fn removes_wages(self) -> bool {
        matches!(self, Variant::NoWages | Variant::NoSubsistenceNoWages)
    }

    fn scales_wages(self) -> bool {
        matches!(
            self,
            Variant::SclWages | Variant::NoSubsistenceSclWages | Variant::SclSubsistenceSclWages
        )
    }
}

/// A calibration setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Setup {
    pub schooling: SchoolingTarget,
    pub variant: Variant,
}

impl Setup {
    pub const fn new(schooling: SchoolingTarget, variant: Variant) -> Self {
        Self { schooling, variant }
    }

    /// The identity setup.
    pub const fn baseline() -> Self {
        Self::new(SchoolingTarget::Relative, Variant::Baseline)
    }

    /// All 27 setups, ordered by name.
    pub fn all() -> Vec<Setup> {
        let mut setups: Vec<Setup> = SchoolingTarget::ALL
            .iter()
            .flat_map(|&s| Variant::ALL.iter().map(move |&v| Setup::new(s, v)))
            .collect();
        setups.sort_by_key(|s| s.name());
        setups
    }

    pub fn name(&self) -> String {
        let base = format!("{}-schooling", self.schooling.prefix());
        match self.variant.suffix() {
            "" => base,
            suffix => format!("{base}-{suffix}"),
        }
    }

    /// Apply the setup to a fresh aggregate and its default targets.
    pub fn prepare(&self, data: &mut ModelData, targets: &mut Targets) {
        match self.schooling {
            SchoolingTarget::Absolute => {
                targets.set_weight(TargetKey::FemaleSchooling, 1.0);
                targets.set_weight(TargetKey::MaleSchooling, 1.0);
            }
            SchoolingTarget::Relative => {}
            SchoolingTarget::Excluded => {
                targets.remove(TargetKey::FemaleSchooling);
                targets.remove(TargetKey::MaleSchooling);
            }
        }

        let variant = self.variant;
        if variant.removes_subsistence() {
            data.remove_subsistence();
        }
        if variant.removes_wages() {
            targets.remove(TargetKey::WageRatio);
        }
        if variant.scales_wages() {
            targets.set_weight(TargetKey::WageRatio, SCALED_WEIGHT);
        }
        match variant {
            Variant::SclSubsistenceSclWages => {
                targets.set_weight(TargetKey::SubsistenceShare, SCALED_WEIGHT);
            }
            Variant::NoModernServiceShareHeterogeneity => {
                data.fixed.set_xi(
                    FlowIndex::Production(ProductionIndex::SR),
                    HOMOGENEOUS_MODERN_SERVICE_SHARE,
                );
            }
            Variant::WithLowIncomeShares => {
                for idx in FlowIndex::ALL {
                    data.fixed.set_xi(idx, LOW_INCOME_SHARES[idx.position()]);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for Setup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Setup {
    type Err = CalibError;

    fn from_str(name: &str) -> CalibResult<Self> {
        Setup::all()
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| CalibError::UnknownSetup { name: name.to_string() })
    }
}
