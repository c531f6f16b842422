//! calibration::targets — empirical moments and their model counterparts.
//!
//! The default target set of an income group is five female within-gender
//! time-allocation ratios, the female leisure share, schooling years of
//! both genders, the wage ratio and the subsistence share. Each target
//! carries a weight; observed value and prediction are both multiplied by
//! it and the error is their absolute difference.
//!
//! Default weights are 1 except for schooling years, which are weighted by
//! `1 / T` so they are comparable with the other, unit-free targets.
use std::{fmt, str::FromStr};

use crate::model::{
    errors::{ModelError, ModelResult},
    index::{FlowIndex, Gender, ProductionIndex},
    inputs::GroupData,
    snapshot::Snapshot,
};

/// Female time-allocation ratios targeted by default, as `(over, under)`.
pub const FEMALE_RATIO_TARGETS: [(ProductionIndex, ProductionIndex); 5] = [
    (ProductionIndex::AR, ProductionIndex::AH),
    (ProductionIndex::MR, ProductionIndex::MH),
    (ProductionIndex::SR, ProductionIndex::SH),
    (ProductionIndex::AR, ProductionIndex::SR),
    (ProductionIndex::MR, ProductionIndex::SR),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKey {
    /// `Lf_<over><under>`: ratio of female time in `over` to time in `under`.
    FemaleRatio { over: ProductionIndex, under: ProductionIndex },
    /// `Lf_l`: female leisure share.
    FemaleLeisure,
    /// `sf`
    FemaleSchooling,
    /// `sm`
    MaleSchooling,
    /// `tw`
    WageRatio,
    /// `gamma`
    SubsistenceShare,
}

impl TargetKey {
    pub fn label(&self) -> String {
        match self {
            TargetKey::FemaleRatio { over, under } => format!("Lf_{over}{under}"),
            TargetKey::FemaleLeisure => "Lf_l".to_string(),
            TargetKey::FemaleSchooling => "sf".to_string(),
            TargetKey::MaleSchooling => "sm".to_string(),
            TargetKey::WageRatio => "tw".to_string(),
            TargetKey::SubsistenceShare => "gamma".to_string(),
        }
    }

    /// Observed value in `data`, unweighted.
    pub fn observed(&self, data: &GroupData) -> f64 {
        match *self {
            TargetKey::FemaleRatio { over, under } => data.female.ratio(over, under),
            TargetKey::FemaleLeisure => data.female.get(FlowIndex::Leisure),
            TargetKey::FemaleSchooling => data.sf,
            TargetKey::MaleSchooling => data.sm,
            TargetKey::WageRatio => data.tw,
            TargetKey::SubsistenceShare => data.gamma,
        }
    }

    /// Model counterpart at `snapshot`, unweighted.
    pub fn predict(&self, snapshot: &Snapshot<'_>) -> f64 {
        let eq = snapshot.equilibrium();
        match *self {
            TargetKey::FemaleRatio { over, under } => {
                snapshot.time_allocation(Gender::Female, over.into())
                    / snapshot.time_allocation(Gender::Female, under.into())
            }
            TargetKey::FemaleLeisure => snapshot.time_allocation(Gender::Female, FlowIndex::Leisure),
            TargetKey::FemaleSchooling => eq.sf,
            TargetKey::MaleSchooling => eq.sm,
            TargetKey::WageRatio => eq.tw,
            TargetKey::SubsistenceShare => snapshot.subsistence_share(),
        }
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for TargetKey {
    type Err = ModelError;

    fn from_str(label: &str) -> ModelResult<Self> {
        match label {
            "Lf_l" => return Ok(TargetKey::FemaleLeisure),
            "sf" => return Ok(TargetKey::FemaleSchooling),
            "sm" => return Ok(TargetKey::MaleSchooling),
            "tw" => return Ok(TargetKey::WageRatio),
            "gamma" => return Ok(TargetKey::SubsistenceShare),
            _ => {}
        }
        let unknown = || ModelError::UnknownIndex { label: label.to_string() };
        let pair = label.strip_prefix("Lf_").ok_or_else(unknown)?;
        if pair.len() != 4 || !pair.is_ascii() {
            return Err(unknown());
        }
        let (over, under) = pair.split_at(2);
        Ok(TargetKey::FemaleRatio { over: over.parse()?, under: under.parse()? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub key: TargetKey,
    /// Observed value, unweighted.
    pub value: f64,
    pub weight: f64,
}

/// Weighted observed value, weighted prediction and their distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetError {
    pub key: TargetKey,
    pub target: f64,
    pub prediction: f64,
    pub error: f64,
}

/// Insertion-ordered set of targets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Targets {
    entries: Vec<Target>,
}

impl Targets {
    /// Default targets and weights of an observed group.
    pub fn from_group(data: &GroupData) -> Self {
        let schooling_weight = 1.0 / data.life_expectancy;
        let mut keys: Vec<(TargetKey, f64)> = FEMALE_RATIO_TARGETS
            .iter()
            .map(|&(over, under)| (TargetKey::FemaleRatio { over, under }, 1.0))
            .collect();
        keys.extend([
            (TargetKey::FemaleLeisure, 1.0),
            (TargetKey::FemaleSchooling, schooling_weight),
            (TargetKey::MaleSchooling, schooling_weight),
            (TargetKey::WageRatio, 1.0),
            (TargetKey::SubsistenceShare, 1.0),
        ]);
        let entries = keys
            .into_iter()
            .map(|(key, weight)| Target { key, value: key.observed(data), weight })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.entries.iter()
    }

    pub fn get(&self, key: TargetKey) -> Option<&Target> {
        self.entries.iter().find(|t| t.key == key)
    }

    pub fn contains(&self, key: TargetKey) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, target: Target) {
        match self.entries.iter_mut().find(|t| t.key == target.key) {
            Some(slot) => *slot = target,
            None => self.entries.push(target),
        }
    }

    pub fn remove(&mut self, key: TargetKey) -> Option<Target> {
        let pos = self.entries.iter().position(|t| t.key == key)?;
        Some(self.entries.remove(pos))
    }

    /// Reweight `key` if it is still targeted; removed targets stay removed.
    pub fn set_weight(&mut self, key: TargetKey, weight: f64) {
        if let Some(target) = self.entries.iter_mut().find(|t| t.key == key) {
            target.weight = weight;
        }
    }

    /// Per-target errors at `snapshot`, in insertion order.
    pub fn errors(&self, snapshot: &Snapshot<'_>) -> Vec<TargetError> {
        self.entries
            .iter()
            .map(|t| {
                let target = t.value * t.weight;
                let prediction = t.key.predict(snapshot) * t.weight;
                TargetError { key: t.key, target, prediction, error: (target - prediction).abs() }
            })
            .collect()
    }

    /// Sum of weighted absolute errors at `snapshot`.
    pub fn sum_of_errors(&self, snapshot: &Snapshot<'_>) -> f64 {
        self.errors(snapshot).iter().map(|e| e.error).sum()
    }
}
