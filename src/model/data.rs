//! model::data — the calibration aggregate and the economy built from it.
//!
//! Purpose
//! -------
//! [`ModelData`] is what a calibration owns and mutates: the income group,
//! the fixed constants, the free-parameter schema with its current values,
//! the subsistence tag and the Newton starting point / last solution.
//! [`Economy`] is an immutable evaluation context built from a fully
//! initialised `ModelData`; every closed-form function of the model is
//! evaluated through it.
//!
//! Key behaviors
//! -------------
//! - [`ModelData::new`] validates a group record, derives the fixed
//!   constants and sets the starting point to the observed `(tw, sf, sm)`.
//! - [`ModelData::remove_subsistence`] switches the subsistence tag once;
//!   afterwards `hat_c` is not part of the schema and reads as zero.
//! - [`Economy::new`] reads every free parameter and resolves the
//!   expenditure table, so unset parameters and unconnected productivity
//!   schemas surface here and never during evaluation.
//!
//! Invariants & assumptions
//! ------------------------
//! - An `Economy` is a snapshot of parameter values: mutating the
//!   `ModelData` afterwards does not affect it. Each calibration trial
//!   builds a fresh one.
//! - Single owner; nothing here is shared across threads.
use crate::model::{
    equilibrium::Equilibrium,
    errors::{ModelError, ModelResult},
    expenditure::{ExpenditureTable, ProductivityGraph},
    inputs::{GroupData, IncomeGroup},
    params::{FixedParams, FreeParams, ParamKey, Subsistence},
};
use crate::solver::options::NewtonOptions;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub group: IncomeGroup,
    pub fixed: FixedParams,
    pub free: FreeParams,
    subsistence: Subsistence,
    /// Options of every Newton solve on this aggregate.
    pub newton: NewtonOptions,
    /// Starting point of the next Newton solve.
    pub x0: Equilibrium,
    /// Last solved equilibrium, if any.
    pub xstar: Option<Equilibrium>,
}

impl ModelData {
    /// Aggregate for an observed group with the default free-parameter
    /// schema (values unset).
    ///
    /// # Errors
    /// [`ModelError::InvalidGroupData`] if the record fails validation.
    pub fn new(group: IncomeGroup, data: &GroupData) -> ModelResult<Self> {
        let fixed = FixedParams::from_group(data)?;
        Ok(Self {
            group,
            fixed,
            free: FreeParams::standard(Subsistence::Calibrated),
            subsistence: Subsistence::Calibrated,
            newton: NewtonOptions::default(),
            x0: Equilibrium::new(data.tw, data.sf, data.sm),
            xstar: None,
        })
    }

    /// Aggregate from explicit parts.
    pub fn from_parts(
        group: IncomeGroup, fixed: FixedParams, free: FreeParams, x0: Equilibrium,
    ) -> Self {
        let subsistence = if free.contains(&ParamKey::HatC) {
            Subsistence::Calibrated
        } else {
            Subsistence::Absent
        };
        Self { group, fixed, free, subsistence, newton: NewtonOptions::default(), x0, xstar: None }
    }

    pub fn subsistence(&self) -> Subsistence {
        self.subsistence
    }

    /// Drop the subsistence term from the model.
    pub fn remove_subsistence(&mut self) {
        self.free.remove(&ParamKey::HatC);
        self.subsistence = Subsistence::Absent;
    }

    /// Subsistence consumption adjustment, zero when absent.
    ///
    /// # Errors
    /// [`ModelError::UnsetParameter`] when calibrated but unset.
    pub fn hat_c(&self) -> ModelResult<f64> {
        match self.subsistence {
            Subsistence::Calibrated => self.free.get(&ParamKey::HatC),
            Subsistence::Absent => Ok(0.0),
        }
    }

    /// Set free parameters from `(label, value)` pairs.
    ///
    /// A `hat_c` entry is skipped when subsistence is absent.
    ///
    /// # Errors
    /// [`ModelError::UnknownParameter`] for labels outside the schema and
    /// [`ModelError::ParameterOutOfBounds`] for inadmissible values.
    pub fn initialize<'a, I>(&mut self, values: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        for (label, value) in values {
            let key: ParamKey = label.parse()?;
            if key == ParamKey::HatC && self.subsistence == Subsistence::Absent {
                continue;
            }
            self.free.set(&key, value)?;
        }
        Ok(())
    }

    /// Build the evaluation context for the current parameter values.
    ///
    /// # Errors
    /// See [`Economy::new`].
    pub fn economy(&self) -> ModelResult<Economy> {
        Economy::new(self)
    }
}

/// Immutable evaluation context for one parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Economy {
    fixed: FixedParams,
    hat_c: f64,
    varphi: f64,
    beta_f: f64,
    table: ExpenditureTable,
}

impl Economy {
    /// # Errors
    /// - [`ModelError::UnsetParameter`] for any unset free parameter.
    /// - [`ModelError::NoProductivityPath`] or
    ///   [`ModelError::ResolutionDepthExceeded`] if the productivity schema
    ///   does not resolve every production pair.
    pub fn new(data: &ModelData) -> ModelResult<Self> {
        if let Some(unset) = data.free.iter().find(|p| p.value.is_none()) {
            return Err(ModelError::UnsetParameter { key: unset.key.label() });
        }
        let graph = ProductivityGraph::from_free(&data.free)?;
        Ok(Self {
            fixed: data.fixed.clone(),
            hat_c: data.hat_c()?,
            varphi: data.free.get(&ParamKey::Varphi)?,
            beta_f: data.free.get(&ParamKey::BetaF)?,
            table: ExpenditureTable::resolve(&graph)?,
        })
    }

    pub fn fixed(&self) -> &FixedParams {
        &self.fixed
    }

    pub fn hat_c(&self) -> f64 {
        self.hat_c
    }

    pub fn varphi(&self) -> f64 {
        self.varphi
    }

    pub fn beta_f(&self) -> f64 {
        self.beta_f
    }

    pub fn table(&self) -> &ExpenditureTable {
        &self.table
    }
}
