//! calibration::config — run configuration and input files.
//!
//! Three JSON inputs drive a calibration:
//! - the run configuration ([`CalibrationConfig`]), every field optional;
//! - the parameter file, a [`GroupTable`] keyed by income group;
//! - the initializer file ([`Initializers`]): a `"default"` block and
//!   optional per-setup blocks, each mapping income groups to initial
//!   free-parameter values by label. Setup values override default values
//!   key by key.
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    calibration::{
        errors::{CalibError, CalibResult},
        persist::read_json,
        run::SimplexOptions,
        setup::Setup,
    },
    model::inputs::{GroupTable, IncomeGroup},
    solver::options::NewtonOptions,
};

/// Name of the initializer block every setup falls back to.
pub const DEFAULT_BLOCK: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Parameter file with one record per income group.
    pub parameters_path: PathBuf,
    /// Initial free-parameter values.
    pub initializers_path: PathBuf,
    /// Root of the persisted results, one directory per setup.
    pub results_dir: PathBuf,
    /// Warm-start Newton solves from the best trial so far.
    pub adaptive: bool,
    /// Attach argmin's slog observer (feature `obs_slog`).
    pub verbose: bool,
    pub newton: NewtonOptions,
    pub simplex: SimplexOptions,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            parameters_path: PathBuf::from("data/parameters.json"),
            initializers_path: PathBuf::from("data/initializers.json"),
            results_dir: PathBuf::from("results"),
            adaptive: true,
            verbose: false,
            newton: NewtonOptions::default(),
            simplex: SimplexOptions::default(),
        }
    }
}

impl CalibrationConfig {
    /// Read and validate a configuration file.
    ///
    /// # Errors
    /// I/O and JSON errors, or invalid Newton / simplex options.
    pub fn load(path: &Path) -> CalibResult<Self> {
        let config: Self = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// [`CalibError::Solve`] or [`CalibError::InvalidSimplexOptions`].
    pub fn validate(&self) -> CalibResult<()> {
        self.newton.validate()?;
        self.simplex.validate()
    }
}

/// Read the parameter file and validate every record.
///
/// # Errors
/// I/O and JSON errors, or [`CalibError::Model`] for an invalid record.
pub fn load_group_table(path: &Path) -> CalibResult<GroupTable> {
    let table: GroupTable = read_json(path)?;
    for data in table.groups.values() {
        data.validate()?;
    }
    Ok(table)
}

/// Initial values: block name, then income group, then parameter label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Initializers {
    pub blocks: BTreeMap<String, BTreeMap<IncomeGroup, BTreeMap<String, f64>>>,
}

impl Initializers {
    /// # Errors
    /// I/O and JSON errors.
    pub fn load(path: &Path) -> CalibResult<Self> {
        read_json(path)
    }

    /// Initial values for `setup` and `group`: the default block overridden
    /// by the setup's own block.
    ///
    /// # Errors
    /// [`CalibError::MissingInitializer`] when neither block covers `group`.
    pub fn values(&self, setup: &Setup, group: IncomeGroup) -> CalibResult<BTreeMap<String, f64>> {
        let default = self.blocks.get(DEFAULT_BLOCK).and_then(|b| b.get(&group));
        let specific = self.blocks.get(&setup.name()).and_then(|b| b.get(&group));
        if default.is_none() && specific.is_none() {
            return Err(CalibError::MissingInitializer {
                setup: setup.name(),
                group: group.label().to_string(),
            });
        }
        let mut merged = default.cloned().unwrap_or_default();
        if let Some(specific) = specific {
            merged.extend(specific.iter().map(|(k, v)| (k.clone(), *v)));
        }
        Ok(merged)
    }
}
