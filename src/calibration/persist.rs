//! calibration::persist — calibration records on disk.
//!
//! Purpose
//! -------
//! Store one [`CalibrationRecord`] per (setup, income group) so a finished
//! calibration is never repeated. [`calibrate_and_save_or_load`] is the
//! entry point: it prepares the aggregate, then either loads the stored
//! record and re-solves its equilibrium, or runs the simplex and stores the
//! result.
//!
//! Key behaviors
//! -------------
//! - Records live at `<results>/<setup>/<group>-income-calibration.json`.
//! - Existing files are never overwritten ([`save_if_absent`]).
//! - `serde_json` is built with `float_roundtrip`, so a stored vector reads
//!   back bit for bit.
//! - [`calibrate_many`] keeps going past a failing pair and reports every
//!   pair's result.
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use ndarray::Array1;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use slog::{info, o, warn, Logger};

use crate::{
    calibration::{
        config::{load_group_table, CalibrationConfig, Initializers},
        errors::{CalibError, CalibResult},
        run::{calibrate, CalibrationOutcome},
        setup::Setup,
        targets::Targets,
    },
    model::{
        data::ModelData,
        equilibrium::Equilibrium,
        inputs::{GroupTable, IncomeGroup},
    },
};

/// Result of one calibration as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub setup: String,
    pub group: IncomeGroup,
    /// Free-parameter labels, aligned with `x`.
    pub labels: Vec<String>,
    pub x: Vec<f64>,
    pub fun: f64,
    pub status: String,
    pub converged: bool,
    pub iterations: u64,
    pub xstar: Option<Equilibrium>,
}

impl CalibrationRecord {
    pub fn from_outcome(setup: &Setup, group: IncomeGroup, outcome: &CalibrationOutcome) -> Self {
        Self {
            setup: setup.name(),
            group,
            labels: outcome.labels.clone(),
            x: outcome.x.to_vec(),
            fun: outcome.fun,
            status: outcome.status.clone(),
            converged: outcome.converged,
            iterations: outcome.iterations,
            xstar: outcome.xstar,
        }
    }

    /// Stored value of the parameter labelled `label`.
    pub fn value(&self, label: &str) -> Option<f64> {
        self.labels.iter().position(|l| l == label).and_then(|i| self.x.get(i).copied())
    }

    /// `setup/group [labels]` with `x` length, as compared by [`Self::check`].
    fn key(setup: &str, group: IncomeGroup, labels: &[String], len: usize) -> String {
        format!("{setup}/{} [{}] ({len} values)", group.label(), labels.join(", "))
    }

    /// Ensure the record was written for `setup`, `group` and a free
    /// parameter schema equal to `labels`, in order.
    ///
    /// # Errors
    /// [`CalibError::RecordMismatch`] naming both keys.
    pub fn check(
        &self, path: &Path, setup: &Setup, group: IncomeGroup, labels: &[String],
    ) -> CalibResult<()> {
        let name = setup.name();
        if self.setup == name
            && self.group == group
            && self.labels == labels
            && self.x.len() == labels.len()
        {
            return Ok(());
        }
        Err(CalibError::RecordMismatch {
            path: path.display().to_string(),
            expected: Self::key(&name, group, labels, labels.len()),
            found: Self::key(&self.setup, self.group, &self.labels, self.x.len()),
        })
    }
}

fn io_error(path: &Path, err: impl ToString) -> CalibError {
    CalibError::Io { path: path.display().to_string(), text: err.to_string() }
}

fn serde_error(path: &Path, err: impl ToString) -> CalibError {
    CalibError::Serde { path: path.display().to_string(), text: err.to_string() }
}

/// Deserialize a JSON file.
///
/// # Errors
/// [`CalibError::Io`] if the file cannot be opened, [`CalibError::Serde`]
/// if it does not parse as `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> CalibResult<T> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| serde_error(path, e))
}

/// Serialize `value` as pretty JSON, replacing any existing file.
///
/// # Errors
/// [`CalibError::Io`] or [`CalibError::Serde`].
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> CalibResult<()> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| serde_error(path, e))?;
    writer.flush().map_err(|e| io_error(path, e))
}

/// `<results_dir>/<setup>/<group>-income-calibration.json`
pub fn record_path(results_dir: &Path, setup: &Setup, group: IncomeGroup) -> PathBuf {
    results_dir.join(setup.name()).join(format!("{}-income-calibration.json", group.label()))
}

/// Write `record` unless `path` already exists. Returns whether it wrote.
///
/// # Errors
/// [`CalibError::Io`] when the directory cannot be created or the file
/// cannot be written.
pub fn save_if_absent(path: &Path, record: &CalibrationRecord) -> CalibResult<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    }
    write_json(path, record)?;
    Ok(true)
}

/// # Errors
/// See [`read_json`].
pub fn load(path: &Path) -> CalibResult<CalibrationRecord> {
    read_json(path)
}

/// Aggregate and targets of `group` under `setup`, with the free
/// parameters initialised.
///
/// # Errors
/// - [`CalibError::Model`] for a missing or invalid group record, unknown
///   initializer labels or out-of-bounds initial values.
/// - [`CalibError::MissingInitializer`].
pub fn prepare_calibration(
    setup: &Setup, group: IncomeGroup, table: &GroupTable, initializers: &Initializers,
) -> CalibResult<(ModelData, Targets)> {
    let record = table.group(group)?;
    let mut data = ModelData::new(group, record)?;
    let mut targets = Targets::from_group(record);
    setup.prepare(&mut data, &mut targets);
    let values = initializers.values(setup, group)?;
    data.initialize(values.iter().map(|(label, &value)| (label.as_str(), value)))?;
    Ok((data, targets))
}

/// Calibrate `group` under `setup`, or load the stored result.
///
/// A stored record is written back into the aggregate and its equilibrium
/// re-solved (from the stored `xstar` when present); the simplex is
/// skipped. Otherwise the simplex runs and the new record is saved.
///
/// # Errors
/// Preparation errors (see [`prepare_calibration`]), calibration errors
/// (see [`calibrate`]) and I/O errors. A stored record written for another
/// setup, group or parameter order is a [`CalibError::RecordMismatch`].
pub fn calibrate_and_save_or_load(
    setup: &Setup, group: IncomeGroup, table: &GroupTable, initializers: &Initializers,
    config: &CalibrationConfig, logger: &Logger,
) -> CalibResult<(ModelData, CalibrationRecord)> {
    let logger = logger.new(o!("setup" => setup.name(), "group" => group.label()));
    let (mut data, targets) = prepare_calibration(setup, group, table, initializers)?;
    data.newton = config.newton;
    let path = record_path(&config.results_dir, setup, group);

    if path.exists() {
        let record = load(&path)?;
        record.check(&path, setup, group, &data.free.labels())?;
        info!(logger, "loaded calibration"; "path" => path.display().to_string(),
            "fun" => record.fun, "status" => &record.status);
        data.free.assign(&Array1::from(record.x.clone()))?;
        if let Some(xstar) = record.xstar {
            data.x0 = xstar;
        }
        if let Err(err) = data.solve_equilibrium(&logger) {
            warn!(logger, "equilibrium at stored parameters not solved: {}", err);
        }
        return Ok((data, record));
    }

    let outcome =
        calibrate(&mut data, &targets, &config.simplex, config.adaptive, config.verbose, &logger)?;
    let record = CalibrationRecord::from_outcome(setup, group, &outcome);
    if save_if_absent(&path, &record)? {
        info!(logger, "saved calibration"; "path" => path.display().to_string(),
            "fun" => record.fun, "converged" => record.converged);
    }
    Ok((data, record))
}

/// Result of one pair in a batch.
pub type PairResult = (Setup, IncomeGroup, CalibResult<CalibrationRecord>);

/// Calibrate (or load) every pair in turn.
///
/// # Errors
/// Only failures to read the parameter or initializer file; per-pair
/// failures are logged and returned in the list.
pub fn calibrate_many(
    pairs: &[(Setup, IncomeGroup)], config: &CalibrationConfig, logger: &Logger,
) -> CalibResult<Vec<PairResult>> {
    let table = load_group_table(&config.parameters_path)?;
    let initializers = Initializers::load(&config.initializers_path)?;
    let results = pairs
        .iter()
        .map(|&(setup, group)| {
            let result =
                calibrate_and_save_or_load(&setup, group, &table, &initializers, config, logger)
                    .map(|(_, record)| record);
            if let Err(err) = &result {
                warn!(logger, "calibration failed: {}", err;
                    "setup" => setup.name(), "group" => group.label());
            }
            (setup, group, result)
        })
        .collect();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::inputs::{AllocationShares, GroupData};
    use slog::Discard;
    use std::collections::BTreeMap;

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

    fn table() -> GroupTable {
        GroupTable { groups: BTreeMap::from([(IncomeGroup::All, record())]) }
    }

    fn initializers() -> Initializers {
        let values = BTreeMap::from([
            ("hat_c".to_string(), 5.0),
            ("varphi".to_string(), 1.5),
            ("beta_f".to_string(), 0.4),
            ("Z_ArAh".to_string(), 0.15),
            ("Z_MrMh".to_string(), 2.0),
            ("Z_SrSh".to_string(), 0.17),
            ("Z_ArSr".to_string(), 3.0),
            ("Z_MrSr".to_string(), 13.0),
        ]);
        let mut inits = Initializers::default();
        inits
            .blocks
            .insert("default".to_string(), BTreeMap::from([(IncomeGroup::All, values)]));
        inits
    }

    fn sample() -> CalibrationRecord {
        CalibrationRecord {
            setup: "rel-schooling-no-subsistence".to_string(),
            group: IncomeGroup::All,
            labels: ["varphi", "beta_f", "Z_ArAh", "Z_MrMh", "Z_SrSh", "Z_ArSr", "Z_MrSr"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            x: vec![1.0 / 3.0, 0.1 + 0.2, 0.15, 2.0000000000000004, 0.17, 3.0, 13.0],
            fun: 0.123456789012345678,
            status: "SolverConverged".to_string(),
            converged: true,
            iterations: 321,
            xstar: Some(Equilibrium::new(1.2417101, 2.982331, 10.471109)),
        }
    }

    #[test]
    // Purpose
    // -------
    // Records survive a save/load cycle bit for bit.
    //
    // Given
    // -----
    // - A record with values that are not exactly representable in short
    //   decimal form.
    //
    // Expect
    // ------
    // - The loaded record equals the saved one, including every float bit.
    fn round_trip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        let saved = sample();
        assert!(save_if_absent(&path, &saved).unwrap());
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, saved);
        for (a, b) in loaded.x.iter().zip(&saved.x) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        assert_eq!(loaded.fun.to_bits(), saved.fun.to_bits());
        assert_eq!(loaded.value("beta_f"), Some(0.1 + 0.2));
        assert_eq!(loaded.value("hat_c"), None);
    }

    #[test]
    // Purpose
    // -------
    // Existing records are never overwritten.
    //
    // Given
    // -----
    // - A record saved at a nested path, then a second record at the same
    //   path.
    //
    // Expect
    // ------
    // - The directories are created; the second save reports `false` and
    //   the file still holds the first record.
    fn save_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let setup: Setup = "rel-schooling-no-subsistence".parse().unwrap();
        let path = record_path(dir.path(), &setup, IncomeGroup::All);
        assert!(path.ends_with("rel-schooling-no-subsistence/all-income-calibration.json"));

        let first = sample();
        assert!(save_if_absent(&path, &first).unwrap());
        let mut second = sample();
        second.fun = 99.0;
        assert!(!save_if_absent(&path, &second).unwrap());
        assert_eq!(load(&path).unwrap(), first);
    }

    #[test]
    // Purpose
    // -------
    // Missing and malformed files map to the I/O error variants.
    //
    // Given
    // -----
    // - A path that does not exist and a file holding invalid JSON.
    //
    // Expect
    // ------
    // - `CalibError::Io` and `CalibError::Serde` respectively.
    fn load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load(&missing), Err(CalibError::Io { .. })));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(load(&broken), Err(CalibError::Serde { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Preparation applies the setup and the initializers.
    //
    // Given
    // -----
    // - The "all" record, `rel-schooling-no-subsistence` and default
    //   initializers that include `hat_c`.
    //
    // Expect
    // ------
    // - Seven free parameters, `hat_c` ignored, values taken from the
    //   initializers; a missing group is a model error.
    fn preparation() {
        let setup: Setup = "rel-schooling-no-subsistence".parse().unwrap();
        let (data, targets) =
            prepare_calibration(&setup, IncomeGroup::All, &table(), &initializers()).unwrap();
        assert_eq!(data.free.len(), 7);
        assert_eq!(data.free.values().unwrap()[0], 1.5);
        assert_eq!(targets, Targets::from_group(&record()));

        assert!(matches!(
            prepare_calibration(&setup, IncomeGroup::Low, &table(), &initializers()),
            Err(CalibError::Model(_))
        ));
    }

    #[test]
    // Purpose
    // -------
    // A stored record short-circuits the simplex.
    //
    // Given
    // -----
    // - A record saved at the setup's path before the call.
    //
    // Expect
    // ------
    // - The returned record is the stored one and the aggregate carries its
    //   parameter vector.
    fn stored_record_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let setup: Setup = "rel-schooling-no-subsistence".parse().unwrap();
        let config = CalibrationConfig {
            results_dir: dir.path().to_path_buf(),
            ..CalibrationConfig::default()
        };
        let stored = sample();
        save_if_absent(&record_path(dir.path(), &setup, IncomeGroup::All), &stored).unwrap();

        let logger = Logger::root(Discard, o!());
        let (data, record) = calibrate_and_save_or_load(
            &setup,
            IncomeGroup::All,
            &table(),
            &initializers(),
            &config,
            &logger,
        )
        .unwrap();
        assert_eq!(record, stored);
        assert_eq!(data.free.values().unwrap().to_vec(), stored.x);
    }

    #[test]
    // Purpose
    // -------
    // Stored records are only loaded into the schema they were written for.
    //
    // Given
    // -----
    // - At the `rel-schooling-no-subsistence` path: a record with the first
    //   and last labels (and values) swapped, then one written under another
    //   setup name, then one for another group.
    //
    // Expect
    // ------
    // - `RecordMismatch` each time, naming the stored labels or key.
    fn mismatched_record_is_rejected() {
        let setup: Setup = "rel-schooling-no-subsistence".parse().unwrap();
        let logger = Logger::root(Discard, o!());

        let mut swapped = sample();
        swapped.labels.swap(0, 6);
        swapped.x.swap(0, 6);
        let mut renamed = sample();
        renamed.setup = "something-else".to_string();
        let mut regrouped = sample();
        regrouped.group = IncomeGroup::Low;

        for stored in [swapped, renamed, regrouped] {
            let dir = tempfile::tempdir().unwrap();
            let config = CalibrationConfig {
                results_dir: dir.path().to_path_buf(),
                ..CalibrationConfig::default()
            };
            save_if_absent(&record_path(dir.path(), &setup, IncomeGroup::All), &stored).unwrap();
            let err = calibrate_and_save_or_load(
                &setup,
                IncomeGroup::All,
                &table(),
                &initializers(),
                &config,
                &logger,
            )
            .unwrap_err();
            match err {
                CalibError::RecordMismatch { expected, found, .. } => {
                    assert!(expected.starts_with("rel-schooling-no-subsistence/all [varphi,"));
                    assert_ne!(expected, found);
                    assert!(found.starts_with(&stored.setup));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Value lookup tolerates records with fewer values than labels.
    //
    // Given
    // -----
    // - Labels `varphi, beta_f` with a single value.
    //
    // Expect
    // ------
    // - `varphi` is found, `beta_f` is absent, and `check` rejects the
    //   record.
    fn short_record_lookup() {
        let mut short = sample();
        short.labels = vec!["varphi".to_string(), "beta_f".to_string()];
        short.x = vec![1.0];
        assert_eq!(short.value("varphi"), Some(1.0));
        assert_eq!(short.value("beta_f"), None);

        let setup: Setup = "rel-schooling-no-subsistence".parse().unwrap();
        let labels = short.labels.clone();
        let err = short.check(Path::new("short.json"), &setup, IncomeGroup::All, &labels);
        assert!(matches!(err, Err(CalibError::RecordMismatch { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Batch failures are reported per pair.
    //
    // Given
    // -----
    // - Parameter and initializer files covering only "all", a stored
    //   record for "all", and a batch asking for "all" and "low".
    //
    // Expect
    // ------
    // - Two results: the stored record for "all" and an error for "low".
    fn batch_reports_each_pair() {
        let dir = tempfile::tempdir().unwrap();
        let parameters = dir.path().join("parameters.json");
        let inits = dir.path().join("initializers.json");
        write_json(&parameters, &table()).unwrap();
        write_json(&inits, &initializers()).unwrap();
        let results_dir = dir.path().join("results");
        let setup: Setup = "rel-schooling-no-subsistence".parse().unwrap();
        save_if_absent(&record_path(&results_dir, &setup, IncomeGroup::All), &sample()).unwrap();

        let config = CalibrationConfig {
            parameters_path: parameters,
            initializers_path: inits,
            results_dir,
            ..CalibrationConfig::default()
        };
        let logger = Logger::root(Discard, o!());
        let results = calibrate_many(
            &[(setup, IncomeGroup::All), (setup, IncomeGroup::Low)],
            &config,
            &logger,
        )
        .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].2.as_ref().unwrap(), &sample());
        assert!(results[1].2.is_err());
    }
}
