//! Integration tests for the calibration pipeline.
//!
//! Purpose
//! -------
//! - Run a short calibration from JSON inputs on disk through
//!   `calibrate_many`, persist it, and check that a second run loads the
//!   stored record instead of calibrating again.
//!
//! Coverage
//! --------
//! - `calibration::config`: parameter and initializer files, run
//!   configuration.
//! - `calibration::persist`: record paths, save-if-absent, load path.
//! - `calibration::run` with a small simplex budget.
//! - `calibration::summary` on the stored record.
//!
//! Exclusions
//! ----------
//! - Calibration quality: the simplex budget is far too small to converge.
use std::collections::BTreeMap;

use schooling_gap::{
    calibration::{
        config::{CalibrationConfig, Initializers},
        errors::CalibError,
        persist::{calibrate_many, load, record_path, write_json},
        run::SimplexOptions,
        setup::Setup,
        summary::{render_summary, SummaryRow},
    },
    logging::discard_logger,
    model::inputs::{AllocationShares, GroupData, GroupTable, IncomeGroup},
};

fn all_income_record() -> GroupData {
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

fn initializers() -> Initializers {
    let values: BTreeMap<String, f64> = [
        ("hat_c", 5.0),
        ("varphi", 1.5),
        ("beta_f", 0.4),
        ("Z_ArAh", 0.15),
        ("Z_MrMh", 2.0),
        ("Z_SrSh", 0.17),
        ("Z_ArSr", 3.0),
        ("Z_MrSr", 13.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    let mut inits = Initializers::default();
    inits.blocks.insert("default".to_string(), BTreeMap::from([(IncomeGroup::All, values)]));
    inits
}

/// Write inputs under `dir` and return a configuration pointing at them.
fn configure(dir: &std::path::Path) -> CalibrationConfig {
    let parameters_path = dir.join("parameters.json");
    let initializers_path = dir.join("initializers.json");
    let table = GroupTable { groups: BTreeMap::from([(IncomeGroup::All, all_income_record())]) };
    write_json(&parameters_path, &table).unwrap();
    write_json(&initializers_path, &initializers()).unwrap();
    CalibrationConfig {
        parameters_path,
        initializers_path,
        results_dir: dir.join("results"),
        simplex: SimplexOptions { max_iters: Some(3), ..SimplexOptions::default() },
        ..CalibrationConfig::default()
    }
}

#[test]
// Purpose
// -------
// A calibration is stored once and loaded afterwards.
//
// Given
// -----
// - `rel-schooling-no-subsistence` for the "all" group with a three
//   iteration simplex budget, run twice through `calibrate_many`.
//
// Expect
// ------
// - The first run writes the record file with seven labelled parameters
//   and a finite objective; the second run returns the identical record;
//   the summary row reports `hat_c` as zero.
fn calibrate_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let config = configure(dir.path());
    let setup: Setup = "rel-schooling-no-subsistence".parse().unwrap();
    let pairs = [(setup, IncomeGroup::All)];
    let logger = discard_logger();

    let first = calibrate_many(&pairs, &config, &logger).unwrap();
    let record = first[0].2.clone().unwrap();
    let path = record_path(&config.results_dir, &setup, IncomeGroup::All);
    assert!(path.exists());
    assert_eq!(load(&path).unwrap(), record);
    assert_eq!(record.labels.len(), 7);
    assert_eq!(record.x.len(), 7);
    assert!(record.fun.is_finite());
    assert!(record.iterations <= 3);
    assert_eq!(record.setup, "rel-schooling-no-subsistence");

    let second = calibrate_many(&pairs, &config, &logger).unwrap();
    assert_eq!(second[0].2.as_ref().unwrap(), &record);

    let row = SummaryRow::from_record(&record);
    assert_eq!(row.parameters[0], 0.0);
    assert!(render_summary(&[row]).contains("| all |"));
}

#[test]
// Purpose
// -------
// Input problems surface as typed errors.
//
// Given
// -----
// - An unknown setup name, a configuration with a missing parameter file,
//   and a group without initializers.
//
// Expect
// ------
// - `UnknownSetup`, `Io` from the batch driver, and a per-pair
//   `MissingInitializer`.
fn input_errors() {
    assert_eq!(
        "rel-schooling-nothing".parse::<Setup>(),
        Err(CalibError::UnknownSetup { name: "rel-schooling-nothing".to_string() })
    );

    let dir = tempfile::tempdir().unwrap();
    let logger = discard_logger();
    let missing = CalibrationConfig {
        parameters_path: dir.path().join("absent.json"),
        ..CalibrationConfig::default()
    };
    let err = calibrate_many(&[], &missing, &logger).unwrap_err();
    assert!(matches!(err, CalibError::Io { .. }));

    let mut config = configure(dir.path());
    let mut table = GroupTable::default();
    table.groups.insert(IncomeGroup::All, all_income_record());
    table.groups.insert(IncomeGroup::High, all_income_record());
    write_json(&config.parameters_path, &table).unwrap();
    config.results_dir = dir.path().join("other-results");
    let results =
        calibrate_many(&[(Setup::baseline(), IncomeGroup::High)], &config, &logger).unwrap();
    assert!(matches!(results[0].2, Err(CalibError::MissingInitializer { .. })));
}
