//! calibration::summary — one table row per calibrated group.
use std::fmt::Write;

use crate::{
    calibration::persist::CalibrationRecord,
    model::{equilibrium::Equilibrium, inputs::IncomeGroup},
};

/// Free-parameter columns, in schema order.
pub const PARAMETER_COLUMNS: [&str; 8] =
    ["hat_c", "varphi", "beta_f", "Z_ArAh", "Z_MrMh", "Z_SrSh", "Z_ArSr", "Z_MrSr"];

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub group: IncomeGroup,
    /// Values for [`PARAMETER_COLUMNS`]; `hat_c` is 0 when subsistence was
    /// removed.
    pub parameters: [f64; 8],
    pub xstar: Option<Equilibrium>,
    pub fun: f64,
    pub status: String,
}

impl SummaryRow {
    pub fn from_record(record: &CalibrationRecord) -> Self {
        let mut parameters = [0.0; 8];
        for (slot, label) in parameters.iter_mut().zip(PARAMETER_COLUMNS) {
            *slot = record.value(label).unwrap_or(0.0);
        }
        Self {
            group: record.group,
            parameters,
            xstar: record.xstar,
            fun: record.fun,
            status: record.status.clone(),
        }
    }

    /// `sf / sm` of the solved equilibrium.
    pub fn schooling_ratio(&self) -> Option<f64> {
        self.xstar.map(|eq| eq.schooling_ratio())
    }
}

fn cell(out: &mut String, value: Option<f64>) {
    match value {
        Some(v) => {
            let _ = write!(out, " {v:>7.4} |");
        }
        None => out.push_str("       - |"),
    }
}

/// Markdown table with one row per record.
pub fn render_summary(rows: &[SummaryRow]) -> String {
    let mut out = String::from("| group |");
    for label in PARAMETER_COLUMNS.iter().chain(&["tw", "sf", "sm", "ts", "error"]) {
        let _ = write!(out, " {label:>7} |");
    }
    out.push_str(" status |\n|---|");
    for _ in 0..PARAMETER_COLUMNS.len() + 5 {
        out.push_str("---|");
    }
    out.push_str("---|\n");

    for row in rows {
        let _ = write!(out, "| {} |", row.group);
        for &value in &row.parameters {
            cell(&mut out, Some(value));
        }
        cell(&mut out, row.xstar.map(|eq| eq.tw));
        cell(&mut out, row.xstar.map(|eq| eq.sf));
        cell(&mut out, row.xstar.map(|eq| eq.sm));
        cell(&mut out, row.schooling_ratio());
        cell(&mut out, Some(row.fun));
        let _ = writeln!(out, " {} |", row.status);
    }
    out
}
