//! model::errors — configuration and resolution failures of the economy.
//!
//! Every variant here describes a programmer or configuration error: an
//! unset parameter, an unknown label, an inconsistent group record or a
//! productivity schema that cannot connect two indices. None of them are
//! numerical difficulties; those live in [`crate::solver::errors`].
use crate::model::index::ProductionIndex;

/// Result alias for model construction and lookups.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Parameters ----
    /// A free parameter is part of the schema but has no value yet.
    UnsetParameter {
        key: String,
    },

    /// The label does not name a free parameter of the schema.
    UnknownParameter {
        key: String,
    },

    /// Lower bound above upper bound, or a NaN bound.
    InvalidBounds {
        key: String,
        lower: f64,
        upper: f64,
    },

    /// Value is non-finite or outside the parameter's bounds.
    ParameterOutOfBounds {
        key: String,
        value: f64,
        lower: f64,
        upper: f64,
    },

    /// A parameter vector does not match the number of free parameters.
    ParameterLengthMismatch {
        expected: usize,
        found: usize,
    },

    // ---- Taxonomy ----
    /// Label is not a production or flow index (e.g. `"Xr"`).
    UnknownIndex {
        label: String,
    },

    /// Label is not one of `low`, `middle`, `high`, `all`.
    UnknownIncomeGroup {
        label: String,
    },

    // ---- Group data ----
    /// Empirical record fails a domain check.
    InvalidGroupData {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The parameter table has no record for the group.
    MissingGroup {
        group: String,
    },

    // ---- Expenditure resolution ----
    /// No chain of calibrated productivity ratios with at most three
    /// intermediate indices connects the pair.
    NoProductivityPath {
        over: ProductionIndex,
        under: ProductionIndex,
    },

    /// Cross-sector definitions refer back to themselves.
    ResolutionDepthExceeded {
        over: ProductionIndex,
        under: ProductionIndex,
        depth: usize,
    },
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Parameters ----
            ModelError::UnsetParameter { key } => {
                write!(f, "Free parameter '{key}' has no value")
            }
            ModelError::UnknownParameter { key } => {
                write!(f, "Unknown free parameter '{key}'")
            }
            ModelError::InvalidBounds { key, lower, upper } => {
                write!(f, "Invalid bounds for '{key}': [{lower}, {upper}]")
            }
            ModelError::ParameterOutOfBounds { key, value, lower, upper } => {
                write!(f, "Value {value} of '{key}' is outside [{lower}, {upper}]")
            }
            ModelError::ParameterLengthMismatch { expected, found } => {
                write!(f, "Parameter vector length mismatch: expected {expected}, found {found}")
            }

            // ---- Taxonomy ----
            ModelError::UnknownIndex { label } => {
                write!(f, "Unknown sector/technology index '{label}'")
            }
            ModelError::UnknownIncomeGroup { label } => {
                write!(f, "Unknown income group '{label}'")
            }

            // ---- Group data ----
            ModelError::InvalidGroupData { field, value, reason } => {
                write!(f, "Invalid group data field '{field}' = {value}: {reason}")
            }
            ModelError::MissingGroup { group } => {
                write!(f, "No parameter record for income group '{group}'")
            }

            // ---- Expenditure resolution ----
            ModelError::NoProductivityPath { over, under } => {
                write!(
                    f,
                    "No productivity path from {over} to {under} within three intermediate indices"
                )
            }
            ModelError::ResolutionDepthExceeded { over, under, depth } => {
                write!(f, "Resolving E({over}, {under}) exceeded depth {depth}")
            }
        }
    }
}
