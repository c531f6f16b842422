use argmin::core::{ArgminError, Error};

use crate::{model::errors::ModelError, solver::errors::SolveError};

/// Result alias for calibration runs, configuration and persistence.
pub type CalibResult<T> = Result<T, CalibError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CalibError {
    // ---- Setup ----
    /// Setup name is not one of the known calibration setups.
    UnknownSetup {
        name: String,
    },

    /// Neither the setup nor the default block initialises this group.
    MissingInitializer {
        setup: String,
        group: String,
    },

    /// Nothing to calibrate.
    EmptyParameterVector,

    /// Simplex options must be usable.
    InvalidSimplexOptions {
        max_iters: u64,
        sd_tolerance: f64,
        reason: &'static str,
    },

    // ---- Model and solver ----
    Model(ModelError),
    Solve(SolveError),

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    /// Optimizer finished without a best parameter vector.
    MissingBestParam,

    // ---- I/O ----
    /// Reading or writing a file failed.
    Io {
        path: String,
        text: String,
    },

    /// A file could not be (de)serialised.
    Serde {
        path: String,
        text: String,
    },

    /// A stored record belongs to another setup, group or parameter schema.
    RecordMismatch {
        path: String,
        expected: String,
        found: String,
    },
}

impl std::error::Error for CalibError {}

impl std::fmt::Display for CalibError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Setup ----
            CalibError::UnknownSetup { name } => {
                write!(f, "Unknown calibration setup: {name}")
            }
            CalibError::MissingInitializer { setup, group } => {
                write!(f, "No initial values for setup {setup} and income group {group}")
            }
            CalibError::EmptyParameterVector => {
                write!(f, "Calibration has no free parameters")
            }
            CalibError::InvalidSimplexOptions { max_iters, sd_tolerance, reason } => {
                write!(
                    f,
                    "Invalid simplex options (max_iters {max_iters}, sd_tolerance {sd_tolerance}): \
                     {reason}"
                )
            }

            // ---- Model and solver ----
            CalibError::Model(err) => {
                write!(f, "Model error: {err}")
            }
            CalibError::Solve(err) => {
                write!(f, "Solver error: {err}")
            }

            // ---- Argmin ----
            CalibError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            CalibError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            CalibError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            CalibError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            CalibError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            CalibError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            CalibError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            CalibError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }
            CalibError::MissingBestParam => {
                write!(f, "Optimizer returned no best parameter vector")
            }

            // ---- I/O ----
            CalibError::Io { path, text } => {
                write!(f, "I/O error at {path}: {text}")
            }
            CalibError::Serde { path, text } => {
                write!(f, "Malformed JSON at {path}: {text}")
            }
            CalibError::RecordMismatch { path, expected, found } => {
                write!(f, "Stored record at {path} does not fit: expected {expected}, found {found}")
            }
        }
    }
}

impl From<Error> for CalibError {
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<CalibError>() {
            Ok(calib_err) => return calib_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => CalibError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => CalibError::NotImplemented { text },
                ArgminError::NotInitialized { text } => CalibError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => CalibError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => CalibError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => CalibError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => CalibError::ImpossibleError { text },
                other => CalibError::BackendError { text: other.to_string() },
            },
            Err(err) => CalibError::BackendError { text: err.to_string() },
        }
    }
}

impl From<ModelError> for CalibError {
    fn from(err: ModelError) -> Self {
        CalibError::Model(err)
    }
}

impl From<SolveError> for CalibError {
    fn from(err: SolveError) -> Self {
        CalibError::Solve(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Errors raised inside the cost function survive the trip through
    // argmin's error type.
    //
    // Given
    // -----
    // - A `CalibError` boxed into `argmin::core::Error`, and a plain
    //   `ArgminError`.
    //
    // Expect
    // ------
    // - The first converts back to itself, the second to its wrapper.
    fn argmin_round_trip() {
        let boxed: Error = CalibError::EmptyParameterVector.into();
        assert_eq!(CalibError::from(boxed), CalibError::EmptyParameterVector);

        let argmin: Error = ArgminError::NotInitialized { text: "x".to_string() }.into();
        assert_eq!(CalibError::from(argmin), CalibError::NotInitialized { text: "x".to_string() });

        let solve = CalibError::from(SolveError::SingularJacobian);
        assert!(solve.to_string().contains("singular"));
    }
}
