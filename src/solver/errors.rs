use crate::model::errors::ModelError;

/// Result alias for Newton solves and their configuration.
pub type SolveResult<T> = Result<T, SolveError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    // ---- NewtonOptions ----
    /// Residual or step tolerance must be finite and positive.
    InvalidTolerance {
        name: &'static str,
        tol: f64,
        reason: &'static str,
    },

    /// Finite-difference steps must be finite, positive and ordered.
    InvalidStep {
        step: f64,
        min_step: f64,
        reason: &'static str,
    },

    /// Maximum iterations must be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },

    /// Damping multiplier and floor must be finite, positive and ordered.
    InvalidDamping {
        lambda: f64,
        floor: f64,
        reason: &'static str,
    },

    // ---- State ----
    /// State vector length does not match the system.
    StateDimMismatch {
        expected: usize,
        found: usize,
    },

    /// State entries need to be finite.
    NonFiniteState {
        index: usize,
        value: f64,
    },

    /// Residual at the starting point is not finite.
    NonFiniteResidual {
        index: usize,
        value: f64,
    },

    // ---- Numerical degeneracy ----
    /// No finite Jacobian for any step down to `min_step`.
    JacobianFailed {
        min_step: f64,
    },

    /// Jacobian has no finite inverse.
    SingularJacobian,

    /// No damping factor down to the floor produced an admissible step.
    StepRejected {
        iteration: usize,
        smallest_damping: f64,
    },

    // ---- Model ----
    /// The residual system could not be evaluated.
    Model(ModelError),
}

impl std::error::Error for SolveError {}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- NewtonOptions ----
            SolveError::InvalidTolerance { name, tol, reason } => {
                write!(f, "Invalid {name} tolerance {tol}: {reason}")
            }
            SolveError::InvalidStep { step, min_step, reason } => {
                write!(f, "Invalid finite-difference steps ({step}, {min_step}): {reason}")
            }
            SolveError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            SolveError::InvalidDamping { lambda, floor, reason } => {
                write!(f, "Invalid damping (lambda {lambda}, floor {floor}): {reason}")
            }

            // ---- State ----
            SolveError::StateDimMismatch { expected, found } => {
                write!(f, "State dimension mismatch: expected {expected}, found {found}")
            }
            SolveError::NonFiniteState { index, value } => {
                write!(f, "Non-finite state at index {index}: {value}")
            }
            SolveError::NonFiniteResidual { index, value } => {
                write!(f, "Non-finite residual at index {index}: {value}")
            }

            // ---- Numerical degeneracy ----
            SolveError::JacobianFailed { min_step } => {
                write!(f, "Jacobian is not finite for any step down to {min_step}")
            }
            SolveError::SingularJacobian => {
                write!(f, "Jacobian is singular")
            }
            SolveError::StepRejected { iteration, smallest_damping } => {
                write!(
                    f,
                    "Newton solver failed to step at iteration {iteration} \
                     (smallest damping tried {smallest_damping})"
                )
            }

            // ---- Model ----
            SolveError::Model(err) => {
                write!(f, "Model error: {err}")
            }
        }
    }
}

impl From<ModelError> for SolveError {
    fn from(err: ModelError) -> Self {
        SolveError::Model(err)
    }
}
