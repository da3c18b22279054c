//! Error types shared across the crate

use thiserror::Error;

/// Errors raised while building a circuit topology
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// Qubit or layer count out of range
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Parameter array does not have the layers x qubits x 3 shape
    #[error("parameter shape mismatch: expected {expected:?}, got {found:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },
}

/// Errors raised by a training run
///
/// `E` is the error type of the caller's cost and step capabilities. Failures
/// raised by them are carried unchanged in [`TrainingError::Upstream`].
#[derive(Debug, Error)]
pub enum TrainingError<E> {
    /// Malformed static arguments, detected before the first evaluation
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The cost or step function failed during an iteration
    #[error("upstream evaluation failed")]
    Upstream(#[source] E),
}

impl<E> TrainingError<E> {
    /// Returns the upstream error, if this is one
    pub fn into_upstream(self) -> Option<E> {
        match self {
            TrainingError::Upstream(err) => Some(err),
            TrainingError::InvalidConfiguration(_) => None,
        }
    }

    /// Whether the run was rejected before it started
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, TrainingError::InvalidConfiguration(_))
    }
}

/// Percentage improvement requested for a run whose initial value is exactly zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("percentage improvement is undefined when the initial value is exactly zero")]
pub struct DivisionUndefined;

/// Errors raised while loading a training configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while assembling a labeled dataset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("{features} feature rows but {labels} labels")]
    LengthMismatch { features: usize, labels: usize },

    #[error("test ratio must lie in [0, 1], got {0}")]
    InvalidSplit(String),
}

/// Errors raised by the reference simulator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulatorError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error("{qubits} qubits exceed the statevector limit of {max}")]
    TooManyQubits { qubits: usize, max: usize },

    #[error("qubit index {qubit} out of range for a {qubit_count}-qubit register")]
    QubitOutOfRange { qubit: usize, qubit_count: usize },

    #[error("{features} features cannot be embedded into {qubits} qubits")]
    TooManyFeatures { features: usize, qubits: usize },

    #[error("{samples} samples but {labels} labels")]
    LabelMismatch { samples: usize, labels: usize },
}
