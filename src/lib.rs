//! Variational Quantum Classifier Toolkit
//!
//! This crate provides the reusable pieces of variational quantum classifier
//! experiments: a layered ansatz topology builder, a convergence-aware training
//! driver that runs either full-batch or mini-batch, label re-encoding, and a
//! small statevector backend with gradient-based optimizers for running the
//! whole thing end to end.
//!
//! The driver is agnostic to both the cost function and the optimizer. It
//! consumes them through the narrow [`training::CostFunction`],
//! [`training::BatchCostFunction`] and [`training::StepFunction`] capabilities.

pub mod circuit;
pub mod error;
pub mod labels;
pub mod optimizer;
pub mod simulator;
pub mod training;

/// Trainable angles of an ansatz, shaped layers x qubits x 3
pub type Parameters = ndarray::Array3<f64>;

pub mod prelude {
    pub use crate::circuit::{build_topology, CircuitTopology, Cnot, Gate};
    pub use crate::error::{DivisionUndefined, SimulatorError, TopologyError, TrainingError};
    pub use crate::labels::{convert_from_quantum, convert_to_quantum};
    pub use crate::optimizer::{Adam, GradientDescent, GradientRule, GradientStep, Momentum, Optimizer};
    pub use crate::simulator::VariationalClassifier;
    pub use crate::training::{
        BatchMode, CostFunction, BatchCostFunction, LabeledData, ProgressObserver, StepFunction,
        StoppingPolicy, Trainer, TrainingConfig, TrainingRun,
    };
    pub use crate::Parameters;
}

// Version and crate information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
