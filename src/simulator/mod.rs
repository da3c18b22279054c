//! Reference statevector backend
//!
//! A small simulator for the gates an ansatz produces, so that classifiers can
//! be trained end to end. The training driver does not depend on it.

pub mod classifier;
pub mod state;

pub use classifier::VariationalClassifier;
pub use state::{StateVector, MAX_QUBITS};
