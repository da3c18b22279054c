//! Variational classifier evaluated on the statevector backend
//!
//! Features are angle-embedded with one `Rx` per feature, the ansatz is applied,
//! and the model output is ⟨Z⟩ on qubit 0. Labels are expected in {-1, +1}.

use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;

use crate::circuit::{CircuitTopology, Gate};
use crate::error::SimulatorError;
use crate::simulator::state::StateVector;
use crate::training::objective::BatchCostFunction;
use crate::Parameters;

/// Classifier built from an ansatz topology
#[derive(Debug)]
pub struct VariationalClassifier {
    topology: CircuitTopology,
    executions: AtomicU64,
}

impl VariationalClassifier {
    pub fn new(topology: CircuitTopology) -> Self {
        VariationalClassifier {
            topology,
            executions: AtomicU64::new(0),
        }
    }

    pub fn topology(&self) -> &CircuitTopology {
        &self.topology
    }

    /// Circuit executions performed since creation or the last reset
    pub fn executions(&self) -> u64 {
        self.executions.load(Ordering::Relaxed)
    }

    pub fn reset_executions(&self) {
        self.executions.store(0, Ordering::Relaxed);
    }

    /// Embedding followed by the ansatz
    pub fn circuit(
        &self,
        params: &Parameters,
        features: ArrayView1<'_, f64>,
    ) -> Result<Vec<Gate>, SimulatorError> {
        let qubits = self.topology.n_qubits();
        if features.len() > qubits {
            return Err(SimulatorError::TooManyFeatures {
                features: features.len(),
                qubits,
            });
        }

        let mut gates: Vec<Gate> = features
            .iter()
            .enumerate()
            .map(|(qubit, &angle)| Gate::Rx { qubit, angle })
            .collect();
        gates.extend(self.topology.gate_sequence(params)?);
        Ok(gates)
    }

    /// Model output for one sample, in [-1, 1]
    pub fn output(
        &self,
        params: &Parameters,
        features: ArrayView1<'_, f64>,
    ) -> Result<f64, SimulatorError> {
        let gates = self.circuit(params, features)?;
        let mut state = StateVector::zero_state(self.topology.n_qubits())?;
        for gate in &gates {
            state.apply(gate)?;
        }
        self.executions.fetch_add(1, Ordering::Relaxed);
        state.expectation_z(0)
    }

    /// Outputs for every row of `features`, evaluated in parallel
    pub fn outputs(
        &self,
        params: &Parameters,
        features: &Array2<f64>,
    ) -> Result<Array1<f64>, SimulatorError> {
        self.topology.check_parameters(params)?;
        let outputs = (0..features.nrows())
            .into_par_iter()
            .map(|i| self.output(params, features.row(i)))
            .collect::<Result<Vec<f64>, SimulatorError>>()?;
        Ok(Array1::from_vec(outputs))
    }

    /// Mean squared error between outputs and {-1, +1} labels
    pub fn square_loss(
        &self,
        params: &Parameters,
        features: &Array2<f64>,
        labels: &Array1<f64>,
    ) -> Result<f64, SimulatorError> {
        let outputs = self.checked_outputs(params, features, labels)?;
        if outputs.is_empty() {
            return Ok(0.0);
        }
        let total: f64 = outputs
            .iter()
            .zip(labels.iter())
            .map(|(o, l)| (l - o) * (l - o))
            .sum();
        Ok(total / outputs.len() as f64)
    }

    /// Fraction of samples whose output sign matches the label
    pub fn accuracy(
        &self,
        params: &Parameters,
        features: &Array2<f64>,
        labels: &Array1<f64>,
    ) -> Result<f64, SimulatorError> {
        let outputs = self.checked_outputs(params, features, labels)?;
        if outputs.is_empty() {
            return Ok(0.0);
        }
        let correct = outputs
            .iter()
            .zip(labels.iter())
            .filter(|(o, l)| o.signum() == l.signum())
            .count();
        Ok(correct as f64 / outputs.len() as f64)
    }

    fn checked_outputs(
        &self,
        params: &Parameters,
        features: &Array2<f64>,
        labels: &Array1<f64>,
    ) -> Result<Array1<f64>, SimulatorError> {
        if features.nrows() != labels.len() {
            return Err(SimulatorError::LabelMismatch {
                samples: features.nrows(),
                labels: labels.len(),
            });
        }
        self.outputs(params, features)
    }
}

impl BatchCostFunction for VariationalClassifier {
    type Error = SimulatorError;

    fn evaluate(
        &self,
        params: &Parameters,
        features: &Array2<f64>,
        labels: &Array1<f64>,
    ) -> Result<f64, SimulatorError> {
        self.square_loss(params, features, labels)
    }
}
