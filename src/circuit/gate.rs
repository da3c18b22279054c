//! Gates produced by flattening a topology
//!
//! These are plain descriptions; applying them is the job of a simulator.

use std::fmt::{self, Display, Formatter};

use crate::circuit::topology::Cnot;

/// A gate in an ansatz or embedding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Rotation around X, used for angle embedding of features
    Rx { qubit: usize, angle: f64 },
    /// General rotation `Rz(omega) Ry(theta) Rz(phi)`
    Rot {
        qubit: usize,
        phi: f64,
        theta: f64,
        omega: f64,
    },
    /// Controlled NOT
    Cnot(Cnot),
}

impl Gate {
    /// Qubits this gate acts on
    pub fn qubits(&self) -> Vec<usize> {
        match self {
            Gate::Rx { qubit, .. } | Gate::Rot { qubit, .. } => vec![*qubit],
            Gate::Cnot(cnot) => vec![cnot.control, cnot.target],
        }
    }

    /// Whether the gate carries trainable angles
    pub fn is_parametrized(&self) -> bool {
        matches!(self, Gate::Rot { .. })
    }
}

impl Display for Gate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Rx { qubit, angle } => write!(f, "Rx({:.2}) q{}", angle, qubit),
            Gate::Rot {
                qubit,
                phi,
                theta,
                omega,
            } => write!(f, "Rot({:.2}, {:.2}, {:.2}) q{}", phi, theta, omega, qubit),
            Gate::Cnot(cnot) => write!(f, "{}", cnot),
        }
    }
}
