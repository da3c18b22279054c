//! Layered ansatz topology
//!
//! A circuit over `Q` qubits with `L` layers repeats the same block `L` times:
//! one three-angle rotation per qubit followed by a fixed entangling pattern.
//! Only the rotation angles differ between layers. The entangling pattern
//! depends on the qubit count alone:
//!
//! * one qubit: no entangler
//! * two qubits: a single CNOT with control 1 and target 0
//! * more qubits: a ring of CNOTs, gate `i` has control `(i + 1) % Q` and target `i`

use std::fmt::{self, Display, Formatter};

use ndarray::Array3;
use rand::Rng;
use std::f64::consts::PI;

use crate::circuit::gate::Gate;
use crate::error::TopologyError;
use crate::Parameters;

/// Number of angles in a single-qubit rotation
pub const ANGLES_PER_ROTATION: usize = 3;

/// A controlled-NOT between two qubits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cnot {
    pub control: usize,
    pub target: usize,
}

impl Cnot {
    pub fn new(control: usize, target: usize) -> Self {
        Cnot { control, target }
    }
}

impl Display for Cnot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "CNOT({} -> {})", self.control, self.target)
    }
}

/// A parameterized rotation on one qubit of one layer
///
/// Its three angles live at `params[[layer, qubit, 0..3]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    pub layer: usize,
    pub qubit: usize,
}

impl Rotation {
    /// Index of the `k`-th angle of this rotation in the parameter array
    pub fn angle_index(&self, k: usize) -> [usize; 3] {
        [self.layer, self.qubit, k]
    }

    /// Reads the `(phi, theta, omega)` angles of this rotation
    pub fn angles(&self, params: &Parameters) -> (f64, f64, f64) {
        (
            params[self.angle_index(0)],
            params[self.angle_index(1)],
            params[self.angle_index(2)],
        )
    }
}

/// One block of the ansatz: rotations on every qubit, then the entanglers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub rotations: Vec<Rotation>,
    pub entanglers: Vec<Cnot>,
}

/// Structural description of a layered variational circuit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitTopology {
    n_qubits: usize,
    layers: Vec<Layer>,
}

/// Entangling pattern for a register of `n_qubits`
pub fn entangling_pattern(n_qubits: usize) -> Vec<Cnot> {
    match n_qubits {
        0 | 1 => Vec::new(),
        2 => vec![Cnot::new(1, 0)],
        n => (0..n).map(|i| Cnot::new((i + 1) % n, i)).collect(),
    }
}

/// Builds the topology of an `n_layers`-deep ansatz over `n_qubits`
pub fn build_topology(n_qubits: usize, n_layers: usize) -> Result<CircuitTopology, TopologyError> {
    if n_qubits < 1 {
        return Err(TopologyError::InvalidConfiguration(
            "qubit count must be at least 1".to_string(),
        ));
    }
    if n_layers < 1 {
        return Err(TopologyError::InvalidConfiguration(
            "layer count must be at least 1".to_string(),
        ));
    }

    let entanglers = entangling_pattern(n_qubits);
    let layers = (0..n_layers)
        .map(|layer| Layer {
            rotations: (0..n_qubits).map(|qubit| Rotation { layer, qubit }).collect(),
            entanglers: entanglers.clone(),
        })
        .collect();

    Ok(CircuitTopology { n_qubits, layers })
}

impl CircuitTopology {
    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Shape of the parameter array: layers x qubits x 3
    pub fn parameter_shape(&self) -> (usize, usize, usize) {
        (self.n_layers(), self.n_qubits, ANGLES_PER_ROTATION)
    }

    /// Total number of trainable angles
    pub fn parameter_count(&self) -> usize {
        self.n_layers() * self.n_qubits * ANGLES_PER_ROTATION
    }

    /// All-zero parameters of the right shape
    pub fn zero_parameters(&self) -> Parameters {
        Array3::zeros(self.parameter_shape())
    }

    /// Parameters drawn uniformly from `[0, 2π)`
    pub fn random_parameters<R: Rng>(&self, rng: &mut R) -> Parameters {
        let (l, q, k) = self.parameter_shape();
        Array3::from_shape_fn((l, q, k), |_| rng.gen_range(0.0..2.0 * PI))
    }

    /// Checks that `params` has the shape this topology expects
    pub fn check_parameters(&self, params: &Parameters) -> Result<(), TopologyError> {
        let expected = self.parameter_shape();
        let found = params.dim();
        if found != expected {
            return Err(TopologyError::ShapeMismatch { expected, found });
        }
        Ok(())
    }

    /// Flattens the topology into an ordered gate list bound to `params`
    pub fn gate_sequence(&self, params: &Parameters) -> Result<Vec<Gate>, TopologyError> {
        self.check_parameters(params)?;

        let per_layer = self.n_qubits + entangling_pattern(self.n_qubits).len();
        let mut gates = Vec::with_capacity(per_layer * self.n_layers());

        for layer in &self.layers {
            for rotation in &layer.rotations {
                let (phi, theta, omega) = rotation.angles(params);
                gates.push(Gate::Rot {
                    qubit: rotation.qubit,
                    phi,
                    theta,
                    omega,
                });
            }
            gates.extend(layer.entanglers.iter().copied().map(Gate::Cnot));
        }

        Ok(gates)
    }
}
