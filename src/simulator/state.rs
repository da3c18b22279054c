//! Statevector representation
//!
//! Qubit 0 is the most significant bit of a basis-state index.

use ndarray::Array1;
use num_complex::Complex64;

use crate::circuit::Gate;
use crate::error::SimulatorError;

type Matrix2 = [[Complex64; 2]; 2];

/// Largest register a statevector may hold (2^26 amplitudes, 1 GiB)
pub const MAX_QUBITS: usize = 26;

/// A pure state of `qubit_count` qubits
#[derive(Clone, Debug)]
pub struct StateVector {
    qubit_count: usize,
    amplitudes: Array1<Complex64>,
}

impl StateVector {
    /// The all-zero basis state |00...0⟩
    pub fn zero_state(qubit_count: usize) -> Result<Self, SimulatorError> {
        if qubit_count > MAX_QUBITS {
            return Err(SimulatorError::TooManyQubits {
                qubits: qubit_count,
                max: MAX_QUBITS,
            });
        }
        let mut amplitudes = Array1::zeros(1 << qubit_count);
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(StateVector {
            qubit_count,
            amplitudes,
        })
    }

    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    /// Probability of measuring the basis state `index`
    pub fn probability(&self, index: usize) -> f64 {
        self.amplitudes.get(index).map_or(0.0, |a| a.norm_sqr())
    }

    /// ⟨Z⟩ on `qubit`
    pub fn expectation_z(&self, qubit: usize) -> Result<f64, SimulatorError> {
        let mask = self.mask(qubit)?;
        Ok(self
            .amplitudes
            .iter()
            .enumerate()
            .map(|(i, a)| if i & mask == 0 { a.norm_sqr() } else { -a.norm_sqr() })
            .sum())
    }

    pub fn apply(&mut self, gate: &Gate) -> Result<(), SimulatorError> {
        match *gate {
            Gate::Rx { qubit, angle } => self.apply_single(qubit, rx_matrix(angle)),
            Gate::Rot {
                qubit,
                phi,
                theta,
                omega,
            } => self.apply_single(qubit, rot_matrix(phi, theta, omega)),
            Gate::Cnot(cnot) => self.apply_cnot(cnot.control, cnot.target),
        }
    }

    fn mask(&self, qubit: usize) -> Result<usize, SimulatorError> {
        if qubit >= self.qubit_count {
            return Err(SimulatorError::QubitOutOfRange {
                qubit,
                qubit_count: self.qubit_count,
            });
        }
        Ok(1 << (self.qubit_count - 1 - qubit))
    }

    fn apply_single(&mut self, qubit: usize, u: Matrix2) -> Result<(), SimulatorError> {
        let mask = self.mask(qubit)?;
        for i in 0..self.dimension() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = u[0][0] * a + u[0][1] * b;
                self.amplitudes[j] = u[1][0] * a + u[1][1] * b;
            }
        }
        Ok(())
    }

    fn apply_cnot(&mut self, control: usize, target: usize) -> Result<(), SimulatorError> {
        let control_mask = self.mask(control)?;
        let target_mask = self.mask(target)?;
        for i in 0..self.dimension() {
            if i & control_mask != 0 && i & target_mask == 0 {
                self.amplitudes.swap(i, i | target_mask);
            }
        }
        Ok(())
    }
}

fn rx_matrix(angle: f64) -> Matrix2 {
    let c = Complex64::new((angle / 2.0).cos(), 0.0);
    let s = Complex64::new(0.0, -(angle / 2.0).sin());
    [[c, s], [s, c]]
}

/// `Rz(omega) Ry(theta) Rz(phi)`
fn rot_matrix(phi: f64, theta: f64, omega: f64) -> Matrix2 {
    let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
    let sum = (phi + omega) / 2.0;
    let diff = (phi - omega) / 2.0;
    [
        [
            Complex64::from_polar(c, -sum),
            -Complex64::from_polar(s, diff),
        ],
        [
            Complex64::from_polar(s, -diff),
            Complex64::from_polar(c, sum),
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Cnot;
    use std::f64::consts::PI;

    #[test]
    fn test_rx_pi_flips_qubit() {
        let mut state = StateVector::zero_state(2).unwrap();
        state.apply(&Gate::Rx { qubit: 0, angle: PI }).unwrap();
        assert!((state.probability(0b10) - 1.0).abs() < 1e-12);
        assert!((state.expectation_z(0).unwrap() + 1.0).abs() < 1e-12);
        assert!((state.expectation_z(1).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cnot_uses_control() {
        let mut state = StateVector::zero_state(2).unwrap();
        state.apply(&Gate::Rx { qubit: 1, angle: PI }).unwrap();
        state.apply(&Gate::Cnot(Cnot::new(1, 0))).unwrap();
        assert!((state.probability(0b11) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rot_theta_matches_ry() {
        let mut state = StateVector::zero_state(1).unwrap();
        state
            .apply(&Gate::Rot {
                qubit: 0,
                phi: 0.4,
                theta: 0.7,
                omega: -1.1,
            })
            .unwrap();
        assert!((state.expectation_z(0).unwrap() - 0.7f64.cos()).abs() < 1e-12);
    }

    #[test]
    fn test_register_size_is_bounded() {
        assert!(StateVector::zero_state(MAX_QUBITS + 1).is_err());
        assert_eq!(
            StateVector::zero_state(usize::BITS as usize).unwrap_err(),
            SimulatorError::TooManyQubits {
                qubits: usize::BITS as usize,
                max: MAX_QUBITS
            }
        );
    }

    #[test]
    fn test_out_of_range_qubit() {
        let mut state = StateVector::zero_state(1).unwrap();
        assert_eq!(
            state.apply(&Gate::Rx { qubit: 1, angle: 0.0 }),
            Err(SimulatorError::QubitOutOfRange {
                qubit: 1,
                qubit_count: 1
            })
        );
    }
}
