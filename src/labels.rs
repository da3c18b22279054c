//! Conversion between binary {0, 1} and quantum {-1, +1} class labels

use ndarray::Array1;

/// Map a binary label to the quantum convention: `q = 2b - 1`
pub fn to_quantum(b: i64) -> i64 {
    2 * b - 1
}

/// Map a quantum label back to binary: `b = floor((q + 1) / 2)`
pub fn from_quantum(q: i64) -> i64 {
    (q + 1).div_euclid(2)
}

/// Convert an array of {0, 1} labels to {-1, +1}
pub fn convert_to_quantum(labels: &Array1<i64>) -> Array1<i64> {
    labels.mapv(to_quantum)
}

/// Convert an array of {-1, +1} labels to {0, 1}
pub fn convert_from_quantum(labels: &Array1<i64>) -> Array1<i64> {
    labels.mapv(from_quantum)
}
