//! Variational circuit structure

pub mod gate;
pub mod topology;

pub use gate::Gate;
pub use topology::{
    build_topology, entangling_pattern, CircuitTopology, Cnot, Layer, Rotation,
    ANGLES_PER_ROTATION,
};
