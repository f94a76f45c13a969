//! Classical statevector simulation of small quantum circuits.
//!
//! Implements the handful of gates the variational encoder needs: rotation
//! gates whose angles are trainable, a fixed CNOT entangling topology, and
//! Pauli-Z expectation readout. States live in a dense amplitude vector of
//! length 2^n, which is plenty for the qubit counts this crate runs.

pub mod circuit;
pub mod complex;
pub mod gates;
pub mod state;

pub use circuit::VariationalCircuit;
pub use complex::Complex;
pub use state::QuantumState;

use thiserror::Error;

pub type QuantumResult<T> = std::result::Result<T, QuantumError>;

#[derive(Debug, Clone, Error)]
pub enum QuantumError {
    #[error("qubit index {index} out of range for {n_qubits}-qubit system")]
    QubitOutOfRange { index: usize, n_qubits: usize },

    #[error("circuit expects {expected} input angles, got {actual}")]
    InputCount { expected: usize, actual: usize },

    #[error("circuit expects {expected} parameters, got {actual}")]
    ParameterCount { expected: usize, actual: usize },

    #[error("control and target qubits coincide at index {index}")]
    OverlappingQubits { index: usize },
}
