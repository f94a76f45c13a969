//! Variational circuit: angle encoding, trainable rotations, fixed
//! entanglement, and parameter-shift jacobians.

use std::f64::consts::FRAC_PI_2;

use super::gates;
use super::state::QuantumState;
use super::{QuantumError, QuantumResult};

/// One gate application. Rotation angles are looked up at execution time,
/// either from the input vector (encoding gates) or the parameter vector
/// (trainable gates); CNOTs carry no angle.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    /// RY rotation fed by input angle `input` (data encoding).
    EncodeRy { qubit: usize, input: usize },
    /// Trainable RY rotation fed by parameter `param`.
    Ry { qubit: usize, param: usize },
    /// Trainable RZ rotation fed by parameter `param`.
    Rz { qubit: usize, param: usize },
    /// Fixed entangling CNOT.
    Cnot { control: usize, target: usize },
}

/// Parameterized quantum circuit with the layout used throughout the crate:
/// one RY encoding rotation per qubit, then `depth` layers of trainable
/// RY+RZ rotations followed by a CNOT chain. Each trainable angle appears in
/// exactly one rotation gate, so the π/2 parameter-shift rule is exact.
#[derive(Debug, Clone)]
pub struct VariationalCircuit {
    n_qubits: usize,
    depth: usize,
    ops: Vec<Op>,
    n_parameters: usize,
}

impl VariationalCircuit {
    /// Build the hardware-efficient layout for `n_qubits` and `depth`
    /// variational layers. Trainable parameter count is `2 * n_qubits * depth`.
    pub fn hardware_efficient(n_qubits: usize, depth: usize) -> Self {
        let mut ops = Vec::new();
        let mut next_param = 0;

        for qubit in 0..n_qubits {
            ops.push(Op::EncodeRy { qubit, input: qubit });
        }

        for _ in 0..depth {
            for qubit in 0..n_qubits {
                ops.push(Op::Ry { qubit, param: next_param });
                next_param += 1;
            }
            for qubit in 0..n_qubits {
                ops.push(Op::Rz { qubit, param: next_param });
                next_param += 1;
            }
            for qubit in 0..n_qubits.saturating_sub(1) {
                ops.push(Op::Cnot { control: qubit, target: qubit + 1 });
            }
        }

        Self {
            n_qubits,
            depth,
            ops,
            n_parameters: next_param,
        }
    }

    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of input encoding angles (one per qubit).
    pub fn n_inputs(&self) -> usize {
        self.n_qubits
    }

    /// Number of trainable rotation angles.
    pub fn n_parameters(&self) -> usize {
        self.n_parameters
    }

    pub fn gate_count(&self) -> usize {
        self.ops.len()
    }

    /// Run the circuit from |0...0⟩ and return the final state.
    pub fn execute(&self, inputs: &[f64], params: &[f64]) -> QuantumResult<QuantumState> {
        if inputs.len() != self.n_inputs() {
            return Err(QuantumError::InputCount {
                expected: self.n_inputs(),
                actual: inputs.len(),
            });
        }
        if params.len() != self.n_parameters {
            return Err(QuantumError::ParameterCount {
                expected: self.n_parameters,
                actual: params.len(),
            });
        }

        let mut state = QuantumState::new(self.n_qubits);
        for op in &self.ops {
            match *op {
                Op::EncodeRy { qubit, input } => {
                    state.apply_single_qubit(&gates::ry(inputs[input]), qubit)?;
                }
                Op::Ry { qubit, param } => {
                    state.apply_single_qubit(&gates::ry(params[param]), qubit)?;
                }
                Op::Rz { qubit, param } => {
                    state.apply_single_qubit(&gates::rz(params[param]), qubit)?;
                }
                Op::Cnot { control, target } => {
                    state.apply_cnot(control, target)?;
                }
            }
        }

        Ok(state)
    }

    /// Pauli-Z expectation of every qubit after running the circuit.
    pub fn z_expectations(&self, inputs: &[f64], params: &[f64]) -> QuantumResult<Vec<f64>> {
        let state = self.execute(inputs, params)?;
        (0..self.n_qubits).map(|q| state.expectation_z(q)).collect()
    }

    /// Jacobian of the Z expectations with respect to the trainable angles,
    /// via the parameter-shift rule:
    /// ∂⟨Z_k⟩/∂θ_j = ½ [⟨Z_k⟩(θ_j + π/2) − ⟨Z_k⟩(θ_j − π/2)].
    ///
    /// Returned as `jac[param][qubit]`.
    pub fn param_jacobian(&self, inputs: &[f64], params: &[f64]) -> QuantumResult<Vec<Vec<f64>>> {
        let mut shifted = params.to_vec();
        let mut jacobian = Vec::with_capacity(params.len());

        for j in 0..params.len() {
            shifted[j] = params[j] + FRAC_PI_2;
            let plus = self.z_expectations(inputs, &shifted)?;
            shifted[j] = params[j] - FRAC_PI_2;
            let minus = self.z_expectations(inputs, &shifted)?;
            shifted[j] = params[j];

            jacobian.push(
                plus.iter()
                    .zip(minus.iter())
                    .map(|(p, m)| 0.5 * (p - m))
                    .collect(),
            );
        }

        Ok(jacobian)
    }

    /// Jacobian of the Z expectations with respect to the encoding angles.
    /// The encoding gates are RY rotations, so the same shift rule applies.
    ///
    /// Returned as `jac[input][qubit]`.
    pub fn input_jacobian(&self, inputs: &[f64], params: &[f64]) -> QuantumResult<Vec<Vec<f64>>> {
        let mut shifted = inputs.to_vec();
        let mut jacobian = Vec::with_capacity(inputs.len());

        for i in 0..inputs.len() {
            shifted[i] = inputs[i] + FRAC_PI_2;
            let plus = self.z_expectations(&shifted, params)?;
            shifted[i] = inputs[i] - FRAC_PI_2;
            let minus = self.z_expectations(&shifted, params)?;
            shifted[i] = inputs[i];

            jacobian.push(
                plus.iter()
                    .zip(minus.iter())
                    .map(|(p, m)| 0.5 * (p - m))
                    .collect(),
            );
        }

        Ok(jacobian)
    }
}
