//! The seam between the classical model and the quantum simulation.
//!
//! The autoencoder only needs a map from (encoding angles, trainable angles)
//! to a latent vector, plus its two jacobians. Keeping that behind a trait
//! lets the classical layers and the training loop be tested against a stub
//! with known derivatives, independent of the statevector backend.

use crate::quantum::VariationalCircuit;

use super::ModelResult;

/// A parameterized circuit viewed as a differentiable latent map.
pub trait LatentCircuit: std::fmt::Debug {
    /// Number of encoding angles consumed per sample.
    fn n_inputs(&self) -> usize;

    /// Number of trainable angles.
    fn n_parameters(&self) -> usize;

    /// Width of the latent vector produced.
    fn latent_width(&self) -> usize;

    /// Latent vector for one sample.
    fn forward(&self, angles: &[f64], params: &[f64]) -> ModelResult<Vec<f64>>;

    /// Jacobian of the latent vector w.r.t. the trainable angles, indexed
    /// `[param][latent]`.
    fn param_jacobian(&self, angles: &[f64], params: &[f64]) -> ModelResult<Vec<Vec<f64>>>;

    /// Jacobian of the latent vector w.r.t. the encoding angles, indexed
    /// `[input][latent]`.
    fn input_jacobian(&self, angles: &[f64], params: &[f64]) -> ModelResult<Vec<Vec<f64>>>;
}

impl LatentCircuit for VariationalCircuit {
    fn n_inputs(&self) -> usize {
        VariationalCircuit::n_inputs(self)
    }

    fn n_parameters(&self) -> usize {
        VariationalCircuit::n_parameters(self)
    }

    fn latent_width(&self) -> usize {
        self.n_qubits()
    }

    fn forward(&self, angles: &[f64], params: &[f64]) -> ModelResult<Vec<f64>> {
        Ok(self.z_expectations(angles, params)?)
    }

    fn param_jacobian(&self, angles: &[f64], params: &[f64]) -> ModelResult<Vec<Vec<f64>>> {
        Ok(VariationalCircuit::param_jacobian(self, angles, params)?)
    }

    fn input_jacobian(&self, angles: &[f64], params: &[f64]) -> ModelResult<Vec<Vec<f64>>> {
        Ok(VariationalCircuit::input_jacobian(self, angles, params)?)
    }
}
