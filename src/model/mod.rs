//! Hybrid quantum-classical autoencoder.
//!
//! A classical linear encoder squeezes each feature vector down to rotation
//! angles, a variational quantum circuit turns the angles into a latent
//! vector of Pauli-Z expectations, and a classical decoder reconstructs the
//! input. Training minimizes mean squared reconstruction error with exact
//! gradients: forward-mode dual numbers for the classical parameters and the
//! parameter-shift rule for the quantum angles.

pub mod autoencoder;
pub mod dataset;
pub mod layers;
pub mod losses;
pub mod optimizer;
pub mod quantum_layer;
pub mod synthetic;
pub mod training;

pub use autoencoder::{Autoencoder, Gradients, ModelConfig};
pub use dataset::Dataset;
pub use layers::{Layer, LinearLayer, ScaleLayer, Sequential, TanhLayer};
pub use losses::{LossFunction, MseLoss};
pub use optimizer::{Optimizer, Sgd};
pub use quantum_layer::LatentCircuit;
pub use synthetic::synthetic_features;
pub use training::{Trainer, TrainingConfig, TrainingResult};

use thiserror::Error;

pub type ModelResult<T> = std::result::Result<T, ModelError>;

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },

    #[error("invalid layer configuration: {reason}")]
    InvalidLayer { reason: String },

    #[error("training error: {reason}")]
    Training { reason: String },

    #[error("loss diverged to a non-finite value at epoch {epoch}")]
    Diverged { epoch: usize },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Quantum(#[from] crate::quantum::QuantumError),
}
