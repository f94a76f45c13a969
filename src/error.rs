use thiserror::Error;

use crate::consolidate::ConsolidateError;
use crate::model::ModelError;
use crate::quantum::QuantumError;

pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the crc-qvae tools.
///
/// Every failure is fatal: the binaries print the message and exit nonzero.
/// There is no retry or partial-result handling anywhere in the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Consolidate(#[from] ConsolidateError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Quantum(#[from] QuantumError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
