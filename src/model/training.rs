//! Training loop: one full pass over the dataset per epoch, full-batch
//! gradient averaging, one loss line per epoch on stdout.

use super::autoencoder::Autoencoder;
use super::losses::{LossFunction, MseLoss};
use super::optimizer::{Optimizer, Sgd};
use super::quantum_layer::LatentCircuit;
use super::{ModelError, ModelResult};

/// Training configuration.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    /// Print one loss line per epoch to stdout.
    pub print_progress: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 30,
            learning_rate: 0.05,
            print_progress: true,
        }
    }
}

/// Training results and statistics.
#[derive(Debug, Clone)]
pub struct TrainingResult {
    pub final_loss: f64,
    pub epochs_completed: usize,
    pub loss_history: Vec<f64>,
}

pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new() -> Self {
        Self {
            config: TrainingConfig::default(),
        }
    }

    pub fn with_config(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Train the model. No early stopping, no validation split; a non-finite
    /// epoch loss aborts the run.
    pub fn train<C: LatentCircuit>(
        &self,
        model: &mut Autoencoder<C>,
        data: &[Vec<f64>],
        loss_fn: &dyn LossFunction,
        optimizer: &mut dyn Optimizer,
    ) -> ModelResult<TrainingResult> {
        if data.is_empty() {
            return Err(ModelError::Training {
                reason: "training data is empty".to_string(),
            });
        }

        // Every row must match the model width before the first epoch runs.
        for row in data {
            if row.len() != model.features() {
                return Err(ModelError::ShapeMismatch {
                    expected: vec![model.features()],
                    actual: vec![row.len()],
                });
            }
        }

        let mut loss_history = Vec::with_capacity(self.config.epochs);
        let mut final_loss = 0.0;

        for epoch in 0..self.config.epochs {
            let mut total = model.zero_gradients();
            let mut epoch_loss = 0.0;

            for sample in data {
                let (loss, grads) = model.gradients(sample, loss_fn)?;
                epoch_loss += loss;
                total.add_assign(&grads);
            }

            let n = data.len() as f64;
            epoch_loss /= n;
            total.scale(1.0 / n);

            if !epoch_loss.is_finite() {
                return Err(ModelError::Diverged { epoch: epoch + 1 });
            }

            model.apply_gradients(&total, optimizer)?;

            final_loss = epoch_loss;
            loss_history.push(epoch_loss);

            if self.config.print_progress {
                println!(
                    "Epoch {}/{}: Loss = {:.6}",
                    epoch + 1,
                    self.config.epochs,
                    epoch_loss
                );
            }
        }

        Ok(TrainingResult {
            final_loss,
            epochs_completed: self.config.epochs,
            loss_history,
        })
    }

    /// Train with the default MSE loss and SGD optimizer.
    pub fn train_simple<C: LatentCircuit>(
        &self,
        model: &mut Autoencoder<C>,
        data: &[Vec<f64>],
    ) -> ModelResult<TrainingResult> {
        let loss_fn = MseLoss;
        let mut optimizer = Sgd::new(self.config.learning_rate);
        self.train(model, data, &loss_fn, &mut optimizer)
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}
