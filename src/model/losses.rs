//! Loss functions with automatic differentiation support.

use crate::autodiff::Dual;

use super::{ModelError, ModelResult};

/// Base trait for loss functions. The prediction carries dual parts so the
/// returned loss exposes its derivative with respect to whatever was seeded.
pub trait LossFunction: std::fmt::Debug {
    fn loss(&self, prediction: &[Dual], target: &[f64]) -> ModelResult<Dual>;
}

/// Mean squared error: (1/n) * Σ (prediction - target)².
#[derive(Debug, Clone)]
pub struct MseLoss;

impl LossFunction for MseLoss {
    fn loss(&self, prediction: &[Dual], target: &[f64]) -> ModelResult<Dual> {
        if prediction.len() != target.len() {
            return Err(ModelError::ShapeMismatch {
                expected: vec![target.len()],
                actual: vec![prediction.len()],
            });
        }
        if prediction.is_empty() {
            return Err(ModelError::Training {
                reason: "cannot compute loss of an empty vector".to_string(),
            });
        }

        let mut sum = Dual::constant(0.0);
        for (p, &t) in prediction.iter().zip(target.iter()) {
            let diff = *p - Dual::constant(t);
            sum = sum + diff * diff;
        }

        Ok(sum / Dual::constant(prediction.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mse_value() {
        let prediction = vec![Dual::constant(1.0), Dual::constant(3.0)];
        let target = vec![0.0, 1.0];
        let loss = MseLoss.loss(&prediction, &target).unwrap();
        // ((1)^2 + (2)^2) / 2 = 2.5
        assert!((loss.value() - 2.5).abs() < 1e-12);
        assert_eq!(loss.derivative(), 0.0);
    }

    #[test]
    fn mse_derivative_flows_through_seeded_prediction() {
        // d/dp (p - t)^2 / 1 = 2 (p - t)
        let prediction = vec![Dual::variable(2.0)];
        let target = vec![0.5];
        let loss = MseLoss.loss(&prediction, &target).unwrap();
        assert!((loss.derivative() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn mse_rejects_width_mismatch() {
        let prediction = vec![Dual::constant(1.0)];
        assert!(matches!(
            MseLoss.loss(&prediction, &[1.0, 2.0]),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }
}
