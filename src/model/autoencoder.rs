//! The hybrid autoencoder: classical encoder, quantum latent map, classical
//! decoder, and exact gradient assembly across the three.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::Rng;

use crate::autodiff::Dual;
use crate::quantum::VariationalCircuit;

use super::layers::{LinearLayer, ScaleLayer, Sequential, TanhLayer};
use super::losses::LossFunction;
use super::optimizer::Optimizer;
use super::quantum_layer::LatentCircuit;
use super::{ModelError, ModelResult};

/// Model hyperparameters.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Expected input feature width.
    pub features: usize,
    /// Qubit count; also the latent width.
    pub n_qubits: usize,
    /// Number of variational layers in the circuit.
    pub depth: usize,
    /// Hidden width of the decoder.
    pub hidden: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            features: 8,
            n_qubits: 4,
            depth: 2,
            hidden: 8,
        }
    }
}

impl ModelConfig {
    fn validate(&self) -> ModelResult<()> {
        if self.features == 0 || self.hidden == 0 {
            return Err(ModelError::InvalidLayer {
                reason: "feature and hidden widths must be positive".to_string(),
            });
        }
        if self.n_qubits == 0 || self.n_qubits > 12 {
            return Err(ModelError::InvalidLayer {
                reason: format!("invalid qubit count {}: must be between 1 and 12", self.n_qubits),
            });
        }
        if self.depth == 0 || self.depth > 8 {
            return Err(ModelError::InvalidLayer {
                reason: format!("invalid circuit depth {}: must be between 1 and 8", self.depth),
            });
        }
        Ok(())
    }
}

/// Gradient of the loss with respect to every trainable parameter, grouped
/// by model section.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub encoder: Vec<f64>,
    pub circuit: Vec<f64>,
    pub decoder: Vec<f64>,
}

impl Gradients {
    fn zeros(encoder: usize, circuit: usize, decoder: usize) -> Self {
        Self {
            encoder: vec![0.0; encoder],
            circuit: vec![0.0; circuit],
            decoder: vec![0.0; decoder],
        }
    }

    pub fn add_assign(&mut self, other: &Gradients) {
        for (a, b) in self.encoder.iter_mut().zip(other.encoder.iter()) {
            *a += b;
        }
        for (a, b) in self.circuit.iter_mut().zip(other.circuit.iter()) {
            *a += b;
        }
        for (a, b) in self.decoder.iter_mut().zip(other.decoder.iter()) {
            *a += b;
        }
    }

    pub fn scale(&mut self, factor: f64) {
        for g in self
            .encoder
            .iter_mut()
            .chain(self.circuit.iter_mut())
            .chain(self.decoder.iter_mut())
        {
            *g *= factor;
        }
    }
}

/// Encoder → variational circuit → decoder.
#[derive(Debug)]
pub struct Autoencoder<C: LatentCircuit> {
    encoder: Sequential,
    circuit: C,
    circuit_params: Vec<f64>,
    decoder: Sequential,
    features: usize,
}

impl Autoencoder<VariationalCircuit> {
    /// Build the standard model: linear + tanh encoder scaled to rotation
    /// angles, a hardware-efficient circuit, and a two-layer decoder.
    pub fn new(config: &ModelConfig, rng: &mut StdRng) -> ModelResult<Self> {
        config.validate()?;
        let circuit = VariationalCircuit::hardware_efficient(config.n_qubits, config.depth);
        Self::with_circuit(config, circuit, rng)
    }
}

impl<C: LatentCircuit> Autoencoder<C> {
    /// Build the model around an arbitrary latent circuit. The encoder output
    /// width follows the circuit's input arity.
    pub fn with_circuit(config: &ModelConfig, circuit: C, rng: &mut StdRng) -> ModelResult<Self> {
        config.validate()?;
        if circuit.n_inputs() == 0 || circuit.latent_width() == 0 {
            return Err(ModelError::InvalidLayer {
                reason: "latent circuit must consume at least one angle and emit at least one value"
                    .to_string(),
            });
        }

        let encoder = Sequential::new(vec![
            Box::new(LinearLayer::new(config.features, circuit.n_inputs(), rng)),
            Box::new(TanhLayer),
            Box::new(ScaleLayer::new(PI)),
        ]);

        let circuit_params: Vec<f64> = (0..circuit.n_parameters())
            .map(|_| (rng.gen::<f64>() - 0.5) * 2.0 * PI)
            .collect();

        let decoder = Sequential::new(vec![
            Box::new(LinearLayer::new(circuit.latent_width(), config.hidden, rng)),
            Box::new(TanhLayer),
            Box::new(LinearLayer::new(config.hidden, config.features, rng)),
        ]);

        Ok(Self {
            encoder,
            circuit,
            circuit_params,
            decoder,
            features: config.features,
        })
    }

    pub fn features(&self) -> usize {
        self.features
    }

    pub fn latent_width(&self) -> usize {
        self.circuit.latent_width()
    }

    pub fn parameter_count(&self) -> usize {
        self.encoder.parameter_count() + self.circuit_params.len() + self.decoder.parameter_count()
    }

    fn check_width(&self, sample: &[f64]) -> ModelResult<()> {
        if sample.len() != self.features {
            return Err(ModelError::ShapeMismatch {
                expected: vec![self.features],
                actual: vec![sample.len()],
            });
        }
        Ok(())
    }

    /// Encode one sample into its latent representation.
    pub fn encode(&self, sample: &[f64]) -> ModelResult<Vec<f64>> {
        self.check_width(sample)?;
        let angles = self.encoder.forward_values(sample)?;
        self.circuit.forward(&angles, &self.circuit_params)
    }

    /// Full reconstruction of one sample.
    pub fn reconstruct(&self, sample: &[f64]) -> ModelResult<Vec<f64>> {
        let latent = self.encode(sample)?;
        self.decoder.forward_values(&latent)
    }

    /// Reconstruction loss of one sample.
    pub fn loss(&self, sample: &[f64], loss_fn: &dyn LossFunction) -> ModelResult<f64> {
        let reconstruction = self.reconstruct(sample)?;
        let duals: Vec<Dual> = reconstruction.iter().map(|&v| Dual::constant(v)).collect();
        Ok(loss_fn.loss(&duals, sample)?.value())
    }

    /// Loss and its gradient for one sample.
    ///
    /// Classical parameters use one seeded dual pass each; quantum angles use
    /// the parameter-shift jacobians chained with dL/d(latent), itself
    /// obtained by seeding latent components through the decoder.
    pub fn gradients(
        &self,
        sample: &[f64],
        loss_fn: &dyn LossFunction,
    ) -> ModelResult<(f64, Gradients)> {
        self.check_width(sample)?;

        let sample_duals: Vec<Dual> = sample.iter().map(|&v| Dual::constant(v)).collect();
        let angles: Vec<f64> = self
            .encoder
            .forward(&sample_duals, None)?
            .iter()
            .map(Dual::value)
            .collect();
        let latent = self.circuit.forward(&angles, &self.circuit_params)?;

        let mut grads = Gradients::zeros(
            self.encoder.parameter_count(),
            self.circuit_params.len(),
            self.decoder.parameter_count(),
        );

        // dL/dz_k: seed one latent component per decoder pass.
        let mut loss_value = 0.0;
        let mut d_loss_d_latent = vec![0.0; latent.len()];
        for k in 0..latent.len() {
            let seeded: Vec<Dual> = latent
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    if i == k {
                        Dual::variable(v)
                    } else {
                        Dual::constant(v)
                    }
                })
                .collect();
            let reconstruction = self.decoder.forward(&seeded, None)?;
            let loss = loss_fn.loss(&reconstruction, sample)?;
            loss_value = loss.value();
            d_loss_d_latent[k] = loss.derivative();
        }

        // Decoder parameters: latent held constant, one seed per parameter.
        let latent_duals: Vec<Dual> = latent.iter().map(|&v| Dual::constant(v)).collect();
        for p in 0..grads.decoder.len() {
            let reconstruction = self.decoder.forward(&latent_duals, Some(p))?;
            grads.decoder[p] = loss_fn.loss(&reconstruction, sample)?.derivative();
        }

        // Quantum angles: parameter-shift jacobian chained with dL/dz.
        let param_jacobian = self.circuit.param_jacobian(&angles, &self.circuit_params)?;
        for (j, row) in param_jacobian.iter().enumerate() {
            grads.circuit[j] = row
                .iter()
                .zip(d_loss_d_latent.iter())
                .map(|(dz, dl)| dz * dl)
                .sum();
        }

        // Encoder parameters: dL/d(angle) from the input-shift jacobian, then
        // one seeded encoder pass per parameter for d(angle)/dθ.
        let input_jacobian = self.circuit.input_jacobian(&angles, &self.circuit_params)?;
        let d_loss_d_angle: Vec<f64> = input_jacobian
            .iter()
            .map(|row| {
                row.iter()
                    .zip(d_loss_d_latent.iter())
                    .map(|(dz, dl)| dz * dl)
                    .sum()
            })
            .collect();
        for p in 0..grads.encoder.len() {
            let angle_duals = self.encoder.forward(&sample_duals, Some(p))?;
            grads.encoder[p] = angle_duals
                .iter()
                .zip(d_loss_d_angle.iter())
                .map(|(a, dl)| a.derivative() * dl)
                .sum();
        }

        Ok((loss_value, grads))
    }

    pub fn zero_gradients(&self) -> Gradients {
        Gradients::zeros(
            self.encoder.parameter_count(),
            self.circuit_params.len(),
            self.decoder.parameter_count(),
        )
    }

    /// One optimizer step over all three parameter groups.
    pub fn apply_gradients(
        &mut self,
        gradients: &Gradients,
        optimizer: &mut dyn Optimizer,
    ) -> ModelResult<()> {
        self.encoder.apply_gradients(&gradients.encoder, optimizer)?;
        optimizer.step(&mut self.circuit_params, &gradients.circuit)?;
        self.decoder.apply_gradients(&gradients.decoder, optimizer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::losses::MseLoss;
    use rand::SeedableRng;

    fn small_config() -> ModelConfig {
        ModelConfig {
            features: 4,
            n_qubits: 2,
            depth: 1,
            hidden: 3,
        }
    }

    #[test]
    fn reconstruction_has_input_width() {
        let mut rng = StdRng::seed_from_u64(3);
        let model = Autoencoder::new(&small_config(), &mut rng).unwrap();
        let sample = [0.1, -0.4, 0.9, 0.2];
        let reconstruction = model.reconstruct(&sample).unwrap();
        assert_eq!(reconstruction.len(), 4);
        assert_eq!(model.encode(&sample).unwrap().len(), 2);
    }

    #[test]
    fn rejects_wrong_input_width() {
        let mut rng = StdRng::seed_from_u64(3);
        let model = Autoencoder::new(&small_config(), &mut rng).unwrap();
        assert!(matches!(
            model.reconstruct(&[1.0, 2.0]),
            Err(ModelError::ShapeMismatch { expected, actual })
                if expected == vec![4] && actual == vec![2]
        ));
    }

    #[test]
    fn rejects_degenerate_configs() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut config = small_config();
        config.n_qubits = 0;
        assert!(Autoencoder::new(&config, &mut rng).is_err());
        config.n_qubits = 2;
        config.depth = 0;
        assert!(Autoencoder::new(&config, &mut rng).is_err());
    }

    #[test]
    fn gradients_match_finite_differences() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut model = Autoencoder::new(&small_config(), &mut rng).unwrap();
        let sample = [0.6, -0.3, 0.1, 0.8];
        let loss_fn = MseLoss;

        let (loss_value, grads) = model.gradients(&sample, &loss_fn).unwrap();
        assert!((loss_value - model.loss(&sample, &loss_fn).unwrap()).abs() < 1e-12);

        let eps = 1e-5;

        for j in 0..grads.circuit.len() {
            model.circuit_params[j] += eps;
            let plus = model.loss(&sample, &loss_fn).unwrap();
            model.circuit_params[j] -= 2.0 * eps;
            let minus = model.loss(&sample, &loss_fn).unwrap();
            model.circuit_params[j] += eps;

            let numeric = (plus - minus) / (2.0 * eps);
            assert!(
                (grads.circuit[j] - numeric).abs() < 1e-5,
                "circuit param {j}: analytic {} vs numeric {numeric}",
                grads.circuit[j]
            );
        }

        for p in 0..grads.encoder.len() {
            model.encoder.nudge_parameter(p, eps);
            let plus = model.loss(&sample, &loss_fn).unwrap();
            model.encoder.nudge_parameter(p, -2.0 * eps);
            let minus = model.loss(&sample, &loss_fn).unwrap();
            model.encoder.nudge_parameter(p, eps);

            let numeric = (plus - minus) / (2.0 * eps);
            assert!(
                (grads.encoder[p] - numeric).abs() < 1e-5,
                "encoder param {p}: analytic {} vs numeric {numeric}",
                grads.encoder[p]
            );
        }

        for p in 0..grads.decoder.len() {
            model.decoder.nudge_parameter(p, eps);
            let plus = model.loss(&sample, &loss_fn).unwrap();
            model.decoder.nudge_parameter(p, -2.0 * eps);
            let minus = model.loss(&sample, &loss_fn).unwrap();
            model.decoder.nudge_parameter(p, eps);

            let numeric = (plus - minus) / (2.0 * eps);
            assert!(
                (grads.decoder[p] - numeric).abs() < 1e-5,
                "decoder param {p}: analytic {} vs numeric {numeric}",
                grads.decoder[p]
            );
        }
    }

    /// Stand-in latent map with analytic derivatives: z_k = cos(a_k + θ_k).
    #[derive(Debug)]
    struct CosineStub {
        width: usize,
    }

    impl LatentCircuit for CosineStub {
        fn n_inputs(&self) -> usize {
            self.width
        }

        fn n_parameters(&self) -> usize {
            self.width
        }

        fn latent_width(&self) -> usize {
            self.width
        }

        fn forward(&self, angles: &[f64], params: &[f64]) -> ModelResult<Vec<f64>> {
            Ok(angles
                .iter()
                .zip(params.iter())
                .map(|(a, p)| (a + p).cos())
                .collect())
        }

        fn param_jacobian(&self, angles: &[f64], params: &[f64]) -> ModelResult<Vec<Vec<f64>>> {
            Ok((0..self.width)
                .map(|j| {
                    (0..self.width)
                        .map(|k| {
                            if j == k {
                                -(angles[j] + params[j]).sin()
                            } else {
                                0.0
                            }
                        })
                        .collect()
                })
                .collect())
        }

        fn input_jacobian(&self, angles: &[f64], params: &[f64]) -> ModelResult<Vec<Vec<f64>>> {
            self.param_jacobian(angles, params)
        }
    }

    #[test]
    fn gradient_assembly_works_against_a_stub_backend() {
        let mut rng = StdRng::seed_from_u64(41);
        let mut model =
            Autoencoder::with_circuit(&small_config(), CosineStub { width: 2 }, &mut rng).unwrap();
        let sample = [0.3, -0.7, 0.2, 0.5];
        let loss_fn = MseLoss;

        let (_, grads) = model.gradients(&sample, &loss_fn).unwrap();

        let eps = 1e-5;
        for j in 0..grads.circuit.len() {
            model.circuit_params[j] += eps;
            let plus = model.loss(&sample, &loss_fn).unwrap();
            model.circuit_params[j] -= 2.0 * eps;
            let minus = model.loss(&sample, &loss_fn).unwrap();
            model.circuit_params[j] += eps;

            let numeric = (plus - minus) / (2.0 * eps);
            assert!((grads.circuit[j] - numeric).abs() < 1e-5);
        }

        for p in 0..grads.encoder.len() {
            model.encoder.nudge_parameter(p, eps);
            let plus = model.loss(&sample, &loss_fn).unwrap();
            model.encoder.nudge_parameter(p, -2.0 * eps);
            let minus = model.loss(&sample, &loss_fn).unwrap();
            model.encoder.nudge_parameter(p, eps);

            let numeric = (plus - minus) / (2.0 * eps);
            assert!((grads.encoder[p] - numeric).abs() < 1e-5);
        }
    }

    #[test]
    fn gradient_step_reduces_loss() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut model = Autoencoder::new(&small_config(), &mut rng).unwrap();
        let sample = [0.5, 0.5, -0.5, 0.25];
        let loss_fn = MseLoss;

        let before = model.loss(&sample, &loss_fn).unwrap();
        let (_, grads) = model.gradients(&sample, &loss_fn).unwrap();
        let mut sgd = crate::model::Sgd::new(0.01);
        model.apply_gradients(&grads, &mut sgd).unwrap();
        let after = model.loss(&sample, &loss_fn).unwrap();

        assert!(after <= before + 1e-9, "loss went up: {before} -> {after}");
    }
}
