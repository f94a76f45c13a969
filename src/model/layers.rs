//! Classical neural network layers over dual numbers.
//!
//! Layers keep their parameters as plain `f64` and build duals on each
//! forward pass. The `seed` argument selects at most one parameter (by index
//! local to the layer) to receive derivative 1; with the inputs carrying
//! their own dual parts, one seeded pass yields one exact partial
//! derivative.

use rand::rngs::StdRng;
use rand::Rng;

use crate::autodiff::Dual;

use super::{ModelError, ModelResult};

/// Base trait for classical layers.
pub trait Layer: std::fmt::Debug {
    /// Forward pass. `seed` is the local index of the parameter whose
    /// derivative channel is set to 1 for this pass, if any.
    fn forward(&self, input: &[Dual], seed: Option<usize>) -> ModelResult<Vec<Dual>>;

    /// The layer's trainable parameters, flat.
    fn parameters(&self) -> &[f64];

    /// Mutable access for the optimizer step.
    fn parameters_mut(&mut self) -> &mut [f64];

    fn parameter_count(&self) -> usize {
        self.parameters().len()
    }

    fn name(&self) -> &str;
}

/// Trainable affine transformation.
///
/// Parameters are stored weights-first, row-major `[input][output]`, with the
/// bias vector appended.
#[derive(Debug, Clone)]
pub struct LinearLayer {
    input_size: usize,
    output_size: usize,
    params: Vec<f64>,
    layer_name: String,
}

impl LinearLayer {
    /// Xavier-initialized layer: weights uniform in
    /// ±sqrt(6 / (fan_in + fan_out)), bias zero.
    pub fn new(input_size: usize, output_size: usize, rng: &mut StdRng) -> Self {
        let scale = (6.0 / (input_size + output_size) as f64).sqrt();
        let mut params: Vec<f64> = (0..input_size * output_size)
            .map(|_| (rng.gen::<f64>() - 0.5) * 2.0 * scale)
            .collect();
        params.extend(std::iter::repeat(0.0).take(output_size));

        Self {
            input_size,
            output_size,
            params,
            layer_name: format!("LinearLayer[{input_size}->{output_size}]"),
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    fn param_dual(&self, index: usize, seed: Option<usize>) -> Dual {
        let derivative = if seed == Some(index) { 1.0 } else { 0.0 };
        Dual::new(self.params[index], derivative)
    }
}

impl Layer for LinearLayer {
    fn forward(&self, input: &[Dual], seed: Option<usize>) -> ModelResult<Vec<Dual>> {
        if input.len() != self.input_size {
            return Err(ModelError::ShapeMismatch {
                expected: vec![self.input_size],
                actual: vec![input.len()],
            });
        }

        let bias_offset = self.input_size * self.output_size;
        let mut output = Vec::with_capacity(self.output_size);

        for o in 0..self.output_size {
            let mut sum = self.param_dual(bias_offset + o, seed);
            for (i, &x) in input.iter().enumerate() {
                sum = sum + x * self.param_dual(i * self.output_size + o, seed);
            }
            output.push(sum);
        }

        Ok(output)
    }

    fn parameters(&self) -> &[f64] {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut [f64] {
        &mut self.params
    }

    fn name(&self) -> &str {
        &self.layer_name
    }
}

/// Elementwise tanh activation.
#[derive(Debug, Clone)]
pub struct TanhLayer;

impl Layer for TanhLayer {
    fn forward(&self, input: &[Dual], _seed: Option<usize>) -> ModelResult<Vec<Dual>> {
        Ok(input.iter().map(|x| x.tanh()).collect())
    }

    fn parameters(&self) -> &[f64] {
        &[]
    }

    fn parameters_mut(&mut self) -> &mut [f64] {
        &mut []
    }

    fn name(&self) -> &str {
        "TanhLayer"
    }
}

/// Multiplies every element by a fixed factor. Used to stretch tanh outputs
/// to the rotation-angle range.
#[derive(Debug, Clone)]
pub struct ScaleLayer {
    pub factor: f64,
}

impl ScaleLayer {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl Layer for ScaleLayer {
    fn forward(&self, input: &[Dual], _seed: Option<usize>) -> ModelResult<Vec<Dual>> {
        let factor = Dual::constant(self.factor);
        Ok(input.iter().map(|&x| x * factor).collect())
    }

    fn parameters(&self) -> &[f64] {
        &[]
    }

    fn parameters_mut(&mut self) -> &mut [f64] {
        &mut []
    }

    fn name(&self) -> &str {
        "ScaleLayer"
    }
}

/// A chain of layers applied in order.
///
/// Parameter indices are flat across the chain in layer order, so one global
/// seed index addresses exactly one parameter of one layer.
#[derive(Debug)]
pub struct Sequential {
    layers: Vec<Box<dyn Layer>>,
}

impl Sequential {
    pub fn new(layers: Vec<Box<dyn Layer>>) -> Self {
        Self { layers }
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|l| l.parameter_count()).sum()
    }

    pub fn forward(&self, input: &[Dual], seed: Option<usize>) -> ModelResult<Vec<Dual>> {
        let mut current = input.to_vec();
        let mut offset = 0;

        for layer in &self.layers {
            let count = layer.parameter_count();
            let local_seed = seed
                .filter(|&s| s >= offset && s < offset + count)
                .map(|s| s - offset);
            current = layer.forward(&current, local_seed)?;
            offset += count;
        }

        Ok(current)
    }

    /// Forward pass on plain values, no derivative tracking.
    pub fn forward_values(&self, input: &[f64]) -> ModelResult<Vec<f64>> {
        let duals: Vec<Dual> = input.iter().map(|&x| Dual::constant(x)).collect();
        Ok(self.forward(&duals, None)?.iter().map(Dual::value).collect())
    }

    /// Apply one optimizer step, slicing the flat gradient vector across the
    /// chain's layers.
    pub fn apply_gradients(
        &mut self,
        gradients: &[f64],
        optimizer: &mut dyn super::Optimizer,
    ) -> ModelResult<()> {
        if gradients.len() != self.parameter_count() {
            return Err(ModelError::ShapeMismatch {
                expected: vec![self.parameter_count()],
                actual: vec![gradients.len()],
            });
        }

        let mut offset = 0;
        for layer in &mut self.layers {
            let count = layer.parameter_count();
            optimizer.step(layer.parameters_mut(), &gradients[offset..offset + count])?;
            offset += count;
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn nudge_parameter(&mut self, index: usize, delta: f64) {
        let mut offset = 0;
        for layer in &mut self.layers {
            let count = layer.parameter_count();
            if index < offset + count {
                layer.parameters_mut()[index - offset] += delta;
                return;
            }
            offset += count;
        }
        panic!("parameter index {index} out of range");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn linear_layer_shapes() {
        let layer = LinearLayer::new(3, 2, &mut rng());
        assert_eq!(layer.parameter_count(), 3 * 2 + 2);

        let input: Vec<Dual> = vec![Dual::constant(1.0); 3];
        let output = layer.forward(&input, None).unwrap();
        assert_eq!(output.len(), 2);

        let bad: Vec<Dual> = vec![Dual::constant(1.0); 4];
        assert!(matches!(
            layer.forward(&bad, None),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn seeded_pass_matches_finite_difference() {
        let mut layer = LinearLayer::new(2, 2, &mut rng());
        let input: Vec<Dual> = vec![Dual::constant(0.4), Dual::constant(-1.2)];

        for p in 0..layer.parameter_count() {
            let analytic = layer.forward(&input, Some(p)).unwrap();

            let eps = 1e-6;
            layer.parameters_mut()[p] += eps;
            let plus = layer.forward(&input, None).unwrap();
            layer.parameters_mut()[p] -= 2.0 * eps;
            let minus = layer.forward(&input, None).unwrap();
            layer.parameters_mut()[p] += eps;

            for o in 0..2 {
                let numeric = (plus[o].value() - minus[o].value()) / (2.0 * eps);
                assert!((analytic[o].derivative() - numeric).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn sequential_routes_seed_to_the_right_layer() {
        let mut r = rng();
        let chain = Sequential::new(vec![
            Box::new(LinearLayer::new(2, 2, &mut r)),
            Box::new(TanhLayer),
            Box::new(LinearLayer::new(2, 1, &mut r)),
        ]);
        assert_eq!(chain.parameter_count(), 6 + 3);

        let input: Vec<Dual> = vec![Dual::constant(0.3), Dual::constant(0.9)];

        // Seeding a second-layer parameter must leave the first layer constant:
        // the derivative still flows, and exactly one parameter drives it.
        let seeded = chain.forward(&input, Some(6)).unwrap();
        assert_eq!(seeded.len(), 1);

        let unseeded = chain.forward(&input, None).unwrap();
        assert_eq!(unseeded[0].derivative(), 0.0);
        assert_eq!(seeded[0].value(), unseeded[0].value());
    }

    #[test]
    fn scale_layer_applies_factor() {
        let layer = ScaleLayer::new(std::f64::consts::PI);
        let output = layer.forward(&[Dual::variable(1.0)], None).unwrap();
        assert!((output[0].value() - std::f64::consts::PI).abs() < 1e-12);
        assert!((output[0].derivative() - std::f64::consts::PI).abs() < 1e-12);
    }
}
