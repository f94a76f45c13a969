//! Seeded synthetic feature generation for trainer runs without a CSV.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draw one standard normal via Box-Muller.
fn randn(rng: &mut StdRng) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>(); // in (0, 1], keeps ln defined
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Generate `n_samples` feature vectors of the given width.
///
/// The data is low-rank (two latent factors mixed through random loadings)
/// plus small noise, so an autoencoder with a narrow latent actually has
/// structure to learn. Fully determined by the seed.
pub fn synthetic_features(n_samples: usize, width: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    const RANK: usize = 2;

    let loadings: Vec<Vec<f64>> = (0..RANK)
        .map(|_| (0..width).map(|_| randn(&mut rng)).collect())
        .collect();

    (0..n_samples)
        .map(|_| {
            let factors: Vec<f64> = (0..RANK).map(|_| randn(&mut rng)).collect();
            (0..width)
                .map(|i| {
                    let signal: f64 = (0..RANK).map(|r| factors[r] * loadings[r][i]).sum();
                    0.5 * signal + 0.05 * randn(&mut rng)
                })
                .collect()
        })
        .collect()
}
