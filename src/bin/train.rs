//! Train the hybrid quantum-classical autoencoder on a consolidated table
//! or on seeded synthetic data.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crc_qvae::model::{
    synthetic_features, Autoencoder, Dataset, ModelConfig, ModelError, Trainer, TrainingConfig,
};

#[derive(Parser)]
#[command(name = "train")]
#[command(about = "Train a hybrid quantum-classical autoencoder")]
#[command(version)]
struct Cli {
    /// Number of training epochs
    #[arg(long, default_value_t = 30)]
    epochs: usize,

    /// Consolidated CSV to train on; synthetic data is generated when absent
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Expected input feature width
    #[arg(long, default_value_t = 8)]
    features: usize,

    /// Qubit count of the variational circuit (also the latent width)
    #[arg(long, default_value_t = 4)]
    qubits: usize,

    /// Number of variational layers
    #[arg(long, default_value_t = 2)]
    depth: usize,

    /// Hidden width of the decoder
    #[arg(long, default_value_t = 8)]
    hidden: usize,

    /// SGD learning rate
    #[arg(long, default_value_t = 0.05)]
    learning_rate: f64,

    /// Sample count for synthetic data
    #[arg(long, default_value_t = 64)]
    samples: usize,

    /// RNG seed for weight initialization and synthetic data
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> crc_qvae::Result<()> {
    let data: Vec<Vec<f64>> = match &cli.csv {
        Some(path) => {
            let mut dataset = Dataset::from_csv(path)?;
            if dataset.width != cli.features {
                return Err(ModelError::ShapeMismatch {
                    expected: vec![cli.features],
                    actual: vec![dataset.width],
                }
                .into());
            }
            dataset.standardize();
            info!(
                samples = dataset.len(),
                width = dataset.width,
                path = %path.display(),
                "loaded consolidated table"
            );
            dataset.features
        }
        None => {
            info!(
                samples = cli.samples,
                width = cli.features,
                seed = cli.seed,
                "generating synthetic data"
            );
            synthetic_features(cli.samples, cli.features, cli.seed)
        }
    };

    let config = ModelConfig {
        features: cli.features,
        n_qubits: cli.qubits,
        depth: cli.depth,
        hidden: cli.hidden,
    };
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut model = Autoencoder::new(&config, &mut rng)?;
    info!(
        parameters = model.parameter_count(),
        latent = model.latent_width(),
        "model constructed"
    );

    let trainer = Trainer::with_config(TrainingConfig {
        epochs: cli.epochs,
        learning_rate: cli.learning_rate,
        print_progress: true,
    });
    let result = trainer.train_simple(&mut model, &data)?;

    info!(
        final_loss = result.final_loss,
        epochs = result.epochs_completed,
        "training finished"
    );
    Ok(())
}
