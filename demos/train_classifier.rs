use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::f64::consts::PI;
use std::time::Instant;

use varq::prelude::*;
use varq::training::LabeledData;

// ===========================================
// CONFIGURABLE PARAMETERS
// ===========================================

const N_SAMPLES: usize = 40; // Samples in the synthetic dataset
const N_QUBITS: usize = 2; // One feature per qubit
const N_LAYERS: usize = 2; // Ansatz depth
const TEST_RATIO: f64 = 0.25; // Share of samples held out for evaluation
const SEED: u64 = 7;

fn default_config() -> TrainingConfig {
    TrainingConfig::mini_batch(25, 8)
        .with_early_stopping(1e-4)
        .with_progress_interval(5)
}

/// Two noisy blobs, one around (0.5, 0.5) and one around (2.6, 2.6)
fn make_dataset(rng: &mut StdRng) -> Result<LabeledData, Box<dyn Error>> {
    let mut features = Array2::zeros((N_SAMPLES, N_QUBITS));
    let mut binary = Array1::zeros(N_SAMPLES);

    for i in 0..N_SAMPLES {
        let class = (i % 2) as i64;
        let centre = if class == 1 { 0.5 } else { PI - 0.5 };
        for j in 0..N_QUBITS {
            features[[i, j]] = centre + rng.gen_range(-0.4..0.4);
        }
        binary[i] = class;
    }

    Ok(LabeledData::from_binary_labels(features, &binary)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("varq=info".parse()?))
        .init();

    // A JSON config may be given as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => TrainingConfig::from_json_file(path)?,
        None => default_config(),
    };

    println!("========================================================");
    println!("  Variational classifier: {} qubits, {} layers", N_QUBITS, N_LAYERS);
    println!("========================================================");

    let mut rng = StdRng::seed_from_u64(SEED);
    let data = make_dataset(&mut rng)?;
    let (train, test) = data.train_test_split(TEST_RATIO, &mut rng)?;
    println!("Training samples: {}, test samples: {}", train.len(), test.len());

    let topology = build_topology(N_QUBITS, N_LAYERS)?;
    for (index, layer) in topology.layers().iter().enumerate() {
        let entanglers: Vec<String> = layer.entanglers.iter().map(|c| c.to_string()).collect();
        println!("Layer {}: {} rotations, {}", index, layer.rotations.len(), entanglers.join(", "));
    }

    let init = topology.random_parameters(&mut rng);
    let classifier = VariationalClassifier::new(topology);
    let step = GradientStep::new(Adam::with_learning_rate(0.1)).with_rule(GradientRule::ParameterShift);

    let before = classifier.accuracy(&init, test.features(), test.labels())?;

    let start = Instant::now();
    let mut trainer = Trainer::new(config);
    let run = trainer.train_on(&classifier, &step, &init, &train, &mut rng)?;
    let elapsed = start.elapsed();

    let after = classifier.accuracy(&run.params, test.features(), test.labels())?;

    println!();
    println!("Finished after {} iterations in {:.2?} ({:?})", run.iterations_run, elapsed, run.termination);
    println!("Circuit executions: {}", classifier.executions());
    println!("Test accuracy: {:.1}% -> {:.1}%", before * 100.0, after * 100.0);
    match run.summary().improvement_percent() {
        Ok(percent) => println!("Loss improvement: {:.2}%", percent),
        Err(undefined) => println!("Loss improvement: {}", undefined),
    }
    println!();
    println!("{}", run.history().to_json()?);

    Ok(())
}
