// tests/simulator_tests.rs
//! End-to-end training of the statevector classifier

use ndarray::{Array1, Array2, Array3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::PI;

use varq::circuit::{build_topology, Cnot, Gate};
use varq::error::{SimulatorError, TrainingError};
use varq::optimizer::{Adam, GradientDescent, GradientRule, GradientStep};
use varq::simulator::{StateVector, VariationalClassifier};
use varq::training::{LabeledData, Silent, Trainer, TrainingConfig};
use varq::Parameters;

/// Helper function for comparing f64 with tolerance
fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Points near 0 labelled +1, points near π labelled -1
fn separable_data() -> LabeledData {
    let xs = [0.1, 0.2, 0.3, PI - 0.1, PI - 0.2, PI - 0.3];
    let features = Array2::from_shape_vec((6, 1), xs.to_vec()).unwrap();
    let binary = Array1::from_vec(vec![1, 1, 1, 0, 0, 0]);
    LabeledData::from_binary_labels(features, &binary).unwrap()
}

/// Single-qubit parameters whose output is anti-correlated with the labels
fn inverted_params() -> Parameters {
    let mut params = Array3::zeros((1, 1, 3));
    params[[0, 0, 1]] = 2.5;
    params
}

#[test]
fn test_bell_state_from_rotations() {
    let mut state = StateVector::zero_state(2).unwrap();
    state
        .apply(&Gate::Rot {
            qubit: 1,
            phi: 0.0,
            theta: PI / 2.0,
            omega: 0.0,
        })
        .unwrap();
    state.apply(&Gate::Cnot(Cnot::new(1, 0))).unwrap();

    assert!(approx_eq(state.probability(0b00), 0.5, 1e-10));
    assert!(approx_eq(state.probability(0b11), 0.5, 1e-10));
    assert!(approx_eq(state.expectation_z(0).unwrap(), 0.0, 1e-10));
}

#[test]
fn test_full_batch_training_reduces_loss() {
    let classifier = VariationalClassifier::new(build_topology(1, 1).unwrap());
    let data = separable_data();
    let step = GradientStep::new(GradientDescent::new(0.2)).with_rule(GradientRule::ParameterShift);
    let mut rng = StdRng::seed_from_u64(0);
    let mut trainer = Trainer::new(TrainingConfig::full_batch(40)).with_observer(Silent);

    let run = trainer
        .train_on(&classifier, &step, &inverted_params(), &data, &mut rng)
        .unwrap();

    assert!(run.initial_value() > 2.0);
    assert!(run.final_value() < run.initial_value());
    assert!(run.final_value() < 1.0);
    assert_eq!(
        classifier
            .accuracy(&run.params, data.features(), data.labels())
            .unwrap(),
        1.0
    );
}

#[test]
fn test_tracked_executions_match_backend_count() {
    let classifier = VariationalClassifier::new(build_topology(1, 1).unwrap());
    let features = Array2::from_shape_vec((4, 1), vec![0.1, 0.2, 2.9, 3.0]).unwrap();
    let data = LabeledData::new(features, Array1::from_vec(vec![1.0, 1.0, -1.0, -1.0])).unwrap();

    let n_params = classifier.topology().parameter_count();
    let per_iteration =
        (GradientStep::<GradientDescent>::evaluations_per_step(n_params) + 1) * data.len() as u64;
    let config = TrainingConfig::full_batch(2).with_executions_per_iteration(per_iteration);
    let step = GradientStep::new(GradientDescent::new(0.1)).with_rule(GradientRule::ParameterShift);
    let mut rng = StdRng::seed_from_u64(0);
    let mut trainer = Trainer::new(config).with_observer(Silent);

    let run = trainer
        .train_on(&classifier, &step, &inverted_params(), &data, &mut rng)
        .unwrap();

    assert_eq!(run.executions.as_slice(), Some(&[0, 28, 56][..]));
    // the initial evaluation is not counted by the tracker
    assert_eq!(
        classifier.executions(),
        run.executions.last().unwrap() + data.len() as u64
    );
}

#[test]
fn test_seeded_mini_batch_runs_are_reproducible() {
    let topology = build_topology(2, 2).unwrap();
    let mut rng = StdRng::seed_from_u64(21);
    let init = topology.random_parameters(&mut rng);
    let classifier = VariationalClassifier::new(topology);

    let features = Array2::from_shape_fn((8, 2), |(i, j)| (i as f64 * 0.4) + j as f64 * 0.1);
    let labels = Array1::from_shape_fn(8, |i| if i < 4 { 1.0 } else { -1.0 });
    let data = LabeledData::new(features, labels).unwrap();

    let run_once = |seed: u64| {
        let step = GradientStep::new(Adam::with_learning_rate(0.05))
            .with_rule(GradientRule::ParameterShift);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut trainer = Trainer::new(TrainingConfig::mini_batch(3, 3)).with_observer(Silent);
        trainer
            .train_on(&classifier, &step, &init, &data, &mut rng)
            .unwrap()
    };

    let first = run_once(99);
    let second = run_once(99);

    assert_eq!(first.trajectory, second.trajectory);
    assert_eq!(first.params, second.params);
    assert_eq!(first.trajectory.len(), 4);
}

#[test]
fn test_backend_failure_is_upstream() {
    let classifier = VariationalClassifier::new(build_topology(2, 1).unwrap());
    let data = LabeledData::new(Array2::zeros((3, 3)), Array1::from_elem(3, 1.0)).unwrap();
    let step = GradientStep::new(GradientDescent::new(0.1));
    let init = classifier.topology().zero_parameters();
    let mut rng = StdRng::seed_from_u64(0);
    let mut trainer = Trainer::new(TrainingConfig::full_batch(3)).with_observer(Silent);

    let err = trainer
        .train_on(&classifier, &step, &init, &data, &mut rng)
        .unwrap_err();

    match err {
        TrainingError::Upstream(SimulatorError::TooManyFeatures { features, qubits }) => {
            assert_eq!(features, 3);
            assert_eq!(qubits, 2);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_wrong_parameter_shape_is_upstream() {
    let classifier = VariationalClassifier::new(build_topology(2, 2).unwrap());
    let data = LabeledData::new(Array2::zeros((2, 2)), Array1::from_elem(2, 1.0)).unwrap();
    let step = GradientStep::new(GradientDescent::new(0.1));
    let mut rng = StdRng::seed_from_u64(0);
    let mut trainer = Trainer::new(TrainingConfig::full_batch(3)).with_observer(Silent);

    let err = trainer
        .train_on(&classifier, &step, &Array3::zeros((1, 2, 3)), &data, &mut rng)
        .unwrap_err();
    assert!(matches!(
        err.into_upstream(),
        Some(SimulatorError::Topology(_))
    ));
}
