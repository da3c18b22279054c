//! Optimizers usable as the driver's step function
//!
//! An [`Optimizer`] only knows how to apply gradients. [`GradientStep`] pairs
//! it with a [`GradientRule`] that estimates gradients from the cost closure,
//! which turns it into a [`StepFunction`] for any cost error type.

use std::f64::consts::FRAC_PI_2;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::training::objective::{CostClosure, StepFunction};
use crate::Parameters;

/// Trait for optimization algorithms
pub trait Optimizer: Send + Sync {
    /// Update parameters using gradients
    fn update(&self, parameters: &mut [f64], gradients: &[f64]);

    /// Reset the optimizer's internal state
    fn reset(&mut self);
}

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Plain gradient descent with a fixed learning rate
#[derive(Debug, Clone)]
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    pub fn new(learning_rate: f64) -> Self {
        GradientDescent { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    fn update(&self, parameters: &mut [f64], gradients: &[f64]) {
        assert_eq!(parameters.len(), gradients.len(), "Parameter and gradient dimensions must match");
        for (param, grad) in parameters.iter_mut().zip(gradients.iter()) {
            *param -= self.learning_rate * grad;
        }
    }

    fn reset(&mut self) {}
}

/// Gradient descent with momentum
#[derive(Debug)]
pub struct Momentum {
    learning_rate: f64,
    momentum: f64,
    velocity: Mutex<Vec<f64>>,
}

impl Momentum {
    pub fn new(learning_rate: f64, momentum: f64) -> Self {
        Momentum {
            learning_rate,
            momentum,
            velocity: Mutex::new(Vec::new()),
        }
    }
}

impl Optimizer for Momentum {
    fn update(&self, parameters: &mut [f64], gradients: &[f64]) {
        assert_eq!(parameters.len(), gradients.len(), "Parameter and gradient dimensions must match");
        let mut velocity = lock(&self.velocity);

        if velocity.len() != parameters.len() {
            *velocity = vec![0.0; parameters.len()];
        }

        for ((param, grad), v) in parameters
            .iter_mut()
            .zip(gradients.iter())
            .zip(velocity.iter_mut())
        {
            *v = self.momentum * *v - self.learning_rate * grad;
            *param += *v;
        }
    }

    fn reset(&mut self) {
        lock(&self.velocity).clear();
    }
}

#[derive(Debug, Default)]
struct Moments {
    m: Vec<f64>,
    v: Vec<f64>,
    t: i32,
}

/// Adaptive Moment Estimation (Adam)
#[derive(Debug)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    moments: Mutex<Moments>,
}

impl Adam {
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            moments: Mutex::new(Moments::default()),
        }
    }

    /// Adam with the usual `beta1 = 0.9`, `beta2 = 0.999`, `epsilon = 1e-8`
    pub fn with_learning_rate(learning_rate: f64) -> Self {
        Adam::new(learning_rate, 0.9, 0.999, 1e-8)
    }
}

impl Default for Adam {
    fn default() -> Self {
        Adam::with_learning_rate(0.001)
    }
}

impl Optimizer for Adam {
    fn update(&self, parameters: &mut [f64], gradients: &[f64]) {
        let n = parameters.len();
        assert_eq!(n, gradients.len(), "Parameter and gradient dimensions must match");
        let mut moments = lock(&self.moments);

        if moments.m.len() != n {
            *moments = Moments {
                m: vec![0.0; n],
                v: vec![0.0; n],
                t: 0,
            };
        }

        moments.t += 1;
        let t = moments.t;
        let bias1 = 1.0 - self.beta1.powi(t);
        let bias2 = 1.0 - self.beta2.powi(t);

        for i in 0..n {
            let g = gradients[i];
            moments.m[i] = self.beta1 * moments.m[i] + (1.0 - self.beta1) * g;
            moments.v[i] = self.beta2 * moments.v[i] + (1.0 - self.beta2) * g * g;

            let m_hat = moments.m[i] / bias1;
            let v_hat = moments.v[i] / bias2;
            parameters[i] -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }

    fn reset(&mut self) {
        *lock(&self.moments) = Moments::default();
    }
}

/// How gradients are estimated from cost evaluations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientRule {
    /// `(f(x + h) - f(x - h)) / 2h`
    CentralDifference { h: f64 },
    /// `(f(x + π/2) - f(x - π/2)) / 2`, exact for Pauli-rotation angles
    ParameterShift,
}

impl Default for GradientRule {
    fn default() -> Self {
        GradientRule::CentralDifference { h: 1e-6 }
    }
}

impl GradientRule {
    fn shift_and_scale(&self) -> (f64, f64) {
        match *self {
            GradientRule::CentralDifference { h } => (h, 2.0 * h),
            GradientRule::ParameterShift => (FRAC_PI_2, 2.0),
        }
    }

    /// Gradient of `cost` at `params`, in the logical order of `params`
    pub fn gradient<E>(&self, cost: &CostClosure<'_, E>, params: &Parameters) -> Result<Vec<f64>, E> {
        let (shift, scale) = self.shift_and_scale();
        let mut shifted = params.clone();
        let mut gradients = Vec::with_capacity(params.len());

        for (index, &value) in params.indexed_iter() {
            let index = [index.0, index.1, index.2];

            shifted[index] = value + shift;
            let forward = cost(&shifted)?;
            shifted[index] = value - shift;
            let backward = cost(&shifted)?;
            shifted[index] = value;

            gradients.push((forward - backward) / scale);
        }

        Ok(gradients)
    }
}

/// Step function that applies an [`Optimizer`] to estimated gradients
#[derive(Debug)]
pub struct GradientStep<O> {
    optimizer: O,
    rule: GradientRule,
}

impl<O: Optimizer> GradientStep<O> {
    pub fn new(optimizer: O) -> Self {
        GradientStep {
            optimizer,
            rule: GradientRule::default(),
        }
    }

    pub fn with_rule(mut self, rule: GradientRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn rule(&self) -> GradientRule {
        self.rule
    }

    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    /// Clears the optimizer's accumulated state before a fresh run
    pub fn reset(&mut self) {
        self.optimizer.reset();
    }

    /// Cost evaluations performed by one step over `n_params` parameters
    pub fn evaluations_per_step(n_params: usize) -> u64 {
        2 * n_params as u64
    }
}

impl<O: Optimizer, E> StepFunction<E> for GradientStep<O> {
    fn step(&self, cost: &CostClosure<'_, E>, params: &Parameters) -> Result<Parameters, E> {
        let gradients = self.rule.gradient(cost, params)?;

        let mut flat: Vec<f64> = params.iter().copied().collect();
        self.optimizer.update(&mut flat, &gradients);

        let mut next = params.clone();
        next.iter_mut().zip(flat).for_each(|(p, v)| *p = v);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use std::convert::Infallible;

    fn quadratic(params: &Parameters) -> Result<f64, Infallible> {
        Ok(params.iter().map(|p| p * p).sum::<f64>())
    }

    #[test]
    fn test_central_difference_gradient() {
        let params = Array3::from_shape_vec((1, 1, 3), vec![1.0, -2.0, 0.5]).unwrap();
        let gradients = GradientRule::default()
            .gradient::<Infallible>(&quadratic, &params).unwrap();
        let expected = [2.0, -4.0, 1.0];
        for (g, e) in gradients.iter().zip(expected.iter()) {
            assert!((g - e).abs() < 1e-5);
        }
    }

    #[test]
    fn test_parameter_shift_on_cosine() {
        let cost = |p: &Parameters| -> Result<f64, Infallible> { Ok(p[[0, 0, 1]].cos()) };
        let params = Array3::from_shape_vec((1, 1, 3), vec![0.0, 0.3, 0.0]).unwrap();
        let gradients = GradientRule::ParameterShift
            .gradient::<Infallible>(&cost, &params).unwrap();
        assert!((gradients[1] + 0.3f64.sin()).abs() < 1e-12);
        assert!(gradients[0].abs() < 1e-12);
    }

    #[test]
    fn test_gradient_descent_step_returns_fresh_parameters() {
        let step = GradientStep::new(GradientDescent::new(0.1));
        let params = Array3::from_elem((1, 2, 3), 1.0);
        let next = StepFunction::<Infallible>::step(&step, &quadratic, &params).unwrap();

        assert_eq!(params, Array3::from_elem((1, 2, 3), 1.0));
        for &p in next.iter() {
            assert!((p - 0.8).abs() < 1e-6);
        }
    }

    #[test]
    fn test_adam_moves_against_gradient() {
        let adam = Adam::with_learning_rate(0.1);
        let mut params = vec![1.0, -1.0];
        adam.update(&mut params, &[2.0, -2.0]);
        assert!(params[0] < 1.0);
        assert!(params[1] > -1.0);
    }

    #[test]
    #[should_panic(expected = "dimensions must match")]
    fn test_gradient_descent_rejects_short_gradient() {
        let mut params = vec![1.0, 2.0];
        GradientDescent::new(0.1).update(&mut params, &[1.0]);
    }

    #[test]
    #[should_panic(expected = "dimensions must match")]
    fn test_adam_rejects_short_gradient() {
        let mut params = vec![1.0, 2.0, 3.0];
        Adam::default().update(&mut params, &[1.0, 1.0]);
    }

    #[test]
    #[should_panic(expected = "dimensions must match")]
    fn test_momentum_rejects_long_gradient() {
        let mut params = vec![1.0];
        Momentum::new(0.1, 0.9).update(&mut params, &[1.0, 1.0]);
    }

    #[test]
    fn test_momentum_accumulates() {
        let momentum = Momentum::new(0.1, 0.9);
        let mut params = vec![0.0];
        momentum.update(&mut params, &[1.0]);
        momentum.update(&mut params, &[1.0]);
        // -0.1, then -0.09 - 0.1
        assert!((params[0] + 0.29).abs() < 1e-12);
    }
}
