//! Capabilities consumed by the training driver
//!
//! The driver knows nothing about circuits or optimizers. It only needs a way
//! to evaluate a cost at some parameters and a way to take one optimizer step.
//! Plain closures implement these traits, so any backend can be plugged in.
//!
//! Implementations must be pure with respect to the driver: the only thing the
//! driver observes is the returned value. Running several drivers at once
//! against the same capability is only sound when the capability itself is
//! reentrant.

use ndarray::{Array1, Array2};

use crate::Parameters;

/// Cost on a fixed problem: parameters -> scalar
pub trait CostFunction {
    type Error;

    fn evaluate(&self, params: &Parameters) -> Result<f64, Self::Error>;
}

impl<F, E> CostFunction for F
where
    F: Fn(&Parameters) -> Result<f64, E>,
{
    type Error = E;

    fn evaluate(&self, params: &Parameters) -> Result<f64, E> {
        self(params)
    }
}

/// Cost on data: parameters, features, labels -> scalar
pub trait BatchCostFunction {
    type Error;

    fn evaluate(
        &self,
        params: &Parameters,
        features: &Array2<f64>,
        labels: &Array1<f64>,
    ) -> Result<f64, Self::Error>;
}

impl<F, E> BatchCostFunction for F
where
    F: Fn(&Parameters, &Array2<f64>, &Array1<f64>) -> Result<f64, E>,
{
    type Error = E;

    fn evaluate(
        &self,
        params: &Parameters,
        features: &Array2<f64>,
        labels: &Array1<f64>,
    ) -> Result<f64, E> {
        self(params, features, labels)
    }
}

/// A cost closure handed to a step function
pub type CostClosure<'a, E> = dyn Fn(&Parameters) -> Result<f64, E> + 'a;

/// One optimizer update: (cost, parameters) -> new parameters
///
/// The returned value must be a fresh array; the driver never hands the same
/// parameters to two iterations.
pub trait StepFunction<E> {
    fn step(&self, cost: &CostClosure<'_, E>, params: &Parameters) -> Result<Parameters, E>;
}

impl<F, E> StepFunction<E> for F
where
    F: Fn(&CostClosure<'_, E>, &Parameters) -> Result<Parameters, E>,
{
    fn step(&self, cost: &CostClosure<'_, E>, params: &Parameters) -> Result<Parameters, E> {
        self(cost, params)
    }
}

/// A data-driven cost bound to one fixed dataset
pub struct BoundCost<'a, B> {
    cost: &'a B,
    features: &'a Array2<f64>,
    labels: &'a Array1<f64>,
}

impl<'a, B: BatchCostFunction> BoundCost<'a, B> {
    pub fn new(cost: &'a B, features: &'a Array2<f64>, labels: &'a Array1<f64>) -> Self {
        BoundCost {
            cost,
            features,
            labels,
        }
    }
}

impl<'a, B: BatchCostFunction> CostFunction for BoundCost<'a, B> {
    type Error = B::Error;

    fn evaluate(&self, params: &Parameters) -> Result<f64, B::Error> {
        self.cost.evaluate(params, self.features, self.labels)
    }
}
