//! The training loop
//!
//! Full-batch and mini-batch training share one loop. What differs is how a
//! single iteration advances the parameters, captured by the private
//! [`Iteration`] trait: a full-batch iteration is one optimizer step, a
//! mini-batch iteration is one epoch over shuffled chunks.
//!
//! The loop is strictly sequential. Iteration `k` consumes the parameters
//! produced by iteration `k - 1`, and each step returns a new array, so no
//! evaluation ever sees parameters that are being mutated.

use rand::Rng;
use tracing::{debug, info, info_span};

use crate::error::TrainingError;
use crate::training::config::{BatchMode, ExecutionTracking, TrainingConfig};
use crate::training::data::LabeledData;
use crate::training::objective::{BatchCostFunction, BoundCost, CostFunction, StepFunction};
use crate::training::progress::{LogObserver, ProgressEvent, ProgressObserver};
use crate::training::summary::{ExecutionTrajectory, Termination, TrainingRun};
use crate::Parameters;

/// How one iteration turns parameters into new parameters and a trajectory value
trait Iteration {
    type Error;

    /// Trajectory value at the starting parameters
    fn initial_value(&mut self, params: &Parameters) -> Result<f64, Self::Error>;

    fn advance(&mut self, params: Parameters) -> Result<(Parameters, f64), Self::Error>;
}

/// One optimizer step against a fixed cost
struct FullBatchStep<'a, C, S> {
    cost: &'a C,
    step: &'a S,
}

impl<'a, C, S> Iteration for FullBatchStep<'a, C, S>
where
    C: CostFunction,
    S: StepFunction<C::Error>,
{
    type Error = C::Error;

    fn initial_value(&mut self, params: &Parameters) -> Result<f64, C::Error> {
        self.cost.evaluate(params)
    }

    fn advance(&mut self, params: Parameters) -> Result<(Parameters, f64), C::Error> {
        let cost = self.cost;
        let closure = |p: &Parameters| cost.evaluate(p);
        let next = self.step.step(&closure, &params)?;
        let value = cost.evaluate(&next)?;
        Ok((next, value))
    }
}

/// One epoch: shuffle, one step per chunk, then the loss on the whole set
struct MiniBatchEpoch<'a, B, S, R: ?Sized> {
    cost: &'a B,
    step: &'a S,
    data: &'a LabeledData,
    batch_size: usize,
    rng: &'a mut R,
}

impl<'a, B, S, R> Iteration for MiniBatchEpoch<'a, B, S, R>
where
    B: BatchCostFunction,
    S: StepFunction<B::Error>,
    R: Rng + ?Sized,
{
    type Error = B::Error;

    fn initial_value(&mut self, params: &Parameters) -> Result<f64, B::Error> {
        self.cost
            .evaluate(params, self.data.features(), self.data.labels())
    }

    fn advance(&mut self, mut params: Parameters) -> Result<(Parameters, f64), B::Error> {
        let (cost, step, data) = (self.cost, self.step, self.data);
        let order = data.permutation(&mut *self.rng);

        for chunk in data.batches(&order, self.batch_size) {
            let closure =
                |p: &Parameters| cost.evaluate(p, chunk.features(), chunk.labels());
            params = step.step(&closure, &params)?;
        }

        let loss = cost.evaluate(&params, data.features(), data.labels())?;
        Ok((params, loss))
    }
}

/// Runs training loops under a fixed configuration
///
/// Each call to a `train*` method is an independent run with its own parameter
/// copy, trajectory and shuffling state. There is no resumption: a finished
/// run is terminal.
pub struct Trainer<O = LogObserver> {
    config: TrainingConfig,
    observer: O,
}

impl Trainer<LogObserver> {
    /// A trainer that reports progress through `tracing`
    pub fn new(config: TrainingConfig) -> Self {
        Trainer {
            config,
            observer: LogObserver,
        }
    }
}

impl<O: ProgressObserver> Trainer<O> {
    /// Replaces the progress observer
    pub fn with_observer<P: ProgressObserver>(self, observer: P) -> Trainer<P> {
        Trainer {
            config: self.config,
            observer,
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Full-batch training against a cost that needs no data
    pub fn train<C, S>(
        &mut self,
        cost: &C,
        step: &S,
        init_params: &Parameters,
    ) -> Result<TrainingRun, TrainingError<C::Error>>
    where
        C: CostFunction,
        S: StepFunction<C::Error>,
    {
        if let BatchMode::MiniBatch { .. } = self.config.batch_mode {
            return Err(TrainingError::InvalidConfiguration(
                "mini-batch training requires a dataset".to_string(),
            ));
        }
        self.drive(FullBatchStep { cost, step }, init_params)
    }

    /// Training against a data-driven cost
    ///
    /// In full-batch mode the cost is bound to the whole of `data` and `rng`
    /// is unused. In mini-batch mode every epoch draws a fresh permutation
    /// from `rng`, so a seeded generator makes runs reproducible.
    pub fn train_on<B, S, R>(
        &mut self,
        cost: &B,
        step: &S,
        init_params: &Parameters,
        data: &LabeledData,
        rng: &mut R,
    ) -> Result<TrainingRun, TrainingError<B::Error>>
    where
        B: BatchCostFunction,
        S: StepFunction<B::Error>,
        R: Rng + ?Sized,
    {
        if data.is_empty() {
            return Err(TrainingError::InvalidConfiguration(
                "training data is empty".to_string(),
            ));
        }

        match self.config.batch_mode {
            BatchMode::FullBatch => {
                let bound = BoundCost::new(cost, data.features(), data.labels());
                self.drive(FullBatchStep { cost: &bound, step }, init_params)
            }
            BatchMode::MiniBatch { batch_size } => self.drive(
                MiniBatchEpoch {
                    cost,
                    step,
                    data,
                    batch_size,
                    rng,
                },
                init_params,
            ),
        }
    }

    fn drive<I: Iteration>(
        &mut self,
        mut iteration: I,
        init_params: &Parameters,
    ) -> Result<TrainingRun, TrainingError<I::Error>> {
        self.config
            .validate()
            .map_err(TrainingError::InvalidConfiguration)?;

        let budget = self.config.max_iterations;
        let interval = self.config.progress_interval;
        let stopping = self.config.stopping;
        let _span = info_span!("training", mode = self.config.batch_mode.name(), budget).entered();

        let mut params = init_params.clone();
        let initial = iteration
            .initial_value(&params)
            .map_err(TrainingError::Upstream)?;

        let mut trajectory = vec![initial];
        let mut executions = match self.config.executions {
            ExecutionTracking::Untracked => None,
            ExecutionTracking::PerIteration(per_iteration) => Some((per_iteration, vec![0u64])),
        };

        debug!(initial, "starting training");

        let mut termination = Termination::BudgetExhausted;
        let mut iterations_run = 0;

        for k in 1..=budget {
            let (next, value) = iteration.advance(params).map_err(TrainingError::Upstream)?;
            params = next;
            trajectory.push(value);
            iterations_run = k;

            let executed = executions.as_mut().map(|(per_iteration, counts)| {
                let total = k as u64 * *per_iteration;
                counts.push(total);
                total
            });

            debug!(iteration = k, value, "iteration complete");

            if k % interval == 0 {
                self.observer.on_progress(&ProgressEvent {
                    iteration: k,
                    budget,
                    executions: executed,
                    value,
                });
            }

            let previous = trajectory[trajectory.len() - 2];
            if stopping.should_stop(previous, value) {
                termination = Termination::Converged;
                break;
            }
        }

        let run = TrainingRun {
            trajectory,
            executions: match executions {
                Some((_, counts)) => ExecutionTrajectory::Tracked(counts),
                None => ExecutionTrajectory::Untracked,
            },
            params,
            iterations_run,
            termination,
        };

        info!(
            iterations = run.iterations_run,
            converged = run.converged(),
            "training finished"
        );
        self.observer.on_summary(&run.summary());

        Ok(run)
    }
}
