//! Convergence-aware training drivers
//!
//! A [`Trainer`] repeatedly updates parameters through an opaque step function,
//! records the trajectory of an opaque cost, optionally tracks cumulative
//! circuit executions and optionally halts once the trajectory flattens out.

pub mod config;
pub mod data;
pub mod driver;
pub mod objective;
pub mod progress;
pub mod summary;

pub use config::{BatchMode, ExecutionTracking, StoppingPolicy, TrainingConfig};
pub use data::LabeledData;
pub use driver::Trainer;
pub use objective::{BatchCostFunction, BoundCost, CostClosure, CostFunction, StepFunction};
pub use progress::{LogObserver, ProgressEvent, ProgressObserver, Recorder, Silent};
pub use summary::{ExecutionTrajectory, Termination, TrainingHistory, TrainingRun, TrainingSummary};
