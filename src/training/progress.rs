//! Progress observations emitted while training
//!
//! Observations are side effects for the caller; they are not part of the
//! returned [`TrainingRun`](crate::training::TrainingRun) and are not an error
//! channel.

use tracing::info;

use crate::training::summary::TrainingSummary;

/// A periodic snapshot of a running driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEvent {
    /// 1-based index of the iteration just completed
    pub iteration: usize,
    /// Configured iteration budget
    pub budget: usize,
    /// Cumulative executions, when tracked
    pub executions: Option<u64>,
    /// Latest trajectory value
    pub value: f64,
}

/// Receiver of progress and summary observations
pub trait ProgressObserver {
    fn on_progress(&mut self, event: &ProgressEvent);

    fn on_summary(&mut self, _summary: &TrainingSummary) {}
}

impl<F> ProgressObserver for F
where
    F: FnMut(&ProgressEvent),
{
    fn on_progress(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Reports observations as `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn on_progress(&mut self, event: &ProgressEvent) {
        match event.executions {
            Some(executions) => info!(
                iteration = event.iteration,
                budget = event.budget,
                executions,
                value = event.value,
                "iteration {}/{}: executions {}, value {:.6}",
                event.iteration,
                event.budget,
                executions,
                event.value
            ),
            None => info!(
                iteration = event.iteration,
                budget = event.budget,
                value = event.value,
                "iteration {}/{}: value {:.6}",
                event.iteration,
                event.budget,
                event.value
            ),
        }
    }

    fn on_summary(&mut self, summary: &TrainingSummary) {
        match summary.improvement_percent() {
            Ok(percent) => info!(
                initial = summary.initial_value,
                last = summary.final_value,
                improvement_percent = percent,
                "initial {:.6}, final {:.6}, improvement {:.2}%",
                summary.initial_value,
                summary.final_value,
                percent
            ),
            Err(undefined) => info!(
                initial = summary.initial_value,
                last = summary.final_value,
                "initial {:.6}, final {:.6}, improvement undefined: {}",
                summary.initial_value,
                summary.final_value,
                undefined
            ),
        }
    }
}

/// Discards every observation
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressObserver for Silent {
    fn on_progress(&mut self, _event: &ProgressEvent) {}
}

/// Keeps every observation in memory
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub events: Vec<ProgressEvent>,
    pub summary: Option<TrainingSummary>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trajectory values seen so far, in order
    pub fn values(&self) -> Vec<f64> {
        self.events.iter().map(|event| event.value).collect()
    }
}

impl ProgressObserver for Recorder {
    fn on_progress(&mut self, event: &ProgressEvent) {
        self.events.push(*event);
    }

    fn on_summary(&mut self, summary: &TrainingSummary) {
        self.summary = Some(*summary);
    }
}
