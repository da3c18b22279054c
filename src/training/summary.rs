//! Outcome of a training run

use serde::{Deserialize, Serialize};

use crate::error::DivisionUndefined;
use crate::Parameters;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Consecutive values differed by less than the early-stopping threshold
    Converged,
    /// The iteration budget ran out
    BudgetExhausted,
}

/// Cumulative circuit executions, index-aligned with the cost trajectory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionTrajectory {
    Untracked,
    Tracked(Vec<u64>),
}

impl ExecutionTrajectory {
    pub fn as_slice(&self) -> Option<&[u64]> {
        match self {
            ExecutionTrajectory::Untracked => None,
            ExecutionTrajectory::Tracked(counts) => Some(counts),
        }
    }

    pub fn last(&self) -> Option<u64> {
        self.as_slice().and_then(|counts| counts.last().copied())
    }

    pub fn is_tracked(&self) -> bool {
        matches!(self, ExecutionTrajectory::Tracked(_))
    }
}

/// Everything a training run returns
#[derive(Debug, Clone)]
pub struct TrainingRun {
    /// Cost (full batch) or full-set loss (mini batch); index 0 is the initial value
    pub trajectory: Vec<f64>,
    pub executions: ExecutionTrajectory,
    /// Parameters after the last completed iteration
    pub params: Parameters,
    pub iterations_run: usize,
    pub termination: Termination,
}

impl TrainingRun {
    pub fn initial_value(&self) -> f64 {
        self.trajectory[0]
    }

    pub fn final_value(&self) -> f64 {
        self.trajectory[self.trajectory.len() - 1]
    }

    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    pub fn summary(&self) -> TrainingSummary {
        TrainingSummary {
            initial_value: self.initial_value(),
            final_value: self.final_value(),
            iterations_run: self.iterations_run,
            termination: self.termination,
        }
    }

    /// Serializable record of the run without its parameters
    pub fn history(&self) -> TrainingHistory {
        TrainingHistory {
            trajectory: self.trajectory.clone(),
            executions: self.executions.clone(),
            iterations_run: self.iterations_run,
            termination: self.termination,
        }
    }
}

/// Trajectories of a run, for plotting or logging elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub trajectory: Vec<f64>,
    pub executions: ExecutionTrajectory,
    pub iterations_run: usize,
    pub termination: Termination,
}

impl TrainingHistory {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Terminal statistics of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub initial_value: f64,
    pub final_value: f64,
    pub iterations_run: usize,
    pub termination: Termination,
}

impl TrainingSummary {
    /// Improvement from initial to final value, as a percentage of `|initial|`
    ///
    /// Undefined when the initial value is exactly zero.
    pub fn improvement_percent(&self) -> Result<f64, DivisionUndefined> {
        if self.initial_value == 0.0 {
            return Err(DivisionUndefined);
        }
        Ok((self.initial_value - self.final_value) / self.initial_value.abs() * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(initial_value: f64, final_value: f64) -> TrainingSummary {
        TrainingSummary {
            initial_value,
            final_value,
            iterations_run: 4,
            termination: Termination::BudgetExhausted,
        }
    }

    #[test]
    fn test_improvement_percent() {
        let improvement = summary(2.0, 0.5).improvement_percent().unwrap();
        assert!((improvement - 75.0).abs() < 1e-12);
    }

    #[test]
    fn test_improvement_relative_to_absolute_initial() {
        let improvement = summary(-2.0, -3.0).improvement_percent().unwrap();
        assert!((improvement - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_improvement_undefined_at_zero() {
        assert_eq!(summary(0.0, -1.0).improvement_percent(), Err(DivisionUndefined));
        assert_eq!(summary(-0.0, 1.0).improvement_percent(), Err(DivisionUndefined));
    }
}
