//! Static configuration of a training run

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Progress is reported every this many iterations unless configured
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10;

/// When a run may halt before exhausting its budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StoppingPolicy {
    /// Run exactly the configured number of iterations
    Fixed,
    /// Halt once two consecutive trajectory values differ by less than `epsilon`
    EarlyStop { epsilon: f64 },
}

impl StoppingPolicy {
    /// Whether the run should halt given the last two trajectory values
    pub fn should_stop(&self, previous: f64, current: f64) -> bool {
        match self {
            StoppingPolicy::Fixed => false,
            StoppingPolicy::EarlyStop { epsilon } => (current - previous).abs() < *epsilon,
        }
    }
}

/// Granularity of one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BatchMode {
    /// One optimizer step per iteration against a fixed cost
    FullBatch,
    /// One epoch per iteration: shuffle, one step per chunk, then a full-set loss
    MiniBatch { batch_size: usize },
}

impl BatchMode {
    pub fn name(&self) -> &'static str {
        match self {
            BatchMode::FullBatch => "full_batch",
            BatchMode::MiniBatch { .. } => "mini_batch",
        }
    }
}

/// Cumulative circuit-execution bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionTracking {
    Untracked,
    /// Each iteration is estimated to cost this many circuit executions
    PerIteration(u64),
}

/// Configuration of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Maximum number of iterations (steps or epochs)
    pub max_iterations: usize,
    pub batch_mode: BatchMode,
    pub stopping: StoppingPolicy,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    #[serde(default = "default_execution_tracking")]
    pub executions: ExecutionTracking,
}

fn default_progress_interval() -> usize {
    DEFAULT_PROGRESS_INTERVAL
}

fn default_execution_tracking() -> ExecutionTracking {
    ExecutionTracking::Untracked
}

impl TrainingConfig {
    /// Full-batch run of `max_iterations` steps with no early stopping
    pub fn full_batch(max_iterations: usize) -> Self {
        TrainingConfig {
            max_iterations,
            batch_mode: BatchMode::FullBatch,
            stopping: StoppingPolicy::Fixed,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            executions: ExecutionTracking::Untracked,
        }
    }

    /// Mini-batch run of `epochs` epochs with chunks of `batch_size`
    pub fn mini_batch(epochs: usize, batch_size: usize) -> Self {
        TrainingConfig {
            batch_mode: BatchMode::MiniBatch { batch_size },
            ..TrainingConfig::full_batch(epochs)
        }
    }

    /// Stop early once consecutive values differ by less than `epsilon`
    pub fn with_early_stopping(mut self, epsilon: f64) -> Self {
        self.stopping = StoppingPolicy::EarlyStop { epsilon };
        self
    }

    pub fn with_stopping(mut self, stopping: StoppingPolicy) -> Self {
        self.stopping = stopping;
        self
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Track cumulative executions, assuming `per_iteration` for each step
    pub fn with_executions_per_iteration(mut self, per_iteration: u64) -> Self {
        self.executions = ExecutionTracking::PerIteration(per_iteration);
        self
    }

    /// Checks every static constraint of the run
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("iteration budget must be positive".to_string());
        }
        if self.progress_interval == 0 {
            return Err("progress interval must be positive".to_string());
        }
        if let StoppingPolicy::EarlyStop { epsilon } = self.stopping {
            if !epsilon.is_finite() || epsilon < 0.0 {
                return Err(format!(
                    "early stopping threshold must be finite and non-negative, got {}",
                    epsilon
                ));
            }
        }
        if let ExecutionTracking::PerIteration(per_iteration) = self.executions {
            if per_iteration.checked_mul(self.max_iterations as u64).is_none() {
                return Err(format!(
                    "{} executions per iteration overflow the cumulative count over {} iterations",
                    per_iteration, self.max_iterations
                ));
            }
        }
        match (self.batch_mode, self.executions) {
            (BatchMode::MiniBatch { batch_size: 0 }, _) => {
                Err("batch size must be positive".to_string())
            }
            (BatchMode::MiniBatch { .. }, ExecutionTracking::PerIteration(_)) => {
                Err("execution tracking is only supported for full-batch runs".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Parses and validates a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TrainingConfig = serde_json::from_str(json)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Reads a JSON configuration from disk
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_zero_budget() {
        assert!(TrainingConfig::full_batch(0).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_tracking_in_mini_batch() {
        let config = TrainingConfig::mini_batch(5, 4).with_executions_per_iteration(3);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overflowing_execution_count() {
        let config = TrainingConfig::full_batch(3).with_executions_per_iteration(u64::MAX / 2);
        assert!(config.validate().is_err());

        let config = TrainingConfig::full_batch(2).with_executions_per_iteration(u64::MAX / 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_defaults() {
        let config = TrainingConfig::from_json_str(
            r#"{
                "max_iterations": 20,
                "batch_mode": { "kind": "mini_batch", "batch_size": 8 },
                "stopping": { "kind": "early_stop", "epsilon": 0.001 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.progress_interval, DEFAULT_PROGRESS_INTERVAL);
        assert_eq!(config.executions, ExecutionTracking::Untracked);
        assert_eq!(config.batch_mode, BatchMode::MiniBatch { batch_size: 8 });
        assert_eq!(config.stopping, StoppingPolicy::EarlyStop { epsilon: 0.001 });
    }

    #[test]
    fn test_json_rejects_invalid_values() {
        let result = TrainingConfig::from_json_str(
            r#"{ "max_iterations": 0, "batch_mode": { "kind": "full_batch" }, "stopping": { "kind": "fixed" } }"#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_json_file_round_trip() {
        let config = TrainingConfig::full_batch(30)
            .with_early_stopping(1e-5)
            .with_executions_per_iteration(12);
        let path = std::env::temp_dir().join(format!("varq-config-{}.json", std::process::id()));
        fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = TrainingConfig::from_json_file(&path);
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let result = TrainingConfig::from_json_file("/nonexistent/varq/config.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
