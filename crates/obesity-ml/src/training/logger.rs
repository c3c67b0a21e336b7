//! Structured training progress logging.
//!
//! [`TrainingLogger`] emits through `tracing`; [`Verbosity`] decides which
//! messages a fit produces at all, independently of the subscriber filter.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Verbosity level for training output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Only warnings (e.g. non-convergence).
    Warning,
    /// Start/finish summaries.
    Info,
    /// Per-round progress.
    Debug,
}

/// Logs the lifecycle of one model fit.
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    model: &'static str,
    n_rounds: usize,
    started: Option<Instant>,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity, model: &'static str) -> Self {
        Self { verbosity, model, n_rounds: 0, started: None }
    }

    /// Verbosity this logger was created with.
    #[inline]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn start_training(&mut self, n_rounds: usize) {
        self.n_rounds = n_rounds;
        self.started = Some(Instant::now());
        if self.verbosity >= Verbosity::Info {
            tracing::info!(model = self.model, rounds = n_rounds, "training started");
        }
    }

    /// Log a training metric for one round.
    pub fn log_round(&self, round: usize, metric: &str, value: f64) {
        if self.verbosity >= Verbosity::Debug {
            tracing::debug!(
                model = self.model,
                round,
                total = self.n_rounds,
                metric,
                value,
                "round finished"
            );
        }
    }

    pub fn log_warning(&self, message: &str) {
        if self.verbosity >= Verbosity::Warning {
            tracing::warn!(model = self.model, "{message}");
        }
    }

    pub fn finish_training(&self, rounds_run: usize) {
        if self.verbosity >= Verbosity::Info {
            let elapsed_ms = self.started.map_or(0, |t| t.elapsed().as_millis());
            tracing::info!(model = self.model, rounds = rounds_run, elapsed_ms, "training finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_is_ordered() {
        assert!(Verbosity::Debug > Verbosity::Info);
        assert!(Verbosity::Info > Verbosity::Warning);
        assert!(Verbosity::Warning > Verbosity::Silent);
        assert_eq!(Verbosity::default(), Verbosity::Silent);
    }

    #[test]
    fn silent_logger_runs_through_lifecycle() {
        let mut logger = TrainingLogger::new(Verbosity::Silent, "test");
        logger.start_training(3);
        logger.log_round(0, "mlogloss", 0.5);
        logger.log_warning("ignored");
        logger.finish_training(3);
        assert_eq!(logger.verbosity(), Verbosity::Silent);
    }
}
