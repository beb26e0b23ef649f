//! Metrics collection
//!
//! Aggregates per-run cell counts and durations.

use crate::workflow::RunOutcome;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Metrics for one workflow run
#[derive(Debug, Clone)]
pub struct RunMetrics {
    /// Workflow name
    pub workflow_name: String,

    /// Wall-clock duration of the whole run
    pub duration: Duration,

    /// Number of matrix cells executed
    pub cell_count: usize,

    /// Number of cells that succeeded
    pub successful_cells: usize,

    /// Number of cells that failed
    pub failed_cells: usize,

    /// Number of cells skipped by fail-fast
    pub skipped_cells: usize,
}

impl RunMetrics {
    /// Builds metrics from a run outcome
    #[must_use]
    pub fn from_outcome(workflow_name: impl Into<String>, outcome: &RunOutcome) -> Self {
        Self {
            workflow_name: workflow_name.into(),
            duration: outcome.cells.iter().map(|c| c.duration).sum(),
            cell_count: outcome.cells.len(),
            successful_cells: outcome
                .cells
                .iter()
                .filter(|c| c.status.is_success())
                .count(),
            failed_cells: outcome
                .cells
                .iter()
                .filter(|c| c.status.is_failure())
                .count(),
            skipped_cells: outcome
                .cells
                .iter()
                .filter(|c| c.status.is_skipped())
                .count(),
        }
    }
}

/// Metrics collector for workflow runs.
///
/// Cloning is cheap and clones share the underlying map, so an
/// executor can hand out a view of its collected metrics.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    /// Collected metrics, keyed by workflow name
    metrics: Arc<RwLock<HashMap<String, RunMetrics>>>,
}

impl MetricsCollector {
    /// Creates a new metrics collector
    #[must_use]
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Records metrics for a workflow run
    pub fn record(&self, metrics: RunMetrics) {
        self.metrics
            .write()
            .insert(metrics.workflow_name.clone(), metrics);
    }

    /// Gets metrics for a specific workflow
    #[must_use]
    pub fn get(&self, workflow_name: &str) -> Option<RunMetrics> {
        self.metrics.read().get(workflow_name).cloned()
    }

    /// Gets all recorded metrics
    #[must_use]
    pub fn get_all(&self) -> Vec<RunMetrics> {
        self.metrics.read().values().cloned().collect()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
