use std::sync::Arc;

use crate::evaluation::{
    metric_names, DecisionThresholdPolicy, EvaluationService, MetricsError, MetricsProvider,
    MetricsReport, StandardMetrics,
};

/// Eight patients, four diabetic; at 0.5 one of each class is misclassified.
pub(super) const LABELS: [u8; 8] = [0, 0, 0, 0, 1, 1, 1, 1];
pub(super) const PROBABILITIES: [f64; 8] = [0.1, 0.4, 0.35, 0.8, 0.9, 0.65, 0.3, 0.7];

pub(super) fn standard_service(policy: DecisionThresholdPolicy) -> EvaluationService<StandardMetrics> {
    EvaluationService::new(Arc::new(StandardMetrics), policy)
}

/// Provider returning a canned report, regardless of input.
pub(super) struct FixedMetrics {
    pub(super) report: MetricsReport,
}

impl FixedMetrics {
    pub(super) fn with_recall(recall: f64) -> Self {
        let mut report = MetricsReport::new();
        report.insert(metric_names::RECALL.to_string(), recall);
        report.insert(metric_names::ACCURACY.to_string(), 0.9);
        Self { report }
    }

    pub(super) fn empty() -> Self {
        Self {
            report: MetricsReport::new(),
        }
    }
}

impl MetricsProvider for FixedMetrics {
    fn compute_metrics(
        &self,
        _y_true: &[u8],
        _y_pred: &[u8],
        _y_proba: &[f64],
    ) -> Result<MetricsReport, MetricsError> {
        Ok(self.report.clone())
    }
}

pub(super) struct FailingMetrics;

impl MetricsProvider for FailingMetrics {
    fn compute_metrics(
        &self,
        _y_true: &[u8],
        _y_pred: &[u8],
        _y_proba: &[f64],
    ) -> Result<MetricsReport, MetricsError> {
        Err(MetricsError::Provider("backend unavailable".to_string()))
    }
}

pub(super) fn service_with<M: MetricsProvider>(
    metrics: M,
    policy: DecisionThresholdPolicy,
) -> EvaluationService<M> {
    EvaluationService::new(Arc::new(metrics), policy)
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
