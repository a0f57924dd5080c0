use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::metrics::names;
use super::{
    ConfusionMatrix, DecisionThresholdPolicy, EvaluationError, MetricsProvider, MetricsReport,
    ThresholdService,
};

/// Immutable outcome of one evaluation call.
///
/// Error rates and MCC are computed from the confusion matrix in-process;
/// ranking and agreement metrics come from the injected provider and stay
/// `None` when it does not report them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub threshold: f64,
    pub confusion: ConfusionMatrix,
    pub auc_roc: Option<f64>,
    pub auc_pr: Option<f64>,
    pub accuracy: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
    pub kappa: Option<f64>,
    pub false_positive_rate: f64,
    pub false_negative_rate: f64,
    pub mcc: f64,
    pub extra_metrics: MetricsReport,
}

/// Applies the decision threshold and merges in-process and delegated metrics.
pub struct EvaluationService<M> {
    metrics: Arc<M>,
    policy: DecisionThresholdPolicy,
}

impl<M> EvaluationService<M>
where
    M: MetricsProvider,
{
    pub fn new(metrics: Arc<M>, policy: DecisionThresholdPolicy) -> Self {
        Self { metrics, policy }
    }

    pub fn policy(&self) -> DecisionThresholdPolicy {
        self.policy
    }

    /// Same collaborator, different cutoff.
    pub fn with_policy(&self, policy: DecisionThresholdPolicy) -> Self {
        Self {
            metrics: Arc::clone(&self.metrics),
            policy,
        }
    }

    pub fn evaluate(
        &self,
        y_true: &[u8],
        y_proba: &[f64],
    ) -> Result<EvaluationResult, EvaluationError> {
        if y_true.is_empty() {
            return Err(EvaluationError::EmptyInput);
        }
        if y_true.len() != y_proba.len() {
            return Err(EvaluationError::LengthMismatch {
                labels: y_true.len(),
                predictions: y_proba.len(),
            });
        }
        if let Some((index, &value)) = y_proba
            .iter()
            .enumerate()
            .find(|(_, probability)| !(0.0..=1.0).contains(*probability))
        {
            return Err(EvaluationError::InvalidProbability { index, value });
        }

        let threshold = self.policy.threshold();
        let y_pred = ThresholdService::apply(y_proba, threshold);
        let confusion = ConfusionMatrix::from_labels(y_true, &y_pred)?;
        debug!(?confusion, threshold, "confusion matrix computed");

        let extra_metrics = self.metrics.compute_metrics(y_true, &y_pred, y_proba)?;
        let delegated = |name: &str| extra_metrics.get(name).copied();

        let result = EvaluationResult {
            threshold,
            confusion,
            auc_roc: delegated(names::AUC_ROC),
            auc_pr: delegated(names::AUC_PR),
            accuracy: delegated(names::ACCURACY),
            precision: delegated(names::PRECISION),
            recall: delegated(names::RECALL),
            f1: delegated(names::F1),
            kappa: delegated(names::KAPPA),
            false_positive_rate: confusion.false_positive_rate(),
            false_negative_rate: confusion.false_negative_rate(),
            mcc: confusion.mcc(),
            extra_metrics,
        };

        info!(
            rows = y_true.len(),
            threshold,
            false_negative_rate = result.false_negative_rate,
            mcc = result.mcc,
            "model evaluated"
        );
        Ok(result)
    }
}
