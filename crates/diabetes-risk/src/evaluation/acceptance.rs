use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{EvaluationError, EvaluationResult, EvaluationService, MetricsProvider};

/// Deployment gate applied to an evaluated model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptancePolicy {
    pub max_false_negative_rate: f64,
    pub min_recall: f64,
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self {
            max_false_negative_rate: 0.05,
            min_recall: 0.90,
        }
    }
}

impl AcceptancePolicy {
    /// False negative rate is checked first; a recall the provider did not
    /// report is skipped.
    pub fn check(&self, evaluation: &EvaluationResult) -> Result<(), ModelRejected> {
        if evaluation.false_negative_rate > self.max_false_negative_rate {
            return Err(ModelRejected {
                metric: RejectedMetric::FalseNegativeRate,
                value: evaluation.false_negative_rate,
                limit: self.max_false_negative_rate,
            });
        }

        if let Some(recall) = evaluation.recall {
            if recall < self.min_recall {
                return Err(ModelRejected {
                    metric: RejectedMetric::Recall,
                    value: recall,
                    limit: self.min_recall,
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectedMetric {
    FalseNegativeRate,
    Recall,
}

impl RejectedMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectedMetric::FalseNegativeRate => "false_negative_rate",
            RejectedMetric::Recall => "recall",
        }
    }
}

impl fmt::Display for RejectedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business rejection of a model; carries the metric that failed the gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelRejected {
    pub metric: RejectedMetric,
    pub value: f64,
    pub limit: f64,
}

impl ModelRejected {
    pub fn summary(&self) -> String {
        match self.metric {
            RejectedMetric::FalseNegativeRate => format!(
                "model rejected: false_negative_rate {:.3} exceeds maximum {:.3}",
                self.value, self.limit
            ),
            RejectedMetric::Recall => format!(
                "model rejected: recall {:.3} is below minimum {:.3}",
                self.value, self.limit
            ),
        }
    }
}

impl fmt::Display for ModelRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for ModelRejected {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Evaluated,
    Accepted,
    Rejected,
}

impl ModelStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ModelStatus::Evaluated => "evaluated",
            ModelStatus::Accepted => "accepted",
            ModelStatus::Rejected => "rejected",
        }
    }
}

/// Audit record of a deployment decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReview {
    pub status: ModelStatus,
    pub evaluation: EvaluationResult,
    pub policy: AcceptancePolicy,
    pub rejection: Option<ModelRejected>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl ModelReview {
    pub fn evaluated(evaluation: EvaluationResult, policy: AcceptancePolicy) -> Self {
        Self {
            status: ModelStatus::Evaluated,
            evaluation,
            policy,
            rejection: None,
            decided_at: None,
        }
    }

    /// Moves an evaluated review to its final status. Decided reviews are
    /// returned unchanged.
    pub fn decide(mut self) -> Self {
        if self.status != ModelStatus::Evaluated {
            return self;
        }
        match self.policy.check(&self.evaluation) {
            Ok(()) => self.status = ModelStatus::Accepted,
            Err(rejection) => {
                self.status = ModelStatus::Rejected;
                self.rejection = Some(rejection);
            }
        }
        self.decided_at = Some(Utc::now());
        self
    }

    /// Accepted review, or the rejection that stopped it.
    pub fn into_accepted(self) -> Result<Self, ModelRejected> {
        match self.rejection {
            Some(rejection) => Err(rejection),
            None => Ok(self),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AcceptanceError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Rejected(#[from] ModelRejected),
}

/// Evaluates a model and gates its deployment.
pub struct ModelAcceptanceUseCase<M> {
    evaluation: EvaluationService<M>,
    policy: AcceptancePolicy,
}

impl<M> ModelAcceptanceUseCase<M>
where
    M: MetricsProvider,
{
    pub fn new(evaluation: EvaluationService<M>, policy: AcceptancePolicy) -> Self {
        Self { evaluation, policy }
    }

    pub fn policy(&self) -> AcceptancePolicy {
        self.policy
    }

    /// Decided audit record, whether accepted or rejected.
    pub fn review(&self, y_true: &[u8], y_proba: &[f64]) -> Result<ModelReview, EvaluationError> {
        let evaluation = self.evaluation.evaluate(y_true, y_proba)?;
        let review = ModelReview::evaluated(evaluation, self.policy).decide();

        match &review.rejection {
            Some(rejection) => warn!(
                metric = rejection.metric.as_str(),
                value = rejection.value,
                limit = rejection.limit,
                "model rejected"
            ),
            None => info!(
                recall = ?review.evaluation.recall,
                false_negative_rate = review.evaluation.false_negative_rate,
                "model accepted"
            ),
        }
        Ok(review)
    }

    /// Hard gate: a rejected model surfaces as [`AcceptanceError::Rejected`].
    pub fn execute(&self, y_true: &[u8], y_proba: &[f64]) -> Result<ModelReview, AcceptanceError> {
        Ok(self.review(y_true, y_proba)?.into_accepted()?)
    }
}
