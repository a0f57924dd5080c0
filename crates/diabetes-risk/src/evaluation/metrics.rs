use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::ConfusionMatrix;

/// Metric name to value, as produced by a [`MetricsProvider`].
pub type MetricsReport = BTreeMap<String, f64>;

/// Keys understood by the evaluation service.
pub mod names {
    pub const ACCURACY: &str = "accuracy";
    pub const PRECISION: &str = "precision";
    pub const RECALL: &str = "recall";
    pub const F1: &str = "f1";
    pub const AUC_ROC: &str = "auc_roc";
    pub const AUC_PR: &str = "auc_pr";
    pub const KAPPA: &str = "kappa";
    pub const FALSE_POSITIVE_RATE: &str = "false_positive_rate";
    pub const FALSE_NEGATIVE_RATE: &str = "false_negative_rate";
    pub const MCC: &str = "mcc";
}

/// Classification metrics backend injected into the evaluation service.
pub trait MetricsProvider: Send + Sync {
    fn compute_metrics(
        &self,
        y_true: &[u8],
        y_pred: &[u8],
        y_proba: &[f64],
    ) -> Result<MetricsReport, MetricsError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    #[error("{metric} is undefined: {reason}")]
    Undefined {
        metric: &'static str,
        reason: &'static str,
    },
    #[error("metrics provider failed: {0}")]
    Provider(String),
}

/// In-process metrics provider. Values are rounded to four decimals and
/// zero divisions yield 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMetrics;

impl MetricsProvider for StandardMetrics {
    fn compute_metrics(
        &self,
        y_true: &[u8],
        y_pred: &[u8],
        y_proba: &[f64],
    ) -> Result<MetricsReport, MetricsError> {
        if y_true.len() != y_proba.len() {
            return Err(MetricsError::Provider(format!(
                "{} labels but {} probabilities",
                y_true.len(),
                y_proba.len()
            )));
        }
        let confusion = ConfusionMatrix::from_labels(y_true, y_pred)
            .map_err(|err| MetricsError::Provider(err.to_string()))?;

        let tp = confusion.true_positives as f64;
        let fp = confusion.false_positives as f64;
        let fn_ = confusion.false_negatives as f64;
        let total = confusion.total() as f64;

        let accuracy = safe_division(tp + confusion.true_negatives as f64, total);
        let precision = safe_division(tp, tp + fp);
        let recall = safe_division(tp, tp + fn_);
        let f1 = safe_division(2.0 * tp, 2.0 * tp + fp + fn_);

        let report = [
            (names::ACCURACY, accuracy),
            (names::PRECISION, precision),
            (names::RECALL, recall),
            (names::F1, f1),
            (names::AUC_ROC, roc_auc(y_true, y_proba)?),
            (names::AUC_PR, average_precision(y_true, y_proba)?),
            (names::KAPPA, cohen_kappa(&confusion)),
            (names::FALSE_POSITIVE_RATE, confusion.false_positive_rate()),
            (names::FALSE_NEGATIVE_RATE, confusion.false_negative_rate()),
            (names::MCC, confusion.mcc()),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), round4(value)))
        .collect();

        Ok(report)
    }
}

fn safe_division(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn require_both_classes(y_true: &[u8], metric: &'static str) -> Result<(f64, f64), MetricsError> {
    let positives = y_true.iter().filter(|&&label| label == 1).count() as f64;
    let negatives = y_true.len() as f64 - positives;
    if positives == 0.0 || negatives == 0.0 {
        return Err(MetricsError::Undefined {
            metric,
            reason: "ground truth holds a single class",
        });
    }
    Ok((positives, negatives))
}

/// Area under the ROC curve via the Mann-Whitney rank statistic; tied scores
/// share their average rank.
fn roc_auc(y_true: &[u8], y_proba: &[f64]) -> Result<f64, MetricsError> {
    let (positives, negatives) = require_both_classes(y_true, names::AUC_ROC)?;

    let mut order: Vec<usize> = (0..y_proba.len()).collect();
    order.sort_by(|&a, &b| y_proba[a].total_cmp(&y_proba[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && y_proba[order[end]] == y_proba[order[start]] {
            end += 1;
        }
        // ranks are 1-based: the tie group covers start+1 ..= end
        let average_rank = (start + 1 + end) as f64 / 2.0;
        let tied_positives = order[start..end]
            .iter()
            .filter(|&&index| y_true[index] == 1)
            .count() as f64;
        positive_rank_sum += average_rank * tied_positives;
        start = end;
    }

    let u = positive_rank_sum - positives * (positives + 1.0) / 2.0;
    Ok(u / (positives * negatives))
}

/// Average precision: precision at each distinct score weighted by the recall
/// gained there.
fn average_precision(y_true: &[u8], y_proba: &[f64]) -> Result<f64, MetricsError> {
    let (positives, _) = require_both_classes(y_true, names::AUC_PR)?;

    let mut order: Vec<usize> = (0..y_proba.len()).collect();
    order.sort_by(|&a, &b| match y_proba[b].total_cmp(&y_proba[a]) {
        Ordering::Equal => a.cmp(&b),
        other => other,
    });

    let mut true_positives = 0.0;
    let mut seen = 0.0;
    let mut previous_recall = 0.0;
    let mut score = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end < order.len() && y_proba[order[end]] == y_proba[order[start]] {
            if y_true[order[end]] == 1 {
                true_positives += 1.0;
            }
            seen += 1.0;
            end += 1;
        }
        let recall = true_positives / positives;
        score += (recall - previous_recall) * (true_positives / seen);
        previous_recall = recall;
        start = end;
    }
    Ok(score)
}

fn cohen_kappa(confusion: &ConfusionMatrix) -> f64 {
    let total = confusion.total() as f64;
    if total == 0.0 {
        return 0.0;
    }
    let observed = (confusion.true_positives + confusion.true_negatives) as f64 / total;
    let predicted_positive = (confusion.true_positives + confusion.false_positives) as f64;
    let predicted_negative = (confusion.true_negatives + confusion.false_negatives) as f64;
    let expected = (predicted_positive * confusion.actual_positives() as f64
        + predicted_negative * confusion.actual_negatives() as f64)
        / (total * total);

    if (1.0 - expected).abs() < f64::EPSILON {
        return 0.0;
    }
    (observed - expected) / (1.0 - expected)
}
