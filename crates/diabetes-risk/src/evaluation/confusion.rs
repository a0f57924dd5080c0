use serde::{Deserialize, Serialize};

use super::EvaluationError;

/// Axis along which a confusion matrix is normalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Each true-class row sums to 1.
    Row,
    /// Each predicted-class column sums to 1.
    Column,
}

/// Binary confusion counts with the error rates derived from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negatives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    pub true_positives: u64,
}

impl ConfusionMatrix {
    pub fn new(
        true_negatives: u64,
        false_positives: u64,
        false_negatives: u64,
        true_positives: u64,
    ) -> Self {
        Self {
            true_negatives,
            false_positives,
            false_negatives,
            true_positives,
        }
    }

    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Result<Self, EvaluationError> {
        if y_true.len() != y_pred.len() {
            return Err(EvaluationError::LengthMismatch {
                labels: y_true.len(),
                predictions: y_pred.len(),
            });
        }

        let mut matrix = Self::default();
        for (index, (&actual, &predicted)) in y_true.iter().zip(y_pred).enumerate() {
            match (actual, predicted) {
                (0, 0) => matrix.true_negatives += 1,
                (0, 1) => matrix.false_positives += 1,
                (1, 0) => matrix.false_negatives += 1,
                (1, 1) => matrix.true_positives += 1,
                (0 | 1, value) | (value, _) => {
                    return Err(EvaluationError::InvalidLabel { index, value });
                }
            }
        }
        Ok(matrix)
    }

    pub fn total(&self) -> u64 {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }

    pub fn actual_positives(&self) -> u64 {
        self.false_negatives + self.true_positives
    }

    pub fn actual_negatives(&self) -> u64 {
        self.true_negatives + self.false_positives
    }

    /// FP / (FP + TN), 0 when there are no actual negatives.
    pub fn false_positive_rate(&self) -> f64 {
        ratio(self.false_positives, self.actual_negatives())
    }

    /// FN / (FN + TP), 0 when there are no actual positives.
    pub fn false_negative_rate(&self) -> f64 {
        ratio(self.false_negatives, self.actual_positives())
    }

    /// Matthews correlation coefficient; 0 whenever any margin is empty.
    pub fn mcc(&self) -> f64 {
        let tp = self.true_positives as f64;
        let tn = self.true_negatives as f64;
        let fp = self.false_positives as f64;
        let fn_ = self.false_negatives as f64;

        let denominator = ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();
        if denominator == 0.0 || !denominator.is_finite() {
            return 0.0;
        }
        (tp * tn - fp * fn_) / denominator
    }

    /// Rows are the true class, columns the predicted class, negatives first.
    pub fn matrix(&self) -> [[u64; 2]; 2] {
        [
            [self.true_negatives, self.false_positives],
            [self.false_negatives, self.true_positives],
        ]
    }

    pub fn normalized(&self, normalization: Normalization) -> [[f64; 2]; 2] {
        let counts = self.matrix();
        let mut normalized = [[0.0; 2]; 2];
        for (row, cells) in counts.iter().enumerate() {
            for (column, &count) in cells.iter().enumerate() {
                let sum = match normalization {
                    Normalization::Row => counts[row][0] + counts[row][1],
                    Normalization::Column => counts[0][column] + counts[1][column],
                };
                normalized[row][column] = ratio(count, sum);
            }
        }
        normalized
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
