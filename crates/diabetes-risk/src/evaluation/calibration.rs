use serde::{Deserialize, Serialize};

use super::EvaluationError;

pub const DEFAULT_CALIBRATION_BINS: usize = 10;

/// Reliability curve: mean predicted probability against observed positive
/// frequency, one point per bin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCurve {
    pub mean_predicted: Vec<f64>,
    pub fraction_positive: Vec<f64>,
}

impl CalibrationCurve {
    pub fn len(&self) -> usize {
        self.mean_predicted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean_predicted.is_empty()
    }
}

/// Sorts predictions by probability and groups them into equal-count bins of
/// `max(1, n / n_bins)` items; the last bin may be short.
pub fn calibration_points(
    y_true: &[u8],
    y_proba: &[f64],
    n_bins: usize,
) -> Result<CalibrationCurve, EvaluationError> {
    if y_true.len() != y_proba.len() {
        return Err(EvaluationError::LengthMismatch {
            labels: y_true.len(),
            predictions: y_proba.len(),
        });
    }

    let mut pairs: Vec<(f64, u8)> = y_proba.iter().copied().zip(y_true.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let bin_size = (pairs.len() / n_bins.max(1)).max(1);
    let mut curve = CalibrationCurve::default();
    for chunk in pairs.chunks(bin_size) {
        let count = chunk.len() as f64;
        let probability_sum: f64 = chunk.iter().map(|(probability, _)| probability).sum();
        let positives = chunk.iter().filter(|(_, label)| *label == 1).count() as f64;
        curve.mean_predicted.push(probability_sum / count);
        curve.fraction_positive.push(positives / count);
    }
    Ok(curve)
}
