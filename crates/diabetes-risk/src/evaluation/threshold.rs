/// Converts probabilities into binary decisions at a fixed cutoff.
pub struct ThresholdService;

impl ThresholdService {
    /// Label is 1 when the probability reaches the threshold; equality counts
    /// as positive. Probabilities are not range-checked here.
    pub fn apply(probabilities: &[f64], threshold: f64) -> Vec<u8> {
        probabilities
            .iter()
            .map(|probability| u8::from(*probability >= threshold))
            .collect()
    }
}
