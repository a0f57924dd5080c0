//! Interpretation of a single model probability for one patient.

mod use_case;

pub use use_case::PredictPatientUseCase;

use serde::{Deserialize, Serialize};

use crate::domain::{PatientRecord, SchemaError};
use crate::evaluation::DecisionThresholdPolicy;
use crate::features::FeatureError;

/// Qualitative risk band shown to clinicians.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Faible")]
    Low,
    #[serde(rename = "Modéré")]
    Moderate,
    #[serde(rename = "Élevé")]
    High,
    #[serde(rename = "Très élevé")]
    VeryHigh,
}

impl RiskLevel {
    /// Left-closed bands at 0.20, 0.50 and 0.80.
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.20 {
            RiskLevel::Low
        } else if probability < 0.50 {
            RiskLevel::Moderate
        } else if probability < 0.80 {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Faible",
            RiskLevel::Moderate => "Modéré",
            RiskLevel::High => "Élevé",
            RiskLevel::VeryHigh => "Très élevé",
        }
    }
}

pub const DIABETIC_TAG: &str = "Diabetic";
pub const NON_DIABETIC_TAG: &str = "Non-Diabetic";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiabetesPrediction {
    pub probability: f64,
    pub predicted_label: u8,
    pub tag_label: String,
    pub risk_level: RiskLevel,
    pub threshold_used: f64,
    pub explanation: Option<String>,
}

/// Inference capability: probability of diabetes for an enriched record.
pub trait ProbabilityModel: Send + Sync {
    fn predict_proba(&self, features: &PatientRecord) -> Result<f64, ModelError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("model inference failed: {0}")]
pub struct ModelError(pub String);

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Features(#[from] FeatureError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),
}

/// Applies the decision threshold to one probability.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionService {
    policy: DecisionThresholdPolicy,
}

impl PredictionService {
    pub fn new(policy: DecisionThresholdPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DecisionThresholdPolicy {
        self.policy
    }

    pub fn interpret(&self, probability: f64) -> Result<DiabetesPrediction, PredictionError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictionError::InvalidProbability(probability));
        }

        let threshold = self.policy.threshold();
        let positive = probability >= threshold;
        let risk_level = RiskLevel::from_probability(probability);

        Ok(DiabetesPrediction {
            probability,
            predicted_label: u8::from(positive),
            tag_label: if positive { DIABETIC_TAG } else { NON_DIABETIC_TAG }.to_string(),
            risk_level,
            threshold_used: threshold,
            explanation: Some(format!(
                "Estimated diabetes probability {:.2}%, risk level: {}.",
                probability * 100.0,
                risk_level.label()
            )),
        })
    }

    pub fn predict<M>(
        &self,
        model: &M,
        features: &PatientRecord,
    ) -> Result<DiabetesPrediction, PredictionError>
    where
        M: ProbabilityModel + ?Sized,
    {
        let probability = model.predict_proba(features)?;
        self.interpret(probability)
    }
}
