use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const PREVENTION_THRESHOLD: f64 = 0.30;
const DIAGNOSTIC_THRESHOLD: f64 = 0.70;
const BALANCED_THRESHOLD: f64 = 0.50;

/// Business cutoff turning a probability into a positive decision.
///
/// The threshold always lies strictly between 0 and 1. Presets trade false
/// negatives against false positives: `prevention` screens wide, `diagnostic`
/// asks for stronger evidence, `balanced` sits in between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DecisionThresholdPolicy {
    threshold: f64,
}

impl DecisionThresholdPolicy {
    pub fn new(threshold: f64) -> Result<Self, PolicyError> {
        if threshold > 0.0 && threshold < 1.0 {
            Ok(Self { threshold })
        } else {
            Err(PolicyError::OutOfRange(threshold))
        }
    }

    pub fn prevention() -> Self {
        Self {
            threshold: PREVENTION_THRESHOLD,
        }
    }

    pub fn diagnostic() -> Self {
        Self {
            threshold: DIAGNOSTIC_THRESHOLD,
        }
    }

    pub fn balanced() -> Self {
        Self {
            threshold: BALANCED_THRESHOLD,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for DecisionThresholdPolicy {
    fn default() -> Self {
        Self::balanced()
    }
}

impl TryFrom<f64> for DecisionThresholdPolicy {
    type Error = PolicyError;

    fn try_from(threshold: f64) -> Result<Self, Self::Error> {
        Self::new(threshold)
    }
}

impl From<DecisionThresholdPolicy> for f64 {
    fn from(policy: DecisionThresholdPolicy) -> Self {
        policy.threshold
    }
}

impl FromStr for DecisionThresholdPolicy {
    type Err = PolicyError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "prevention" => Ok(Self::prevention()),
            "diagnostic" => Ok(Self::diagnostic()),
            "balanced" => Ok(Self::balanced()),
            _ => Err(PolicyError::UnknownPreset(name.to_string())),
        }
    }
}

impl fmt::Display for DecisionThresholdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.threshold)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("decision threshold must lie strictly between 0 and 1, got {0}")]
    OutOfRange(f64),
    #[error("unknown decision policy `{0}`; expected prevention, diagnostic or balanced")]
    UnknownPreset(String),
}
