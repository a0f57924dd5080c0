use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{enrich, FeatureError, FeatureStage};
use crate::domain::columns::{AGE, EDUCATION_LEVEL, INCOME_LEVEL};
use crate::domain::{FieldValue, RecordSet};

const VULNERABLE_INCOME: [&str; 2] = ["Low", "Lower-Middle"];
const VULNERABLE_EDUCATION: [&str; 2] = ["No formal", "Highschool"];

/// Lower bounds (inclusive) and labels for each age bucket.
const DETAILED_AGE_GROUPS: [(f64, &str); 7] = [
    (0.0, "<30"),
    (30.0, "30–39"),
    (40.0, "40–49"),
    (50.0, "50–59"),
    (60.0, "60–69"),
    (70.0, "70–79"),
    (80.0, "80+"),
];
const COARSE_AGE_GROUPS: [(f64, &str); 3] = [(0.0, "Jeune"), (30.0, "Adulte"), (60.0, "Senior")];

/// Granularity of the age bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroupStrategy {
    #[default]
    Detailed,
    Coarse,
}

impl AgeGroupStrategy {
    /// Bucket label for `age`; negative ages have no bucket.
    pub fn bucket(self, age: f64) -> Option<&'static str> {
        let groups: &[(f64, &str)] = match self {
            AgeGroupStrategy::Detailed => &DETAILED_AGE_GROUPS,
            AgeGroupStrategy::Coarse => &COARSE_AGE_GROUPS,
        };
        groups
            .iter()
            .rev()
            .find(|(lower, _)| age >= *lower)
            .map(|(_, label)| *label)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgeGroupStrategy::Detailed => "detailed",
            AgeGroupStrategy::Coarse => "coarse",
        }
    }
}

impl FromStr for AgeGroupStrategy {
    type Err = FeatureError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "detailed" => Ok(Self::Detailed),
            "coarse" => Ok(Self::Coarse),
            _ => Err(FeatureError::UnknownAgeGroupStrategy(value.to_string())),
        }
    }
}

impl fmt::Display for AgeGroupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Age buckets, non-linear age term and socioeconomic vulnerability.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemographicsStage {
    strategy: AgeGroupStrategy,
}

impl DemographicsStage {
    pub fn new(strategy: AgeGroupStrategy) -> Self {
        Self { strategy }
    }

    /// Builds the stage from a configured strategy name.
    pub fn from_strategy_name(name: &str) -> Result<Self, FeatureError> {
        Ok(Self::new(name.parse()?))
    }

    pub fn strategy(&self) -> AgeGroupStrategy {
        self.strategy
    }
}

impl FeatureStage for DemographicsStage {
    fn name(&self) -> &'static str {
        "demographics"
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &["age_group", "age_squared", "socioeconomic_vulnerability_flag"]
    }

    fn transform(&self, records: &RecordSet) -> Result<RecordSet, FeatureError> {
        info!(strategy = %self.strategy, "deriving demographic features");
        enrich(self.name(), records, |record| {
            let age = record.number(AGE)?;
            let income = record.text(INCOME_LEVEL)?;
            let education = record.text(EDUCATION_LEVEL)?;

            let vulnerable = income.is_some_and(|value| VULNERABLE_INCOME.contains(&value))
                && education.is_some_and(|value| VULNERABLE_EDUCATION.contains(&value));

            record.set("age_group", FieldValue::category(self.strategy.bucket(age)));
            record.set("age_squared", age * age);
            record.set(
                "socioeconomic_vulnerability_flag",
                FieldValue::flag(vulnerable),
            );
            Ok(())
        })
    }
}
