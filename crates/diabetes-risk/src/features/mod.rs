//! Feature engineering stages and the pipeline that orders them.
//!
//! Every stage takes a borrowed [`RecordSet`] and returns an enriched copy, so
//! callers keep their raw input untouched. Stages fail on the first record
//! that lacks a column they read; no partial output is returned.

mod cleaning;
mod clinical;
mod demographics;
mod leakage;
mod lifestyle;
mod medical;
mod metabolic;
mod pipeline;

#[cfg(test)]
mod tests;

pub use cleaning::CategoricalCleaner;
pub use clinical::ClinicalStage;
pub use demographics::{AgeGroupStrategy, DemographicsStage};
pub use leakage::{LeakageFilter, LEAKAGE_COLUMNS};
pub use lifestyle::LifestyleStage;
pub use medical::{
    bmi_category, bp_category, glucose_status, hba1c_category, CardiometabolicMarkers, MedicalStage,
};
pub use metabolic::MetabolicStage;
pub use pipeline::{FeatureConfig, FeatureEngineeringPipeline};

use crate::domain::{FieldValue, PatientRecord, RecordError, RecordSet};

/// Single transformation step of the pipeline.
pub trait FeatureStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Columns this stage adds to every record.
    fn output_columns(&self) -> &'static [&'static str];

    fn transform(&self, records: &RecordSet) -> Result<RecordSet, FeatureError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("{stage} stage failed on record {row}: {source}")]
    Record {
        stage: &'static str,
        row: usize,
        source: RecordError,
    },
    #[error("unknown age group strategy `{0}`; expected `detailed` or `coarse`")]
    UnknownAgeGroupStrategy(String),
}

impl FeatureError {
    /// Column named by a record failure, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            FeatureError::Record { source, .. } => match source {
                RecordError::MissingColumn(column) => Some(column),
                RecordError::NotNumeric { column, .. } => Some(column),
            },
            FeatureError::UnknownAgeGroupStrategy(_) => None,
        }
    }
}

/// Applies `derive` to a copy of every record, tagging failures with the row.
pub(crate) fn enrich<F>(
    stage: &'static str,
    records: &RecordSet,
    mut derive: F,
) -> Result<RecordSet, FeatureError>
where
    F: FnMut(&mut PatientRecord) -> Result<(), RecordError>,
{
    let mut enriched = records.clone();
    for (row, record) in enriched.iter_mut().enumerate() {
        derive(record).map_err(|source| FeatureError::Record { stage, row, source })?;
    }
    Ok(enriched)
}

/// Value used when a ratio's denominator is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ZeroDenominator {
    Missing,
    Zero,
}

pub(crate) fn guarded_ratio(
    numerator: f64,
    denominator: f64,
    fallback: ZeroDenominator,
) -> Option<f64> {
    if denominator == 0.0 {
        return match fallback {
            ZeroDenominator::Missing => None,
            ZeroDenominator::Zero => Some(0.0),
        };
    }
    Some(numerator / denominator)
}

/// Upper clip that leaves missing values missing.
pub(crate) fn clip_upper(value: Option<f64>, upper: f64) -> FieldValue {
    match value {
        Some(value) => FieldValue::Float(value.min(upper)),
        None => FieldValue::Missing,
    }
}

pub(crate) fn optional(value: Option<f64>) -> FieldValue {
    value.map(FieldValue::Float).unwrap_or(FieldValue::Missing)
}
