use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    AgeGroupStrategy, CategoricalCleaner, ClinicalStage, DemographicsStage, FeatureError,
    FeatureStage, LeakageFilter, LifestyleStage, MedicalStage, MetabolicStage,
};
use crate::domain::{PatientRecord, RecordSet};

/// Stage parameters resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub age_group_strategy: AgeGroupStrategy,
}

/// Runs the stages in physiological order: leakage removal, cleaning,
/// demographics, medical, clinical, metabolic, then lifestyle.
pub struct FeatureEngineeringPipeline {
    stages: Vec<Box<dyn FeatureStage>>,
}

impl FeatureEngineeringPipeline {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            stages: vec![
                Box::new(LeakageFilter),
                Box::new(CategoricalCleaner),
                Box::new(DemographicsStage::new(config.age_group_strategy)),
                Box::new(MedicalStage),
                Box::new(ClinicalStage),
                Box::new(MetabolicStage),
                Box::new(LifestyleStage),
            ],
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Every column the pipeline derives, in stage order.
    pub fn derived_columns(&self) -> Vec<&'static str> {
        self.stages
            .iter()
            .flat_map(|stage| stage.output_columns().iter().copied())
            .collect()
    }

    pub fn transform(&self, records: &RecordSet) -> Result<RecordSet, FeatureError> {
        let initial_columns = records.columns().len();
        info!(
            rows = records.len(),
            columns = initial_columns,
            "starting feature engineering"
        );

        let mut current = records.clone();
        for stage in &self.stages {
            current = stage.transform(&current)?;
            debug!(
                stage = stage.name(),
                columns = current.columns().len(),
                "stage complete"
            );
        }

        let final_columns = current.columns().len();
        info!(
            rows = current.len(),
            columns = final_columns,
            added = final_columns as i64 - initial_columns as i64,
            "feature engineering complete"
        );
        Ok(current)
    }

    /// Enriches a single record, e.g. an incoming prediction request.
    pub fn transform_record(&self, record: &PatientRecord) -> Result<PatientRecord, FeatureError> {
        let enriched = self.transform(&RecordSet::from(record.clone()))?;
        Ok(enriched
            .into_records()
            .into_iter()
            .next()
            .unwrap_or_default())
    }
}

impl Default for FeatureEngineeringPipeline {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

impl std::fmt::Debug for FeatureEngineeringPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureEngineeringPipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}
