use tracing::info;

use super::{FeatureError, FeatureStage};
use crate::domain::columns::{DIABETES_RISK_SCORE, DIABETES_STAGE};
use crate::domain::RecordSet;

/// Columns that encode or summarize the diagnosis and must never reach a model.
pub const LEAKAGE_COLUMNS: [&str; 2] = [DIABETES_STAGE, DIABETES_RISK_SCORE];

/// Drops leakage columns; a no-op when none are present.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeakageFilter;

impl FeatureStage for LeakageFilter {
    fn name(&self) -> &'static str {
        "leakage"
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &[]
    }

    fn transform(&self, records: &RecordSet) -> Result<RecordSet, FeatureError> {
        let present: Vec<&str> = LEAKAGE_COLUMNS
            .iter()
            .copied()
            .filter(|column| records.has_column(column))
            .collect();

        if present.is_empty() {
            info!("no leakage columns detected");
            return Ok(records.clone());
        }

        info!(columns = ?present, "dropping leakage columns");
        let mut filtered = records.clone();
        for record in filtered.iter_mut() {
            for column in &present {
                record.remove(column);
            }
        }
        Ok(filtered)
    }
}
