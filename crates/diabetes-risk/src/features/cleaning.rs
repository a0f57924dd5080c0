use tracing::info;

use super::{enrich, FeatureError, FeatureStage};
use crate::domain::columns::{EMPLOYMENT_STATUS, GENDER, SMOKING_STATUS};
use crate::domain::{FieldValue, RecordSet};

/// Label substitutions per categorical column. Values not listed pass through.
const SUBSTITUTIONS: [(&str, &[(&str, &str)]); 3] = [
    (GENDER, &[("Other", "Unknown")]),
    (
        EMPLOYMENT_STATUS,
        &[("Retired", "Inactive"), ("Unemployed", "Inactive")],
    ),
    (SMOKING_STATUS, &[("Former", "Ex-Smoker")]),
];

/// Harmonizes free-text category labels before any bucketing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoricalCleaner;

impl CategoricalCleaner {
    /// Canonical label for `value` in `column`.
    pub fn normalize<'a>(column: &str, value: &'a str) -> &'a str {
        SUBSTITUTIONS
            .iter()
            .find(|(name, _)| *name == column)
            .and_then(|(_, table)| table.iter().find(|(from, _)| *from == value))
            .map(|(_, to)| *to)
            .unwrap_or(value)
    }
}

impl FeatureStage for CategoricalCleaner {
    fn name(&self) -> &'static str {
        "cleaning"
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &[]
    }

    fn transform(&self, records: &RecordSet) -> Result<RecordSet, FeatureError> {
        info!("harmonizing categorical labels");
        enrich(self.name(), records, |record| {
            for (column, _) in SUBSTITUTIONS {
                let cleaned = match record.require(column)? {
                    FieldValue::Text(value) => Self::normalize(column, value).to_string(),
                    _ => continue,
                };
                record.set(column, cleaned);
            }
            Ok(())
        })
    }
}
