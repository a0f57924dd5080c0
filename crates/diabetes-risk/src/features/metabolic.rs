use tracing::info;

use super::medical::CardiometabolicMarkers;
use super::{enrich, guarded_ratio, optional, FeatureError, FeatureStage, ZeroDenominator};
use crate::domain::columns::DIASTOLIC_BP;
use crate::domain::{FieldValue, RecordSet};

/// Cumulative cardiometabolic load: glycemic load, dyslipidemia, burden score
/// and blood pressure ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetabolicStage;

impl FeatureStage for MetabolicStage {
    fn name(&self) -> &'static str {
        "metabolic"
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &[
            "glycemic_load",
            "dyslipidemia_flag",
            "cardiometabolic_burden_score",
            "bp_ratio",
        ]
    }

    fn transform(&self, records: &RecordSet) -> Result<RecordSet, FeatureError> {
        info!("deriving metabolic burden features");
        enrich(self.name(), records, |record| {
            let markers = CardiometabolicMarkers::from_record(record)?;
            let diastolic = record.number(DIASTOLIC_BP)?;

            record.set("glycemic_load", markers.glucose_fasting * markers.bmi);
            record.set(
                "dyslipidemia_flag",
                FieldValue::flag(markers.high_triglycerides() || markers.low_hdl()),
            );
            record.set(
                "cardiometabolic_burden_score",
                i64::from(markers.criteria_met()),
            );
            record.set(
                "bp_ratio",
                optional(guarded_ratio(
                    markers.systolic_bp,
                    diastolic,
                    ZeroDenominator::Missing,
                )),
            );
            Ok(())
        })
    }
}
