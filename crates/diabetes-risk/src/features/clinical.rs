use tracing::info;

use super::{enrich, guarded_ratio, optional, FeatureError, FeatureStage, ZeroDenominator};
use crate::domain::columns::{
    BMI, CHOLESTEROL_TOTAL, GLUCOSE_FASTING, GLUCOSE_POSTPRANDIAL, HDL_CHOLESTEROL,
    LDL_CHOLESTEROL,
};
use crate::domain::RecordSet;

/// Lipid ratios and glycemic interactions between biomarkers.
///
/// Lipid ratios with a zero denominator are recorded as missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClinicalStage;

impl FeatureStage for ClinicalStage {
    fn name(&self) -> &'static str {
        "clinical"
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &[
            "hdl_to_ldl_ratio",
            "cholesterol_ratio",
            "bmi_glucose_interaction",
            "glucose_diff",
        ]
    }

    fn transform(&self, records: &RecordSet) -> Result<RecordSet, FeatureError> {
        info!("deriving clinical ratios and interactions");
        enrich(self.name(), records, |record| {
            let hdl = record.number(HDL_CHOLESTEROL)?;
            let ldl = record.number(LDL_CHOLESTEROL)?;
            let total = record.number(CHOLESTEROL_TOTAL)?;
            let bmi = record.number(BMI)?;
            let fasting = record.number(GLUCOSE_FASTING)?;
            let postprandial = record.number(GLUCOSE_POSTPRANDIAL)?;

            record.set(
                "hdl_to_ldl_ratio",
                optional(guarded_ratio(hdl, ldl, ZeroDenominator::Missing)),
            );
            record.set(
                "cholesterol_ratio",
                optional(guarded_ratio(total, hdl, ZeroDenominator::Missing)),
            );
            record.set("bmi_glucose_interaction", bmi * fasting);
            record.set("glucose_diff", postprandial - fasting);
            Ok(())
        })
    }
}
