use crate::domain::columns::*;
use crate::domain::{FieldValue, PatientRecord, RecordError, RecordSet};
use crate::features::{FeatureError, FeatureStage};

/// Raw record for a 45 year old with all five cardiometabolic markers raised.
pub(super) fn patient() -> PatientRecord {
    PatientRecord::new()
        .with(AGE, 45_i64)
        .with(GENDER, "Male")
        .with(ETHNICITY, "White")
        .with(EDUCATION_LEVEL, "Highschool")
        .with(INCOME_LEVEL, "Low")
        .with(EMPLOYMENT_STATUS, "Employed")
        .with(SMOKING_STATUS, "Never")
        .with(ALCOHOL_PER_WEEK, 1_i64)
        .with(ACTIVITY_MINUTES_PER_WEEK, 200_i64)
        .with(DIET_SCORE, 6.5)
        .with(SLEEP_HOURS_PER_DAY, 7.5)
        .with(SCREEN_HOURS_PER_DAY, 3.0)
        .with(FAMILY_HISTORY_DIABETES, 1_i64)
        .with(HYPERTENSION_HISTORY, 0_i64)
        .with(CARDIOVASCULAR_HISTORY, 0_i64)
        .with(BMI, 32.0)
        .with(WAIST_TO_HIP_RATIO, 0.92)
        .with(SYSTOLIC_BP, 135_i64)
        .with(DIASTOLIC_BP, 85_i64)
        .with(HEART_RATE, 72_i64)
        .with(CHOLESTEROL_TOTAL, 210_i64)
        .with(HDL_CHOLESTEROL, 35_i64)
        .with(LDL_CHOLESTEROL, 140_i64)
        .with(TRIGLYCERIDES, 160_i64)
        .with(GLUCOSE_FASTING, 130_i64)
        .with(GLUCOSE_POSTPRANDIAL, 180_i64)
        .with(INSULIN_LEVEL, 12.0)
        .with(HBA1C, 6.8)
}

/// Patient with the leakage columns and target attached, as in a training export.
pub(super) fn labelled_patient() -> PatientRecord {
    patient()
        .with(DIABETES_STAGE, "Type 2")
        .with(DIABETES_RISK_SCORE, 38.5)
        .with(DIAGNOSED_DIABETES, 1_i64)
}

pub(super) fn patient_with(column: &str, value: impl Into<FieldValue>) -> PatientRecord {
    patient().with(column, value)
}

pub(super) fn single(record: PatientRecord) -> RecordSet {
    RecordSet::from(record)
}

/// Runs `stage` on one record and returns the enriched record.
pub(super) fn run_stage(stage: &dyn FeatureStage, record: PatientRecord) -> PatientRecord {
    stage
        .transform(&single(record))
        .expect("stage succeeds")
        .into_records()
        .remove(0)
}

pub(super) fn number(record: &PatientRecord, column: &str) -> f64 {
    record
        .get(column)
        .and_then(FieldValue::as_f64)
        .unwrap_or_else(|| panic!("{column} should be numeric, got {:?}", record.get(column)))
}

pub(super) fn text<'a>(record: &'a PatientRecord, column: &str) -> &'a str {
    record
        .get(column)
        .and_then(FieldValue::as_str)
        .unwrap_or_else(|| panic!("{column} should be text, got {:?}", record.get(column)))
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn assert_missing_column(error: FeatureError, stage: &str, column: &str) {
    assert_eq!(error.column(), Some(column), "unexpected error {error:?}");
    match error {
        FeatureError::Record {
            stage: failed_stage,
            source: RecordError::MissingColumn(_),
            ..
        } => assert_eq!(failed_stage, stage),
        other => panic!("expected missing column failure, got {other:?}"),
    }
}
