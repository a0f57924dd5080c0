use super::common::*;
use crate::domain::columns::*;
use crate::domain::{FieldValue, RecordSet};
use crate::features::{
    AgeGroupStrategy, FeatureConfig, FeatureEngineeringPipeline, LEAKAGE_COLUMNS,
};

fn pipeline() -> FeatureEngineeringPipeline {
    FeatureEngineeringPipeline::new(FeatureConfig {
        age_group_strategy: AgeGroupStrategy::Detailed,
    })
}

fn cohort() -> RecordSet {
    RecordSet::new(vec![
        labelled_patient(),
        patient()
            .with(AGE, 72_i64)
            .with(GENDER, "Other")
            .with(SMOKING_STATUS, "Former")
            .with(BMI, 23.1)
            .with(GLUCOSE_FASTING, 92_i64)
            .with(DIABETES_STAGE, "No Diabetes"),
        patient()
            .with(AGE, 24_i64)
            .with(LDL_CHOLESTEROL, 0_i64)
            .with(SLEEP_HOURS_PER_DAY, 0.0),
    ])
}

#[test]
fn stages_run_in_physiological_order() {
    assert_eq!(
        pipeline().stage_names(),
        vec![
            "leakage",
            "cleaning",
            "demographics",
            "medical",
            "clinical",
            "metabolic",
            "lifestyle"
        ]
    );
}

#[test]
fn enriched_output_never_contains_leakage_columns() {
    let enriched = pipeline().transform(&cohort()).expect("pipeline runs");

    for column in LEAKAGE_COLUMNS {
        assert!(!enriched.has_column(column), "{column} leaked");
    }
    assert_eq!(enriched.len(), 3);
}

#[test]
fn target_column_passes_through_untouched() {
    let enriched = pipeline()
        .transform(&single(labelled_patient()))
        .expect("pipeline runs");

    assert_eq!(
        enriched.records()[0].get(DIAGNOSED_DIABETES),
        Some(&FieldValue::Int(1))
    );
}

#[test]
fn end_to_end_patient_is_flagged() {
    let enriched = pipeline()
        .transform(&single(patient()))
        .expect("pipeline runs");
    let record = &enriched.records()[0];

    assert_eq!(text(record, "glucose_status"), "Diabetes");
    assert_eq!(text(record, "bmi_category"), "Obese");
    assert_eq!(text(record, "bp_category"), "Pre-Hypertension");
    assert_close(number(record, "metabolic_syndrome_flag"), 1.0);
    assert_close(number(record, "cardiometabolic_burden_score"), 5.0);
    assert_close(number(record, "socioeconomic_vulnerability_flag"), 1.0);
    assert_eq!(text(record, "age_group"), "40–49");
}

#[test]
fn every_derived_column_is_present() {
    let pipeline = pipeline();
    let enriched = pipeline.transform(&cohort()).expect("pipeline runs");

    let derived = pipeline.derived_columns();
    assert_eq!(derived.len(), 23);
    for record in enriched.iter() {
        for column in &derived {
            assert!(record.contains(column), "{column} missing");
        }
    }
}

#[test]
fn input_records_are_not_mutated() {
    let input = cohort();
    let snapshot = input.clone();

    pipeline().transform(&input).expect("pipeline runs");

    assert_eq!(input, snapshot);
}

#[test]
fn rerunning_on_enriched_output_is_stable() {
    let pipeline = pipeline();
    let once = pipeline.transform(&cohort()).expect("first pass");
    let twice = pipeline.transform(&once).expect("second pass");

    assert_eq!(once, twice);
}

#[test]
fn categorical_cleaning_runs_before_scoring() {
    let enriched = pipeline().transform(&cohort()).expect("pipeline runs");
    let record = &enriched.records()[1];

    assert_eq!(text(record, GENDER), "Unknown");
    assert_eq!(text(record, SMOKING_STATUS), "Ex-Smoker");
    assert_close(number(record, "lifestyle_score"), 8.0);
    assert_eq!(text(record, "age_group"), "70–79");
}

#[test]
fn guarded_ratios_survive_the_full_pipeline() {
    let enriched = pipeline().transform(&cohort()).expect("pipeline runs");
    let record = &enriched.records()[2];

    assert_eq!(record.get("hdl_to_ldl_ratio"), Some(&FieldValue::Missing));
    assert_eq!(record.get("screen_sleep_ratio"), Some(&FieldValue::Missing));
    assert_close(number(record, "sleep_efficiency"), 0.0);
}

#[test]
fn failure_aborts_the_whole_batch() {
    let mut broken = patient();
    broken.remove(TRIGLYCERIDES);
    let records = RecordSet::new(vec![patient(), broken]);

    let error = pipeline().transform(&records).expect_err("missing column fails");

    assert_eq!(error.column(), Some(TRIGLYCERIDES));
    assert!(error.to_string().contains("record 1"));
}

#[test]
fn single_record_transform_matches_batch() {
    let pipeline = pipeline();
    let record = patient();

    let enriched = pipeline.transform_record(&record).expect("pipeline runs");
    let batch = pipeline.transform(&single(record)).expect("pipeline runs");

    assert_eq!(&enriched, &batch.records()[0]);
}
