use std::path::{Path, PathBuf};

use diabetes_risk::dataset::{CsvDatasetRepository, DatasetRepository};
use diabetes_risk::domain::{FeatureSchema, FieldValue, PatientRecord, RecordSet};
use diabetes_risk::features::{
    AgeGroupStrategy, FeatureConfig, FeatureEngineeringPipeline, LEAKAGE_COLUMNS,
};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/patients.csv")
}

fn load() -> RecordSet {
    CsvDatasetRepository::new(fixture())
        .load_dataset()
        .expect("fixture loads")
}

fn text<'a>(record: &'a PatientRecord, column: &str) -> &'a str {
    record
        .text(column)
        .expect("column present")
        .expect("text value")
}

#[test]
fn fixture_conforms_to_the_standard_schema() {
    let records = load();

    assert_eq!(records.len(), 4);
    FeatureSchema::standard()
        .validate_records(&records)
        .expect("fixture is valid");
}

#[test]
fn pipeline_enriches_every_fixture_row() {
    let pipeline = FeatureEngineeringPipeline::new(FeatureConfig::default());
    let enriched = pipeline.transform(&load()).expect("pipeline runs");
    let rows = enriched.records();

    for column in LEAKAGE_COLUMNS {
        assert!(!enriched.has_column(column));
    }
    assert!(enriched.has_column("diagnosed_diabetes"));

    assert_eq!(text(&rows[0], "bp_category"), "Pre-Hypertension");
    assert_eq!(text(&rows[1], "bmi_category"), "Normal");
    assert_eq!(text(&rows[1], "glucose_status"), "Normal");

    assert_eq!(text(&rows[2], "employment_status"), "Inactive");
    assert_eq!(text(&rows[2], "smoking_status"), "Ex-Smoker");
    assert_eq!(text(&rows[2], "bmi_category"), "Overweight");
    assert_eq!(text(&rows[2], "glucose_status"), "Pre-Diabetes");
    assert_eq!(text(&rows[2], "bp_category"), "Hypertension");
    assert_eq!(rows[2].get("hdl_to_ldl_ratio"), Some(&FieldValue::Missing));
    assert_eq!(rows[2].get("sedentary_risk_flag"), Some(&FieldValue::Int(1)));
    assert_eq!(
        rows[2].get("socioeconomic_vulnerability_flag"),
        Some(&FieldValue::Int(1))
    );

    assert_eq!(text(&rows[3], "age_group"), "80+");
    assert_eq!(text(&rows[3], "bmi_category"), "Underweight");
    assert_eq!(text(&rows[3], "hba1c_category"), "Normal");
    assert_eq!(text(&rows[3], "bp_category"), "Normal");
    assert_eq!(rows[3].get("sleep_efficiency"), Some(&FieldValue::Float(2.0)));
}

#[test]
fn coarse_strategy_labels_life_stages() {
    let pipeline = FeatureEngineeringPipeline::new(FeatureConfig {
        age_group_strategy: AgeGroupStrategy::Coarse,
    });
    let enriched = pipeline.transform(&load()).expect("pipeline runs");

    let groups: Vec<&str> = enriched
        .iter()
        .map(|record| text(record, "age_group"))
        .collect();
    assert_eq!(groups, vec!["Adulte", "Jeune", "Senior", "Senior"]);
}

#[test]
fn enriched_dataset_survives_a_save_and_reload() {
    let pipeline = FeatureEngineeringPipeline::default();
    let repository = CsvDatasetRepository::new(fixture());
    let enriched = pipeline
        .transform(&repository.load_dataset().expect("fixture loads"))
        .expect("pipeline runs");

    let output = std::env::temp_dir()
        .join(format!("diabetes-risk-{}", std::process::id()))
        .join("nested/enriched.csv");
    repository
        .save_dataset(&enriched, &output)
        .expect("dataset saved");

    let reloaded = CsvDatasetRepository::new(&output)
        .load_dataset()
        .expect("saved dataset loads");
    assert_eq!(reloaded.len(), enriched.len());
    assert_eq!(reloaded.columns(), enriched.columns());
    assert_eq!(
        reloaded.records()[0].get("homa_ir"),
        enriched.records()[0].get("homa_ir")
    );

    if let Some(root) = output.parent().and_then(Path::parent) {
        let _ = std::fs::remove_dir_all(root);
    }
}
