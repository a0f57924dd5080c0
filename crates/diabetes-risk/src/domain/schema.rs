use serde::{Deserialize, Serialize};

use super::record::{FieldValue, PatientRecord, RecordSet};

/// Raw dataset column names.
pub mod columns {
    pub const AGE: &str = "age";
    pub const GENDER: &str = "gender";
    pub const ETHNICITY: &str = "ethnicity";
    pub const EDUCATION_LEVEL: &str = "education_level";
    pub const INCOME_LEVEL: &str = "income_level";
    pub const EMPLOYMENT_STATUS: &str = "employment_status";
    pub const SMOKING_STATUS: &str = "smoking_status";
    pub const ALCOHOL_PER_WEEK: &str = "alcohol_consumption_per_week";
    pub const ACTIVITY_MINUTES_PER_WEEK: &str = "physical_activity_minutes_per_week";
    pub const DIET_SCORE: &str = "diet_score";
    pub const SLEEP_HOURS_PER_DAY: &str = "sleep_hours_per_day";
    pub const SCREEN_HOURS_PER_DAY: &str = "screen_time_hours_per_day";
    pub const FAMILY_HISTORY_DIABETES: &str = "family_history_diabetes";
    pub const HYPERTENSION_HISTORY: &str = "hypertension_history";
    pub const CARDIOVASCULAR_HISTORY: &str = "cardiovascular_history";
    pub const BMI: &str = "bmi";
    pub const WAIST_TO_HIP_RATIO: &str = "waist_to_hip_ratio";
    pub const SYSTOLIC_BP: &str = "systolic_bp";
    pub const DIASTOLIC_BP: &str = "diastolic_bp";
    pub const HEART_RATE: &str = "heart_rate";
    pub const CHOLESTEROL_TOTAL: &str = "cholesterol_total";
    pub const HDL_CHOLESTEROL: &str = "hdl_cholesterol";
    pub const LDL_CHOLESTEROL: &str = "ldl_cholesterol";
    pub const TRIGLYCERIDES: &str = "triglycerides";
    pub const GLUCOSE_FASTING: &str = "glucose_fasting";
    pub const GLUCOSE_POSTPRANDIAL: &str = "glucose_postprandial";
    pub const INSULIN_LEVEL: &str = "insulin_level";
    pub const HBA1C: &str = "hba1c";
    pub const DIABETES_RISK_SCORE: &str = "diabetes_risk_score";
    pub const DIABETES_STAGE: &str = "diabetes_stage";
    pub const DIAGNOSED_DIABETES: &str = "diagnosed_diabetes";
}

/// Primitive type expected for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Int,
    Float,
    Text,
}

impl ColumnType {
    /// Floats accept integer cells; nothing accepts a missing cell.
    pub fn accepts(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (ColumnType::Int, FieldValue::Int(_))
                | (ColumnType::Float, FieldValue::Int(_) | FieldValue::Float(_))
                | (ColumnType::Text, FieldValue::Text(_))
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ColumnType::Int => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
        }
    }
}

/// Whether a column is a model input, a leakage column, or the training target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Feature,
    Leakage,
    Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub role: ColumnRole,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("missing column `{0}`")]
    MissingColumn(String),
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
    #[error("column `{column}` must be {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("record {row} violates the feature schema: {violation}")]
pub struct SchemaError {
    pub row: usize,
    #[source]
    pub violation: SchemaViolation,
}

/// Structural contract for raw patient records.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<ColumnSpec>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// Columns of the lifestyle/diabetes dataset.
    pub fn standard() -> Self {
        use columns::*;
        use ColumnRole::{Feature, Leakage, Target};
        use ColumnType::{Float, Int, Text};

        let spec = |name, column_type, role| ColumnSpec {
            name,
            column_type,
            role,
        };

        Self::new(vec![
            spec(AGE, Int, Feature),
            spec(GENDER, Text, Feature),
            spec(ETHNICITY, Text, Feature),
            spec(EDUCATION_LEVEL, Text, Feature),
            spec(INCOME_LEVEL, Text, Feature),
            spec(EMPLOYMENT_STATUS, Text, Feature),
            spec(SMOKING_STATUS, Text, Feature),
            spec(ALCOHOL_PER_WEEK, Int, Feature),
            spec(ACTIVITY_MINUTES_PER_WEEK, Int, Feature),
            spec(DIET_SCORE, Float, Feature),
            spec(SLEEP_HOURS_PER_DAY, Float, Feature),
            spec(SCREEN_HOURS_PER_DAY, Float, Feature),
            spec(FAMILY_HISTORY_DIABETES, Int, Feature),
            spec(HYPERTENSION_HISTORY, Int, Feature),
            spec(CARDIOVASCULAR_HISTORY, Int, Feature),
            spec(BMI, Float, Feature),
            spec(WAIST_TO_HIP_RATIO, Float, Feature),
            spec(SYSTOLIC_BP, Int, Feature),
            spec(DIASTOLIC_BP, Int, Feature),
            spec(HEART_RATE, Int, Feature),
            spec(CHOLESTEROL_TOTAL, Int, Feature),
            spec(HDL_CHOLESTEROL, Int, Feature),
            spec(LDL_CHOLESTEROL, Int, Feature),
            spec(TRIGLYCERIDES, Int, Feature),
            spec(GLUCOSE_FASTING, Int, Feature),
            spec(GLUCOSE_POSTPRANDIAL, Int, Feature),
            spec(INSULIN_LEVEL, Float, Feature),
            spec(HBA1C, Float, Feature),
            spec(DIABETES_RISK_SCORE, Float, Leakage),
            spec(DIABETES_STAGE, Text, Leakage),
            spec(DIAGNOSED_DIABETES, Int, Target),
        ])
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|spec| spec.name == name)
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns
            .iter()
            .filter(|spec| spec.role == ColumnRole::Feature)
    }

    pub fn columns_with_role(&self, role: ColumnRole) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .filter(move |spec| spec.role == role)
            .map(|spec| spec.name)
    }

    /// Checks presence and primitive type of every column. Leakage and target
    /// columns may be absent but are type-checked when supplied.
    pub fn validate(&self, record: &PatientRecord) -> Result<(), SchemaViolation> {
        for spec in &self.columns {
            let value = match record.get(spec.name) {
                Some(value) => value,
                None if spec.role == ColumnRole::Feature => {
                    return Err(SchemaViolation::MissingColumn(spec.name.to_string()));
                }
                None => continue,
            };

            if !spec.column_type.accepts(value) {
                return Err(SchemaViolation::TypeMismatch {
                    column: spec.name.to_string(),
                    expected: spec.column_type.label(),
                    found: value.kind(),
                });
            }
        }

        if let Some(unknown) = record.columns().find(|column| self.column(column).is_none()) {
            return Err(SchemaViolation::UnknownColumn(unknown.to_string()));
        }

        Ok(())
    }

    pub fn validate_records(&self, records: &RecordSet) -> Result<(), SchemaError> {
        for (row, record) in records.iter().enumerate() {
            self.validate(record)
                .map_err(|violation| SchemaError { row, violation })?;
        }
        Ok(())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::standard()
    }
}
