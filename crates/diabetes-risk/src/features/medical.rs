use tracing::info;

use super::{enrich, FeatureError, FeatureStage};
use crate::domain::columns::{
    BMI, DIASTOLIC_BP, GLUCOSE_FASTING, HBA1C, HDL_CHOLESTEROL, INSULIN_LEVEL, SYSTOLIC_BP,
    TRIGLYCERIDES,
};
use crate::domain::{FieldValue, PatientRecord, RecordError, RecordSet};

const HOMA_IR_DIVISOR: f64 = 405.0;
const INSULIN_RESISTANCE_CUTOFF: f64 = 2.5;
const METABOLIC_SYNDROME_MIN_CRITERIA: u8 = 3;

/// Right-closed buckets: a value belongs to the first band whose upper bound it
/// does not exceed. Values at or below zero fall outside every band.
const GLUCOSE_BANDS: [(f64, &str); 3] = [
    (99.0, "Normal"),
    (125.0, "Pre-Diabetes"),
    (f64::INFINITY, "Diabetes"),
];
const HBA1C_BANDS: [(f64, &str); 3] = [
    (5.7, "Normal"),
    (6.4, "Pre-Diabetes"),
    (f64::INFINITY, "Diabetes"),
];
const BMI_BANDS: [(f64, &str); 4] = [
    (18.5, "Underweight"),
    (24.9, "Normal"),
    (29.9, "Overweight"),
    (f64::INFINITY, "Obese"),
];

fn band(value: f64, bands: &[(f64, &'static str)]) -> Option<&'static str> {
    if !(value > 0.0) {
        return None;
    }
    bands
        .iter()
        .find(|(upper, _)| value <= *upper)
        .map(|(_, label)| *label)
}

pub fn glucose_status(glucose_fasting: f64) -> Option<&'static str> {
    band(glucose_fasting, &GLUCOSE_BANDS)
}

pub fn hba1c_category(hba1c: f64) -> Option<&'static str> {
    band(hba1c, &HBA1C_BANDS)
}

pub fn bmi_category(bmi: f64) -> Option<&'static str> {
    band(bmi, &BMI_BANDS)
}

pub fn bp_category(systolic: f64, diastolic: f64) -> &'static str {
    if systolic < 120.0 && diastolic < 80.0 {
        "Normal"
    } else if (120.0..=139.0).contains(&systolic) || (80.0..=89.0).contains(&diastolic) {
        "Pre-Hypertension"
    } else {
        "Hypertension"
    }
}

/// The five NCEP-ATP III style markers shared by the medical and metabolic stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardiometabolicMarkers {
    pub bmi: f64,
    pub systolic_bp: f64,
    pub triglycerides: f64,
    pub hdl_cholesterol: f64,
    pub glucose_fasting: f64,
}

impl CardiometabolicMarkers {
    pub fn from_record(record: &PatientRecord) -> Result<Self, RecordError> {
        Ok(Self {
            bmi: record.number(BMI)?,
            systolic_bp: record.number(SYSTOLIC_BP)?,
            triglycerides: record.number(TRIGLYCERIDES)?,
            hdl_cholesterol: record.number(HDL_CHOLESTEROL)?,
            glucose_fasting: record.number(GLUCOSE_FASTING)?,
        })
    }

    pub fn obese(&self) -> bool {
        self.bmi >= 30.0
    }

    pub fn elevated_systolic(&self) -> bool {
        self.systolic_bp >= 130.0
    }

    pub fn high_triglycerides(&self) -> bool {
        self.triglycerides >= 150.0
    }

    pub fn low_hdl(&self) -> bool {
        self.hdl_cholesterol < 40.0
    }

    pub fn elevated_glucose(&self) -> bool {
        self.glucose_fasting >= 110.0
    }

    /// Number of markers outside their healthy range (0 to 5).
    pub fn criteria_met(&self) -> u8 {
        [
            self.obese(),
            self.elevated_systolic(),
            self.high_triglycerides(),
            self.low_hdl(),
            self.elevated_glucose(),
        ]
        .into_iter()
        .map(u8::from)
        .sum()
    }

    pub fn metabolic_syndrome(&self) -> bool {
        self.criteria_met() >= METABOLIC_SYNDROME_MIN_CRITERIA
    }
}

/// Clinical categories: glycemia, HbA1c, HOMA-IR, BMI, blood pressure and
/// metabolic syndrome.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedicalStage;

impl FeatureStage for MedicalStage {
    fn name(&self) -> &'static str {
        "medical"
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &[
            "glucose_status",
            "hba1c_category",
            "homa_ir",
            "insulin_resistance_flag",
            "bmi_category",
            "bp_category",
            "metabolic_syndrome_flag",
        ]
    }

    fn transform(&self, records: &RecordSet) -> Result<RecordSet, FeatureError> {
        info!("deriving medical features");
        enrich(self.name(), records, |record| {
            let markers = CardiometabolicMarkers::from_record(record)?;
            let hba1c = record.number(HBA1C)?;
            let insulin = record.number(INSULIN_LEVEL)?;
            let diastolic = record.number(DIASTOLIC_BP)?;

            let homa_ir = markers.glucose_fasting * insulin / HOMA_IR_DIVISOR;

            record.set(
                "glucose_status",
                FieldValue::category(glucose_status(markers.glucose_fasting)),
            );
            record.set("hba1c_category", FieldValue::category(hba1c_category(hba1c)));
            record.set("homa_ir", homa_ir);
            record.set(
                "insulin_resistance_flag",
                FieldValue::flag(homa_ir > INSULIN_RESISTANCE_CUTOFF),
            );
            record.set("bmi_category", FieldValue::category(bmi_category(markers.bmi)));
            record.set(
                "bp_category",
                bp_category(markers.systolic_bp, diastolic),
            );
            record.set(
                "metabolic_syndrome_flag",
                FieldValue::flag(markers.metabolic_syndrome()),
            );
            Ok(())
        })
    }
}
