use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Single cell of a patient record.
///
/// `Missing` is the marker produced by guarded divisions and empty dataset
/// cells; it serializes as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl FieldValue {
    pub fn flag(value: bool) -> Self {
        FieldValue::Int(i64::from(value))
    }

    pub fn category(label: Option<&str>) -> Self {
        match label {
            Some(label) => FieldValue::Text(label.to_string()),
            None => FieldValue::Missing,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Int(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Missing => "missing",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(value) => Some(*value as f64),
            FieldValue::Float(value) => Some(*value),
            FieldValue::Text(_) | FieldValue::Missing => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Failure to read a column from a record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("missing column `{0}`")]
    MissingColumn(String),
    #[error("column `{column}` must be numeric, found {found}")]
    NotNumeric { column: String, found: &'static str },
}

/// One row of patient data keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl PatientRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert used when assembling fixtures and requests.
    pub fn with(mut self, column: &str, value: impl Into<FieldValue>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &str, value: impl Into<FieldValue>) {
        self.fields.insert(column.to_string(), value.into());
    }

    pub fn remove(&mut self, column: &str) -> Option<FieldValue> {
        self.fields.remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Value of `column`, failing when the column is absent.
    pub fn require(&self, column: &str) -> Result<&FieldValue, RecordError> {
        self.fields
            .get(column)
            .ok_or_else(|| RecordError::MissingColumn(column.to_string()))
    }

    /// Numeric value of `column`. Text and missing cells are rejected rather than
    /// coerced so that no biomarker is fabricated.
    pub fn number(&self, column: &str) -> Result<f64, RecordError> {
        let value = self.require(column)?;
        value.as_f64().ok_or_else(|| RecordError::NotNumeric {
            column: column.to_string(),
            found: value.kind(),
        })
    }

    /// Text value of `column`; `None` when the cell holds a non-text value.
    pub fn text(&self, column: &str) -> Result<Option<&str>, RecordError> {
        Ok(self.require(column)?.as_str())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for PatientRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Ordered collection of patient records processed as one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<PatientRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<PatientRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PatientRecord> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatientRecord> {
        self.records.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, PatientRecord> {
        self.records.iter_mut()
    }

    /// Union of the columns present in any record.
    pub fn columns(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .flat_map(|record| record.columns().map(str::to_string))
            .collect()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.records.iter().any(|record| record.contains(column))
    }
}

impl From<Vec<PatientRecord>> for RecordSet {
    fn from(records: Vec<PatientRecord>) -> Self {
        Self::new(records)
    }
}

impl From<PatientRecord> for RecordSet {
    fn from(record: PatientRecord) -> Self {
        Self::new(vec![record])
    }
}
