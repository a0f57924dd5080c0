use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use super::{DatasetError, DatasetRepository};
use crate::domain::{FieldValue, PatientRecord, RecordSet};

/// CSV-backed dataset. Cells are typed on read: empty or NaN cells become
/// `Missing`, then integers, then floats, and anything else stays text.
#[derive(Debug, Clone)]
pub struct CsvDatasetRepository {
    source: PathBuf,
}

impl CsvDatasetRepository {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<RecordSet, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let record: PatientRecord = headers
                .iter()
                .zip(row.iter())
                .map(|(column, cell)| (column, parse_cell(cell)))
                .collect();
            records.push(record);
        }
        Ok(RecordSet::new(records))
    }

    /// Writes the sorted union of columns; absent and missing cells are empty.
    pub fn to_writer<W: Write>(records: &RecordSet, writer: W) -> Result<(), DatasetError> {
        let columns = records.columns();
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&columns)?;

        for record in records.iter() {
            let row: Vec<String> = columns
                .iter()
                .map(|column| record.get(column).map(format_cell).unwrap_or_default())
                .collect();
            csv_writer.write_record(&row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl DatasetRepository for CsvDatasetRepository {
    fn load_dataset(&self) -> Result<RecordSet, DatasetError> {
        if !self.source.is_file() {
            return Err(DatasetError::NotFound(self.source.clone()));
        }
        let records = Self::from_reader(File::open(&self.source)?)?;
        info!(
            path = %self.source.display(),
            rows = records.len(),
            columns = records.columns().len(),
            "dataset loaded"
        );
        Ok(records)
    }

    fn save_dataset(&self, records: &RecordSet, path: &Path) -> Result<(), DatasetError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Self::to_writer(records, File::create(path)?)?;
        info!(path = %path.display(), rows = records.len(), "dataset saved");
        Ok(())
    }
}

fn parse_cell(cell: &str) -> FieldValue {
    if cell.is_empty() {
        return FieldValue::Missing;
    }
    if let Ok(value) = cell.parse::<i64>() {
        return FieldValue::Int(value);
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_nan() => FieldValue::Missing,
        Ok(value) => FieldValue::Float(value),
        Err(_) => FieldValue::Text(cell.to_string()),
    }
}

fn format_cell(value: &FieldValue) -> String {
    match value {
        FieldValue::Int(value) => value.to_string(),
        // Debug keeps the fractional part so floats read back as floats
        FieldValue::Float(value) if value.is_finite() => format!("{value:?}"),
        FieldValue::Float(_) | FieldValue::Missing => String::new(),
        FieldValue::Text(value) => value.clone(),
    }
}
