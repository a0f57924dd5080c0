//! Tabular dataset storage behind a repository trait.

mod csv_repository;

pub use csv_repository::CsvDatasetRepository;

use std::path::{Path, PathBuf};

use crate::domain::RecordSet;

/// Storage abstraction so pipelines can run against files or fixtures.
pub trait DatasetRepository: Send + Sync {
    fn load_dataset(&self) -> Result<RecordSet, DatasetError>;
    fn save_dataset(&self, records: &RecordSet, path: &Path) -> Result<(), DatasetError>;
}

#[derive(Debug)]
pub enum DatasetError {
    NotFound(PathBuf),
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::NotFound(path) => {
                write!(f, "dataset not found at {}", path.display())
            }
            DatasetError::Io(err) => write!(f, "failed to access dataset: {}", err),
            DatasetError::Csv(err) => write!(f, "invalid dataset CSV: {}", err),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::NotFound(_) => None,
            DatasetError::Io(err) => Some(err),
            DatasetError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}
