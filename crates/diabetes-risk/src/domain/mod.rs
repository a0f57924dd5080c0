//! Patient records and the structural schema they are validated against.

pub mod record;
pub mod schema;

pub use record::{FieldValue, PatientRecord, RecordError, RecordSet};
pub use schema::{
    columns, ColumnRole, ColumnSpec, ColumnType, FeatureSchema, SchemaError, SchemaViolation,
};
