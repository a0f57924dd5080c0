//! Diabetes risk modelling core: feature engineering over patient records,
//! model evaluation, decision thresholds and deployment acceptance.

pub mod config;
pub mod dataset;
pub mod domain;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod prediction;
pub mod router;
pub mod service;
pub mod telemetry;

pub use router::risk_router;
pub use service::RiskService;
