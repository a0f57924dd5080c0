use clap::Args;
use diabetes_risk::config::AppConfig;
use diabetes_risk::dataset::{CsvDatasetRepository, DatasetError, DatasetRepository};
use diabetes_risk::error::AppError;
use diabetes_risk::evaluation::{DecisionThresholdPolicy, StandardMetrics};
use diabetes_risk::features::AgeGroupStrategy;
use diabetes_risk::service::EvaluationRequest;
use diabetes_risk::telemetry;
use diabetes_risk::RiskService;
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct FeaturesArgs {
    /// Raw patient CSV to enrich
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination for the enriched CSV
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Override the configured age grouping (`detailed` or `coarse`)
    #[arg(long)]
    pub(crate) age_group_strategy: Option<AgeGroupStrategy>,
    /// Run the pipeline without checking the raw schema first
    #[arg(long, default_value_t = false)]
    pub(crate) skip_validation: bool,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// CSV with `y_true` and `y_proba` columns
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Decision threshold, overriding the configured policy
    #[arg(long)]
    pub(crate) threshold: Option<f64>,
    /// Gate the model with the acceptance policy; rejection exits non-zero
    #[arg(long, default_value_t = false)]
    pub(crate) accept: bool,
    /// Also report a calibration curve with this many bins
    #[arg(long)]
    pub(crate) bins: Option<usize>,
}

pub(crate) fn run_features(args: FeaturesArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(strategy) = args.age_group_strategy {
        config.features.age_group_strategy = strategy;
    }
    telemetry::init(&config.telemetry)?;

    let repository = CsvDatasetRepository::new(&args.input);
    let records = repository.load_dataset()?;
    let service = RiskService::from_config(&config, Arc::new(StandardMetrics));

    let enriched = if args.skip_validation {
        service.pipeline().transform(&records)?
    } else {
        service.engineer_features(&records)?
    };
    repository.save_dataset(&enriched, &args.output)?;

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        rows = enriched.len(),
        "features written"
    );
    println!(
        "Wrote {} rows with {} columns to {}",
        enriched.len(),
        enriched.columns().len(),
        args.output.display()
    );
    Ok(())
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let file = std::fs::File::open(&args.input).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => DatasetError::NotFound(args.input.clone()),
        _ => DatasetError::Io(err),
    })?;
    let (y_true, y_proba) = read_scored_predictions(file)?;

    let threshold = args
        .threshold
        .map(DecisionThresholdPolicy::new)
        .transpose()?;
    let request = EvaluationRequest {
        y_true,
        y_proba,
        threshold,
        calibration_bins: args.bins,
    };
    let service = RiskService::from_config(&config, Arc::new(StandardMetrics));

    let rendered = if args.accept {
        to_pretty_json(&service.review_model(&request)?)?
    } else {
        to_pretty_json(&service.evaluate(&request)?)?
    };
    println!("{rendered}");
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ScoredRow {
    y_true: u8,
    y_proba: f64,
}

fn read_scored_predictions<R: Read>(reader: R) -> Result<(Vec<u8>, Vec<f64>), DatasetError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut y_true = Vec::new();
    let mut y_proba = Vec::new();
    for row in reader.deserialize::<ScoredRow>() {
        let row = row?;
        y_true.push(row.y_true);
        y_proba.push(row.y_proba);
    }
    Ok((y_true, y_proba))
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|err| AppError::Io(std::io::Error::other(err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_labels_and_probabilities_in_row_order() {
        let csv = "y_true,y_proba\n0,0.1\n1, 0.9\n1,0.65\n";

        let (y_true, y_proba) = read_scored_predictions(csv.as_bytes()).expect("valid csv");

        assert_eq!(y_true, vec![0, 1, 1]);
        assert_eq!(y_proba, vec![0.1, 0.9, 0.65]);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let csv = "patient_id,y_true,y_proba\n17,0,0.2\n";

        let (y_true, y_proba) = read_scored_predictions(csv.as_bytes()).expect("valid csv");

        assert_eq!(y_true, vec![0]);
        assert_eq!(y_proba, vec![0.2]);
    }

    #[test]
    fn unparseable_rows_surface_as_csv_errors() {
        let csv = "y_true,y_proba\n0,high\n";

        let err = read_scored_predictions(csv.as_bytes()).expect_err("bad probability");

        assert!(matches!(err, DatasetError::Csv(_)));
    }

    #[test]
    fn evaluation_reports_render_as_json() {
        let request = EvaluationRequest {
            y_true: vec![0, 1],
            y_proba: vec![0.2, 0.8],
            threshold: None,
            calibration_bins: None,
        };

        let rendered = to_pretty_json(&request).expect("serializable");

        assert!(rendered.contains("\"y_true\""));
    }
}
