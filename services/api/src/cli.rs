use crate::commands::{run_evaluate, run_features, EvaluateArgs, FeaturesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use diabetes_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Diabetes Risk",
    about = "Engineer clinical features, evaluate risk models and serve decisions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Enrich a patient CSV with the engineered clinical features
    Features(FeaturesArgs),
    /// Evaluate scored predictions (CSV with y_true,y_proba) and print JSON
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Features(args) => run_features(args),
        Command::Evaluate(args) => run_evaluate(args),
    }
}
