use clap::{ArgGroup, Args};
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::scoring::{
    read_applicants, write_outcomes, ApplicantRecord, ArtifactLoader, CreditScoringService,
    PredictionError, ScoringEngine, ScoringResult,
};
use credit_risk::telemetry;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["record", "input"])))]
pub(crate) struct ScoreArgs {
    /// Override the configured classifier artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Applicant record as an inline JSON object
    #[arg(long)]
    pub(crate) record: Option<String>,
    /// File containing the applicant record as JSON
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Override the configured classifier artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// CSV file with one applicant per row
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let service = command_service(args.model)?;
    let payload = match args.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => args.record.unwrap_or_default(),
    };

    match score_payload(&service, &payload) {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(AppError::Prediction(PredictionError::Validation(err))) => {
            for violation in err.violations() {
                eprintln!("  - {violation}");
            }
            Err(AppError::Prediction(PredictionError::Validation(err)))
        }
        Err(err) => Err(err),
    }
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let service = command_service(args.model)?;
    let file = File::open(&args.csv)?;
    let stdout = std::io::stdout();

    let summary = score_csv(&service, file, stdout.lock())?;
    info!(
        path = %args.csv.display(),
        scored = summary.scored,
        rejected = summary.rejected,
        "batch scoring finished"
    );
    Ok(())
}

fn command_service(model: Option<PathBuf>) -> Result<CreditScoringService, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = model {
        config.model.artifact_path = path;
    }
    telemetry::init(&config.telemetry)?;

    let loader = Arc::new(ArtifactLoader::new(config.model.artifact_path));
    Ok(CreditScoringService::new(Arc::new(ScoringEngine::new(loader))))
}

pub(crate) fn score_payload(
    service: &CreditScoringService,
    payload: &str,
) -> Result<ScoringResult, AppError> {
    let record: ApplicantRecord = serde_json::from_str(payload)?;
    Ok(service.predict(&record)?)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct BatchSummary {
    pub(crate) scored: usize,
    pub(crate) rejected: usize,
}

pub(crate) fn score_csv<R: Read, W: Write>(
    service: &CreditScoringService,
    reader: R,
    writer: W,
) -> Result<BatchSummary, AppError> {
    let records = read_applicants(reader)?;
    let outcomes = service
        .predict_offline(&records)
        .map_err(PredictionError::Scoring)?;
    write_outcomes(writer, &outcomes)?;

    let scored = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    Ok(BatchSummary {
        scored,
        rejected: outcomes.len() - scored,
    })
}
