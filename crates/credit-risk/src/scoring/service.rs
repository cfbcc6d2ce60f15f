use std::sync::Arc;

use tracing::debug;

use super::domain::{ApplicantRecord, ScoringResult};
use super::engine::{EngineState, ScoringEngine, ScoringError};
use super::preprocessing::{impute, preprocess, FeatureSchemaError};
use super::validation::{validate, ValidationError};

/// Service composing validation, preprocessing, and the scoring engine.
#[derive(Debug, Clone)]
pub struct CreditScoringService {
    engine: Arc<ScoringEngine>,
}

impl CreditScoringService {
    pub fn new(engine: Arc<ScoringEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<ScoringEngine> {
        &self.engine
    }

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    /// Validate, preprocess, and score one live request.
    ///
    /// Validation runs to completion before any preprocessing; scoring failures abort
    /// the call without a partial result.
    pub fn predict(&self, raw: &ApplicantRecord) -> Result<ScoringResult, PredictionError> {
        let record = validate(raw).inspect_err(|err| {
            debug!(violations = err.violations().len(), "applicant record rejected");
        })?;
        let features = preprocess(&record)?;
        let result = self.engine.score(&features)?;

        debug!(
            probability = result.default_probability,
            will_default = result.will_default,
            "applicant scored"
        );
        Ok(result)
    }

    /// Score records from offline data, imputing missing income and dependents first.
    ///
    /// Each record gets its own outcome. An unavailable model fails the whole batch up
    /// front instead of once per record.
    pub fn predict_offline(
        &self,
        records: &[ApplicantRecord],
    ) -> Result<Vec<Result<ScoringResult, PredictionError>>, ScoringError> {
        self.engine.warm_up()?;

        Ok(records
            .iter()
            .map(|raw| self.predict(&impute(raw)))
            .collect())
    }
}

/// Error raised by the composite prediction call.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl PredictionError {
    /// Whether the caller can fix the failure by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictionError::Validation(_))
    }

    pub fn is_model_unavailable(&self) -> bool {
        matches!(
            self,
            PredictionError::Scoring(ScoringError::ModelUnavailable(_))
        )
    }
}

impl From<FeatureSchemaError> for PredictionError {
    fn from(value: FeatureSchemaError) -> Self {
        Self::Scoring(ScoringError::FeatureSchema(value))
    }
}
