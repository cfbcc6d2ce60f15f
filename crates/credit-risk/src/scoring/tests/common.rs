use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::scoring::domain::ApplicantRecord;
use crate::scoring::engine::ScoringEngine;
use crate::scoring::model::{Classifier, ModelError, ModelLoader};
use crate::scoring::preprocessing::TRAINING_FEATURES;
use crate::scoring::service::CreditScoringService;

/// The reference applicant: high utilization, two dependents, otherwise clean.
pub(super) fn applicant() -> ApplicantRecord {
    ApplicantRecord {
        revolving_utilization: Some(0.9),
        age: Some(45),
        late_30_59_count: Some(2),
        late_60_89_count: Some(0),
        late_90_plus_count: Some(0),
        debt_ratio: Some(0.3),
        monthly_income: Some(4000.0),
        open_credit_lines: Some(5),
        real_estate_lines: Some(1),
        dependents: Some(2),
    }
}

pub(super) fn training_names() -> Vec<String> {
    TRAINING_FEATURES.iter().map(|name| name.to_string()).collect()
}

/// Classifier returning a fixed probability and recording what it was given.
pub(super) struct FixedClassifier {
    pub(super) names: Vec<String>,
    pub(super) probability: f64,
    pub(super) class: bool,
}

impl FixedClassifier {
    pub(super) fn new(probability: f64) -> Self {
        Self {
            names: training_names(),
            probability,
            class: probability >= 0.5,
        }
    }
}

impl Classifier for FixedClassifier {
    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict_proba(&self, features: &[f64]) -> f64 {
        assert_eq!(features.len(), self.names.len());
        self.probability
    }

    fn predict_class(&self, _features: &[f64]) -> bool {
        self.class
    }
}

/// Loader that fails a configurable number of times before succeeding.
pub(super) struct CountingLoader {
    pub(super) loads: AtomicUsize,
    pub(super) failures_remaining: AtomicUsize,
    pub(super) probability: f64,
}

impl CountingLoader {
    pub(super) fn new(probability: f64, failures: usize) -> Self {
        Self {
            loads: AtomicUsize::new(0),
            failures_remaining: AtomicUsize::new(failures),
            probability,
        }
    }

    pub(super) fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ModelLoader for CountingLoader {
    fn load(&self) -> Result<Arc<dyn Classifier>, ModelError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok();
        if failing {
            return Err(ModelError::Malformed("artifact not published yet".to_string()));
        }
        Ok(Arc::new(FixedClassifier::new(self.probability)))
    }

    fn describe(&self) -> String {
        "counting-loader".to_string()
    }
}

pub(super) fn service_with_probability(probability: f64) -> CreditScoringService {
    let engine = ScoringEngine::with_classifier(Arc::new(FixedClassifier::new(probability)));
    CreditScoringService::new(Arc::new(engine))
}

pub(super) fn unavailable_service() -> CreditScoringService {
    let loader = Arc::new(CountingLoader::new(0.5, usize::MAX));
    CreditScoringService::new(Arc::new(ScoringEngine::new(loader)))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
