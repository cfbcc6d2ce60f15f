use std::sync::{Arc, Mutex, OnceLock};

use tracing::{error, info};

use super::domain::{FeatureVector, ScoringResult};
use super::model::{Classifier, ModelError, ModelLoader};
use super::preprocessing::FeatureSchemaError;

/// Lifecycle of the engine's classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unloaded,
    Ready,
}

impl EngineState {
    pub const fn label(self) -> &'static str {
        match self {
            EngineState::Unloaded => "unloaded",
            EngineState::Ready => "ready",
        }
    }
}

/// Failures raised while scoring a feature vector.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),
    #[error("feature vector does not match the classifier schema: {0}")]
    FeatureSchema(#[from] FeatureSchemaError),
    #[error("classifier returned {0}, which is not a probability")]
    InvalidProbability(f64),
}

/// Wraps a classifier that is loaded at most once and then shared read-only.
///
/// A failed load leaves the engine [`EngineState::Unloaded`]; the next call that needs
/// the classifier attempts the load again.
pub struct ScoringEngine {
    loader: Option<Arc<dyn ModelLoader>>,
    classifier: OnceLock<Arc<dyn Classifier>>,
    load_lock: Mutex<()>,
}

impl ScoringEngine {
    /// Engine that loads lazily from `loader` on first use.
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader: Some(loader),
            classifier: OnceLock::new(),
            load_lock: Mutex::new(()),
        }
    }

    /// Engine that is ready immediately with an already-built classifier.
    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            loader: None,
            classifier: OnceLock::from(classifier),
            load_lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> EngineState {
        if self.classifier.get().is_some() {
            EngineState::Ready
        } else {
            EngineState::Unloaded
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == EngineState::Ready
    }

    /// Load the classifier if it is not loaded yet.
    pub fn warm_up(&self) -> Result<(), ScoringError> {
        self.classifier().map(|_| ())
    }

    /// Return the shared classifier, loading it on first use.
    ///
    /// Concurrent first callers serialize on the load lock; only one performs the load
    /// and the rest observe its result.
    pub fn classifier(&self) -> Result<Arc<dyn Classifier>, ScoringError> {
        if let Some(classifier) = self.classifier.get() {
            return Ok(classifier.clone());
        }

        let _guard = self
            .load_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(classifier) = self.classifier.get() {
            return Ok(classifier.clone());
        }

        let Some(loader) = &self.loader else {
            return Err(ScoringError::ModelUnavailable(ModelError::Malformed(
                "no model loader configured".to_string(),
            )));
        };

        match loader.load() {
            Ok(classifier) => {
                info!(
                    source = %loader.describe(),
                    features = classifier.feature_names().len(),
                    "classifier loaded"
                );
                Ok(self.classifier.get_or_init(|| classifier).clone())
            }
            Err(err) => {
                error!(source = %loader.describe(), error = %err, "classifier load failed");
                Err(ScoringError::ModelUnavailable(err))
            }
        }
    }

    /// Score one preprocessed feature vector.
    ///
    /// The vector is aligned to the classifier's declared feature order first; the
    /// decision is derived from the probability alone.
    pub fn score(&self, features: &FeatureVector) -> Result<ScoringResult, ScoringError> {
        let classifier = self.classifier()?;
        let aligned = features.align_to(classifier.feature_names())?;
        let probability = classifier.predict_proba(aligned.values());

        if !(0.0..=1.0).contains(&probability) {
            return Err(ScoringError::InvalidProbability(probability));
        }

        Ok(ScoringResult::from_probability(probability))
    }
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("state", &self.state())
            .field(
                "loader",
                &self.loader.as_ref().map(|loader| loader.describe()),
            )
            .finish()
    }
}
