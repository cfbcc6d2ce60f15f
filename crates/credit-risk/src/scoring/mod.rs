//! Applicant validation, feature preprocessing, and classifier scoring.
//!
//! A request flows through [`validate`], [`preprocess`], and [`ScoringEngine::score`];
//! [`CreditScoringService::predict`] composes the three.

pub mod dataset;
pub mod domain;
pub mod engine;
pub mod model;
pub mod preprocessing;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use dataset::{read_applicants, read_applicants_from_path, write_outcomes, DatasetError};
pub use domain::{
    ApplicantField, ApplicantRecord, DerivedFeatures, FeatureVector, ScoringResult,
    ValidatedRecord, DECISION_THRESHOLD,
};
pub use engine::{EngineState, ScoringEngine, ScoringError};
pub use model::{
    ArtifactLoader, Classifier, ModelError, ModelLoader, Tree, TreeEnsemble, TreeNode,
};
pub use preprocessing::{
    derive_features, impute, normalize_name, preprocess, FeatureSchemaError,
    MONTHLY_INCOME_IMPUTATION, TRAINING_FEATURES,
};
pub use router::prediction_router;
pub use service::{CreditScoringService, PredictionError};
pub use validation::{validate, FieldBounds, FieldViolation, ValidationError};
