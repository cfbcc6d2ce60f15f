//! Credit default scoring.
//!
//! Raw applicant attributes are validated into a [`scoring::ValidatedRecord`],
//! preprocessed into the feature vector the trained classifier was fit on, and
//! scored into a default probability plus a thresholded decision.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
