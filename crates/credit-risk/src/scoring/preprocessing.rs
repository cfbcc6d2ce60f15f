use std::collections::HashSet;

use super::domain::{
    ApplicantField, ApplicantRecord, DerivedFeatures, FeatureVector, ValidatedRecord,
};

/// Historical median monthly income substituted for missing values in offline data.
pub const MONTHLY_INCOME_IMPUTATION: f64 = 5400.0;
pub const DEPENDENTS_IMPUTATION: i64 = 0;

pub const HIGH_UTILIZATION_THRESHOLD: f64 = 0.8;

pub const DEBT_PER_DEPENDENT_COLUMN: &str = "DebtPerDependent";
pub const HIGH_UTILIZATION_COLUMN: &str = "HighUtilization";

/// Input columns whose identifiers differ in the schema the classifier was fit on.
pub const TRAINING_RENAMES: [(&str, &str); 2] = [
    (
        "NumberOfTime30_59DaysPastDueNotWorse",
        "NumberOfTime30-59DaysPastDueNotWorse",
    ),
    (
        "NumberOfTime60_89DaysPastDueNotWorse",
        "NumberOfTime60-89DaysPastDueNotWorse",
    ),
];

/// Feature names, in order, of the schema the classifier was trained on.
pub const TRAINING_FEATURES: [&str; 12] = [
    "RevolvingUtilizationOfUnsecuredLines",
    "age",
    "NumberOfTime30-59DaysPastDueNotWorse",
    "DebtRatio",
    "MonthlyIncome",
    "NumberOfOpenCreditLinesAndLoans",
    "NumberOfTimes90DaysLate",
    "NumberRealEstateLoansOrLines",
    "NumberOfTime60-89DaysPastDueNotWorse",
    "NumberOfDependents",
    DEBT_PER_DEPENDENT_COLUMN,
    HIGH_UTILIZATION_COLUMN,
];

/// Produced features disagree with the schema a consumer expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureSchemaError {
    #[error("expected {expected} features, found {found}")]
    Arity { expected: usize, found: usize },
    #[error("feature '{0}' is missing")]
    Missing(String),
    #[error("feature '{0}' is not part of the expected schema")]
    Unexpected(String),
    #[error("feature '{0}' appears more than once")]
    Duplicate(String),
}

/// Fill fields that are truly absent with their fixed defaults.
///
/// Explicit zeros are left untouched so validation can still reject them.
pub fn impute(raw: &ApplicantRecord) -> ApplicantRecord {
    ApplicantRecord {
        monthly_income: raw.monthly_income.or(Some(MONTHLY_INCOME_IMPUTATION)),
        dependents: raw.dependents.or(Some(DEPENDENTS_IMPUTATION)),
        ..raw.clone()
    }
}

pub fn derive_features(record: &ValidatedRecord) -> DerivedFeatures {
    DerivedFeatures {
        debt_per_dependent: record.debt_ratio / (f64::from(record.dependents) + 1.0),
        high_utilization: u8::from(record.revolving_utilization > HIGH_UTILIZATION_THRESHOLD),
    }
}

/// Map an input column identifier onto its training identifier. Names without a
/// rename, including already-normalized ones, pass through unchanged.
pub fn normalize_name(name: &str) -> &str {
    TRAINING_RENAMES
        .iter()
        .find(|(input, _)| *input == name)
        .map(|(_, trained)| *trained)
        .unwrap_or(name)
}

/// Turn a validated record into the ordered feature vector of the training schema.
pub fn preprocess(record: &ValidatedRecord) -> Result<FeatureVector, FeatureSchemaError> {
    let derived = derive_features(record);

    let columns = input_columns(record)
        .into_iter()
        .chain([
            (DEBT_PER_DEPENDENT_COLUMN, derived.debt_per_dependent),
            (HIGH_UTILIZATION_COLUMN, f64::from(derived.high_utilization)),
        ])
        .map(|(name, value)| (normalize_name(name), value));

    FeatureVector::from_columns(columns).align_to(&TRAINING_FEATURES)
}

fn input_columns(record: &ValidatedRecord) -> [(&'static str, f64); 10] {
    ApplicantField::ALL.map(|field| {
        let value = match field {
            ApplicantField::RevolvingUtilization => record.revolving_utilization,
            ApplicantField::Age => f64::from(record.age),
            ApplicantField::Late30To59Count => f64::from(record.late_30_59_count),
            ApplicantField::Late60To89Count => f64::from(record.late_60_89_count),
            ApplicantField::Late90PlusCount => f64::from(record.late_90_plus_count),
            ApplicantField::DebtRatio => record.debt_ratio,
            ApplicantField::MonthlyIncome => record.monthly_income,
            ApplicantField::OpenCreditLines => f64::from(record.open_credit_lines),
            ApplicantField::RealEstateLines => f64::from(record.real_estate_lines),
            ApplicantField::Dependents => f64::from(record.dependents),
        };
        (field.column(), value)
    })
}

impl FeatureVector {
    /// Reorder the vector to match `expected` exactly.
    ///
    /// Every expected name must be present once and nothing else may be present; any
    /// disagreement is reported rather than dropped or defaulted.
    pub fn align_to<S: AsRef<str>>(
        &self,
        expected: &[S],
    ) -> Result<FeatureVector, FeatureSchemaError> {
        let mut seen = HashSet::with_capacity(self.names.len());
        for name in &self.names {
            if !seen.insert(name.as_str()) {
                return Err(FeatureSchemaError::Duplicate(name.clone()));
            }
        }

        let expected_names: HashSet<&str> = expected.iter().map(|name| name.as_ref()).collect();
        if let Some(extra) = self
            .names
            .iter()
            .find(|name| !expected_names.contains(name.as_str()))
        {
            return Err(FeatureSchemaError::Unexpected(extra.clone()));
        }

        let mut names = Vec::with_capacity(expected.len());
        let mut values = Vec::with_capacity(expected.len());
        for name in expected {
            let name: &str = name.as_ref();
            let value = self
                .get(name)
                .ok_or_else(|| FeatureSchemaError::Missing(name.to_string()))?;
            names.push(name.to_string());
            values.push(value);
        }

        if self.names.len() != expected.len() {
            return Err(FeatureSchemaError::Arity {
                expected: expected.len(),
                found: self.names.len(),
            });
        }

        Ok(FeatureVector { names, values })
    }
}
