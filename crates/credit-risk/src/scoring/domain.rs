use std::fmt;

use serde::{Deserialize, Serialize};

/// Probability at or above which an applicant is classified as a likely defaulter.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Raw applicant attributes as received from a caller, before any bounds checking.
///
/// Integers are carried as `i64` so negative or oversized inputs surface as field-level
/// range violations instead of opaque deserialization failures. Field aliases accept the
/// column names used by the historical credit dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    #[serde(default, alias = "RevolvingUtilizationOfUnsecuredLines")]
    pub revolving_utilization: Option<f64>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default, alias = "NumberOfTime30_59DaysPastDueNotWorse")]
    pub late_30_59_count: Option<i64>,
    #[serde(default, alias = "NumberOfTime60_89DaysPastDueNotWorse")]
    pub late_60_89_count: Option<i64>,
    #[serde(default, alias = "NumberOfTimes90DaysLate")]
    pub late_90_plus_count: Option<i64>,
    #[serde(default, alias = "DebtRatio")]
    pub debt_ratio: Option<f64>,
    #[serde(default, alias = "MonthlyIncome")]
    pub monthly_income: Option<f64>,
    #[serde(default, alias = "NumberOfOpenCreditLinesAndLoans")]
    pub open_credit_lines: Option<i64>,
    #[serde(default, alias = "NumberRealEstateLoansOrLines")]
    pub real_estate_lines: Option<i64>,
    #[serde(default, alias = "NumberOfDependents")]
    pub dependents: Option<i64>,
}

/// Attributes of an applicant record, in the order they are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicantField {
    RevolvingUtilization,
    Age,
    Late30To59Count,
    Late60To89Count,
    Late90PlusCount,
    DebtRatio,
    MonthlyIncome,
    OpenCreditLines,
    RealEstateLines,
    Dependents,
}

impl ApplicantField {
    pub const ALL: [ApplicantField; 10] = [
        ApplicantField::RevolvingUtilization,
        ApplicantField::Age,
        ApplicantField::Late30To59Count,
        ApplicantField::Late60To89Count,
        ApplicantField::Late90PlusCount,
        ApplicantField::DebtRatio,
        ApplicantField::MonthlyIncome,
        ApplicantField::OpenCreditLines,
        ApplicantField::RealEstateLines,
        ApplicantField::Dependents,
    ];

    /// Name used by callers of the scoring API.
    pub const fn label(self) -> &'static str {
        match self {
            ApplicantField::RevolvingUtilization => "revolving_utilization",
            ApplicantField::Age => "age",
            ApplicantField::Late30To59Count => "late_30_59_count",
            ApplicantField::Late60To89Count => "late_60_89_count",
            ApplicantField::Late90PlusCount => "late_90_plus_count",
            ApplicantField::DebtRatio => "debt_ratio",
            ApplicantField::MonthlyIncome => "monthly_income",
            ApplicantField::OpenCreditLines => "open_credit_lines",
            ApplicantField::RealEstateLines => "real_estate_lines",
            ApplicantField::Dependents => "dependents",
        }
    }

    /// Column identifier in the input schema, before training-name normalization.
    pub const fn column(self) -> &'static str {
        match self {
            ApplicantField::RevolvingUtilization => "RevolvingUtilizationOfUnsecuredLines",
            ApplicantField::Age => "age",
            ApplicantField::Late30To59Count => "NumberOfTime30_59DaysPastDueNotWorse",
            ApplicantField::Late60To89Count => "NumberOfTime60_89DaysPastDueNotWorse",
            ApplicantField::Late90PlusCount => "NumberOfTimes90DaysLate",
            ApplicantField::DebtRatio => "DebtRatio",
            ApplicantField::MonthlyIncome => "MonthlyIncome",
            ApplicantField::OpenCreditLines => "NumberOfOpenCreditLinesAndLoans",
            ApplicantField::RealEstateLines => "NumberRealEstateLoansOrLines",
            ApplicantField::Dependents => "NumberOfDependents",
        }
    }
}

impl Serialize for ApplicantField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl fmt::Display for ApplicantField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Applicant attributes that passed bounds and sanity checks.
///
/// The only constructor is [`super::validate`], so holding a value is proof that every
/// field lies within its documented interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRecord {
    pub(crate) revolving_utilization: f64,
    pub(crate) age: u32,
    pub(crate) late_30_59_count: u32,
    pub(crate) late_60_89_count: u32,
    pub(crate) late_90_plus_count: u32,
    pub(crate) debt_ratio: f64,
    pub(crate) monthly_income: f64,
    pub(crate) open_credit_lines: u32,
    pub(crate) real_estate_lines: u32,
    pub(crate) dependents: u32,
}

impl ValidatedRecord {
    pub fn revolving_utilization(&self) -> f64 {
        self.revolving_utilization
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn late_30_59_count(&self) -> u32 {
        self.late_30_59_count
    }

    pub fn late_60_89_count(&self) -> u32 {
        self.late_60_89_count
    }

    pub fn late_90_plus_count(&self) -> u32 {
        self.late_90_plus_count
    }

    pub fn debt_ratio(&self) -> f64 {
        self.debt_ratio
    }

    pub fn monthly_income(&self) -> f64 {
        self.monthly_income
    }

    pub fn open_credit_lines(&self) -> u32 {
        self.open_credit_lines
    }

    pub fn real_estate_lines(&self) -> u32 {
        self.real_estate_lines
    }

    pub fn dependents(&self) -> u32 {
        self.dependents
    }
}

/// Features computed from a validated record rather than supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedFeatures {
    pub debt_per_dependent: f64,
    pub high_utilization: u8,
}

/// Model-ready representation of one applicant: named values in training order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub(crate) names: Vec<String>,
    pub(crate) values: Vec<f64>,
}

impl FeatureVector {
    /// Build a vector from named columns, keeping their order.
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let (names, values) = columns
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .unzip();
        Self { names, values }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|candidate| candidate == name)
            .map(|index| self.values[index])
    }
}

/// Default probability and the decision derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub default_probability: f64,
    pub will_default: bool,
}

impl ScoringResult {
    /// The decision is always the thresholded probability so the two fields cannot disagree.
    pub fn from_probability(default_probability: f64) -> Self {
        Self {
            default_probability,
            will_default: default_probability >= DECISION_THRESHOLD,
        }
    }
}
