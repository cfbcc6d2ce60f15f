use std::fmt;

use serde::Serialize;

use super::domain::{ApplicantField, ApplicantRecord, ValidatedRecord};

/// Closed interval a field must fall within, plus the domain-level positivity rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
    pub strictly_positive: bool,
}

impl FieldBounds {
    const fn closed(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            strictly_positive: false,
        }
    }

    const fn positive(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            strictly_positive: true,
        }
    }
}

impl ApplicantField {
    pub const fn bounds(self) -> FieldBounds {
        match self {
            ApplicantField::RevolvingUtilization => FieldBounds::closed(0.0, 1.5),
            ApplicantField::Age => FieldBounds::positive(0.0, 120.0),
            ApplicantField::Late30To59Count
            | ApplicantField::Late60To89Count
            | ApplicantField::Late90PlusCount => FieldBounds::closed(0.0, 100.0),
            ApplicantField::DebtRatio => FieldBounds::closed(0.0, 10_000.0),
            ApplicantField::MonthlyIncome => FieldBounds::positive(0.0, 3_000_000.0),
            ApplicantField::OpenCreditLines | ApplicantField::RealEstateLines => {
                FieldBounds::closed(0.0, 100.0)
            }
            ApplicantField::Dependents => FieldBounds::closed(0.0, 20.0),
        }
    }
}

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FieldViolation {
    OutOfRange {
        field: ApplicantField,
        value: f64,
        min: f64,
        max: f64,
    },
    InvalidValue {
        field: ApplicantField,
        value: f64,
        reason: String,
    },
    MissingField {
        field: ApplicantField,
    },
}

impl FieldViolation {
    pub fn field(&self) -> ApplicantField {
        match self {
            FieldViolation::OutOfRange { field, .. }
            | FieldViolation::InvalidValue { field, .. }
            | FieldViolation::MissingField { field } => *field,
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldViolation::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field} = {value} is outside [{min}, {max}]"),
            FieldViolation::InvalidValue {
                field,
                value,
                reason,
            } => write!(f, "{field} = {value} is invalid: {reason}"),
            FieldViolation::MissingField { field } => write!(f, "{field} is required"),
        }
    }
}

/// Every constraint a raw record violated, in field order.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("applicant record failed validation: {}", summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn violates(&self, field: ApplicantField) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.field() == field)
    }
}

/// Collects violations across all fields so callers see the full list at once.
#[derive(Default)]
struct Checker {
    violations: Vec<FieldViolation>,
}

impl Checker {
    fn check(&mut self, field: ApplicantField, raw: Option<f64>) -> Option<f64> {
        let Some(value) = raw else {
            self.violations.push(FieldViolation::MissingField { field });
            return None;
        };

        if !value.is_finite() {
            self.violations.push(FieldViolation::InvalidValue {
                field,
                value,
                reason: "must be a finite number".to_string(),
            });
            return None;
        }

        let bounds = field.bounds();
        if value < bounds.min || value > bounds.max {
            self.violations.push(FieldViolation::OutOfRange {
                field,
                value,
                min: bounds.min,
                max: bounds.max,
            });
            return None;
        }

        if bounds.strictly_positive && value == 0.0 {
            self.violations.push(FieldViolation::InvalidValue {
                field,
                value,
                reason: format!("{field} must be > 0"),
            });
            return None;
        }

        Some(value)
    }

    fn ratio(&mut self, field: ApplicantField, raw: Option<f64>) -> Option<f64> {
        self.check(field, raw)
    }

    fn count(&mut self, field: ApplicantField, raw: Option<i64>) -> Option<u32> {
        // Bounds never exceed u32, so the cast after checking is lossless.
        self.check(field, raw.map(|value| value as f64))
            .map(|value| value as u32)
    }
}

/// Check every field of a raw record and build a [`ValidatedRecord`].
///
/// Omitted `dependents` default to zero. Every other field is required; zero `age` or
/// `monthly_income` is rejected as invalid rather than treated as missing.
pub fn validate(raw: &ApplicantRecord) -> Result<ValidatedRecord, ValidationError> {
    let mut checker = Checker::default();

    let revolving_utilization =
        checker.ratio(ApplicantField::RevolvingUtilization, raw.revolving_utilization);
    let age = checker.count(ApplicantField::Age, raw.age);
    let late_30_59_count = checker.count(ApplicantField::Late30To59Count, raw.late_30_59_count);
    let late_60_89_count = checker.count(ApplicantField::Late60To89Count, raw.late_60_89_count);
    let late_90_plus_count =
        checker.count(ApplicantField::Late90PlusCount, raw.late_90_plus_count);
    let debt_ratio = checker.ratio(ApplicantField::DebtRatio, raw.debt_ratio);
    let monthly_income = checker.ratio(ApplicantField::MonthlyIncome, raw.monthly_income);
    let open_credit_lines = checker.count(ApplicantField::OpenCreditLines, raw.open_credit_lines);
    let real_estate_lines = checker.count(ApplicantField::RealEstateLines, raw.real_estate_lines);
    let dependents = checker.count(ApplicantField::Dependents, Some(raw.dependents.unwrap_or(0)));

    match (
        revolving_utilization,
        age,
        late_30_59_count,
        late_60_89_count,
        late_90_plus_count,
        debt_ratio,
        monthly_income,
        open_credit_lines,
        real_estate_lines,
        dependents,
    ) {
        (
            Some(revolving_utilization),
            Some(age),
            Some(late_30_59_count),
            Some(late_60_89_count),
            Some(late_90_plus_count),
            Some(debt_ratio),
            Some(monthly_income),
            Some(open_credit_lines),
            Some(real_estate_lines),
            Some(dependents),
        ) if checker.violations.is_empty() => Ok(ValidatedRecord {
            revolving_utilization,
            age,
            late_30_59_count,
            late_60_89_count,
            late_90_plus_count,
            debt_ratio,
            monthly_income,
            open_credit_lines,
            real_estate_lines,
            dependents,
        }),
        _ => Err(ValidationError {
            violations: checker.violations,
        }),
    }
}
