use super::common::*;
use crate::scoring::domain::ApplicantField;
use crate::scoring::validation::{validate, FieldViolation};

#[test]
fn accepts_reference_applicant() {
    let record = validate(&applicant()).expect("reference applicant is valid");

    assert_eq!(record.revolving_utilization(), 0.9);
    assert_eq!(record.age(), 45);
    assert_eq!(record.late_30_59_count(), 2);
    assert_eq!(record.monthly_income(), 4000.0);
    assert_eq!(record.dependents(), 2);
}

#[test]
fn rejects_zero_age_as_invalid_value() {
    let mut raw = applicant();
    raw.age = Some(0);

    let err = validate(&raw).expect_err("zero age rejected");

    match err.violations() {
        [FieldViolation::InvalidValue { field, reason, .. }] => {
            assert_eq!(*field, ApplicantField::Age);
            assert_eq!(reason, "age must be > 0");
        }
        other => panic!("expected a single invalid value violation, got {other:?}"),
    }
}

#[test]
fn rejects_zero_income_even_when_other_fields_are_invalid() {
    let mut raw = applicant();
    raw.monthly_income = Some(0.0);
    raw.debt_ratio = Some(-1.0);

    let err = validate(&raw).expect_err("zero income rejected");

    assert!(err.violations().iter().any(|violation| matches!(
        violation,
        FieldViolation::InvalidValue {
            field: ApplicantField::MonthlyIncome,
            ..
        }
    )));
    assert!(err.violates(ApplicantField::DebtRatio));
}

#[test]
fn rejects_utilization_above_cap_as_out_of_range() {
    let mut raw = applicant();
    raw.revolving_utilization = Some(1.6);

    let err = validate(&raw).expect_err("utilization above cap");

    match err.violations() {
        [FieldViolation::OutOfRange {
            field, value, max, ..
        }] => {
            assert_eq!(*field, ApplicantField::RevolvingUtilization);
            assert_eq!(*value, 1.6);
            assert_eq!(*max, 1.5);
        }
        other => panic!("expected out of range violation, got {other:?}"),
    }
}

#[test]
fn interval_bounds_are_closed() {
    let mut raw = applicant();
    raw.revolving_utilization = Some(1.5);
    raw.age = Some(120);
    raw.late_90_plus_count = Some(100);
    raw.debt_ratio = Some(10_000.0);
    raw.monthly_income = Some(3_000_000.0);
    raw.open_credit_lines = Some(0);
    raw.real_estate_lines = Some(100);
    raw.dependents = Some(20);

    validate(&raw).expect("values on the interval edges are accepted");
}

#[test]
fn reports_every_violation_in_field_order() {
    let raw = crate::scoring::ApplicantRecord {
        revolving_utilization: Some(2.0),
        age: Some(-3),
        late_30_59_count: Some(101),
        late_60_89_count: None,
        late_90_plus_count: Some(0),
        debt_ratio: Some(f64::NAN),
        monthly_income: None,
        open_credit_lines: Some(3),
        real_estate_lines: Some(0),
        dependents: Some(21),
    };

    let err = validate(&raw).expect_err("many violations");
    let fields: Vec<ApplicantField> = err
        .violations()
        .iter()
        .map(FieldViolation::field)
        .collect();

    assert_eq!(
        fields,
        vec![
            ApplicantField::RevolvingUtilization,
            ApplicantField::Age,
            ApplicantField::Late30To59Count,
            ApplicantField::Late60To89Count,
            ApplicantField::DebtRatio,
            ApplicantField::MonthlyIncome,
            ApplicantField::Dependents,
        ]
    );
    assert!(matches!(
        err.violations()[3],
        FieldViolation::MissingField {
            field: ApplicantField::Late60To89Count
        }
    ));
    assert!(matches!(
        err.violations()[4],
        FieldViolation::InvalidValue {
            field: ApplicantField::DebtRatio,
            ..
        }
    ));
}

#[test]
fn omitted_dependents_default_to_zero() {
    let mut raw = applicant();
    raw.dependents = None;

    let record = validate(&raw).expect("dependents optional");

    assert_eq!(record.dependents(), 0);
}

#[test]
fn missing_income_is_required_for_live_requests() {
    let mut raw = applicant();
    raw.monthly_income = None;

    let err = validate(&raw).expect_err("income required");

    assert_eq!(
        err.violations(),
        &[FieldViolation::MissingField {
            field: ApplicantField::MonthlyIncome
        }]
    );
}

#[test]
fn error_message_lists_violations() {
    let mut raw = applicant();
    raw.age = Some(0);
    raw.revolving_utilization = Some(1.6);

    let message = validate(&raw).expect_err("invalid").to_string();

    assert!(message.contains("revolving_utilization = 1.6 is outside [0, 1.5]"));
    assert!(message.contains("age must be > 0"));
}

#[test]
fn violations_serialize_with_rule_and_field() {
    let mut raw = applicant();
    raw.age = Some(0);

    let err = validate(&raw).expect_err("invalid");
    let payload = serde_json::to_value(err.violations()).expect("serializes");

    assert_eq!(payload[0]["rule"], "invalid_value");
    assert_eq!(payload[0]["field"], "age");
    assert_eq!(payload[0]["value"], 0.0);
}
