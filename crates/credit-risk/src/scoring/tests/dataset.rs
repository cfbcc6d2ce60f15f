use super::common::*;
use crate::scoring::dataset::{read_applicants, write_outcomes, DatasetError};
use crate::scoring::domain::ScoringResult;
use crate::scoring::service::PredictionError;
use crate::scoring::validation::validate;

const KAGGLE_SAMPLE: &str = "\
,SeriousDlqin2yrs,RevolvingUtilizationOfUnsecuredLines,age,NumberOfTime30-59DaysPastDueNotWorse,DebtRatio,MonthlyIncome,NumberOfOpenCreditLinesAndLoans,NumberOfTimes90DaysLate,NumberRealEstateLoansOrLines,NumberOfTime60-89DaysPastDueNotWorse,NumberOfDependents
1,1,0.766126609,45,2,0.802982129,9120,13,0,6,0,2
2,0,0.957151019,40,0,0.121876201,2600,4,0,0,0,1
3,0,0.658180114,38,1,0.085113375,NA,2,1,0,0,NA
";

#[test]
fn reads_historical_dataset_and_ignores_extra_columns() {
    let records = read_applicants(KAGGLE_SAMPLE.as_bytes()).expect("parses");

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].age, Some(45));
    assert_eq!(records[0].late_30_59_count, Some(2));
    assert_eq!(records[0].monthly_income, Some(9120.0));
    assert_eq!(records[1].revolving_utilization, Some(0.957151019));
    assert_eq!(records[2].late_90_plus_count, Some(1));
}

#[test]
fn na_cells_become_missing_values() {
    let records = read_applicants(KAGGLE_SAMPLE.as_bytes()).expect("parses");

    assert_eq!(records[2].monthly_income, None);
    assert_eq!(records[2].dependents, None);
    assert!(validate(&records[2]).is_err());
}

#[test]
fn empty_cells_are_missing_like_na() {
    let csv = "\
age,MonthlyIncome,NumberOfDependents
40,,
";

    let records = read_applicants(csv.as_bytes()).expect("parses");

    assert_eq!(records[0].monthly_income, None);
    assert_eq!(records[0].dependents, None);
}

#[test]
fn non_numeric_cell_rejects_the_row_instead_of_imputing() {
    let csv = "\
age,MonthlyIncome,NumberOfDependents
40,garbage,1
";

    let err = read_applicants(csv.as_bytes()).expect_err("garbage income rejected");

    assert!(matches!(err, DatasetError::Csv(_)));
    assert!(err.to_string().contains("garbage"));
}

#[test]
fn fractional_count_rejects_the_row() {
    let csv = "\
age,MonthlyIncome,NumberOfDependents
40,4000,2.5
";

    assert!(matches!(
        read_applicants(csv.as_bytes()),
        Err(DatasetError::Csv(_))
    ));
}

#[test]
fn accepts_snake_case_headers() {
    let csv = "\
revolving_utilization, age, late_30_59_count, late_60_89_count, late_90_plus_count, debt_ratio, monthly_income, open_credit_lines, real_estate_lines, dependents
0.9, 45, 2, 0, 0, 0.3, 4000, 5, 1, 2
";

    let records = read_applicants(csv.as_bytes()).expect("parses");

    assert_eq!(records, vec![applicant()]);
}

#[test]
fn writes_one_numbered_row_per_outcome() {
    let mut raw = applicant();
    raw.age = Some(0);
    let failure = PredictionError::from(validate(&raw).expect_err("zero age"));
    let outcomes = vec![
        Ok(ScoringResult::from_probability(0.75)),
        Err(failure),
    ];
    let mut buffer = Vec::new();

    write_outcomes(&mut buffer, &outcomes).expect("writes");

    let output = String::from_utf8(buffer).expect("utf8");
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "row,default_probability,will_default,error");
    assert_eq!(lines[1], "1,0.75,true,");
    assert!(lines[2].starts_with("2,,,"));
    assert!(lines[2].contains("age must be > 0"));
}
