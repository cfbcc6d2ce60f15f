use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{ApplicantRecord, ScoringResult};
use super::service::PredictionError;

/// Errors raised while reading or writing offline applicant files.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cell text the historical dataset uses for an absent value.
const MISSING_MARKER: &str = "NA";

/// One row of the historical credit dataset.
///
/// Empty and `NA` cells are missing; any other cell must parse or the row is rejected.
/// The index and target columns are ignored.
#[derive(Debug, Deserialize)]
struct DatasetRow {
    #[serde(
        rename = "RevolvingUtilizationOfUnsecuredLines",
        alias = "revolving_utilization",
        default,
        deserialize_with = "missing_or_parsed"
    )]
    revolving_utilization: Option<f64>,
    #[serde(default, deserialize_with = "missing_or_parsed")]
    age: Option<i64>,
    #[serde(
        rename = "NumberOfTime30-59DaysPastDueNotWorse",
        alias = "NumberOfTime30_59DaysPastDueNotWorse",
        alias = "late_30_59_count",
        default,
        deserialize_with = "missing_or_parsed"
    )]
    late_30_59_count: Option<i64>,
    #[serde(
        rename = "NumberOfTime60-89DaysPastDueNotWorse",
        alias = "NumberOfTime60_89DaysPastDueNotWorse",
        alias = "late_60_89_count",
        default,
        deserialize_with = "missing_or_parsed"
    )]
    late_60_89_count: Option<i64>,
    #[serde(
        rename = "NumberOfTimes90DaysLate",
        alias = "late_90_plus_count",
        default,
        deserialize_with = "missing_or_parsed"
    )]
    late_90_plus_count: Option<i64>,
    #[serde(
        rename = "DebtRatio",
        alias = "debt_ratio",
        default,
        deserialize_with = "missing_or_parsed"
    )]
    debt_ratio: Option<f64>,
    #[serde(
        rename = "MonthlyIncome",
        alias = "monthly_income",
        default,
        deserialize_with = "missing_or_parsed"
    )]
    monthly_income: Option<f64>,
    #[serde(
        rename = "NumberOfOpenCreditLinesAndLoans",
        alias = "open_credit_lines",
        default,
        deserialize_with = "missing_or_parsed"
    )]
    open_credit_lines: Option<i64>,
    #[serde(
        rename = "NumberRealEstateLoansOrLines",
        alias = "real_estate_lines",
        default,
        deserialize_with = "missing_or_parsed"
    )]
    real_estate_lines: Option<i64>,
    #[serde(
        rename = "NumberOfDependents",
        alias = "dependents",
        default,
        deserialize_with = "missing_or_parsed"
    )]
    dependents: Option<i64>,
}

fn missing_or_parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let cell = Option::<String>::deserialize(deserializer)?;
    match cell.as_deref().map(str::trim) {
        None | Some("") | Some(MISSING_MARKER) => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|err| {
            serde::de::Error::custom(format!("cell '{raw}' is not a valid number: {err}"))
        }),
    }
}

impl From<DatasetRow> for ApplicantRecord {
    fn from(row: DatasetRow) -> Self {
        ApplicantRecord {
            revolving_utilization: row.revolving_utilization,
            age: row.age,
            late_30_59_count: row.late_30_59_count,
            late_60_89_count: row.late_60_89_count,
            late_90_plus_count: row.late_90_plus_count,
            debt_ratio: row.debt_ratio,
            monthly_income: row.monthly_income,
            open_credit_lines: row.open_credit_lines,
            real_estate_lines: row.real_estate_lines,
            dependents: row.dependents,
        }
    }
}

pub fn read_applicants<R: Read>(reader: R) -> Result<Vec<ApplicantRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for row in reader.deserialize::<DatasetRow>() {
        records.push(ApplicantRecord::from(row?));
    }
    Ok(records)
}

pub fn read_applicants_from_path(
    path: impl AsRef<Path>,
) -> Result<Vec<ApplicantRecord>, DatasetError> {
    let file = std::fs::File::open(path)?;
    read_applicants(file)
}

#[derive(Debug, Serialize)]
struct OutcomeRow {
    row: usize,
    default_probability: Option<f64>,
    will_default: Option<bool>,
    error: Option<String>,
}

/// Write one CSV line per scored record, numbering rows from 1.
pub fn write_outcomes<W: Write>(
    writer: W,
    outcomes: &[Result<ScoringResult, PredictionError>],
) -> Result<(), DatasetError> {
    let mut writer = csv::Writer::from_writer(writer);
    for (index, outcome) in outcomes.iter().enumerate() {
        let row = match outcome {
            Ok(result) => OutcomeRow {
                row: index + 1,
                default_probability: Some(result.default_probability),
                will_default: Some(result.will_default),
                error: None,
            },
            Err(err) => OutcomeRow {
                row: index + 1,
                default_probability: None,
                will_default: None,
                error: Some(err.to_string()),
            },
        };
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
