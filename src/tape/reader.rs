use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::io;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

use crate::decimal::{Money, Rate};
use crate::errors::{AmortizationError, Result};
use crate::loan::LoanRecord;
use crate::portfolio::SkippedLoan;
use crate::types::{FailurePolicy, LoanId, PaymentFrequency};

const PRINCIPAL: &str = "loan amount";
const RATE: &str = "interest_rate";
const TERM: &str = "term";
const START_DATE: &str = "start_date";

const PRINCIPAL_ALIASES: &[&str] = &["loan amount", "original_principal", "principal"];
const RATE_ALIASES: &[&str] = &["interest_rate", "interest rate"];
const TERM_ALIASES: &[&str] = &["term", "amortization_term_months"];
const START_ALIASES: &[&str] = &["start_date", "start date"];
const FREQUENCY_ALIASES: &[&str] = &["payment_frequency", "payment frequency"];
const PREPAYMENT_ALIASES: &[&str] = &["prepayment"];
const LOAN_ID_ALIASES: &[&str] = &["loan number", "loan_number"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// records parsed from a loan tape plus the rows left out
#[derive(Debug, Clone, Default)]
pub struct LoanTape {
    pub records: Vec<LoanRecord>,
    pub rejected: Vec<SkippedLoan>,
}

/// column positions after header normalization
#[derive(Debug, Clone, Default)]
struct ColumnMap {
    principal: Option<usize>,
    rate: Option<usize>,
    term: Option<usize>,
    start_date: Option<usize>,
    frequency: Option<usize>,
    prepayment: Option<usize>,
    loan_id: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |aliases: &[&str]| normalized.iter().position(|h| aliases.contains(&h.as_str()));

        Self {
            principal: find(PRINCIPAL_ALIASES),
            rate: find(RATE_ALIASES),
            term: find(TERM_ALIASES),
            start_date: find(START_ALIASES),
            frequency: find(FREQUENCY_ALIASES),
            prepayment: find(PREPAYMENT_ALIASES),
            loan_id: find(LOAN_ID_ALIASES),
        }
    }
}

/// read a loan tape from any csv source
pub fn read_loan_tape<R: io::Read>(source: R, policy: FailurePolicy) -> Result<LoanTape> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);
    let columns = ColumnMap::from_headers(reader.headers()?);

    let mut tape = LoanTape::default();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = idx + 1;

        match parse_row(&record, &columns, row) {
            Ok(mut loan) => {
                loan.tape_index = Some(idx);
                tape.records.push(loan);
            }
            Err(err) if policy == FailurePolicy::Skip => {
                let loan_id = cell(&record, columns.loan_id).map(LoanId::from).unwrap_or_default();
                let reason = err.to_string();
                warn!(row, %loan_id, %reason, "loan tape row rejected");
                tape.rejected.push(SkippedLoan {
                    index: idx,
                    loan_id,
                    reason,
                });
            }
            Err(err) => return Err(err),
        }
    }

    info!(records = tape.records.len(), rejected = tape.rejected.len(), "loan tape read");
    Ok(tape)
}

/// read a loan tape from a csv file
pub fn read_loan_tape_path(path: impl AsRef<Path>, policy: FailurePolicy) -> Result<LoanTape> {
    let file = std::fs::File::open(path)?;
    read_loan_tape(io::BufReader::new(file), policy)
}

fn parse_row(record: &csv::StringRecord, columns: &ColumnMap, row: usize) -> Result<LoanRecord> {
    let principal = required(record, columns.principal, row, PRINCIPAL)?;
    let rate = required(record, columns.rate, row, RATE)?;
    let term = required(record, columns.term, row, TERM)?;
    let start = required(record, columns.start_date, row, START_DATE)?;

    let mut loan = LoanRecord::new(
        parse_money(principal, PRINCIPAL)?,
        parse_rate(rate)?,
        parse_term(term)?,
        parse_date(start)?,
    );

    if let Some(frequency) = cell(record, columns.frequency) {
        loan.frequency = Some(PaymentFrequency::from_str(frequency)?);
    }
    if let Some(prepayment) = cell(record, columns.prepayment) {
        loan.prepayment = Some(parse_money(prepayment, "prepayment")?);
    }
    loan.loan_id = cell(record, columns.loan_id).map(LoanId::from);

    Ok(loan)
}

/// non-empty cell at `column`
fn cell(record: &csv::StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn required<'r>(
    record: &'r csv::StringRecord,
    column: Option<usize>,
    row: usize,
    field: &'static str,
) -> Result<&'r str> {
    cell(record, column).ok_or(AmortizationError::MissingField { row, field })
}

fn parse_money(value: &str, field: &'static str) -> Result<Money> {
    let cleaned: String = value.chars().filter(|c| !matches!(c, ',' | '$')).collect();
    Money::from_str_exact(&cleaned).map_err(|_| AmortizationError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// decimal fraction, or a percentage when suffixed with `%`
fn parse_rate(value: &str) -> Result<Rate> {
    let invalid = || AmortizationError::InvalidNumber {
        field: RATE,
        value: value.to_string(),
    };

    match value.strip_suffix('%') {
        Some(pct) => {
            let pct = Decimal::from_str(pct.trim()).map_err(|_| invalid())?;
            Ok(Rate::from_decimal(pct / Decimal::from(100)))
        }
        None => Rate::from_str(value).map_err(|_| invalid()),
    }
}

/// whole months; spreadsheet exports often write `360.0`
fn parse_term(value: &str) -> Result<u32> {
    let invalid = || AmortizationError::InvalidNumber {
        field: TERM,
        value: value.to_string(),
    };

    let months = Decimal::from_str(value).map_err(|_| invalid())?;
    if !months.fract().is_zero() {
        return Err(invalid());
    }
    months.to_u32().ok_or_else(invalid)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| AmortizationError::InvalidDate {
            message: format!("unrecognised start date `{}`", value),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reads_canonical_headers() {
        let csv = "\
loan number,loan amount,interest_rate,term,start_date,payment_frequency,prepayment
L-1,120000,0.06,360,2024-01-01,Monthly,0
L-2,5000,0.05,12,2024-02-15,Quarterly,100
";
        let tape = read_loan_tape(csv.as_bytes(), FailurePolicy::Abort).unwrap();

        assert_eq!(tape.records.len(), 2);
        let first = &tape.records[0];
        assert_eq!(first.loan_id(), LoanId::from("L-1"));
        assert_eq!(first.principal, Money::from_major(120_000));
        assert_eq!(first.annual_rate.as_decimal(), dec!(0.06));
        assert_eq!(first.term_months, 360);
        assert_eq!(first.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(tape.records[1].frequency, Some(PaymentFrequency::Quarterly));
        assert_eq!(tape.records[1].prepayment, Some(Money::from_major(100)));
    }

    #[test]
    fn test_normalizes_source_column_names() {
        let csv = "\
Loan_Number, Original_Principal ,Interest_Rate,Amortization_Term_Months,Start_Date
X9,\"25,000\",5%,60.0,2023-06-30 00:00:00
";
        let tape = read_loan_tape(csv.as_bytes(), FailurePolicy::Abort).unwrap();

        let loan = &tape.records[0];
        assert_eq!(loan.loan_id(), LoanId::from("X9"));
        assert_eq!(loan.principal, Money::from_major(25_000));
        assert_eq!(loan.annual_rate.as_decimal(), dec!(0.05));
        assert_eq!(loan.term_months, 60);
        assert_eq!(loan.start_date, NaiveDate::from_ymd_opt(2023, 6, 30).unwrap());
        assert_eq!(loan.frequency, None);
        assert_eq!(loan.prepayment, None);
    }

    #[test]
    fn test_optional_columns_may_be_absent_or_blank() {
        let csv = "\
loan amount,interest_rate,term,start_date,loan number
1000,0.1,12,01/15/2024,
";
        let tape = read_loan_tape(csv.as_bytes(), FailurePolicy::Abort).unwrap();

        let loan = &tape.records[0];
        assert_eq!(loan.loan_id, None);
        assert_eq!(loan.loan_id(), LoanId::missing());
        assert_eq!(loan.start_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_missing_required_field_aborts() {
        let csv = "\
loan amount,interest_rate,start_date
1000,0.1,2024-01-01
";
        let err = read_loan_tape(csv.as_bytes(), FailurePolicy::Abort).unwrap_err();
        assert!(matches!(err, AmortizationError::MissingField { row: 1, field: "term" }));
    }

    #[test]
    fn test_skip_policy_rejects_bad_rows() {
        let csv = "\
loan number,loan amount,interest_rate,term,start_date,payment_frequency
good,1000,0.1,12,2024-01-01,Monthly
no-amount,,0.1,12,2024-01-01,Monthly
odd-freq,1000,0.1,12,2024-01-01,Fortnightly
bad-term,1000,0.1,12.5,2024-01-01,Monthly
bad-date,1000,0.1,12,next tuesday,Monthly
";
        let tape = read_loan_tape(csv.as_bytes(), FailurePolicy::Skip).unwrap();

        assert_eq!(tape.records.len(), 1);
        let rejected: Vec<_> = tape.rejected.iter().map(|r| r.loan_id.as_str()).collect();
        assert_eq!(rejected, vec!["no-amount", "odd-freq", "bad-term", "bad-date"]);
        assert_eq!(tape.rejected[0].index, 1);
        assert!(tape.rejected[0].reason.contains("loan amount"));
    }

    #[test]
    fn test_records_keep_their_tape_row() {
        let csv = "\
loan number,loan amount,interest_rate,term,start_date
bad,,0.1,12,2024-01-01
A,1000,0.1,12,2024-01-01
B,2000,0.1,12,2024-01-01
";
        let tape = read_loan_tape(csv.as_bytes(), FailurePolicy::Skip).unwrap();

        assert_eq!(tape.rejected[0].index, 0);
        let rows: Vec<_> = tape.records.iter().map(|r| r.tape_index).collect();
        assert_eq!(rows, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_reads_tape_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tape.csv");
        std::fs::write(&path, "loan amount,interest_rate,term,start_date\n1000,0.1,12,2024-01-01\n").unwrap();

        let tape = read_loan_tape_path(&path, FailurePolicy::Abort).unwrap();
        assert_eq!(tape.records.len(), 1);
        assert_eq!(tape.records[0].principal, Money::from_major(1_000));

        let missing = read_loan_tape_path(dir.path().join("absent.csv"), FailurePolicy::Skip);
        assert!(matches!(missing, Err(AmortizationError::Io(_))));
    }

    #[test]
    fn test_parse_rate_forms() {
        assert_eq!(parse_rate("0.045").unwrap().as_decimal(), dec!(0.045));
        assert_eq!(parse_rate("4.5%").unwrap().as_decimal(), dec!(0.045));
        assert!(parse_rate("four").is_err());
    }
}
